//! Database entities.

pub mod article_like;
pub mod follow;
pub mod notification;
pub mod poll_option_count;
pub mod poll_vote;
pub mod saved_entry;
pub mod user;

pub use article_like::Entity as ArticleLike;
pub use follow::Entity as Follow;
pub use notification::Entity as Notification;
pub use poll_option_count::Entity as PollOptionCount;
pub use poll_vote::Entity as PollVote;
pub use saved_entry::Entity as SavedEntry;
pub use user::Entity as User;
