//! Database repositories.

pub mod article_like;
pub mod follow;
pub mod notification;
pub mod poll;
pub mod saved_entry;
pub mod user;

pub use article_like::ArticleLikeRepository;
pub use follow::FollowRepository;
pub use notification::NotificationRepository;
pub use poll::{NewVote, PollCountRepository, PollVoteRepository, VoteMove};
pub use saved_entry::SavedEntryRepository;
pub use user::UserRepository;
