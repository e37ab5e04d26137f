//! Business logic services.

#![allow(missing_docs)]

pub mod engagement;
pub mod notification;
pub mod poll;
pub mod user;

pub use engagement::{EngagementService, ToggleTarget};
pub use notification::NotificationService;
pub use poll::{
    BatchPollResults, CastVoteInput, PollOptionResult, PollResults, PollService, UserVote,
};
pub use user::UserService;
