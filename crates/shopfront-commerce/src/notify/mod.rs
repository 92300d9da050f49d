//! Notifications and the realtime feed.

mod feed;
mod notification;

pub use feed::{ChangeEvent, FeedNotice, UserFeed};
pub use notification::Notification;
