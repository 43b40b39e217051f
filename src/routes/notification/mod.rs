mod handler;
mod model;
mod service;

pub use handler::{list_notifications, mark_read, unread_count};
pub use model::{Notification, NotificationView, TourSummary};
pub use service::notify_nearby_users;
