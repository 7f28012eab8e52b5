//! Notifications module - domain models.

mod notifications_model;

pub use notifications_model::{notification_title, Notification, NotificationStatus};
