// Messaging module - lock-free channels between UI and audio contexts

pub mod channels;
pub mod command;
pub mod notification;

pub use channels::{create_command_channel, create_notification_channel};
pub use command::Command;
pub use notification::{Notification, NotificationCategory, NotificationLevel};
