//! Push notification pass-through.

use serde::{Deserialize, Serialize};

use shelter_core::config::NotificationConfig;

/// A notification the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Arrival time in milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Build the notification shown for a push event.
///
/// The body is the push payload, or a generic message when the push
/// carried no text.
pub fn push_notification(app_name: &str, config: &NotificationConfig, payload: Option<&str>) -> Notification {
    let body = match payload {
        Some(text) => text.to_string(),
        None => format!("New notification from {app_name}"),
    };

    Notification {
        title: app_name.to_string(),
        body,
        icon: config.icon.clone(),
        badge: config.badge.clone(),
        vibrate: config.vibrate.clone(),
        data: NotificationData { date_of_arrival: chrono::Utc::now().timestamp_millis(), primary_key: 1 },
    }
}
