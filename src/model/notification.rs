use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    #[default]
    Info,
    Success,
    Achievement,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Info => "info",
            NotificationCategory::Success => "success",
            NotificationCategory::Achievement => "achievement",
        }
    }
}

/// A transient sidebar message. Only the notification queue creates these;
/// everyone else gets read access.
#[readonly::make]
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub category: NotificationCategory,
    pub created_at: DateTime<Local>,
}

impl Notification {
    pub(crate) fn new(
        id: NotificationId,
        message: impl Into<String>,
        category: NotificationCategory,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            category,
            created_at,
        }
    }

    pub fn view(&self) -> NotificationView {
        NotificationView {
            id: self.id,
            message: self.message.clone(),
            category: self.category,
            formatted_time: format_clock_time(&self.created_at),
        }
    }
}

/// One row of the rendered notification list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub id: NotificationId,
    pub message: String,
    pub category: NotificationCategory,
    pub formatted_time: String,
}

/// Hour and minute, both zero-padded to two digits.
pub fn format_clock_time<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    timestamp.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_clock_time_is_zero_padded() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let early = tz.with_ymd_and_hms(2024, 3, 9, 7, 5, 59).unwrap();
        assert_eq!(format_clock_time(&early), "07:05");

        let late = tz.with_ymd_and_hms(2024, 3, 9, 23, 40, 0).unwrap();
        assert_eq!(format_clock_time(&late), "23:40");
    }

    #[test]
    fn test_view_copies_fields() {
        let created_at = Local.with_ymd_and_hms(2024, 1, 2, 9, 3, 0).unwrap();
        let notification = Notification::new(
            NotificationId(7),
            "New highest tile: 1024",
            NotificationCategory::Success,
            created_at,
        );
        let view = notification.view();

        assert_eq!(view.id, NotificationId(7));
        assert_eq!(view.message, "New highest tile: 1024");
        assert_eq!(view.category, NotificationCategory::Success);
        assert_eq!(view.formatted_time, "09:03");
    }

    #[test]
    fn test_category_names() {
        assert_eq!(NotificationCategory::Info.as_str(), "info");
        assert_eq!(NotificationCategory::Success.as_str(), "success");
        assert_eq!(NotificationCategory::Achievement.as_str(), "achievement");
        assert_eq!(
            serde_json::to_string(&NotificationCategory::Achievement).unwrap(),
            "\"achievement\""
        );
    }
}
