use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Weekday a task is scheduled for. Wire names are the backend's
/// capitalized English day names (`"Monday"` .. `"Sunday"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Abbreviated label for compact list rendering.
    pub fn short_label(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Mon",
            DayOfWeek::Tuesday => "Tue",
            DayOfWeek::Wednesday => "Wed",
            DayOfWeek::Thursday => "Thu",
            DayOfWeek::Friday => "Fri",
            DayOfWeek::Saturday => "Sat",
            DayOfWeek::Sunday => "Sun",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayOfWeek::Monday => write!(f, "Monday"),
            DayOfWeek::Tuesday => write!(f, "Tuesday"),
            DayOfWeek::Wednesday => write!(f, "Wednesday"),
            DayOfWeek::Thursday => write!(f, "Thursday"),
            DayOfWeek::Friday => write!(f, "Friday"),
            DayOfWeek::Saturday => write!(f, "Saturday"),
            DayOfWeek::Sunday => write!(f, "Sunday"),
        }
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(DayOfWeek::Monday),
            "tue" | "tuesday" => Ok(DayOfWeek::Tuesday),
            "wed" | "wednesday" => Ok(DayOfWeek::Wednesday),
            "thu" | "thursday" => Ok(DayOfWeek::Thursday),
            "fri" | "friday" => Ok(DayOfWeek::Friday),
            "sat" | "saturday" => Ok(DayOfWeek::Saturday),
            "sun" | "sunday" => Ok(DayOfWeek::Sunday),
            other => Err(ClientError::Validation(format!("unknown weekday: {other}"))),
        }
    }
}

/// A task record as the backend serializes it. Timestamps arrive as
/// zoneless ISO-8601 local datetimes, so fields stay `NaiveDateTime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// A task is completed exactly when it carries a completion timestamp.
    pub fn completion_state_consistent(&self) -> bool {
        self.completed == self.completed_at.is_some()
    }
}

/// Aggregate counts reported by the backend's statistics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatistics {
    pub total: i64,
    pub completed: i64,
    pub incomplete: i64,
}
