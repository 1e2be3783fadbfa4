use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Todo,
    Doing,
    Completed,
    Expired,
}

impl Status {
    /// Statuses that get a column on the board. Expired tasks are never shown.
    pub const BOARD: [Status; 3] = [Status::Todo, Status::Doing, Status::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Completed => "completed",
            Status::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [Status::Todo, Status::Doing, Status::Completed, Status::Expired]
            .into_iter()
            .find(|s| s.as_str() == value)
    }
}

/// A task as returned by the remote API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(with = "due_date")]
    pub finishdate: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

/// Request body for creating or updating a task.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    #[serde(with = "due_date")]
    pub finishdate: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    pub category: String,
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone(),
            finishdate: task.finishdate,
            priority: task.priority,
            status: task.status,
            category: task.category.clone(),
        }
    }
}

/// Reads a missing or `null` value as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Due dates travel as `YYYY-MM-DD`; the API may append a time part, which is dropped.
pub mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    /// Strict `YYYY-MM-DD`, for dates typed by the user.
    pub fn parse(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), FORMAT).ok()
    }

    /// Reads the leading date of an API value such as `2024-05-01T00:00:00.000Z`.
    fn parse_leading(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        parse(value.get(..10).unwrap_or(value))
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_leading(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid due date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_task_with_timestamp_due_date() {
        let task: Task = serde_json::from_str(
            r#"{"_id":"t1","name":"Cook","description":"pasta","finishdate":"2024-05-01T00:00:00.000Z",
                "priority":"high","status":"doing","category":"home"}"#,
        )
        .unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.finishdate, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::Doing);
    }

    #[test]
    fn draft_serializes_plain_date() {
        let draft = TaskDraft {
            name: "Cook".into(),
            description: String::new(),
            finishdate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            priority: Priority::Medium,
            status: Status::Todo,
            category: "home".into(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["finishdate"], "2024-05-01");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["status"], "todo");
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"_id":"t2","name":"Call","description":null,"finishdate":"2024-05-01",
                "priority":null,"status":null,"category":null}"#,
        )
        .unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.category, "");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn rejects_garbage_due_date() {
        let err = serde_json::from_str::<Task>(r#"{"id":"t","name":"n","finishdate":"soon"}"#);
        assert!(err.is_err());
    }
}
