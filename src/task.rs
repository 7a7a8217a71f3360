//! Task records and the payloads used to create and edit them.
//!
//! Field names serialize in camelCase so that a task document matches the
//! shape stored in the remote `tasks` collection
//! (`title`, `description`, `priority`, `assignee`, `dueDate`, `processNumber`).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Date format accepted for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("priority cannot be empty".to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!(
                "unknown task priority '{trimmed}' (expected low|medium|high)"
            ))),
        }
    }
}

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT).map_err(|err| {
        Error::InvalidArgument(format!(
            "invalid due date '{trimmed}' (expected YYYY-MM-DD): {err}"
        ))
    })
}

/// Everything about a task except its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_number: Option<u32>,
}

impl TaskFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            assignee: None,
            due_date: None,
            process_number: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_process_number(mut self, process_number: u32) -> Self {
        self.process_number = Some(process_number);
        self
    }

    /// Trim text fields and turn blank optional text into `None`.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = non_blank(self.description);
        self.assignee = non_blank(self.assignee);
        self
    }

    /// Reject records a form would refuse to submit.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }
        if self.process_number == Some(0) {
            return Err(Error::Validation(
                "process number must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(flatten)]
    pub fields: TaskFields,
}

impl Task {
    pub fn new(id: impl Into<String>, fields: TaskFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn priority(&self) -> Priority {
        self.fields.priority
    }
}

/// Partial update for a task.
///
/// Outer `None` leaves a field untouched. For optional fields `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub assignee: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub process_number: Option<Option<u32>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.process_number.is_none()
    }

    /// Merge into `fields`. Nothing is written when the result would not validate.
    pub fn apply(&self, fields: &mut TaskFields) -> Result<()> {
        let mut next = fields.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            next.assignee = assignee.clone();
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(process_number) = self.process_number {
            next.process_number = process_number;
        }
        let next = next.normalized();
        next.validate()?;
        *fields = next;
        Ok(())
    }

    /// Names of the fields this patch touches, for logs and output.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.description.is_some() {
            names.push("description");
        }
        if self.priority.is_some() {
            names.push("priority");
        }
        if self.assignee.is_some() {
            names.push("assignee");
        }
        if self.due_date.is_some() {
            names.push("dueDate");
        }
        if self.process_number.is_some() {
            names.push("processNumber");
        }
        names
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

// A present-but-null field deserializes to `Some(None)` rather than `None`.
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn validate_rejects_blank_title_and_zero_process() {
        assert!(TaskFields::new("   ").validate().is_err());
        assert!(TaskFields::new("ok").with_process_number(0).validate().is_err());
        assert!(TaskFields::new("ok").with_process_number(3).validate().is_ok());
    }

    #[test]
    fn normalized_drops_blank_optional_text() {
        let fields = TaskFields::new("  Title  ")
            .with_description("   ")
            .with_assignee(" Sarah Kim ")
            .normalized();
        assert_eq!(fields.title, "Title");
        assert_eq!(fields.description, None);
        assert_eq!(fields.assignee.as_deref(), Some("Sarah Kim"));
    }

    #[test]
    fn task_serializes_as_flat_camel_case_document() {
        let task = Task::new(
            "1",
            TaskFields::new("Design mockups")
                .with_priority(Priority::High)
                .with_due_date(parse_due_date("2024-01-25").unwrap())
                .with_process_number(2),
        );
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["title"], "Design mockups");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["dueDate"], "2024-01-25");
        assert_eq!(value["processNumber"], 2);
        assert!(value.get("description").is_none());
    }

    #[test]
    fn patch_clears_and_sets_fields() {
        let mut fields = TaskFields::new("Write docs").with_assignee("Mike");
        let patch = TaskPatch {
            assignee: Some(None),
            priority: Some(Priority::Low),
            ..TaskPatch::default()
        };
        patch.apply(&mut fields).unwrap();
        assert_eq!(fields.assignee, None);
        assert_eq!(fields.priority, Priority::Low);
        assert_eq!(patch.field_names(), vec!["priority", "assignee"]);
    }

    #[test]
    fn patch_with_blank_title_leaves_fields_untouched() {
        let mut fields = TaskFields::new("Keep me");
        let patch = TaskPatch {
            title: Some("  ".to_string()),
            priority: Some(Priority::High),
            ..TaskPatch::default()
        };
        assert!(matches!(patch.apply(&mut fields), Err(Error::Validation(_))));
        assert_eq!(fields.title, "Keep me");
        assert_eq!(fields.priority, Priority::Medium);
    }

    #[test]
    fn patch_null_roundtrips_as_clear() {
        let patch: TaskPatch = serde_json::from_str(r#"{"dueDate": null}"#).unwrap();
        assert_eq!(patch.due_date, Some(None));
        let empty: TaskPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn bad_due_date_is_rejected() {
        assert!(parse_due_date("2024-13-01").is_err());
        assert!(parse_due_date("tomorrow").is_err());
    }
}
