use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const ID_LEN: usize = 8;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub type TaskId = String;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid time `{0}` (expected HH:MM, 24-hour)")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Done,
    #[default]
    NotDone,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Done => TaskStatus::NotDone,
            TaskStatus::NotDone => TaskStatus::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Done => "done",
            TaskStatus::NotDone => "not-done",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "done" => Ok(TaskStatus::Done),
            "not-done" => Ok(TaskStatus::NotDone),
            other => Err(format!("unknown status `{other}` (expected done or not-done)")),
        }
    }
}

/// Wall-clock time of a task, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskTime {
    hour: u32,
    minute: u32,
}

impl TaskTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, TaskError> {
        if hour > 23 || minute > 59 {
            return Err(TaskError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parses `HH:MM`. Single-digit hours (`9:30`) are accepted.
    pub fn parse(raw: &str) -> Result<Self, TaskError> {
        let invalid = || TaskError::InvalidTime(raw.to_string());
        let (hour, minute) = raw.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn hour(self) -> u32 {
        self.hour
    }

    pub fn minute(self) -> u32 {
        self.minute
    }
}

impl Display for TaskTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TaskTime {
    type Err = TaskError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Serialize for TaskTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TaskTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: TaskTime,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        time: TaskTime,
        status: TaskStatus,
    ) -> Result<Self, TaskError> {
        let title = required_title(title.into())?;
        Ok(Self {
            id: generate_id(),
            title,
            description: description.into(),
            date,
            time,
            status,
        })
    }

    /// Builds a task from raw form input: `YYYY-MM-DD` date and `HH:MM` time.
    pub fn from_input(
        title: &str,
        description: &str,
        date: &str,
        time: &str,
        status: TaskStatus,
    ) -> Result<Self, TaskError> {
        let date = parse_date(date)?;
        let time = TaskTime::parse(time)?;
        Self::new(title, description, date, time, status)
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Applies a patch and returns the validated replacement. The id is kept.
    pub fn patched(&self, patch: &TaskPatch) -> Result<Self, TaskError> {
        let title = match &patch.title {
            Some(title) => required_title(title.clone())?,
            None => self.title.clone(),
        };
        Ok(Self {
            id: self.id.clone(),
            title,
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            date: patch.date.unwrap_or(self.date),
            time: patch.time.unwrap_or(self.time),
            status: patch.status.unwrap_or(self.status),
        })
    }
}

/// Field-wise replacement values for editing an existing task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<TaskTime>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TaskError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TaskError::InvalidDate(raw.to_string()))
}

pub(crate) fn required_title(title: String) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

pub fn generate_id() -> TaskId {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Task, TaskError, TaskPatch, TaskStatus, TaskTime, parse_date};

    #[test]
    fn parses_24_hour_times() {
        assert_eq!(TaskTime::parse("09:00").unwrap(), TaskTime::new(9, 0).unwrap());
        assert_eq!(TaskTime::parse("23:59").unwrap().to_string(), "23:59");
        assert_eq!(TaskTime::parse("7:05").unwrap().to_string(), "07:05");
    }

    #[test]
    fn rejects_out_of_range_times() {
        for raw in ["24:00", "12:60", "noon", "12", "12:5", ":30", "123:00"] {
            assert_eq!(
                TaskTime::parse(raw),
                Err(TaskError::InvalidTime(raw.to_string())),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_blank_titles_and_bad_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let time = TaskTime::new(9, 0).unwrap();
        assert_eq!(
            Task::new("   ", "", date, time, TaskStatus::NotDone),
            Err(TaskError::EmptyTitle)
        );
        assert_eq!(
            parse_date("2024-02-30"),
            Err(TaskError::InvalidDate("2024-02-30".to_string()))
        );
        assert!(Task::from_input("A", "", "2024-06-01", "25:00", TaskStatus::Done).is_err());
    }

    #[test]
    fn new_tasks_get_distinct_ids() {
        let first = Task::from_input("A", "", "2024-06-01", "09:00", TaskStatus::NotDone)
            .expect("task should be valid");
        let second = Task::from_input("A", "", "2024-06-01", "09:00", TaskStatus::NotDone)
            .expect("task should be valid");
        assert_eq!(first.id.len(), 8);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn patch_keeps_id_and_untouched_fields() {
        let task = Task::from_input("Write", "draft", "2024-06-01", "09:00", TaskStatus::NotDone)
            .expect("task should be valid");
        let patch = TaskPatch {
            time: Some(TaskTime::new(14, 30).unwrap()),
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        let patched = task.patched(&patch).expect("patch should apply");
        assert_eq!(patched.id, task.id);
        assert_eq!(patched.title, "Write");
        assert_eq!(patched.description, "draft");
        assert_eq!(patched.time.to_string(), "14:30");
        assert!(patched.is_done());

        let blank = TaskPatch {
            title: Some(String::new()),
            ..TaskPatch::default()
        };
        assert_eq!(task.patched(&blank), Err(TaskError::EmptyTitle));
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("done".parse::<TaskStatus>(), Ok(TaskStatus::Done));
        assert_eq!("not-done".parse::<TaskStatus>(), Ok(TaskStatus::NotDone));
        assert_eq!(TaskStatus::Done.toggled(), TaskStatus::NotDone);
        assert!("maybe".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn text_and_serde_accept_the_same_statuses() {
        for raw in ["done", "not-done", "todo", "not_done", "Done", " done", ""] {
            let parsed = raw.parse::<TaskStatus>().ok();
            let decoded = serde_json::from_value::<TaskStatus>(serde_json::json!(raw)).ok();
            assert_eq!(parsed, decoded, "{raw:?} should be treated the same way");
        }
        for status in [TaskStatus::Done, TaskStatus::NotDone] {
            let encoded = serde_json::to_value(status).expect("status should encode");
            assert_eq!(encoded, serde_json::json!(status.as_str()));
        }
    }
}
