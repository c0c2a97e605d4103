use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::reminder::ReminderType;
use crate::domain::types::{CustomerId, TodoId, TodoTitle, UserId, text_enum};

text_enum!(
    /// Lifecycle state of a todo.
    TodoStatus {
        Pending => "pending",
        Completed => "completed",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
);

text_enum!(
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

text_enum!(
    /// Kind of mutation recorded in the todo audit log.
    TodoAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        Complete => "complete",
        Cancel => "cancel",
    }
);

impl Default for TodoStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl TodoStatus {
    /// Completed and cancelled todos no longer need attention.
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: TodoId,
    pub customer_id: CustomerId,
    pub creator_id: UserId,
    pub executor_id: UserId,
    pub title: TodoTitle,
    pub content: String,
    pub status: TodoStatus,
    pub planned_time: NaiveDateTime,
    pub completed_time: Option<NaiveDateTime>,
    pub is_reminder: bool,
    pub reminder_type: Option<ReminderType>,
    pub reminder_user_id: Option<UserId>,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: Priority,
    pub tags: Value,
    pub attachments: Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Todo {
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.status.is_closed() && now > self.planned_time
    }

    /// Whole days until `planned_time`, truncated toward zero.
    pub fn days_left(&self, now: NaiveDateTime) -> i64 {
        if self.status.is_closed() {
            return 0;
        }
        (self.planned_time - now).num_days()
    }

    /// Returns a copy moved into `status`, stamping completion when needed.
    #[must_use]
    pub fn with_status(&self, status: TodoStatus, now: NaiveDateTime) -> Self {
        let mut next = self.clone();
        if status == TodoStatus::Completed && self.status != TodoStatus::Completed {
            next.completed_time = Some(now);
        }
        next.status = status;
        next.updated_at = now;
        next
    }

    /// JSON snapshot stored in the audit log.
    pub fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Debug)]
pub struct NewTodo {
    pub customer_id: CustomerId,
    pub creator_id: UserId,
    pub executor_id: UserId,
    pub title: TodoTitle,
    pub content: String,
    pub status: TodoStatus,
    pub planned_time: NaiveDateTime,
    pub is_reminder: bool,
    pub reminder_type: Option<ReminderType>,
    pub reminder_user_id: Option<UserId>,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: Priority,
    pub tags: Value,
    pub attachments: Value,
}

impl NewTodo {
    /// Pending, medium priority todo without reminder settings.
    pub fn new(
        customer_id: CustomerId,
        creator_id: UserId,
        executor_id: UserId,
        title: TodoTitle,
        planned_time: NaiveDateTime,
    ) -> Self {
        Self {
            customer_id,
            creator_id,
            executor_id,
            title,
            content: String::new(),
            status: TodoStatus::default(),
            planned_time,
            is_reminder: false,
            reminder_type: None,
            reminder_user_id: None,
            reminder_time: None,
            priority: Priority::default(),
            tags: Value::Array(Vec::new()),
            attachments: Value::Array(Vec::new()),
        }
    }
}

/// Partial update of a todo; `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateTodo {
    pub customer_id: Option<CustomerId>,
    pub executor_id: Option<UserId>,
    pub title: Option<TodoTitle>,
    pub content: Option<String>,
    pub status: Option<TodoStatus>,
    pub planned_time: Option<NaiveDateTime>,
    pub is_reminder: Option<bool>,
    pub reminder_type: Option<ReminderType>,
    pub reminder_user_id: Option<UserId>,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: Option<Priority>,
    pub tags: Option<Value>,
    pub attachments: Option<Value>,
}

impl UpdateTodo {
    /// Applies the changes on top of `todo`.
    #[must_use]
    pub fn apply(&self, todo: &Todo, now: NaiveDateTime) -> Todo {
        let mut next = match self.status {
            Some(status) => todo.with_status(status, now),
            None => todo.clone(),
        };
        if let Some(customer_id) = self.customer_id {
            next.customer_id = customer_id;
        }
        if let Some(executor_id) = self.executor_id {
            next.executor_id = executor_id;
        }
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(content) = &self.content {
            next.content = content.clone();
        }
        if let Some(planned_time) = self.planned_time {
            next.planned_time = planned_time;
        }
        if let Some(is_reminder) = self.is_reminder {
            next.is_reminder = is_reminder;
        }
        if self.reminder_type.is_some() {
            next.reminder_type = self.reminder_type;
        }
        if self.reminder_user_id.is_some() {
            next.reminder_user_id = self.reminder_user_id;
        }
        if self.reminder_time.is_some() {
            next.reminder_time = self.reminder_time;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(tags) = &self.tags {
            next.tags = tags.clone();
        }
        if let Some(attachments) = &self.attachments {
            next.attachments = attachments.clone();
        }
        next.updated_at = now;
        next
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoLog {
    pub id: i32,
    pub todo_id: TodoId,
    pub operator_id: UserId,
    pub action: TodoAction,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
    pub remark: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewTodoLog {
    pub todo_id: TodoId,
    pub operator_id: UserId,
    pub action: TodoAction,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
    pub remark: String,
}

impl NewTodoLog {
    pub fn new(
        todo_id: TodoId,
        operator_id: UserId,
        action: TodoAction,
        old: Option<&Todo>,
        new: Option<&Todo>,
    ) -> Self {
        Self {
            todo_id,
            operator_id,
            action,
            old_data: old.map(Todo::snapshot),
            new_data: new.map(Todo::snapshot),
            remark: String::new(),
        }
    }

    #[must_use]
    pub fn remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }
}

/// Relative planning window used by `GET /todos?date_type=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateWindow {
    Yesterday,
    Today,
    Tomorrow,
    /// Planned after today.
    Upcoming,
    /// Open and planned before now.
    Overdue,
    All,
}

/// Per-status counters reported by `GET /todos/stats`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
    pub cancelled: i64,
    /// Open todos whose planned time has passed.
    pub overdue: i64,
    /// Todos planned for the current day, whatever their status.
    pub today: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> Todo {
        Todo {
            id: TodoId::new(1).unwrap(),
            customer_id: CustomerId::new(1).unwrap(),
            creator_id: UserId::new(1).unwrap(),
            executor_id: UserId::new(2).unwrap(),
            title: TodoTitle::new("回访").unwrap(),
            content: String::new(),
            status: TodoStatus::Pending,
            planned_time: at(12),
            completed_time: None,
            is_reminder: false,
            reminder_type: None,
            reminder_user_id: None,
            reminder_time: None,
            priority: Priority::Medium,
            tags: Value::Array(vec![]),
            attachments: Value::Array(vec![]),
            created_at: at(8),
            updated_at: at(8),
        }
    }

    #[test]
    fn overdue_only_for_open_todos() {
        let todo = sample();
        assert!(!todo.is_overdue(at(11)));
        assert!(todo.is_overdue(at(13)));

        let done = todo.with_status(TodoStatus::Completed, at(13));
        assert!(!done.is_overdue(at(14)));
    }

    #[test]
    fn days_left_truncates_toward_zero() {
        let todo = sample();
        assert_eq!(todo.days_left(at(12) - Duration::hours(47)), 1);
        assert_eq!(todo.days_left(at(12) + Duration::hours(30)), -1);
        let cancelled = todo.with_status(TodoStatus::Cancelled, at(9));
        assert_eq!(cancelled.days_left(at(0) - Duration::days(5)), 0);
    }

    #[test]
    fn completing_stamps_time_once() {
        let todo = sample();
        let done = todo.with_status(TodoStatus::Completed, at(13));
        assert_eq!(done.completed_time, Some(at(13)));
        let again = done.with_status(TodoStatus::Completed, at(15));
        assert_eq!(again.completed_time, Some(at(13)));
    }

    #[test]
    fn update_merges_only_present_fields() {
        let todo = sample();
        let update = UpdateTodo {
            title: Some(TodoTitle::new("新标题").unwrap()),
            priority: Some(Priority::Urgent),
            ..Default::default()
        };
        let next = update.apply(&todo, at(9));
        assert_eq!(next.title.as_str(), "新标题");
        assert_eq!(next.priority, Priority::Urgent);
        assert_eq!(next.executor_id, todo.executor_id);
        assert_eq!(next.updated_at, at(9));
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(TodoStatus::Cancelled.as_str(), "cancelled");
        assert_eq!("urgent".parse::<Priority>(), Ok(Priority::Urgent));
        assert!("done".parse::<TodoStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TodoAction::Complete).unwrap(),
            "\"complete\""
        );
    }
}
