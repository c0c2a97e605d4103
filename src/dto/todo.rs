use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::todo::{DateWindow, Priority, Todo, TodoStatus};

/// Query parameters of `GET /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoQuery {
    pub customer_id: Option<i32>,
    pub executor_id: Option<i32>,
    pub creator_id: Option<i32>,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
    pub date_type: Option<DateWindow>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Query parameters of `GET /todos/stats`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoStatsQuery {
    pub customer_id: Option<i32>,
    pub executor_id: Option<i32>,
}

/// Todo returned by `GET /todos/{id}` with the names of the related rows.
#[derive(Debug, Serialize, PartialEq)]
pub struct TodoDetail {
    #[serde(flatten)]
    pub todo: Todo,
    pub creator_name: String,
    pub executor_name: String,
    pub customer_name: String,
    pub reminder_user_name: Option<String>,
    pub is_overdue: bool,
    pub days_left: i64,
}

impl TodoDetail {
    pub fn new(todo: Todo, now: NaiveDateTime) -> Self {
        let is_overdue = todo.is_overdue(now);
        let days_left = todo.days_left(now);
        Self {
            todo,
            creator_name: String::new(),
            executor_name: String::new(),
            customer_name: String::new(),
            reminder_user_name: None,
            is_overdue,
            days_left,
        }
    }
}
