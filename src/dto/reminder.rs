use serde::Deserialize;

use crate::domain::reminder::{ReminderStatus, ReminderType};

/// Query parameters of `GET /reminders`.
#[derive(Debug, Default, Deserialize)]
pub struct ReminderQuery {
    pub todo_id: Option<i32>,
    pub user_id: Option<i32>,
    pub status: Option<ReminderStatus>,
    #[serde(rename = "type")]
    pub reminder_type: Option<ReminderType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReminderStatsQuery {
    pub user_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(rename = "type")]
    pub reminder_type: Option<ReminderType>,
}
