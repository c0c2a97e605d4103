use serde::Serialize;

use crate::domain::dashboard::DashboardGroup;
use crate::domain::types::CustomerId;

/// One dashboard line as rendered by the frontend.
///
/// `planned_time` is `YYYY-MM-DD HH:MM`; call and order dates are
/// `YYYY-MM-DD` and empty when unknown.
#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardEntry {
    pub customer_id: CustomerId,
    pub contact_name: String,
    pub customer_name: String,
    pub tags: Vec<String>,
    pub todo_contents: String,
    pub todo_count: usize,
    pub planned_time: String,
    pub last_call_time: String,
    pub last_order_time: String,
}

impl From<DashboardGroup> for DashboardEntry {
    fn from(group: DashboardGroup) -> Self {
        let day = |at: Option<chrono::NaiveDateTime>| {
            at.map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        Self {
            customer_id: group.customer_id,
            contact_name: group.contact_name,
            customer_name: group.customer_name,
            tags: group.tags,
            todo_contents: group.content,
            todo_count: group.todo_count,
            planned_time: group.planned_time.format("%Y-%m-%d %H:%M").to_string(),
            last_call_time: day(group.last_call_date),
            last_order_time: day(group.last_order_date),
        }
    }
}
