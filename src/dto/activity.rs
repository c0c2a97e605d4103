//! Activity payloads with the JSON blob flattened into top-level fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::activity::{Activity, ActivityKind, time_ago};
use crate::domain::todo::Todo;
use crate::domain::types::{ActivityId, CustomerId, UserId};

/// Query parameters of `GET /activities`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub customer_id: Option<i32>,
    pub user_id: Option<i32>,
    pub kind: Option<ActivityKind>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityView {
    pub id: ActivityId,
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub kind: ActivityKind,
    pub kind_name: &'static str,
    pub title: String,
    pub content: String,
    pub result: String,
    pub amount: f64,
    pub cost: f64,
    pub feedback: String,
    pub satisfaction: i32,
    pub remark: String,
    pub duration: Option<i32>,
    pub location: String,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user_name: String,
    pub customer_name: String,
    pub time_ago: String,
}

impl ActivityView {
    pub fn new(
        activity: Activity,
        user_name: String,
        customer_name: String,
        now: NaiveDateTime,
    ) -> Self {
        let details = activity.details;
        Self {
            id: activity.id,
            customer_id: activity.customer_id,
            user_id: activity.user_id,
            kind: activity.kind,
            kind_name: activity.kind.display_name(),
            title: activity.title,
            content: details.content,
            result: details.result,
            amount: details.amount,
            cost: details.cost,
            feedback: details.feedback,
            satisfaction: details.satisfaction,
            remark: activity.remark,
            duration: activity.duration,
            location: activity.location,
            next_follow_time: activity.next_follow_time,
            attachments: activity.attachments,
            time_ago: time_ago(activity.created_at, now),
            created_at: activity.created_at,
            updated_at: activity.updated_at,
            user_name,
            customer_name,
        }
    }
}

/// Response of `POST /activities`: the record and the follow-up todo, if any.
#[derive(Debug, Serialize, PartialEq)]
pub struct ActivityCreated {
    #[serde(flatten)]
    pub activity: ActivityView,
    pub todo: Option<Todo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::ActivityDetails;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn view_flattens_details() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let activity = Activity {
            id: ActivityId::new(3).unwrap(),
            customer_id: CustomerId::new(1).unwrap(),
            user_id: UserId::new(2).unwrap(),
            kind: ActivityKind::Order,
            title: "下单".into(),
            details: ActivityDetails {
                content: "十箱".into(),
                amount: 880.0,
                ..Default::default()
            },
            remark: String::new(),
            duration: None,
            location: String::new(),
            next_follow_time: None,
            attachments: Value::Array(vec![]),
            created_at: now - Duration::hours(30),
            updated_at: now,
        };

        let view = ActivityView::new(activity, "李四".into(), "阿里小店".into(), now);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["content"], "十箱");
        assert_eq!(json["amount"], 880.0);
        assert_eq!(json["kind"], "order");
        assert_eq!(json["kind_name"], "下单记录");
        assert_eq!(json["time_ago"], "昨天");
        assert_eq!(json["customer_name"], "阿里小店");
    }
}
