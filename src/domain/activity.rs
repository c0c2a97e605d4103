use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{ActivityId, CleanText, CustomerId, UserId, text_enum};

text_enum!(
    /// Type of a follow-up activity.
    ActivityKind {
        Call => "call",
        Visit => "visit",
        Email => "email",
        Wechat => "wechat",
        Meeting => "meeting",
        Order => "order",
        Sample => "sample",
        Feedback => "feedback",
        Complaint => "complaint",
        Payment => "payment",
        Other => "other",
    }
);

impl Default for ActivityKind {
    fn default() -> Self {
        Self::Other
    }
}

impl ActivityKind {
    /// Human readable label shown next to each record.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Call => "电话沟通",
            Self::Visit => "实地拜访",
            Self::Email => "邮件",
            Self::Wechat => "微信沟通",
            Self::Meeting => "会议洽谈",
            Self::Order => "下单记录",
            Self::Sample => "发样记录",
            Self::Feedback => "客户反馈",
            Self::Complaint => "客户投诉",
            Self::Payment => "付款记录",
            Self::Other => "其他",
        }
    }
}

/// Structured payload kept in the activity `data` JSON column.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActivityDetails {
    pub content: String,
    pub result: String,
    pub amount: f64,
    pub cost: f64,
    pub feedback: String,
    pub satisfaction: i32,
}

impl ActivityDetails {
    /// Stores feedback; satisfaction is only taken when within 1..=5.
    pub fn record_feedback(&mut self, feedback: CleanText, satisfaction: Option<i32>) {
        self.feedback = feedback.into();
        if let Some(score) = satisfaction.filter(|s| (1..=5).contains(s)) {
            self.satisfaction = score;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub kind: ActivityKind,
    pub title: String,
    pub details: ActivityDetails,
    pub remark: String,
    pub duration: Option<i32>,
    pub location: String,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewActivity {
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub kind: ActivityKind,
    pub title: String,
    pub details: ActivityDetails,
    pub remark: CleanText,
    pub duration: Option<i32>,
    pub location: String,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: Value,
}

/// Partial update of an activity. Blob fields are merged one by one.
#[derive(Clone, Debug, Default)]
pub struct UpdateActivity {
    pub kind: Option<ActivityKind>,
    pub title: Option<String>,
    pub content: Option<CleanText>,
    pub result: Option<String>,
    pub amount: Option<f64>,
    pub cost: Option<f64>,
    pub remark: Option<CleanText>,
    pub duration: Option<i32>,
    pub location: Option<String>,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: Option<Value>,
}

impl UpdateActivity {
    #[must_use]
    pub fn apply(&self, activity: &Activity, now: NaiveDateTime) -> Activity {
        let mut next = activity.clone();
        if let Some(kind) = self.kind {
            next.kind = kind;
        }
        if let Some(title) = &self.title {
            next.title = title.trim().to_string();
        }
        if let Some(content) = &self.content {
            next.details.content = content.to_string();
        }
        if let Some(result) = &self.result {
            next.details.result = result.clone();
        }
        if let Some(amount) = self.amount {
            next.details.amount = amount;
        }
        if let Some(cost) = self.cost {
            next.details.cost = cost;
        }
        if let Some(remark) = &self.remark {
            next.remark = remark.to_string();
        }
        if self.duration.is_some() {
            next.duration = self.duration;
        }
        if let Some(location) = &self.location {
            next.location = location.clone();
        }
        if self.next_follow_time.is_some() {
            next.next_follow_time = self.next_follow_time;
        }
        if let Some(attachments) = &self.attachments {
            next.attachments = attachments.clone();
        }
        next.updated_at = now;
        next
    }
}

/// Aggregates returned by the per-customer statistics endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivityStatistics {
    pub total_records: i64,
    pub records_by_kind: BTreeMap<String, i64>,
    pub total_amount: f64,
    pub total_cost: f64,
    pub order_count: i64,
    pub sample_count: i64,
}

impl ActivityStatistics {
    /// Folds a customer's activities into the statistics.
    pub fn from_activities<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> Self {
        activities
            .into_iter()
            .fold(Self::default(), |mut stats, activity| {
                stats.total_records += 1;
                *stats
                    .records_by_kind
                    .entry(activity.kind.as_str().to_string())
                    .or_insert(0) += 1;
                stats.total_amount += activity.details.amount;
                stats.total_cost += activity.details.cost;
                match activity.kind {
                    ActivityKind::Order => stats.order_count += 1,
                    ActivityKind::Sample => stats.sample_count += 1,
                    _ => {}
                }
                stats
            })
    }
}

/// Coarse "how long ago" label for a record created at `created_at`.
pub fn time_ago(created_at: NaiveDateTime, now: NaiveDateTime) -> String {
    let hours = (now - created_at).num_hours();
    match hours {
        h if h < 1 => "刚刚".to_string(),
        h if h < 24 => "今天".to_string(),
        h if h < 48 => "昨天".to_string(),
        h if h < 72 => "2天前".to_string(),
        h => format!("{}天前", h / 24),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn activity(kind: ActivityKind, amount: f64, cost: f64) -> Activity {
        Activity {
            id: ActivityId::new(1).unwrap(),
            customer_id: CustomerId::new(1).unwrap(),
            user_id: UserId::new(1).unwrap(),
            kind,
            title: String::new(),
            details: ActivityDetails {
                amount,
                cost,
                ..Default::default()
            },
            remark: String::new(),
            duration: None,
            location: String::new(),
            next_follow_time: None,
            attachments: Value::Array(vec![]),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn time_ago_buckets() {
        let n = now();
        assert_eq!(time_ago(n - Duration::minutes(59), n), "刚刚");
        assert_eq!(time_ago(n - Duration::hours(5), n), "今天");
        assert_eq!(time_ago(n - Duration::hours(30), n), "昨天");
        assert_eq!(time_ago(n - Duration::hours(50), n), "2天前");
        assert_eq!(time_ago(n - Duration::hours(24 * 9 + 3), n), "9天前");
    }

    #[test]
    fn feedback_ignores_out_of_range_satisfaction() {
        let mut details = ActivityDetails {
            satisfaction: 3,
            ..Default::default()
        };
        details.record_feedback(CleanText::new("不错"), Some(9));
        assert_eq!(details.feedback, "不错");
        assert_eq!(details.satisfaction, 3);

        details.record_feedback(CleanText::new("很好"), Some(5));
        assert_eq!(details.satisfaction, 5);
    }

    #[test]
    fn statistics_fold() {
        let items = vec![
            activity(ActivityKind::Order, 100.0, 0.0),
            activity(ActivityKind::Order, 50.5, 0.0),
            activity(ActivityKind::Sample, 0.0, 12.0),
            activity(ActivityKind::Call, 0.0, 0.0),
        ];
        let stats = ActivityStatistics::from_activities(&items);
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.sample_count, 1);
        assert_eq!(stats.records_by_kind.get("order"), Some(&2));
        assert!((stats.total_amount - 150.5).abs() < f64::EPSILON);
        assert!((stats.total_cost - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn details_tolerate_missing_keys() {
        let details: ActivityDetails =
            serde_json::from_str(r#"{"content":"聊了聊"}"#).expect("valid blob");
        assert_eq!(details.content, "聊了聊");
        assert_eq!(details.satisfaction, 0);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ActivityKind::Sample.display_name(), "发样记录");
        assert_eq!(ActivityKind::default(), ActivityKind::Other);
    }
}
