use chrono::{Duration, Months, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{
    ClockTime, ReminderId, ReminderTemplateId, ReminderTitle, TemplateName, TodoId, UserId,
    text_enum,
};

text_enum!(
    /// Channel a reminder is delivered through.
    ReminderType {
        Wechat => "wechat",
        EnterpriseWechat => "enterprise_wechat",
        Both => "both",
        Sms => "sms",
    }
);

text_enum!(
    ReminderStatus {
        Pending => "pending",
        Sent => "sent",
        Failed => "failed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    ReminderFrequency {
        Once => "once",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
);

impl Default for ReminderType {
    fn default() -> Self {
        Self::Wechat
    }
}

impl Default for ReminderFrequency {
    fn default() -> Self {
        Self::Once
    }
}

impl ReminderFrequency {
    /// Next occurrence after `at`, or `None` for one-shot reminders.
    ///
    /// Monthly rollover keeps the day of month when possible and clamps to the
    /// last day otherwise (Jan 31 -> Feb 28/29).
    pub fn next_occurrence(self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Once => None,
            Self::Daily => Some(at + Duration::days(1)),
            Self::Weekly => Some(at + Duration::days(7)),
            Self::Monthly => at.checked_add_months(Months::new(1)),
        }
    }

    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::Once)
    }
}

/// Default number of delivery attempts for a reminder.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub id: ReminderId,
    pub todo_id: TodoId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub title: ReminderTitle,
    pub content: String,
    pub status: ReminderStatus,
    pub frequency: ReminderFrequency,
    pub schedule_time: NaiveDateTime,
    pub sent_time: Option<NaiveDateTime>,
    pub fail_reason: String,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Reminder {
    /// Pending reminders and failed ones with attempts left are due for dispatch.
    pub fn is_dispatchable(&self, now: NaiveDateTime) -> bool {
        let status_ok = match self.status {
            ReminderStatus::Pending => true,
            ReminderStatus::Failed => self.retry_count < self.max_retries,
            ReminderStatus::Sent | ReminderStatus::Cancelled => false,
        };
        status_ok && self.schedule_time <= now
    }

    /// Follow-up reminder for recurring frequencies.
    pub fn next_occurrence(&self) -> Option<NewReminder> {
        let schedule_time = self.frequency.next_occurrence(self.schedule_time)?;
        Some(NewReminder {
            todo_id: self.todo_id,
            user_id: self.user_id,
            reminder_type: self.reminder_type,
            title: self.title.clone(),
            content: self.content.clone(),
            frequency: self.frequency,
            schedule_time,
            max_retries: self.max_retries,
        })
    }
}

#[derive(Clone, Debug)]
pub struct NewReminder {
    pub todo_id: TodoId,
    pub user_id: UserId,
    pub reminder_type: ReminderType,
    pub title: ReminderTitle,
    pub content: String,
    pub frequency: ReminderFrequency,
    pub schedule_time: NaiveDateTime,
    pub max_retries: i32,
}

/// Partial update of a reminder.
#[derive(Clone, Debug, Default)]
pub struct UpdateReminder {
    pub reminder_type: Option<ReminderType>,
    pub title: Option<ReminderTitle>,
    pub content: Option<String>,
    pub status: Option<ReminderStatus>,
    pub frequency: Option<ReminderFrequency>,
    pub schedule_time: Option<NaiveDateTime>,
    pub max_retries: Option<i32>,
}

impl UpdateReminder {
    #[must_use]
    pub fn apply(&self, reminder: &Reminder, now: NaiveDateTime) -> Reminder {
        let mut next = reminder.clone();
        if let Some(reminder_type) = self.reminder_type {
            next.reminder_type = reminder_type;
        }
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(content) = &self.content {
            next.content = content.clone();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(frequency) = self.frequency {
            next.frequency = frequency;
        }
        if let Some(schedule_time) = self.schedule_time {
            next.schedule_time = schedule_time;
        }
        if let Some(max_retries) = self.max_retries {
            next.max_retries = max_retries;
        }
        next.updated_at = now;
        next
    }
}

/// Outcome of a single delivery attempt, written back by the dispatch sweep.
#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryOutcome {
    Sent { at: NaiveDateTime },
    Failed { reason: String },
    /// Marked failed without spending a retry, e.g. during quiet hours.
    Deferred { reason: String },
}

/// Reminder enriched with the names shown in listings.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ReminderWithContext {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub todo_title: String,
    pub user_name: String,
    pub customer_name: String,
}

/// Counters reported by `GET /reminders/stats`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderStats {
    pub total: i64,
    pub pending: i64,
    pub sent: i64,
    pub failed: i64,
    pub cancelled: i64,
    /// Pending reminders scheduled for the current day.
    pub today_pending: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReminderTemplate {
    pub id: ReminderTemplateId,
    pub name: TemplateName,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub title: String,
    pub content: String,
    pub variables: Value,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewReminderTemplate {
    pub name: TemplateName,
    pub reminder_type: ReminderType,
    pub title: String,
    pub content: String,
    pub variables: Value,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: i32,
}

/// Title and body of a template, either stored or built in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateBody {
    pub title: String,
    pub content: String,
}

impl TemplateBody {
    /// Fallback used when no active default template exists for a channel.
    pub fn builtin() -> Self {
        Self {
            title: "待办提醒：{{ title }}".to_string(),
            content: "您有一个待办事项需要处理：\n\n标题：{{ title }}\n内容：{{ content }}\n客户：{{ customer_name }}\n计划时间：{{ planned_time }}\n\n请及时处理！".to_string(),
        }
    }
}

impl From<&ReminderTemplate> for TemplateBody {
    fn from(template: &ReminderTemplate) -> Self {
        Self {
            title: template.title.clone(),
            content: template.content.clone(),
        }
    }
}

/// Per-user delivery preferences.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReminderConfig {
    pub id: i32,
    pub user_id: UserId,
    pub enable_wechat: bool,
    pub enable_enterprise_wechat: bool,
    pub wechat_user_id: String,
    pub enterprise_wechat_user_id: String,
    pub default_advance_minutes: i32,
    pub quiet_start_time: Option<ClockTime>,
    pub quiet_end_time: Option<ClockTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ReminderConfig {
    /// Whether `at` falls inside the configured quiet window.
    ///
    /// The window is inclusive on both ends and wraps past midnight when the
    /// start is later than the end. A missing bound disables it.
    pub fn is_quiet_at(&self, at: NaiveDateTime) -> bool {
        let (Some(start), Some(end)) = (&self.quiet_start_time, &self.quiet_end_time) else {
            return false;
        };
        let now = format!("{:02}:{:02}", at.hour(), at.minute());
        let (start, end) = (start.as_str(), end.as_str());
        if start <= end {
            start <= now.as_str() && now.as_str() <= end
        } else {
            now.as_str() >= start || now.as_str() <= end
        }
    }

    /// Whether the channel is enabled for this user.
    pub fn allows(&self, reminder_type: ReminderType) -> bool {
        match reminder_type {
            ReminderType::Wechat => self.enable_wechat,
            ReminderType::EnterpriseWechat => self.enable_enterprise_wechat,
            ReminderType::Both => self.enable_wechat && self.enable_enterprise_wechat,
            ReminderType::Sms => true,
        }
    }
}

/// Values applied when a user's config is first created.
#[derive(Clone, Debug)]
pub struct NewReminderConfig {
    pub user_id: UserId,
    pub enable_wechat: bool,
    pub enable_enterprise_wechat: bool,
    pub wechat_user_id: String,
    pub enterprise_wechat_user_id: String,
    pub default_advance_minutes: i32,
    pub quiet_start_time: Option<ClockTime>,
    pub quiet_end_time: Option<ClockTime>,
}

impl NewReminderConfig {
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            user_id,
            enable_wechat: true,
            enable_enterprise_wechat: false,
            wechat_user_id: String::new(),
            enterprise_wechat_user_id: String::new(),
            default_advance_minutes: 30,
            quiet_start_time: ClockTime::new("22:00").ok(),
            quiet_end_time: ClockTime::new("08:00").ok(),
        }
    }
}

/// Counts produced by one dispatch sweep.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchReport {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    pub rescheduled: usize,
}
