//! Diesel models for reminders, reminder templates and per-user configs.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::reminder::{
    NewReminder as DomainNewReminder, NewReminderConfig as DomainNewReminderConfig,
    NewReminderTemplate as DomainNewReminderTemplate, Reminder as DomainReminder,
    ReminderConfig as DomainReminderConfig, ReminderStatus,
    ReminderTemplate as DomainReminderTemplate,
};
use crate::domain::types::{
    ClockTime, ReminderId, ReminderTemplateId, ReminderTitle, TemplateName, TodoId,
    TypeConstraintError, UserId, parse_column,
};
use crate::models::decode_value;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::reminders)]
pub struct Reminder {
    pub id: i32,
    pub todo_id: i32,
    pub user_id: i32,
    pub reminder_type: String,
    pub title: String,
    pub content: String,
    pub status: String,
    pub frequency: String,
    pub schedule_time: NaiveDateTime,
    pub sent_time: Option<NaiveDateTime>,
    pub fail_reason: String,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reminders)]
pub struct NewReminder<'a> {
    pub todo_id: i32,
    pub user_id: i32,
    pub reminder_type: &'static str,
    pub title: &'a str,
    pub content: &'a str,
    pub status: &'static str,
    pub frequency: &'static str,
    pub schedule_time: NaiveDateTime,
    pub max_retries: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewReminder<'a> {
    pub fn new(reminder: &'a DomainNewReminder, now: NaiveDateTime) -> Self {
        Self {
            todo_id: reminder.todo_id.get(),
            user_id: reminder.user_id.get(),
            reminder_type: reminder.reminder_type.as_str(),
            title: reminder.title.as_str(),
            content: &reminder.content,
            status: ReminderStatus::Pending.as_str(),
            frequency: reminder.frequency.as_str(),
            schedule_time: reminder.schedule_time,
            max_retries: reminder.max_retries,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::reminders)]
#[diesel(treat_none_as_null = true)]
pub struct ReminderChangeset<'a> {
    pub reminder_type: &'static str,
    pub title: &'a str,
    pub content: &'a str,
    pub status: &'static str,
    pub frequency: &'static str,
    pub schedule_time: NaiveDateTime,
    pub sent_time: Option<NaiveDateTime>,
    pub fail_reason: &'a str,
    pub retry_count: i32,
    pub max_retries: i32,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a DomainReminder> for ReminderChangeset<'a> {
    fn from(reminder: &'a DomainReminder) -> Self {
        Self {
            reminder_type: reminder.reminder_type.as_str(),
            title: reminder.title.as_str(),
            content: &reminder.content,
            status: reminder.status.as_str(),
            frequency: reminder.frequency.as_str(),
            schedule_time: reminder.schedule_time,
            sent_time: reminder.sent_time,
            fail_reason: &reminder.fail_reason,
            retry_count: reminder.retry_count,
            max_retries: reminder.max_retries,
            updated_at: reminder.updated_at,
        }
    }
}

impl TryFrom<Reminder> for DomainReminder {
    type Error = TypeConstraintError;

    fn try_from(reminder: Reminder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReminderId::try_from(reminder.id)?,
            todo_id: TodoId::try_from(reminder.todo_id)?,
            user_id: UserId::try_from(reminder.user_id)?,
            reminder_type: parse_column(&reminder.reminder_type)?,
            title: ReminderTitle::new(reminder.title)?,
            content: reminder.content,
            status: parse_column(&reminder.status)?,
            frequency: parse_column(&reminder.frequency)?,
            schedule_time: reminder.schedule_time,
            sent_time: reminder.sent_time,
            fail_reason: reminder.fail_reason,
            retry_count: reminder.retry_count,
            max_retries: reminder.max_retries,
            created_at: reminder.created_at,
            updated_at: reminder.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::reminder_templates)]
pub struct ReminderTemplate {
    pub id: i32,
    pub name: String,
    pub reminder_type: String,
    pub title: String,
    pub content: String,
    pub variables: String,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reminder_templates)]
pub struct NewReminderTemplate<'a> {
    pub name: &'a str,
    pub reminder_type: &'static str,
    pub title: &'a str,
    pub content: &'a str,
    pub variables: String,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewReminderTemplate<'a> {
    pub fn new(template: &'a DomainNewReminderTemplate, now: NaiveDateTime) -> Self {
        Self {
            name: template.name.as_str(),
            reminder_type: template.reminder_type.as_str(),
            title: &template.title,
            content: &template.content,
            variables: template.variables.to_string(),
            is_active: template.is_active,
            is_default: template.is_default,
            created_by: template.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<ReminderTemplate> for DomainReminderTemplate {
    type Error = TypeConstraintError;

    fn try_from(template: ReminderTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReminderTemplateId::try_from(template.id)?,
            name: TemplateName::new(template.name)?,
            reminder_type: parse_column(&template.reminder_type)?,
            title: template.title,
            content: template.content,
            variables: decode_value(&template.variables),
            is_active: template.is_active,
            is_default: template.is_default,
            created_by: template.created_by,
            created_at: template.created_at,
            updated_at: template.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::reminder_configs)]
pub struct ReminderConfig {
    pub id: i32,
    pub user_id: i32,
    pub enable_wechat: bool,
    pub enable_enterprise_wechat: bool,
    pub wechat_user_id: String,
    pub enterprise_wechat_user_id: String,
    pub default_advance_minutes: i32,
    pub quiet_start_time: Option<String>,
    pub quiet_end_time: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Column values of a config row, used for the first insert and for updates.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::reminder_configs)]
#[diesel(treat_none_as_null = true)]
pub struct ReminderConfigRow<'a> {
    pub user_id: i32,
    pub enable_wechat: bool,
    pub enable_enterprise_wechat: bool,
    pub wechat_user_id: &'a str,
    pub enterprise_wechat_user_id: &'a str,
    pub default_advance_minutes: i32,
    pub quiet_start_time: Option<&'a str>,
    pub quiet_end_time: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl<'a> ReminderConfigRow<'a> {
    pub fn new(config: &'a DomainNewReminderConfig, now: NaiveDateTime) -> Self {
        Self {
            user_id: config.user_id.get(),
            enable_wechat: config.enable_wechat,
            enable_enterprise_wechat: config.enable_enterprise_wechat,
            wechat_user_id: &config.wechat_user_id,
            enterprise_wechat_user_id: &config.enterprise_wechat_user_id,
            default_advance_minutes: config.default_advance_minutes,
            quiet_start_time: config.quiet_start_time.as_ref().map(ClockTime::as_str),
            quiet_end_time: config.quiet_end_time.as_ref().map(ClockTime::as_str),
            updated_at: now,
        }
    }
}

impl TryFrom<ReminderConfig> for DomainReminderConfig {
    type Error = TypeConstraintError;

    fn try_from(config: ReminderConfig) -> Result<Self, Self::Error> {
        // blank bounds mean "no quiet window"
        let clock = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(ClockTime::new)
                .transpose()
        };
        Ok(Self {
            id: config.id,
            user_id: UserId::try_from(config.user_id)?,
            enable_wechat: config.enable_wechat,
            enable_enterprise_wechat: config.enable_enterprise_wechat,
            wechat_user_id: config.wechat_user_id,
            enterprise_wechat_user_id: config.enterprise_wechat_user_id,
            default_advance_minutes: config.default_advance_minutes,
            quiet_start_time: clock(config.quiet_start_time)?,
            quiet_end_time: clock(config.quiet_end_time)?,
            created_at: config.created_at,
            updated_at: config.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reminder::{ReminderFrequency, ReminderType};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_reminder_starts_pending() {
        let domain = DomainNewReminder {
            todo_id: TodoId::new(1).unwrap(),
            user_id: UserId::new(2).unwrap(),
            reminder_type: ReminderType::Both,
            title: ReminderTitle::new("提醒").unwrap(),
            content: String::new(),
            frequency: ReminderFrequency::Weekly,
            schedule_time: now(),
            max_retries: 3,
        };
        let new = NewReminder::new(&domain, now());
        assert_eq!(new.status, "pending");
        assert_eq!(new.reminder_type, "both");
        assert_eq!(new.frequency, "weekly");
    }

    #[test]
    fn config_with_blank_quiet_bounds() {
        let db = ReminderConfig {
            id: 1,
            user_id: 1,
            enable_wechat: true,
            enable_enterprise_wechat: false,
            wechat_user_id: String::new(),
            enterprise_wechat_user_id: String::new(),
            default_advance_minutes: 30,
            quiet_start_time: Some(String::new()),
            quiet_end_time: Some("08:00".into()),
            created_at: now(),
            updated_at: now(),
        };
        let domain = DomainReminderConfig::try_from(db).expect("valid config");
        assert!(domain.quiet_start_time.is_none());
        assert_eq!(domain.quiet_end_time.unwrap().as_str(), "08:00");
    }
}
