use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::domain::reminder::{
    DEFAULT_MAX_RETRIES, NewReminder, NewReminderConfig, NewReminderTemplate, ReminderFrequency,
    ReminderStatus, ReminderType, UpdateReminder,
};
use crate::domain::types::{ClockTime, ReminderTitle, TemplateName, TodoId, UserId};
use crate::forms::{FormError, parse_datetime, parse_optional_datetime};

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /reminders`.
pub struct CreateReminderForm {
    pub todo_id: i32,
    pub user_id: i32,
    #[serde(rename = "type", default)]
    pub reminder_type: ReminderType,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub frequency: ReminderFrequency,
    pub schedule_time: String,
    #[validate(range(min = 0, max = 20))]
    pub max_retries: Option<i32>,
}

impl TryFrom<CreateReminderForm> for NewReminder {
    type Error = FormError;

    fn try_from(form: CreateReminderForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            todo_id: TodoId::new(form.todo_id)?,
            user_id: UserId::new(form.user_id)?,
            reminder_type: form.reminder_type,
            title: ReminderTitle::new(form.title)?,
            content: form.content,
            frequency: form.frequency,
            schedule_time: parse_datetime(&form.schedule_time)?,
            max_retries: form.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `PUT /reminders/{id}`.
pub struct UpdateReminderForm {
    #[serde(rename = "type")]
    pub reminder_type: Option<ReminderType>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<ReminderStatus>,
    pub frequency: Option<ReminderFrequency>,
    pub schedule_time: Option<String>,
    #[validate(range(min = 0, max = 20))]
    pub max_retries: Option<i32>,
}

impl TryFrom<UpdateReminderForm> for UpdateReminder {
    type Error = FormError;

    fn try_from(form: UpdateReminderForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            reminder_type: form.reminder_type,
            title: form.title.map(ReminderTitle::new).transpose()?,
            content: form.content,
            status: form.status,
            frequency: form.frequency,
            schedule_time: parse_optional_datetime(form.schedule_time.as_deref())?,
            max_retries: form.max_retries,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Body of `PUT /reminders/config`.
pub struct ReminderConfigForm {
    #[serde(default = "enabled")]
    pub enable_wechat: bool,
    #[serde(default)]
    pub enable_enterprise_wechat: bool,
    #[serde(default)]
    pub wechat_user_id: String,
    #[serde(default)]
    pub enterprise_wechat_user_id: String,
    #[validate(range(min = 0, max = 10080))]
    pub default_advance_minutes: Option<i32>,
    /// `HH:MM`; blank disables the quiet window.
    pub quiet_start_time: Option<String>,
    pub quiet_end_time: Option<String>,
}

fn enabled() -> bool {
    true
}

fn optional_clock(raw: Option<String>) -> Result<Option<ClockTime>, FormError> {
    match raw {
        Some(value) if !value.trim().is_empty() => Ok(Some(ClockTime::new(value)?)),
        _ => Ok(None),
    }
}

impl ReminderConfigForm {
    pub fn into_config(self, user_id: UserId) -> Result<NewReminderConfig, FormError> {
        self.validate()?;
        let defaults = NewReminderConfig::defaults_for(user_id);
        Ok(NewReminderConfig {
            user_id,
            enable_wechat: self.enable_wechat,
            enable_enterprise_wechat: self.enable_enterprise_wechat,
            wechat_user_id: self.wechat_user_id.trim().to_string(),
            enterprise_wechat_user_id: self.enterprise_wechat_user_id.trim().to_string(),
            default_advance_minutes: self
                .default_advance_minutes
                .unwrap_or(defaults.default_advance_minutes),
            quiet_start_time: optional_clock(self.quiet_start_time)?,
            quiet_end_time: optional_clock(self.quiet_end_time)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /reminder-templates`.
pub struct CreateTemplateForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "type", default)]
    pub reminder_type: ReminderType,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub variables: Value,
    #[serde(default = "enabled")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl CreateTemplateForm {
    pub fn into_new_template(self, created_by: UserId) -> Result<NewReminderTemplate, FormError> {
        self.validate()?;
        Ok(NewReminderTemplate {
            name: TemplateName::new(self.name)?,
            reminder_type: self.reminder_type,
            title: self.title,
            content: self.content,
            variables: if self.variables.is_null() {
                Value::Array(Vec::new())
            } else {
                self.variables
            },
            is_active: self.is_active,
            is_default: self.is_default,
            created_by: created_by.get(),
        })
    }
}
