//! Outbound reminder delivery.
//!
//! No messaging provider is wired in yet; [`LogNotifier`] applies the user's
//! channel and quiet-hour settings and writes accepted messages to the log.

use chrono::NaiveDateTime;
use log::info;
use thiserror::Error;

use crate::domain::reminder::{Reminder, ReminderConfig, ReminderType};

/// Reasons a delivery attempt is refused. The message is stored as the
/// reminder's `fail_reason`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("用户未启用微信提醒")]
    WechatDisabled,
    #[error("用户未启用企业微信提醒")]
    EnterpriseWechatDisabled,
    #[error("当前在免打扰时间内")]
    QuietHours,
}

#[cfg_attr(any(test, feature = "test-mocks"), mockall::automock)]
pub trait Notifier {
    fn send(
        &self,
        reminder: &Reminder,
        config: &ReminderConfig,
        now: NaiveDateTime,
    ) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    fn send_wechat(
        &self,
        reminder: &Reminder,
        config: &ReminderConfig,
        now: NaiveDateTime,
    ) -> Result<(), NotifyError> {
        if !config.allows(ReminderType::Wechat) {
            return Err(NotifyError::WechatDisabled);
        }
        if config.is_quiet_at(now) {
            return Err(NotifyError::QuietHours);
        }
        info!(
            "Sent wechat reminder {} to '{}': {}",
            reminder.id,
            config.wechat_user_id,
            reminder.title.as_str()
        );
        Ok(())
    }

    fn send_enterprise_wechat(
        &self,
        reminder: &Reminder,
        config: &ReminderConfig,
        now: NaiveDateTime,
    ) -> Result<(), NotifyError> {
        if !config.allows(ReminderType::EnterpriseWechat) {
            return Err(NotifyError::EnterpriseWechatDisabled);
        }
        if config.is_quiet_at(now) {
            return Err(NotifyError::QuietHours);
        }
        info!(
            "Sent enterprise wechat reminder {} to '{}': {}",
            reminder.id,
            config.enterprise_wechat_user_id,
            reminder.title.as_str()
        );
        Ok(())
    }
}

impl Notifier for LogNotifier {
    fn send(
        &self,
        reminder: &Reminder,
        config: &ReminderConfig,
        now: NaiveDateTime,
    ) -> Result<(), NotifyError> {
        match reminder.reminder_type {
            ReminderType::Wechat => self.send_wechat(reminder, config, now),
            ReminderType::EnterpriseWechat => self.send_enterprise_wechat(reminder, config, now),
            ReminderType::Both => {
                self.send_wechat(reminder, config, now)?;
                self.send_enterprise_wechat(reminder, config, now)
            }
            ReminderType::Sms => {
                info!(
                    "Sent sms reminder {} to user {}: {}",
                    reminder.id,
                    reminder.user_id,
                    reminder.title.as_str()
                );
                Ok(())
            }
        }
    }
}
