//! Reminder workflows: CRUD, per-user delivery settings, templates and the
//! dispatch sweep.

use chrono::NaiveDateTime;
use log::{error, info, warn};
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::reminder::{
    DEFAULT_MAX_RETRIES, DeliveryOutcome, DispatchReport, NewReminder, NewReminderConfig,
    Reminder, ReminderConfig, ReminderFrequency, ReminderStats, ReminderStatus, ReminderTemplate,
    ReminderWithContext, TemplateBody, UpdateReminder,
};
use crate::domain::todo::Todo;
use crate::domain::types::{ReminderId, ReminderTitle, TodoId, UserId};
use crate::dto::reminder::{ReminderQuery, ReminderStatsQuery, TemplateQuery};
use crate::forms::parse_optional_datetime;
use crate::forms::reminder::{
    CreateReminderForm, CreateTemplateForm, ReminderConfigForm, UpdateReminderForm,
};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{CustomerReader, ReminderListQuery, ReminderReader, ReminderWriter};
use crate::services::notifier::{Notifier, NotifyError};
use crate::services::{ServiceError, ServiceResult};

/// Variables available to reminder templates.
#[derive(Debug, Default, Serialize)]
pub struct TemplateVars {
    pub title: String,
    pub content: String,
    pub customer_name: String,
    pub planned_time: String,
    pub priority: String,
    pub status: String,
}

impl TemplateVars {
    pub fn for_todo(todo: &Todo, customer_name: &str) -> Self {
        Self {
            title: todo.title.as_str().to_string(),
            content: todo.content.clone(),
            customer_name: customer_name.to_string(),
            planned_time: todo.planned_time.format("%Y-%m-%d %H:%M").to_string(),
            priority: todo.priority.as_str().to_string(),
            status: todo.status.as_str().to_string(),
        }
    }
}

/// Renders the title and body of a template with Tera.
pub fn render_template(body: &TemplateBody, vars: &TemplateVars) -> ServiceResult<TemplateBody> {
    let context = Context::from_serialize(vars)
        .map_err(|e| ServiceError::Internal(format!("template context: {e}")))?;
    let render = |source: &str| {
        Tera::one_off(source, &context, false)
            .map_err(|e| ServiceError::Validation(format!("invalid reminder template: {e}")))
    };
    Ok(TemplateBody {
        title: render(&body.title)?,
        content: render(&body.content)?,
    })
}

fn load_reminder<R>(repo: &R, id: i32) -> ServiceResult<Reminder>
where
    R: ReminderReader + ?Sized,
{
    repo.get_reminder_by_id(ReminderId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_reminder<R>(repo: &R, form: CreateReminderForm) -> ServiceResult<Reminder>
where
    R: ReminderWriter + ?Sized,
{
    let reminder = NewReminder::try_from(form)?;
    Ok(repo.create_reminder(&reminder)?)
}

/// Creates the reminder requested on a todo from the default template of its
/// channel. Returns `None` when the todo asks for no reminder.
pub fn create_reminder_for_todo<R>(repo: &R, todo: &Todo) -> ServiceResult<Option<Reminder>>
where
    R: CustomerReader + ReminderReader + ReminderWriter + ?Sized,
{
    let Some(schedule_time) = todo.reminder_time.filter(|_| todo.is_reminder) else {
        return Ok(None);
    };
    let reminder_type = todo.reminder_type.unwrap_or_default();

    let body = match repo.get_default_template(reminder_type)? {
        Some(template) => TemplateBody::from(&template),
        None => TemplateBody::builtin(),
    };
    let customer_name = repo
        .get_customer_by_id(todo.customer_id)?
        .map(|customer| customer.name().to_string())
        .unwrap_or_default();
    let rendered = render_template(&body, &TemplateVars::for_todo(todo, &customer_name))?;

    let reminder = NewReminder {
        todo_id: todo.id,
        user_id: todo.reminder_user_id.unwrap_or(todo.executor_id),
        reminder_type,
        title: ReminderTitle::new(rendered.title)
            .or_else(|_| ReminderTitle::new(todo.title.as_str()))?,
        content: rendered.content,
        frequency: ReminderFrequency::Once,
        schedule_time,
        max_retries: DEFAULT_MAX_RETRIES,
    };
    let reminder = repo.create_reminder(&reminder)?;
    info!("Created reminder {} for todo {}", reminder.id, todo.id);
    Ok(Some(reminder))
}

pub fn list_reminders<R>(
    repo: &R,
    params: ReminderQuery,
) -> ServiceResult<Paginated<ReminderWithContext>>
where
    R: ReminderReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let mut query = ReminderListQuery::new().paginate(pagination);
    if let Some(todo_id) = params.todo_id {
        query = query.todo(TodoId::new(todo_id)?);
    }
    if let Some(user_id) = params.user_id {
        query = query.user(UserId::new(user_id)?);
    }
    if let Some(status) = params.status {
        query = query.status(status);
    }
    query.reminder_type = params.reminder_type;
    query.start = parse_optional_datetime(params.start_date.as_deref())?;
    query.end = parse_optional_datetime(params.end_date.as_deref())?;

    let (total, reminders) = repo.list_reminders(query)?;
    Ok(Paginated::new(reminders, total, pagination))
}

pub fn get_reminder<R>(repo: &R, id: i32) -> ServiceResult<ReminderWithContext>
where
    R: ReminderReader + ?Sized,
{
    repo.get_reminder_with_context(ReminderId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn update_reminder<R>(
    repo: &R,
    id: i32,
    form: UpdateReminderForm,
    now: NaiveDateTime,
) -> ServiceResult<Reminder>
where
    R: ReminderReader + ReminderWriter + ?Sized,
{
    let reminder = load_reminder(repo, id)?;
    let updates = UpdateReminder::try_from(form)?;
    Ok(repo.save_reminder(&updates.apply(&reminder, now))?)
}

pub fn delete_reminder<R>(repo: &R, id: i32) -> ServiceResult<()>
where
    R: ReminderWriter + ?Sized,
{
    match repo.delete_reminder(ReminderId::new(id)?)? {
        0 => Err(ServiceError::NotFound),
        _ => Ok(()),
    }
}

/// Cancels a reminder. Cancelling twice is a no-op.
pub fn cancel_reminder<R>(repo: &R, id: i32, now: NaiveDateTime) -> ServiceResult<Reminder>
where
    R: ReminderReader + ReminderWriter + ?Sized,
{
    let reminder = load_reminder(repo, id)?;
    if reminder.status == ReminderStatus::Cancelled {
        return Ok(reminder);
    }
    let updates = UpdateReminder {
        status: Some(ReminderStatus::Cancelled),
        ..Default::default()
    };
    Ok(repo.save_reminder(&updates.apply(&reminder, now))?)
}

pub fn reminder_stats<R>(
    repo: &R,
    params: ReminderStatsQuery,
    now: NaiveDateTime,
) -> ServiceResult<ReminderStats>
where
    R: ReminderReader + ?Sized,
{
    let user_id = params.user_id.map(UserId::new).transpose()?;
    Ok(repo.reminder_stats(user_id, now)?)
}

/// Returns the user's delivery settings, storing the defaults on first use.
pub fn get_reminder_config<R>(repo: &R, user_id: UserId) -> ServiceResult<ReminderConfig>
where
    R: ReminderReader + ReminderWriter + ?Sized,
{
    if let Some(config) = repo.get_reminder_config(user_id)? {
        return Ok(config);
    }
    info!("Creating default reminder config for user {user_id}");
    Ok(repo.upsert_reminder_config(&NewReminderConfig::defaults_for(user_id))?)
}

pub fn update_reminder_config<R>(
    repo: &R,
    user_id: UserId,
    form: ReminderConfigForm,
) -> ServiceResult<ReminderConfig>
where
    R: ReminderWriter + ?Sized,
{
    let config = form.into_config(user_id)?;
    Ok(repo.upsert_reminder_config(&config)?)
}

pub fn list_templates<R>(repo: &R, params: TemplateQuery) -> ServiceResult<Vec<ReminderTemplate>>
where
    R: ReminderReader + ?Sized,
{
    Ok(repo.list_templates(params.reminder_type)?)
}

/// Stores a template after checking that it renders.
pub fn create_template<R>(
    repo: &R,
    acting_user: UserId,
    form: CreateTemplateForm,
) -> ServiceResult<ReminderTemplate>
where
    R: ReminderWriter + ?Sized,
{
    let template = form.into_new_template(acting_user)?;
    render_template(
        &TemplateBody {
            title: template.title.clone(),
            content: template.content.clone(),
        },
        &TemplateVars::default(),
    )?;
    Ok(repo.create_template(&template)?)
}

enum Dispatched {
    Sent { rescheduled: bool },
    Failed,
}

fn dispatch_one<R, N>(
    repo: &R,
    notifier: &N,
    reminder: &Reminder,
    now: NaiveDateTime,
) -> ServiceResult<Dispatched>
where
    R: ReminderReader + ReminderWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let config = get_reminder_config(repo, reminder.user_id)?;

    if let Err(err) = notifier.send(reminder, &config, now) {
        warn!("Reminder {} was not delivered: {err}", reminder.id);
        let reason = err.to_string();
        let outcome = match err {
            NotifyError::QuietHours => DeliveryOutcome::Deferred { reason },
            _ => DeliveryOutcome::Failed { reason },
        };
        repo.record_delivery(reminder.id, &outcome)?;
        return Ok(Dispatched::Failed);
    }

    repo.record_delivery(reminder.id, &DeliveryOutcome::Sent { at: now })?;

    let rescheduled = match reminder.next_occurrence() {
        Some(next) => {
            let next = repo.create_reminder(&next)?;
            info!(
                "Scheduled reminder {} at {} after {}",
                next.id, next.schedule_time, reminder.id
            );
            true
        }
        None => false,
    };
    Ok(Dispatched::Sent { rescheduled })
}

/// Delivers every due reminder, at most `batch_size` per call.
///
/// Failed attempts are recorded on the reminder and retried by later sweeps
/// until `max_retries` is reached. Quiet hours do not use up a retry. A storage error on one reminder is logged
/// and counted as a failure without stopping the sweep.
pub fn dispatch_due_reminders<R, N>(
    repo: &R,
    notifier: &N,
    now: NaiveDateTime,
    batch_size: usize,
) -> ServiceResult<DispatchReport>
where
    R: ReminderReader + ReminderWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let due = repo.list_due_reminders(now, batch_size)?;
    let mut report = DispatchReport::default();

    for reminder in &due {
        report.processed += 1;
        match dispatch_one(repo, notifier, reminder, now) {
            Ok(Dispatched::Sent { rescheduled }) => {
                report.sent += 1;
                if rescheduled {
                    report.rescheduled += 1;
                }
            }
            Ok(Dispatched::Failed) => report.failed += 1,
            Err(err) => {
                error!("Failed to dispatch reminder {}: {err}", reminder.id);
                report.failed += 1;
            }
        }
    }

    if report.processed > 0 {
        info!(
            "Dispatched {} reminders: {} sent, {} failed, {} rescheduled",
            report.processed, report.sent, report.failed, report.rescheduled
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reminder::ReminderType;
    use crate::domain::todo::{Priority, TodoStatus};
    use crate::domain::types::{ClockTime, CustomerId, TodoTitle};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::notifier::MockNotifier;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn reminder(id: i32, frequency: ReminderFrequency) -> Reminder {
        Reminder {
            id: ReminderId::new(id).unwrap(),
            todo_id: TodoId::new(1).unwrap(),
            user_id: UserId::new(5).unwrap(),
            reminder_type: ReminderType::Wechat,
            title: ReminderTitle::new("回访").unwrap(),
            content: String::new(),
            status: ReminderStatus::Pending,
            frequency,
            schedule_time: at(31, 9),
            sent_time: None,
            fail_reason: String::new(),
            retry_count: 0,
            max_retries: 3,
            created_at: at(1, 0),
            updated_at: at(1, 0),
        }
    }

    fn config() -> ReminderConfig {
        ReminderConfig {
            id: 1,
            user_id: UserId::new(5).unwrap(),
            enable_wechat: true,
            enable_enterprise_wechat: false,
            wechat_user_id: String::new(),
            enterprise_wechat_user_id: String::new(),
            default_advance_minutes: 30,
            quiet_start_time: ClockTime::new("22:00").ok(),
            quiet_end_time: ClockTime::new("08:00").ok(),
            created_at: at(1, 0),
            updated_at: at(1, 0),
        }
    }

    fn todo() -> Todo {
        Todo {
            id: TodoId::new(9).unwrap(),
            customer_id: CustomerId::new(2).unwrap(),
            creator_id: UserId::new(1).unwrap(),
            executor_id: UserId::new(3).unwrap(),
            title: TodoTitle::new("确认报价").unwrap(),
            content: "电话确认".into(),
            status: TodoStatus::Pending,
            planned_time: at(20, 14),
            completed_time: None,
            is_reminder: true,
            reminder_type: None,
            reminder_user_id: None,
            reminder_time: Some(at(20, 13)),
            priority: Priority::High,
            tags: Value::Array(vec![]),
            attachments: Value::Array(vec![]),
            created_at: at(1, 0),
            updated_at: at(1, 0),
        }
    }

    #[test]
    fn sweep_records_outcomes_and_reschedules() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_reminders().returning(|_, limit| {
            assert_eq!(limit, 100);
            Ok(vec![
                reminder(1, ReminderFrequency::Monthly),
                reminder(2, ReminderFrequency::Once),
            ])
        });
        repo.expect_get_reminder_config()
            .returning(|_| Ok(Some(config())));
        repo.expect_record_delivery().returning(|id, outcome| {
            let mut stored = reminder(id.get(), ReminderFrequency::Once);
            match outcome {
                DeliveryOutcome::Sent { .. } => assert_eq!(id.get(), 1),
                DeliveryOutcome::Deferred { reason } => {
                    assert_eq!(id.get(), 2);
                    assert_eq!(reason, "当前在免打扰时间内");
                    stored.status = ReminderStatus::Failed;
                }
                DeliveryOutcome::Failed { .. } => panic!("quiet hours must not spend a retry"),
            }
            Ok(stored)
        });
        repo.expect_create_reminder().times(1).returning(|new| {
            assert_eq!(new.schedule_time, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(9, 0, 0).unwrap());
            let mut next = reminder(3, new.frequency);
            next.schedule_time = new.schedule_time;
            Ok(next)
        });

        let mut notifier = MockNotifier::new();
        notifier.expect_send().returning(|reminder, _, _| {
            if reminder.id.get() == 1 {
                Ok(())
            } else {
                Err(NotifyError::QuietHours)
            }
        });

        let report = dispatch_due_reminders(&repo, &notifier, at(31, 10), 100).unwrap();
        assert_eq!(
            report,
            DispatchReport {
                processed: 2,
                sent: 1,
                failed: 1,
                rescheduled: 1,
            }
        );
    }

    #[test]
    fn sweep_continues_after_storage_error() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_reminders().returning(|_, _| {
            Ok(vec![
                reminder(1, ReminderFrequency::Once),
                reminder(2, ReminderFrequency::Once),
            ])
        });
        repo.expect_get_reminder_config()
            .returning(|_| Ok(Some(config())));
        repo.expect_record_delivery().returning(|id, _| {
            if id.get() == 1 {
                Err(RepositoryError::ConnectionError("locked".into()))
            } else {
                Ok(reminder(2, ReminderFrequency::Once))
            }
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_send().returning(|_, _, _| Ok(()));

        let report = dispatch_due_reminders(&repo, &notifier, at(31, 10), 10).unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.rescheduled, 0);
    }

    #[test]
    fn missing_config_is_created_with_defaults() {
        let mut repo = MockRepository::new();
        repo.expect_get_reminder_config().returning(|_| Ok(None));
        repo.expect_upsert_reminder_config()
            .times(1)
            .returning(|new| {
                assert!(new.enable_wechat);
                assert_eq!(new.default_advance_minutes, 30);
                let mut stored = config();
                stored.user_id = new.user_id;
                Ok(stored)
            });

        let config = get_reminder_config(&repo, UserId::new(8).unwrap()).unwrap();
        assert_eq!(config.user_id.get(), 8);
    }

    #[test]
    fn todo_reminder_uses_builtin_template() {
        let mut repo = MockRepository::new();
        repo.expect_get_default_template().returning(|_| Ok(None));
        repo.expect_get_customer_by_id().returning(|_| Ok(None));
        repo.expect_create_reminder().returning(|new| {
            assert_eq!(new.title.as_str(), "待办提醒：确认报价");
            assert!(new.content.contains("计划时间：2024-01-20 14:00"));
            assert_eq!(new.user_id.get(), 3);
            assert_eq!(new.reminder_type, ReminderType::Wechat);
            assert_eq!(new.schedule_time, at(20, 13));
            let mut stored = reminder(4, ReminderFrequency::Once);
            stored.title = new.title.clone();
            Ok(stored)
        });

        let created = create_reminder_for_todo(&repo, &todo()).unwrap();
        assert!(created.is_some());
    }

    #[test]
    fn todo_without_reminder_creates_nothing() {
        let repo = MockRepository::new();
        let mut todo = todo();
        todo.is_reminder = false;
        assert!(create_reminder_for_todo(&repo, &todo).unwrap().is_none());
    }

    #[test]
    fn templates_render_todo_variables() {
        let body = TemplateBody {
            title: "{{ customer_name }}: {{ title }}".into(),
            content: "{{ priority }}/{{ status }}".into(),
        };
        let rendered = render_template(&body, &TemplateVars::for_todo(&todo(), "阿里小店")).unwrap();
        assert_eq!(rendered.title, "阿里小店: 确认报价");
        assert_eq!(rendered.content, "high/pending");
    }

    #[test]
    fn broken_template_is_rejected() {
        let body = TemplateBody {
            title: "{{ title".into(),
            content: String::new(),
        };
        assert!(matches!(
            render_template(&body, &TemplateVars::default()),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn cancelling_twice_is_a_no_op() {
        let mut repo = MockRepository::new();
        repo.expect_get_reminder_by_id().returning(|_| {
            let mut stored = reminder(1, ReminderFrequency::Once);
            stored.status = ReminderStatus::Cancelled;
            Ok(Some(stored))
        });
        repo.expect_save_reminder().never();

        let reminder = cancel_reminder(&repo, 1, at(2, 0)).unwrap();
        assert_eq!(reminder.status, ReminderStatus::Cancelled);
    }

    #[test]
    fn deleting_a_missing_reminder_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_reminder().returning(|_| Ok(0));
        assert!(matches!(
            delete_reminder(&repo, 12),
            Err(ServiceError::NotFound)
        ));
    }
}
