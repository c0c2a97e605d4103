use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::db::DbConnection;
use crate::domain::local_now;
use crate::domain::reminder::{
    DeliveryOutcome, NewReminder, NewReminderConfig, NewReminderTemplate, Reminder,
    ReminderConfig, ReminderStats, ReminderStatus, ReminderTemplate, ReminderType,
    ReminderWithContext,
};
use crate::domain::start_of_day;
use crate::domain::types::{ReminderId, UserId};
use crate::models::reminder::{
    NewReminder as DbNewReminder, NewReminderTemplate as DbNewReminderTemplate,
    Reminder as DbReminder, ReminderChangeset, ReminderConfig as DbReminderConfig,
    ReminderConfigRow, ReminderTemplate as DbReminderTemplate,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ReminderListQuery, ReminderReader, ReminderWriter};
use crate::schema::{customers, reminder_configs, reminder_templates, reminders, todos, users};

/// Attaches todo title, recipient name and customer name to each reminder.
fn with_context(
    conn: &mut DbConnection,
    items: Vec<Reminder>,
) -> RepositoryResult<Vec<ReminderWithContext>> {
    let todo_ids: Vec<i32> = items.iter().map(|r| r.todo_id.get()).collect();
    let user_ids: Vec<i32> = items.iter().map(|r| r.user_id.get()).collect();

    let todo_rows = todos::table
        .filter(todos::id.eq_any(&todo_ids))
        .select((todos::id, todos::title, todos::customer_id))
        .load::<(i32, String, i32)>(conn)?;

    let customer_ids: Vec<i32> = todo_rows.iter().map(|(_, _, c)| *c).collect();
    let customer_names: HashMap<i32, String> = customers::table
        .filter(customers::id.eq_any(&customer_ids))
        .select((customers::id, customers::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let user_names: HashMap<i32, String> = users::table
        .filter(users::id.eq_any(&user_ids))
        .select((users::id, users::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let todo_info: HashMap<i32, (String, i32)> = todo_rows
        .into_iter()
        .map(|(id, title, customer_id)| (id, (title, customer_id)))
        .collect();

    Ok(items
        .into_iter()
        .map(|reminder| {
            let (todo_title, customer_name) = todo_info
                .get(&reminder.todo_id.get())
                .map(|(title, customer_id)| {
                    (
                        title.clone(),
                        customer_names.get(customer_id).cloned().unwrap_or_default(),
                    )
                })
                .unwrap_or_default();
            let user_name = user_names
                .get(&reminder.user_id.get())
                .cloned()
                .unwrap_or_default();
            ReminderWithContext {
                reminder,
                todo_title,
                user_name,
                customer_name,
            }
        })
        .collect())
}

fn into_domain(rows: Vec<DbReminder>) -> RepositoryResult<Vec<Reminder>> {
    rows.into_iter()
        .map(|r| Reminder::try_from(r).map_err(RepositoryError::from))
        .collect()
}

impl ReminderReader for DieselRepository {
    fn get_reminder_by_id(&self, id: ReminderId) -> RepositoryResult<Option<Reminder>> {
        let mut conn = self.conn()?;

        let reminder = reminders::table
            .filter(reminders::id.eq(id.get()))
            .first::<DbReminder>(&mut conn)
            .optional()?;

        reminder
            .map(Reminder::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_reminder_with_context(
        &self,
        id: ReminderId,
    ) -> RepositoryResult<Option<ReminderWithContext>> {
        let mut conn = self.conn()?;

        let reminder = reminders::table
            .filter(reminders::id.eq(id.get()))
            .first::<DbReminder>(&mut conn)
            .optional()?;

        let Some(reminder) = reminder else {
            return Ok(None);
        };
        let reminder = Reminder::try_from(reminder)?;

        Ok(with_context(&mut conn, vec![reminder])?.pop())
    }

    fn list_reminders(
        &self,
        query: ReminderListQuery,
    ) -> RepositoryResult<(usize, Vec<ReminderWithContext>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = reminders::table.into_boxed::<Sqlite>();

            if let Some(todo_id) = query.todo_id {
                items = items.filter(reminders::todo_id.eq(todo_id.get()));
            }
            if let Some(user_id) = query.user_id {
                items = items.filter(reminders::user_id.eq(user_id.get()));
            }
            if let Some(status) = query.status {
                items = items.filter(reminders::status.eq(status.as_str()));
            }
            if let Some(reminder_type) = query.reminder_type {
                items = items.filter(reminders::reminder_type.eq(reminder_type.as_str()));
            }
            if let Some(start) = query.start {
                items = items.filter(reminders::schedule_time.ge(start));
            }
            if let Some(end) = query.end {
                items = items.filter(reminders::schedule_time.le(end));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((reminders::schedule_time.desc(), reminders::id.desc()))
            .load::<DbReminder>(&mut conn)?;

        let reminders = into_domain(rows)?;
        Ok((total, with_context(&mut conn, reminders)?))
    }

    fn list_due_reminders(
        &self,
        now: NaiveDateTime,
        limit: usize,
    ) -> RepositoryResult<Vec<Reminder>> {
        let mut conn = self.conn()?;

        let rows = reminders::table
            .filter(reminders::schedule_time.le(now))
            .filter(
                reminders::status.eq(ReminderStatus::Pending.as_str()).or(reminders::status
                    .eq(ReminderStatus::Failed.as_str())
                    .and(reminders::retry_count.lt(reminders::max_retries))),
            )
            .order((reminders::schedule_time.asc(), reminders::id.asc()))
            .limit(limit as i64)
            .load::<DbReminder>(&mut conn)?;

        into_domain(rows)
    }

    fn reminder_stats(
        &self,
        user_id: Option<UserId>,
        now: NaiveDateTime,
    ) -> RepositoryResult<ReminderStats> {
        let mut conn = self.conn()?;

        let scoped = || {
            let mut items = reminders::table.into_boxed::<Sqlite>();
            if let Some(user_id) = user_id {
                items = items.filter(reminders::user_id.eq(user_id.get()));
            }
            items
        };

        let mut count_status = |status: ReminderStatus| -> RepositoryResult<i64> {
            Ok(scoped()
                .filter(reminders::status.eq(status.as_str()))
                .count()
                .get_result::<i64>(&mut conn)?)
        };

        let pending = count_status(ReminderStatus::Pending)?;
        let sent = count_status(ReminderStatus::Sent)?;
        let failed = count_status(ReminderStatus::Failed)?;
        let cancelled = count_status(ReminderStatus::Cancelled)?;

        let total = scoped().count().get_result::<i64>(&mut conn)?;

        let today = start_of_day(now);
        let today_pending = scoped()
            .filter(reminders::status.eq(ReminderStatus::Pending.as_str()))
            .filter(reminders::schedule_time.ge(today))
            .filter(reminders::schedule_time.lt(today + Duration::days(1)))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(ReminderStats {
            total,
            pending,
            sent,
            failed,
            cancelled,
            today_pending,
        })
    }

    fn get_default_template(
        &self,
        reminder_type: ReminderType,
    ) -> RepositoryResult<Option<ReminderTemplate>> {
        let mut conn = self.conn()?;

        let template = reminder_templates::table
            .filter(reminder_templates::reminder_type.eq(reminder_type.as_str()))
            .filter(reminder_templates::is_active.eq(true))
            .filter(reminder_templates::is_default.eq(true))
            .order(reminder_templates::id.desc())
            .first::<DbReminderTemplate>(&mut conn)
            .optional()?;

        template
            .map(ReminderTemplate::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_templates(
        &self,
        reminder_type: Option<ReminderType>,
    ) -> RepositoryResult<Vec<ReminderTemplate>> {
        let mut conn = self.conn()?;

        let mut items = reminder_templates::table
            .filter(reminder_templates::is_active.eq(true))
            .into_boxed::<Sqlite>();
        if let Some(reminder_type) = reminder_type {
            items = items.filter(reminder_templates::reminder_type.eq(reminder_type.as_str()));
        }

        let rows = items
            .order(reminder_templates::id.asc())
            .load::<DbReminderTemplate>(&mut conn)?;

        rows.into_iter()
            .map(|t| ReminderTemplate::try_from(t).map_err(RepositoryError::from))
            .collect()
    }

    fn get_reminder_config(&self, user_id: UserId) -> RepositoryResult<Option<ReminderConfig>> {
        let mut conn = self.conn()?;

        let config = reminder_configs::table
            .filter(reminder_configs::user_id.eq(user_id.get()))
            .first::<DbReminderConfig>(&mut conn)
            .optional()?;

        config
            .map(ReminderConfig::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }
}

impl ReminderWriter for DieselRepository {
    fn create_reminder(&self, reminder: &NewReminder) -> RepositoryResult<Reminder> {
        let mut conn = self.conn()?;

        let new_reminder = DbNewReminder::new(reminder, local_now());
        let created = diesel::insert_into(reminders::table)
            .values(&new_reminder)
            .get_result::<DbReminder>(&mut conn)?;

        Reminder::try_from(created).map_err(RepositoryError::from)
    }

    fn save_reminder(&self, reminder: &Reminder) -> RepositoryResult<Reminder> {
        let mut conn = self.conn()?;

        let changeset = ReminderChangeset::from(reminder);
        let saved = diesel::update(reminders::table.filter(reminders::id.eq(reminder.id.get())))
            .set(&changeset)
            .get_result::<DbReminder>(&mut conn)?;

        Reminder::try_from(saved).map_err(RepositoryError::from)
    }

    fn delete_reminder(&self, id: ReminderId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(reminders::table.filter(reminders::id.eq(id.get())))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn record_delivery(
        &self,
        id: ReminderId,
        outcome: &DeliveryOutcome,
    ) -> RepositoryResult<Reminder> {
        let mut conn = self.conn()?;
        let now = local_now();
        let target = reminders::table.filter(reminders::id.eq(id.get()));

        let updated = match outcome {
            DeliveryOutcome::Sent { at } => diesel::update(target)
                .set((
                    reminders::status.eq(ReminderStatus::Sent.as_str()),
                    reminders::sent_time.eq(Some(*at)),
                    reminders::fail_reason.eq(""),
                    reminders::updated_at.eq(now),
                ))
                .get_result::<DbReminder>(&mut conn)?,
            DeliveryOutcome::Failed { reason } => diesel::update(target)
                .set((
                    reminders::status.eq(ReminderStatus::Failed.as_str()),
                    reminders::fail_reason.eq(reason.as_str()),
                    reminders::retry_count.eq(reminders::retry_count + 1),
                    reminders::updated_at.eq(now),
                ))
                .get_result::<DbReminder>(&mut conn)?,
            DeliveryOutcome::Deferred { reason } => diesel::update(target)
                .set((
                    reminders::status.eq(ReminderStatus::Failed.as_str()),
                    reminders::fail_reason.eq(reason.as_str()),
                    reminders::updated_at.eq(now),
                ))
                .get_result::<DbReminder>(&mut conn)?,
        };

        Reminder::try_from(updated).map_err(RepositoryError::from)
    }

    fn create_template(
        &self,
        template: &NewReminderTemplate,
    ) -> RepositoryResult<ReminderTemplate> {
        let mut conn = self.conn()?;

        let new_template = DbNewReminderTemplate::new(template, local_now());
        let created = diesel::insert_into(reminder_templates::table)
            .values(&new_template)
            .get_result::<DbReminderTemplate>(&mut conn)?;

        ReminderTemplate::try_from(created).map_err(RepositoryError::from)
    }

    fn upsert_reminder_config(
        &self,
        config: &NewReminderConfig,
    ) -> RepositoryResult<ReminderConfig> {
        let mut conn = self.conn()?;

        let row = ReminderConfigRow::new(config, local_now());
        let saved = diesel::insert_into(reminder_configs::table)
            .values(&row)
            .on_conflict(reminder_configs::user_id)
            .do_update()
            .set(&row)
            .get_result::<DbReminderConfig>(&mut conn)?;

        ReminderConfig::try_from(saved).map_err(RepositoryError::from)
    }
}
