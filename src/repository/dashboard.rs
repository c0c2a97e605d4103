use chrono::{Duration, NaiveDateTime};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;

use crate::domain::customer::half_year_before;
use crate::domain::dashboard::{
    BLACKLIST_TAG, DashboardQuery, DashboardRow, NO_FOLLOW_UP_MARKER, SAMPLE_SENT_MARKER,
    SHIPPED_MARKER, StatusFilter, TimeFilter,
};
use crate::domain::reminder::ReminderFrequency;
use crate::domain::start_of_day;
use crate::domain::todo::TodoStatus;
use crate::domain::types::CustomerId;
use crate::models::decode_or_default;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DashboardReader, DieselRepository};
use crate::schema::{customers, todos};

type RawRow = (
    i32,
    String,
    String,
    String,
    Option<NaiveDateTime>,
    Option<NaiveDateTime>,
    String,
    NaiveDateTime,
);

const OPEN_SEA_SQL: &str = "(CASE WHEN json_valid(customers.sellers) \
     THEN json_array_length(customers.sellers) = 0 ELSE 1 END)";

fn blacklist_sql() -> String {
    format!(
        "(json_valid(customers.tags) AND EXISTS (SELECT 1 FROM json_each(customers.tags) \
         WHERE json_each.value = '{BLACKLIST_TAG}'))"
    )
}

fn recurring_sql() -> String {
    format!(
        "EXISTS (SELECT 1 FROM reminders WHERE reminders.todo_id = todos.id \
         AND reminders.frequency != '{}')",
        ReminderFrequency::Once.as_str()
    )
}

impl DashboardReader for DieselRepository {
    fn search_dashboard(
        &self,
        query: &DashboardQuery,
        now: NaiveDateTime,
    ) -> RepositoryResult<(usize, Vec<DashboardRow>)> {
        let mut conn = self.conn()?;

        let today = start_of_day(now);
        let tomorrow = today + Duration::days(1);

        let query_builder = || {
            let mut items = todos::table
                .inner_join(customers::table)
                .filter(todos::executor_id.eq(query.user_id.get()))
                .filter(todos::status.ne(TodoStatus::Completed.as_str()))
                .filter(todos::is_deleted.eq(false))
                .filter(customers::is_deleted.eq(false))
                .into_boxed::<Sqlite>();

            items = match query.time_filter {
                TimeFilter::Today => items
                    .filter(todos::planned_time.ge(today))
                    .filter(todos::planned_time.lt(tomorrow)),
                TimeFilter::Upcoming => items.filter(todos::planned_time.ge(tomorrow)),
                TimeFilter::NeverContacted => items.filter(customers::last_called.is_null()),
                TimeFilter::NeverOrdered => items.filter(customers::last_order_date.is_null()),
                TimeFilter::OpenSea => items.filter(sql::<Bool>(OPEN_SEA_SQL)),
                TimeFilter::NoFollowUp => {
                    items.filter(customers::remark.like(format!("%{NO_FOLLOW_UP_MARKER}%")))
                }
                TimeFilter::Blacklist => items.filter(sql::<Bool>(&blacklist_sql())),
                TimeFilter::All => items,
            };

            items = match query.status_filter {
                StatusFilter::DueToday => items
                    .filter(todos::planned_time.ge(today))
                    .filter(todos::planned_time.lt(tomorrow)),
                StatusFilter::Recurring => items.filter(sql::<Bool>(&recurring_sql())),
                StatusFilter::SampleSent => {
                    items.filter(todos::title.like(format!("%{SAMPLE_SENT_MARKER}%")))
                }
                StatusFilter::Shipped => {
                    items.filter(todos::title.like(format!("%{SHIPPED_MARKER}%")))
                }
                StatusFilter::NoOrderHalfYear => items.filter(
                    customers::last_order_date
                        .is_null()
                        .or(customers::last_order_date.lt(half_year_before(now))),
                ),
                StatusFilter::NeverOrdered => items.filter(customers::last_order_date.is_null()),
                StatusFilter::All => items,
            };

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((todos::planned_time.asc(), todos::id.asc()))
            .select((
                customers::id,
                customers::name,
                customers::contact_name,
                customers::tags,
                customers::last_called,
                customers::last_order_date,
                todos::content,
                todos::planned_time,
            ))
            .load::<RawRow>(&mut conn)?;

        let rows = rows
            .into_iter()
            .map(
                |(id, name, contact, tags, last_called, last_order, content, planned)| {
                    Ok(DashboardRow {
                        customer_id: CustomerId::try_from(id)?,
                        customer_name: name,
                        contact_name: contact,
                        customer_tags: decode_or_default(&tags),
                        last_called,
                        last_order_date: last_order,
                        todo_content: content,
                        planned_time: planned,
                    })
                },
            )
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, rows))
    }
}
