use chrono::{Duration, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::local_now;
use crate::domain::start_of_day;
use crate::domain::todo::{
    DateWindow, NewTodo, NewTodoLog, Todo, TodoLog, TodoStats, TodoStatus,
};
use crate::domain::types::{CustomerId, TodoId, UserId};
use crate::models::todo::{
    NewTodo as DbNewTodo, NewTodoLog as DbNewTodoLog, Todo as DbTodo, TodoChangeset,
    TodoLog as DbTodoLog,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TodoListQuery, TodoReader, TodoWriter};
use crate::schema::{todo_logs, todos};

const CLOSED_STATUSES: [&str; 2] = [
    TodoStatus::Completed.as_str(),
    TodoStatus::Cancelled.as_str(),
];

/// Planned-time bounds `[from, to)` of a relative window; `None` on either
/// side leaves it open.
fn window_bounds(
    window: DateWindow,
    now: NaiveDateTime,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let today = start_of_day(now);
    let day = Duration::days(1);
    match window {
        DateWindow::Yesterday => (Some(today - day), Some(today)),
        DateWindow::Today => (Some(today), Some(today + day)),
        DateWindow::Tomorrow => (Some(today + day), Some(today + day + day)),
        DateWindow::Upcoming => (Some(today + day), None),
        DateWindow::Overdue => (None, Some(now)),
        DateWindow::All => (None, None),
    }
}

impl TodoReader for DieselRepository {
    fn get_todo_by_id(&self, id: TodoId) -> RepositoryResult<Option<Todo>> {
        let mut conn = self.conn()?;

        let todo = todos::table
            .filter(todos::id.eq(id.get()))
            .filter(todos::is_deleted.eq(false))
            .first::<DbTodo>(&mut conn)
            .optional()?;

        todo.map(Todo::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_todos(&self, query: TodoListQuery) -> RepositoryResult<(usize, Vec<Todo>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = todos::table
                .filter(todos::is_deleted.eq(false))
                .into_boxed::<Sqlite>();

            if let Some(customer_id) = query.customer_id {
                items = items.filter(todos::customer_id.eq(customer_id.get()));
            }
            if let Some(executor_id) = query.executor_id {
                items = items.filter(todos::executor_id.eq(executor_id.get()));
            }
            if let Some(creator_id) = query.creator_id {
                items = items.filter(todos::creator_id.eq(creator_id.get()));
            }
            if let Some(status) = query.status {
                items = items.filter(todos::status.eq(status.as_str()));
            }
            if let Some(priority) = query.priority {
                items = items.filter(todos::priority.eq(priority.as_str()));
            }

            if let Some(window) = query.window {
                let (from, to) = window_bounds(window, query.now);
                if let Some(from) = from {
                    items = items.filter(todos::planned_time.ge(from));
                }
                if let Some(to) = to {
                    items = items.filter(todos::planned_time.lt(to));
                }
                if window == DateWindow::Overdue {
                    items = items.filter(todos::status.ne_all(CLOSED_STATUSES));
                }
            }

            if let Some(start) = query.start {
                items = items.filter(todos::planned_time.ge(start));
            }
            if let Some(end) = query.end {
                items = items.filter(todos::planned_time.le(end));
            }

            if let Some(keyword) = &query.keyword {
                let pattern = format!("%{keyword}%");
                items = items.filter(
                    todos::title
                        .like(pattern.clone())
                        .or(todos::content.like(pattern)),
                );
            }

            items
        };

        // Get the total count before applying pagination
        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((todos::created_at.desc(), todos::id.desc()))
            .load::<DbTodo>(&mut conn)?;

        let todos = rows
            .into_iter()
            .map(Todo::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, todos))
    }

    fn todo_stats(
        &self,
        customer_id: Option<CustomerId>,
        executor_id: Option<UserId>,
        now: NaiveDateTime,
    ) -> RepositoryResult<TodoStats> {
        let mut conn = self.conn()?;

        let scoped = || {
            let mut items = todos::table
                .filter(todos::is_deleted.eq(false))
                .into_boxed::<Sqlite>();
            if let Some(customer_id) = customer_id {
                items = items.filter(todos::customer_id.eq(customer_id.get()));
            }
            if let Some(executor_id) = executor_id {
                items = items.filter(todos::executor_id.eq(executor_id.get()));
            }
            items
        };

        let mut count_status = |status: TodoStatus| -> RepositoryResult<i64> {
            Ok(scoped()
                .filter(todos::status.eq(status.as_str()))
                .count()
                .get_result::<i64>(&mut conn)?)
        };

        let pending = count_status(TodoStatus::Pending)?;
        let completed = count_status(TodoStatus::Completed)?;
        let cancelled = count_status(TodoStatus::Cancelled)?;

        let total = scoped().count().get_result::<i64>(&mut conn)?;
        let overdue = scoped()
            .filter(todos::planned_time.lt(now))
            .filter(todos::status.ne_all(CLOSED_STATUSES))
            .count()
            .get_result::<i64>(&mut conn)?;

        let (from, to) = window_bounds(DateWindow::Today, now);
        let mut today = scoped();
        if let (Some(from), Some(to)) = (from, to) {
            today = today
                .filter(todos::planned_time.ge(from))
                .filter(todos::planned_time.lt(to));
        }
        let today = today.count().get_result::<i64>(&mut conn)?;

        Ok(TodoStats {
            total,
            pending,
            completed,
            cancelled,
            overdue,
            today,
        })
    }

    fn list_todo_logs(&self, todo_id: TodoId) -> RepositoryResult<Vec<TodoLog>> {
        let mut conn = self.conn()?;

        let rows = todo_logs::table
            .filter(todo_logs::todo_id.eq(todo_id.get()))
            .order((todo_logs::created_at.desc(), todo_logs::id.desc()))
            .load::<DbTodoLog>(&mut conn)?;

        rows.into_iter()
            .map(|log| TodoLog::try_from(log).map_err(RepositoryError::from))
            .collect()
    }
}

impl TodoWriter for DieselRepository {
    fn create_todo(&self, todo: &NewTodo) -> RepositoryResult<Todo> {
        let mut conn = self.conn()?;

        let new_todo = DbNewTodo::new(todo, local_now());
        let created = diesel::insert_into(todos::table)
            .values(&new_todo)
            .get_result::<DbTodo>(&mut conn)?;

        Todo::try_from(created).map_err(RepositoryError::from)
    }

    fn save_todo(&self, todo: &Todo) -> RepositoryResult<Todo> {
        let mut conn = self.conn()?;

        let changeset = TodoChangeset::from(todo);
        let saved = diesel::update(
            todos::table
                .filter(todos::id.eq(todo.id.get()))
                .filter(todos::is_deleted.eq(false)),
        )
        .set(&changeset)
        .get_result::<DbTodo>(&mut conn)?;

        Todo::try_from(saved).map_err(RepositoryError::from)
    }

    fn delete_todo(&self, id: TodoId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        let affected = diesel::update(
            todos::table
                .filter(todos::id.eq(id.get()))
                .filter(todos::is_deleted.eq(false)),
        )
        .set((
            todos::is_deleted.eq(true),
            todos::deleted_at.eq(Some(now)),
            todos::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn create_todo_log(&self, log: &NewTodoLog) -> RepositoryResult<TodoLog> {
        let mut conn = self.conn()?;

        let new_log = DbNewTodoLog::new(log, local_now());
        let created = diesel::insert_into(todo_logs::table)
            .values(&new_log)
            .get_result::<DbTodoLog>(&mut conn)?;

        TodoLog::try_from(created).map_err(RepositoryError::from)
    }
}
