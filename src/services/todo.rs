//! Todo workflows. Every mutation is recorded in the todo audit log.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::error;

use crate::domain::todo::{NewTodoLog, Todo, TodoAction, TodoLog, TodoStats, TodoStatus, UpdateTodo};
use crate::domain::types::{CustomerId, TodoId, UserId};
use crate::dto::todo::{TodoDetail, TodoQuery, TodoStatsQuery};
use crate::forms::parse_optional_datetime;
use crate::forms::todo::{CreateTodoForm, UpdateTodoForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{
    CustomerReader, ReminderReader, ReminderWriter, TodoListQuery, TodoReader, TodoWriter,
    UserReader,
};
use crate::services::reminder::create_reminder_for_todo;
use crate::services::{ServiceError, ServiceResult};

/// The todo is already saved and logged when this runs, so a reminder that
/// cannot be created is logged instead of failing the request.
fn schedule_reminder<R>(repo: &R, todo: &Todo)
where
    R: CustomerReader + ReminderReader + ReminderWriter + ?Sized,
{
    if let Err(err) = create_reminder_for_todo(repo, todo) {
        error!("Failed to create reminder for todo {}: {err}", todo.id);
    }
}

fn load_todo<R>(repo: &R, id: i32) -> ServiceResult<Todo>
where
    R: TodoReader + ?Sized,
{
    repo.get_todo_by_id(TodoId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

/// Creates a todo on behalf of `acting_user`, together with its reminder
/// when one is requested.
pub fn create_todo<R>(repo: &R, acting_user: UserId, form: CreateTodoForm) -> ServiceResult<Todo>
where
    R: TodoWriter + CustomerReader + ReminderReader + ReminderWriter + ?Sized,
{
    let new_todo = form.into_new_todo(acting_user)?;
    if repo.get_customer_by_id(new_todo.customer_id)?.is_none() {
        return Err(ServiceError::Validation(format!(
            "customer {} does not exist",
            new_todo.customer_id
        )));
    }

    let todo = repo.create_todo(&new_todo)?;
    repo.create_todo_log(&NewTodoLog::new(
        todo.id,
        acting_user,
        TodoAction::Create,
        None,
        Some(&todo),
    ))?;

    schedule_reminder(repo, &todo);
    Ok(todo)
}

pub fn list_todos<R>(
    repo: &R,
    params: TodoQuery,
    now: NaiveDateTime,
) -> ServiceResult<Paginated<Todo>>
where
    R: TodoReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let mut query = TodoListQuery::new(now).paginate(pagination);
    query.customer_id = params.customer_id.map(CustomerId::new).transpose()?;
    query.executor_id = params.executor_id.map(UserId::new).transpose()?;
    query.creator_id = params.creator_id.map(UserId::new).transpose()?;
    query.status = params.status;
    query.priority = params.priority;
    query.window = params.date_type;
    query.start = parse_optional_datetime(params.start_date.as_deref())?;
    query.end = parse_optional_datetime(params.end_date.as_deref())?;
    query.keyword = params
        .keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let (total, todos) = repo.list_todos(query)?;
    Ok(Paginated::new(todos, total, pagination))
}

/// Loads a todo with the names of its creator, executor, reminder recipient
/// and customer. Deleted users and customers still resolve.
pub fn get_todo<R>(repo: &R, id: i32, now: NaiveDateTime) -> ServiceResult<TodoDetail>
where
    R: TodoReader + UserReader + CustomerReader + ?Sized,
{
    let todo = load_todo(repo, id)?;

    let mut user_ids = vec![todo.creator_id, todo.executor_id];
    user_ids.extend(todo.reminder_user_id);
    let names: HashMap<UserId, String> = repo
        .get_users_by_ids(&user_ids)?
        .into_iter()
        .map(|user| (user.id, user.name.as_str().to_string()))
        .collect();
    let customer_name = repo
        .get_customers_by_ids(&[todo.customer_id])?
        .into_iter()
        .next()
        .map(|customer| customer.name().to_string())
        .unwrap_or_default();

    let name_of = |id: UserId| names.get(&id).cloned().unwrap_or_default();
    let mut detail = TodoDetail::new(todo, now);
    detail.creator_name = name_of(detail.todo.creator_id);
    detail.executor_name = name_of(detail.todo.executor_id);
    detail.reminder_user_name = detail.todo.reminder_user_id.map(name_of);
    detail.customer_name = customer_name;
    Ok(detail)
}

fn action_for(before: TodoStatus, after: TodoStatus) -> TodoAction {
    match after {
        _ if before == after => TodoAction::Update,
        TodoStatus::Completed => TodoAction::Complete,
        TodoStatus::Cancelled => TodoAction::Cancel,
        _ => TodoAction::Update,
    }
}

/// Applies a partial update. Turning the reminder flag on creates the
/// reminder.
pub fn update_todo<R>(
    repo: &R,
    acting_user: UserId,
    id: i32,
    form: UpdateTodoForm,
    now: NaiveDateTime,
) -> ServiceResult<Todo>
where
    R: TodoReader + TodoWriter + CustomerReader + ReminderReader + ReminderWriter + ?Sized,
{
    let todo = load_todo(repo, id)?;
    let updates = UpdateTodo::try_from(form)?;
    let saved = repo.save_todo(&updates.apply(&todo, now))?;

    repo.create_todo_log(&NewTodoLog::new(
        saved.id,
        acting_user,
        action_for(todo.status, saved.status),
        Some(&todo),
        Some(&saved),
    ))?;

    if !todo.is_reminder && saved.is_reminder {
        schedule_reminder(repo, &saved);
    }
    Ok(saved)
}

fn change_status<R>(
    repo: &R,
    acting_user: UserId,
    id: i32,
    status: TodoStatus,
    now: NaiveDateTime,
) -> ServiceResult<Todo>
where
    R: TodoReader + TodoWriter + ?Sized,
{
    let todo = load_todo(repo, id)?;
    if todo.status == status {
        return Ok(todo);
    }
    let saved = repo.save_todo(&todo.with_status(status, now))?;
    repo.create_todo_log(&NewTodoLog::new(
        saved.id,
        acting_user,
        action_for(todo.status, status),
        Some(&todo),
        Some(&saved),
    ))?;
    Ok(saved)
}

/// Marks the todo completed. Completing twice keeps the first timestamp.
pub fn complete_todo<R>(
    repo: &R,
    acting_user: UserId,
    id: i32,
    now: NaiveDateTime,
) -> ServiceResult<Todo>
where
    R: TodoReader + TodoWriter + ?Sized,
{
    change_status(repo, acting_user, id, TodoStatus::Completed, now)
}

pub fn cancel_todo<R>(
    repo: &R,
    acting_user: UserId,
    id: i32,
    now: NaiveDateTime,
) -> ServiceResult<Todo>
where
    R: TodoReader + TodoWriter + ?Sized,
{
    change_status(repo, acting_user, id, TodoStatus::Cancelled, now)
}

pub fn delete_todo<R>(repo: &R, acting_user: UserId, id: i32) -> ServiceResult<()>
where
    R: TodoReader + TodoWriter + ?Sized,
{
    let todo = load_todo(repo, id)?;
    if repo.delete_todo(todo.id)? == 0 {
        return Err(ServiceError::NotFound);
    }
    repo.create_todo_log(&NewTodoLog::new(
        todo.id,
        acting_user,
        TodoAction::Delete,
        Some(&todo),
        None,
    ))?;
    Ok(())
}

pub fn todo_stats<R>(
    repo: &R,
    params: TodoStatsQuery,
    now: NaiveDateTime,
) -> ServiceResult<TodoStats>
where
    R: TodoReader + ?Sized,
{
    let customer_id = params.customer_id.map(CustomerId::new).transpose()?;
    let executor_id = params.executor_id.map(UserId::new).transpose()?;
    Ok(repo.todo_stats(customer_id, executor_id, now)?)
}

pub fn list_todo_logs<R>(repo: &R, id: i32) -> ServiceResult<Vec<TodoLog>>
where
    R: TodoReader + ?Sized,
{
    Ok(repo.list_todo_logs(TodoId::new(id)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Customer, CustomerProfile};
    use crate::domain::todo::Priority;
    use crate::domain::types::{CustomerName, TodoTitle};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn todo(status: TodoStatus) -> Todo {
        Todo {
            id: TodoId::new(7).unwrap(),
            customer_id: CustomerId::new(2).unwrap(),
            creator_id: UserId::new(1).unwrap(),
            executor_id: UserId::new(3).unwrap(),
            title: TodoTitle::new("回访").unwrap(),
            content: String::new(),
            status,
            planned_time: at(15),
            completed_time: None,
            is_reminder: false,
            reminder_type: None,
            reminder_user_id: None,
            reminder_time: None,
            priority: Priority::Medium,
            tags: Value::Array(vec![]),
            attachments: Value::Array(vec![]),
            created_at: at(8),
            updated_at: at(8),
        }
    }

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(2).unwrap(),
            profile: CustomerProfile::named(CustomerName::new("阿里小店").unwrap()),
            created_by: 1,
            updated_by: 1,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn log_from(new: &NewTodoLog) -> TodoLog {
        TodoLog {
            id: 1,
            todo_id: new.todo_id,
            operator_id: new.operator_id,
            action: new.action,
            old_data: new.old_data.clone(),
            new_data: new.new_data.clone(),
            remark: new.remark.clone(),
            created_at: at(9),
        }
    }

    #[test]
    fn create_logs_and_skips_reminder_when_not_requested() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|_| Ok(Some(customer())));
        repo.expect_create_todo().returning(|new| {
            assert_eq!(new.creator_id.get(), 1);
            assert_eq!(new.executor_id.get(), 1);
            Ok(todo(TodoStatus::Pending))
        });
        repo.expect_create_todo_log().times(1).returning(|new| {
            assert_eq!(new.action, TodoAction::Create);
            assert!(new.old_data.is_none());
            assert!(new.new_data.is_some());
            Ok(log_from(new))
        });
        repo.expect_create_reminder().never();

        let form: CreateTodoForm = serde_json::from_str(
            r#"{"customer_id": 2, "title": "回访", "planned_time": "2024-05-10 15:00"}"#,
        )
        .unwrap();
        let created = create_todo(&repo, UserId::new(1).unwrap(), form).unwrap();
        assert_eq!(created.id.get(), 7);
    }

    #[test]
    fn reminder_failure_keeps_created_todo() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|_| Ok(Some(customer())));
        repo.expect_create_todo().returning(|new| {
            let mut stored = todo(TodoStatus::Pending);
            stored.is_reminder = new.is_reminder;
            stored.reminder_time = new.reminder_time;
            Ok(stored)
        });
        repo.expect_create_todo_log()
            .times(1)
            .returning(|new| Ok(log_from(new)));
        repo.expect_get_default_template()
            .returning(|_| Ok(None));
        repo.expect_create_reminder()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("disk full".into())));

        let form: CreateTodoForm = serde_json::from_str(
            r#"{"customer_id": 2, "title": "回访", "planned_time": "2024-05-10 15:00",
                "is_reminder": true, "reminder_time": "2024-05-10 14:30"}"#,
        )
        .unwrap();
        let created = create_todo(&repo, UserId::new(1).unwrap(), form).unwrap();
        assert_eq!(created.id.get(), 7);
        assert!(created.is_reminder);
    }

    #[test]
    fn update_keeps_saved_todo_when_reminder_fails() {
        let mut repo = MockRepository::new();
        repo.expect_get_todo_by_id()
            .returning(|_| Ok(Some(todo(TodoStatus::Pending))));
        repo.expect_save_todo().returning(|saved| Ok(saved.clone()));
        repo.expect_create_todo_log()
            .times(1)
            .returning(|new| Ok(log_from(new)));
        repo.expect_get_default_template()
            .returning(|_| Err(RepositoryError::ConnectionError("locked".into())));
        repo.expect_create_reminder().never();

        let form: UpdateTodoForm = serde_json::from_str(
            r#"{"is_reminder": true, "reminder_time": "2024-05-10 14:30"}"#,
        )
        .unwrap();
        let saved = update_todo(&repo, UserId::new(1).unwrap(), 7, form, at(10)).unwrap();
        assert!(saved.is_reminder);
        assert_eq!(saved.reminder_time, Some(at(14) + chrono::Duration::minutes(30)));
    }

    #[test]
    fn create_rejects_unknown_customer() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id().returning(|_| Ok(None));
        repo.expect_create_todo().never();

        let form: CreateTodoForm = serde_json::from_str(
            r#"{"customer_id": 99, "title": "回访", "planned_time": "2024-05-10 15:00"}"#,
        )
        .unwrap();
        assert!(matches!(
            create_todo(&repo, UserId::new(1).unwrap(), form),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn complete_is_idempotent() {
        let mut repo = MockRepository::new();
        repo.expect_get_todo_by_id()
            .returning(|_| Ok(Some(todo(TodoStatus::Completed))));
        repo.expect_save_todo().never();
        repo.expect_create_todo_log().never();

        let done = complete_todo(&repo, UserId::new(1).unwrap(), 7, at(16)).unwrap();
        assert_eq!(done.status, TodoStatus::Completed);
    }

    #[test]
    fn cancel_writes_cancel_log() {
        let mut repo = MockRepository::new();
        repo.expect_get_todo_by_id()
            .returning(|_| Ok(Some(todo(TodoStatus::Pending))));
        repo.expect_save_todo().returning(|todo| Ok(todo.clone()));
        repo.expect_create_todo_log().times(1).returning(|new| {
            assert_eq!(new.action, TodoAction::Cancel);
            Ok(log_from(new))
        });

        let cancelled = cancel_todo(&repo, UserId::new(1).unwrap(), 7, at(16)).unwrap();
        assert_eq!(cancelled.status, TodoStatus::Cancelled);
        assert_eq!(cancelled.completed_time, None);
    }

    #[test]
    fn update_into_completed_logs_completion() {
        let mut repo = MockRepository::new();
        repo.expect_get_todo_by_id()
            .returning(|_| Ok(Some(todo(TodoStatus::Pending))));
        repo.expect_save_todo().returning(|todo| Ok(todo.clone()));
        repo.expect_create_todo_log().returning(|new| {
            assert_eq!(new.action, TodoAction::Complete);
            Ok(log_from(new))
        });

        let form: UpdateTodoForm = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        let saved = update_todo(&repo, UserId::new(1).unwrap(), 7, form, at(16)).unwrap();
        assert_eq!(saved.completed_time, Some(at(16)));
    }

    #[test]
    fn detail_resolves_names() {
        let mut repo = MockRepository::new();
        repo.expect_get_todo_by_id()
            .returning(|_| Ok(Some(todo(TodoStatus::Pending))));
        repo.expect_get_users_by_ids().returning(|_| Ok(vec![]));
        repo.expect_get_customers_by_ids()
            .returning(|_| Ok(vec![customer()]));

        let detail = get_todo(&repo, 7, at(16)).unwrap();
        assert_eq!(detail.customer_name, "阿里小店");
        assert_eq!(detail.executor_name, "");
        assert!(detail.is_overdue);
        assert_eq!(detail.days_left, 0);
    }

    #[test]
    fn missing_todo_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_todo_by_id().returning(|_| Ok(None));
        assert!(matches!(
            delete_todo(&repo, UserId::new(1).unwrap(), 7),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn invalid_id_is_a_validation_error() {
        let repo = MockRepository::new();
        assert!(matches!(
            list_todo_logs(&repo, 0),
            Err(ServiceError::Validation(_))
        ));
    }
}
