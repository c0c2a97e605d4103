use chrono::NaiveDateTime;
use log::info;

use crate::domain::start_of_day;
use crate::domain::todo::DateWindow;
use crate::domain::types::UserId;
use crate::domain::user::{NewUser, UpdateUser, User, UserHomepage, UserWithManager};
use crate::dto::user::UserQuery;
use crate::forms::user::{CreateUserForm, UpdateUserForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{
    ActivityListQuery, ActivityReader, TodoListQuery, TodoReader, UserListQuery, UserReader,
    UserWriter,
};
use crate::services::{ServiceError, ServiceResult};

fn load_user<R>(repo: &R, id: i32) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    repo.get_user_by_id(UserId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn list_users<R>(repo: &R, params: UserQuery) -> ServiceResult<Paginated<User>>
where
    R: UserReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let query = UserListQuery {
        department: non_blank(params.department),
        status: non_blank(params.status),
        name: non_blank(params.name),
        pagination: Some(pagination),
    };
    let (total, users) = repo.list_users(query)?;
    Ok(Paginated::new(users, total, pagination))
}

pub fn list_active_users<R>(repo: &R) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    Ok(repo.list_active_users()?)
}

/// User profile with the manager's display name resolved.
pub fn get_user<R>(repo: &R, id: i32) -> ServiceResult<UserWithManager>
where
    R: UserReader + ?Sized,
{
    let user = load_user(repo, id)?;
    let manager_name = match user.manager_id {
        Some(manager_id) => repo
            .get_user_by_id(manager_id)?
            .map(|manager| manager.name.into_inner()),
        None => None,
    };
    Ok(UserWithManager { user, manager_name })
}

/// Today's open todos executed by the user plus the activities they
/// recorded since midnight.
pub fn homepage<R>(repo: &R, id: i32, now: NaiveDateTime) -> ServiceResult<UserHomepage>
where
    R: UserReader + TodoReader + ActivityReader + ?Sized,
{
    let user = load_user(repo, id)?;

    let (_, todos) = repo.list_todos(
        TodoListQuery::new(now)
            .executor(user.id)
            .window(DateWindow::Today),
    )?;
    let todos = todos
        .into_iter()
        .filter(|todo| !todo.status.is_closed())
        .collect();

    let (_, activities) = repo.list_activities(
        ActivityListQuery::new()
            .user(user.id)
            .created_between(start_of_day(now), now),
    )?;

    Ok(UserHomepage::new(user, todos, activities))
}

pub fn create_user<R>(repo: &R, form: CreateUserForm) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let new_user = NewUser::try_from(form)?;
    let user = repo.create_user(&new_user)?;
    info!("Created user {} ({})", user.id, user.name);
    Ok(user)
}

pub fn update_user<R>(
    repo: &R,
    id: i32,
    form: UpdateUserForm,
    now: NaiveDateTime,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let user = load_user(repo, id)?;
    let updates = UpdateUser::try_from(form)?;
    if updates.manager_id == Some(user.id) {
        return Err(ServiceError::Validation(
            "a user cannot manage themselves".to_string(),
        ));
    }
    Ok(repo.save_user(&updates.apply(&user, now))?)
}

pub fn delete_user<R>(repo: &R, id: i32) -> ServiceResult<()>
where
    R: UserWriter + ?Sized,
{
    match repo.delete_user(UserId::new(id)?)? {
        0 => Err(ServiceError::NotFound),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::{Priority, Todo, TodoStatus};
    use crate::domain::types::{CustomerId, TodoId, TodoTitle, UserName};
    use crate::domain::user::ACTIVE_STATUS;
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn user(id: i32, name: &str, manager: Option<i32>) -> User {
        User {
            id: UserId::new(id).unwrap(),
            name: UserName::new(name).unwrap(),
            manager_id: manager.map(|m| UserId::new(m).unwrap()),
            email: None,
            phone: String::new(),
            department: "销售部".into(),
            department_leader_id: None,
            position: String::new(),
            wechat_work_id: String::new(),
            wechat_id: String::new(),
            status: ACTIVE_STATUS.into(),
            avatar_url: String::new(),
            last_login_at: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn todo(id: i32, status: TodoStatus) -> Todo {
        Todo {
            id: TodoId::new(id).unwrap(),
            customer_id: CustomerId::new(1).unwrap(),
            creator_id: UserId::new(1).unwrap(),
            executor_id: UserId::new(2).unwrap(),
            title: TodoTitle::new("回访").unwrap(),
            content: String::new(),
            status,
            planned_time: now(),
            completed_time: None,
            is_reminder: false,
            reminder_type: None,
            reminder_user_id: None,
            reminder_time: None,
            priority: Priority::Medium,
            tags: Value::Array(vec![]),
            attachments: Value::Array(vec![]),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn user_comes_with_manager_name() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(match id.get() {
                2 => user(2, "李四", Some(1)),
                _ => user(1, "王经理", None),
            }))
        });

        let found = get_user(&repo, 2).unwrap();
        assert_eq!(found.manager_name.as_deref(), Some("王经理"));
    }

    #[test]
    fn homepage_skips_closed_todos() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_| Ok(Some(user(2, "李四", None))));
        repo.expect_list_todos().returning(|query| {
            assert_eq!(query.window, Some(DateWindow::Today));
            assert_eq!(query.executor_id.map(UserId::get), Some(2));
            Ok((
                3,
                vec![
                    todo(1, TodoStatus::Pending),
                    todo(2, TodoStatus::Completed),
                    todo(3, TodoStatus::Overdue),
                ],
            ))
        });
        repo.expect_list_activities().returning(|query| {
            assert_eq!(query.start, Some(start_of_day(now())));
            Ok((0, vec![]))
        });

        let page = homepage(&repo, 2, now()).unwrap();
        assert_eq!(page.todos.len(), 2);
        assert_eq!(page.follow_up_count, 2);
    }

    #[test]
    fn self_management_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_| Ok(Some(user(2, "李四", None))));
        repo.expect_save_user().never();

        let form = UpdateUserForm {
            manager_id: Some(2),
            ..Default::default()
        };
        assert!(matches!(
            update_user(&repo, 2, form, now()),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn missing_user_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|_| Ok(None));
        assert!(matches!(get_user(&repo, 9), Err(ServiceError::NotFound)));
    }
}
