//! Follow-up activity workflows.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::info;

use crate::domain::activity::{Activity, ActivityStatistics, UpdateActivity};
use crate::domain::todo::{NewTodoLog, TodoAction};
use crate::domain::types::{ActivityId, CleanText, CustomerId, UserId};
use crate::dto::activity::{ActivityCreated, ActivityQuery, ActivityView, PageQuery};
use crate::forms::activity::{CreateActivityForm, FeedbackForm, UpdateActivityForm};
use crate::forms::parse_optional_datetime;
use crate::pagination::{Paginated, Pagination};
use crate::repository::{
    ActivityListQuery, ActivityReader, ActivityWriter, CustomerReader, TodoWriter, UserReader,
};
use crate::services::{ServiceError, ServiceResult};

fn load_activity<R>(repo: &R, id: i32) -> ServiceResult<Activity>
where
    R: ActivityReader + ?Sized,
{
    repo.get_activity_by_id(ActivityId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

/// Attaches user and customer names, resolving each id once.
fn into_views<R>(
    repo: &R,
    activities: Vec<Activity>,
    now: NaiveDateTime,
) -> ServiceResult<Vec<ActivityView>>
where
    R: UserReader + CustomerReader + ?Sized,
{
    let mut user_ids: Vec<UserId> = activities.iter().map(|a| a.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let mut customer_ids: Vec<CustomerId> = activities.iter().map(|a| a.customer_id).collect();
    customer_ids.sort_unstable();
    customer_ids.dedup();

    let users: HashMap<UserId, String> = repo
        .get_users_by_ids(&user_ids)?
        .into_iter()
        .map(|u| (u.id, u.name.as_str().to_string()))
        .collect();
    let customers: HashMap<CustomerId, String> = repo
        .get_customers_by_ids(&customer_ids)?
        .into_iter()
        .map(|c| (c.id, c.name().to_string()))
        .collect();

    Ok(activities
        .into_iter()
        .map(|activity| {
            let user_name = users.get(&activity.user_id).cloned().unwrap_or_default();
            let customer_name = customers
                .get(&activity.customer_id)
                .cloned()
                .unwrap_or_default();
            ActivityView::new(activity, user_name, customer_name, now)
        })
        .collect())
}

fn into_view<R>(repo: &R, activity: Activity, now: NaiveDateTime) -> ServiceResult<ActivityView>
where
    R: UserReader + CustomerReader + ?Sized,
{
    into_views(repo, vec![activity], now)?
        .pop()
        .ok_or_else(|| ServiceError::Internal("activity view lost".to_string()))
}

/// Records an activity and, when requested, its pending follow-up todo.
pub fn create_activity<R>(
    repo: &R,
    acting_user: UserId,
    form: CreateActivityForm,
    now: NaiveDateTime,
) -> ServiceResult<ActivityCreated>
where
    R: ActivityWriter + TodoWriter + UserReader + CustomerReader + ?Sized,
{
    let (new_activity, follow_up) = form.into_parts(acting_user)?;
    if repo.get_customer_by_id(new_activity.customer_id)?.is_none() {
        return Err(ServiceError::Validation(format!(
            "customer {} does not exist",
            new_activity.customer_id
        )));
    }

    let activity = repo.create_activity(&new_activity)?;

    let todo = match follow_up {
        Some(new_todo) => {
            let todo = repo.create_todo(&new_todo)?;
            repo.create_todo_log(
                &NewTodoLog::new(todo.id, acting_user, TodoAction::Create, None, Some(&todo))
                    .remark(format!("跟进记录 {} 创建", activity.id)),
            )?;
            info!("Created follow-up todo {} for activity {}", todo.id, activity.id);
            Some(todo)
        }
        None => None,
    };

    Ok(ActivityCreated {
        activity: into_view(repo, activity, now)?,
        todo,
    })
}

pub fn list_activities<R>(
    repo: &R,
    params: ActivityQuery,
    now: NaiveDateTime,
) -> ServiceResult<Paginated<ActivityView>>
where
    R: ActivityReader + UserReader + CustomerReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let mut query = ActivityListQuery::new().paginate(pagination);
    query.customer_id = params.customer_id.map(CustomerId::new).transpose()?;
    query.user_id = params.user_id.map(UserId::new).transpose()?;
    query.kind = params.kind;
    query.start = parse_optional_datetime(params.start_date.as_deref())?;
    query.end = parse_optional_datetime(params.end_date.as_deref())?;
    query.keyword = params
        .keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let (total, activities) = repo.list_activities(query)?;
    Ok(Paginated::new(into_views(repo, activities, now)?, total, pagination))
}

pub fn list_customer_activities<R>(
    repo: &R,
    customer_id: i32,
    params: PageQuery,
    now: NaiveDateTime,
) -> ServiceResult<Paginated<ActivityView>>
where
    R: ActivityReader + UserReader + CustomerReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let query = ActivityListQuery::new()
        .customer(CustomerId::new(customer_id)?)
        .paginate(pagination);
    let (total, activities) = repo.list_activities(query)?;
    Ok(Paginated::new(into_views(repo, activities, now)?, total, pagination))
}

pub fn get_activity<R>(repo: &R, id: i32, now: NaiveDateTime) -> ServiceResult<ActivityView>
where
    R: ActivityReader + UserReader + CustomerReader + ?Sized,
{
    let activity = load_activity(repo, id)?;
    into_view(repo, activity, now)
}

/// Partial update; blob fields are merged one by one.
pub fn update_activity<R>(
    repo: &R,
    id: i32,
    form: UpdateActivityForm,
    now: NaiveDateTime,
) -> ServiceResult<ActivityView>
where
    R: ActivityReader + ActivityWriter + UserReader + CustomerReader + ?Sized,
{
    let activity = load_activity(repo, id)?;
    let updates = UpdateActivity::try_from(form)?;
    let saved = repo.save_activity(&updates.apply(&activity, now))?;
    into_view(repo, saved, now)
}

pub fn record_feedback<R>(
    repo: &R,
    id: i32,
    form: FeedbackForm,
    now: NaiveDateTime,
) -> ServiceResult<ActivityView>
where
    R: ActivityReader + ActivityWriter + UserReader + CustomerReader + ?Sized,
{
    let mut activity = load_activity(repo, id)?;
    activity
        .details
        .record_feedback(CleanText::new(&form.feedback), form.satisfaction);
    activity.updated_at = now;
    let saved = repo.save_activity(&activity)?;
    into_view(repo, saved, now)
}

pub fn delete_activity<R>(repo: &R, id: i32) -> ServiceResult<()>
where
    R: ActivityWriter + ?Sized,
{
    match repo.delete_activity(ActivityId::new(id)?)? {
        0 => Err(ServiceError::NotFound),
        _ => Ok(()),
    }
}

pub fn customer_statistics<R>(repo: &R, customer_id: i32) -> ServiceResult<ActivityStatistics>
where
    R: ActivityReader + ?Sized,
{
    let query = ActivityListQuery::new().customer(CustomerId::new(customer_id)?);
    let (_, activities) = repo.list_activities(query)?;
    Ok(ActivityStatistics::from_activities(&activities))
}

/// Activities whose next follow-up time has arrived, soonest first.
pub fn need_follow_up<R>(repo: &R, now: NaiveDateTime) -> ServiceResult<Vec<ActivityView>>
where
    R: ActivityReader + UserReader + CustomerReader + ?Sized,
{
    let activities = repo.list_due_follow_ups(now)?;
    into_views(repo, activities, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::{ActivityDetails, ActivityKind};
    use crate::domain::customer::{Customer, CustomerProfile};
    use crate::domain::todo::{Priority, Todo, TodoLog, TodoStatus};
    use crate::domain::types::{CustomerName, TodoId, UserName};
    use crate::domain::user::{ACTIVE_STATUS, User};
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn activity(id: i32, kind: ActivityKind) -> Activity {
        Activity {
            id: ActivityId::new(id).unwrap(),
            customer_id: CustomerId::new(2).unwrap(),
            user_id: UserId::new(4).unwrap(),
            kind,
            title: "拜访".into(),
            details: ActivityDetails {
                satisfaction: 3,
                ..Default::default()
            },
            remark: String::new(),
            duration: None,
            location: String::new(),
            next_follow_time: None,
            attachments: Value::Array(vec![]),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(2).unwrap(),
            profile: CustomerProfile::named(CustomerName::new("阿里小店").unwrap()),
            created_by: 1,
            updated_by: 1,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn user() -> User {
        User {
            id: UserId::new(4).unwrap(),
            name: UserName::new("李四").unwrap(),
            manager_id: None,
            email: None,
            phone: String::new(),
            department: String::new(),
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

    fn with_names(repo: &mut MockRepository) {
        repo.expect_get_users_by_ids().returning(|_| Ok(vec![user()]));
        repo.expect_get_customers_by_ids()
            .returning(|_| Ok(vec![customer()]));
    }

    #[test]
    fn create_with_follow_up_todo() {
        let mut repo = MockRepository::new();
        with_names(&mut repo);
        repo.expect_get_customer_by_id()
            .returning(|_| Ok(Some(customer())));
        repo.expect_create_activity()
            .returning(|_| Ok(activity(1, ActivityKind::Visit)));
        repo.expect_create_todo().times(1).returning(|new| {
            assert_eq!(new.status, TodoStatus::Pending);
            assert_eq!(new.priority, Priority::Medium);
            assert_eq!(new.executor_id.get(), 4);
            assert_eq!(new.title.as_str(), "拜访");
            Ok(Todo {
                id: TodoId::new(11).unwrap(),
                customer_id: new.customer_id,
                creator_id: new.creator_id,
                executor_id: new.executor_id,
                title: new.title.clone(),
                content: new.content.clone(),
                status: new.status,
                planned_time: new.planned_time,
                completed_time: None,
                is_reminder: false,
                reminder_type: None,
                reminder_user_id: None,
                reminder_time: None,
                priority: new.priority,
                tags: new.tags.clone(),
                attachments: new.attachments.clone(),
                created_at: now(),
                updated_at: now(),
            })
        });
        repo.expect_create_todo_log().times(1).returning(|new| {
            Ok(TodoLog {
                id: 1,
                todo_id: new.todo_id,
                operator_id: new.operator_id,
                action: new.action,
                old_data: None,
                new_data: new.new_data.clone(),
                remark: new.remark.clone(),
                created_at: now(),
            })
        });

        let form: CreateActivityForm = serde_json::from_str(
            r#"{"customer_id": 2, "kind": "visit", "title": "拜访",
                "create_todo": true, "todo_planned_time": "2024-06-03 10:00"}"#,
        )
        .unwrap();
        let created = create_activity(&repo, UserId::new(4).unwrap(), form, now()).unwrap();
        assert_eq!(created.activity.user_name, "李四");
        assert_eq!(created.activity.customer_name, "阿里小店");
        assert_eq!(created.todo.map(|t| t.id.get()), Some(11));
    }

    #[test]
    fn feedback_keeps_satisfaction_out_of_range() {
        let mut repo = MockRepository::new();
        with_names(&mut repo);
        repo.expect_get_activity_by_id()
            .returning(|_| Ok(Some(activity(1, ActivityKind::Call))));
        repo.expect_save_activity().returning(|a| Ok(a.clone()));

        let view = record_feedback(
            &repo,
            1,
            FeedbackForm {
                feedback: "还行".into(),
                satisfaction: Some(7),
            },
            now(),
        )
        .unwrap();
        assert_eq!(view.feedback, "还行");
        assert_eq!(view.satisfaction, 3);
    }

    #[test]
    fn statistics_cover_all_customer_activities() {
        let mut repo = MockRepository::new();
        repo.expect_list_activities().returning(|query| {
            assert!(query.pagination.is_none());
            assert_eq!(query.customer_id.map(CustomerId::get), Some(2));
            Ok((
                3,
                vec![
                    activity(1, ActivityKind::Order),
                    activity(2, ActivityKind::Sample),
                    activity(3, ActivityKind::Order),
                ],
            ))
        });

        let stats = customer_statistics(&repo, 2).unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.sample_count, 1);
    }
}
