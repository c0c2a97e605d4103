use chrono::NaiveDateTime;
use serde_json::Value;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::activity::{Activity, ActivityKind, NewActivity};
use crate::domain::customer::{Customer, NewCustomer, SpecialSegment, UpdateCustomer};
use crate::domain::dashboard::{DashboardQuery, DashboardRow};
use crate::domain::reminder::{
    DeliveryOutcome, NewReminder, NewReminderConfig, NewReminderTemplate, Reminder,
    ReminderConfig, ReminderStats, ReminderStatus, ReminderTemplate, ReminderType,
    ReminderWithContext,
};
use crate::domain::tag::{
    NewTag, NewTagDimension, Tag, TagDimension, TagWithDimension, UpdateTag, UpdateTagDimension,
};
use crate::domain::todo::{
    DateWindow, NewTodo, NewTodoLog, Priority, Todo, TodoLog, TodoStats, TodoStatus,
};
use crate::domain::types::{
    ActivityId, CustomerId, ReminderId, TagDimensionId, TagId, TodoId, UserId,
};
use crate::domain::user::{NewUser, User};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod activity;
pub mod customer;
pub mod dashboard;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod reminder;
pub mod tag;
pub mod todo;
pub mod user;

/// Diesel implementation of every repository trait, backed by an r2d2 pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerListQuery {
    pub search: Option<String>,
    /// Any-of match against the customer's system tag ids.
    pub system_tags: Vec<i32>,
    /// Special segment evaluated relative to the given moment.
    pub segment: Option<(SpecialSegment, NaiveDateTime)>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        if !term.is_empty() {
            self.search = Some(term.to_string());
        }
        self
    }

    pub fn system_tags(mut self, tags: Vec<i32>) -> Self {
        self.system_tags = tags;
        self
    }

    pub fn segment(mut self, segment: SpecialSegment, now: NaiveDateTime) -> Self {
        self.segment = Some((segment, now));
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TodoListQuery {
    pub customer_id: Option<CustomerId>,
    pub executor_id: Option<UserId>,
    pub creator_id: Option<UserId>,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
    pub window: Option<DateWindow>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub keyword: Option<String>,
    /// Reference moment for relative windows.
    pub now: NaiveDateTime,
    pub pagination: Option<Pagination>,
}

impl TodoListQuery {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            customer_id: None,
            executor_id: None,
            creator_id: None,
            status: None,
            priority: None,
            window: None,
            start: None,
            end: None,
            keyword: None,
            now,
            pagination: None,
        }
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn executor(mut self, executor_id: UserId) -> Self {
        self.executor_id = Some(executor_id);
        self
    }

    pub fn status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityListQuery {
    pub customer_id: Option<CustomerId>,
    pub user_id: Option<UserId>,
    pub kind: Option<ActivityKind>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub keyword: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ActivityListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn created_between(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReminderListQuery {
    pub todo_id: Option<TodoId>,
    pub user_id: Option<UserId>,
    pub status: Option<ReminderStatus>,
    pub reminder_type: Option<ReminderType>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub pagination: Option<Pagination>,
}

impl ReminderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todo(mut self, todo_id: TodoId) -> Self {
        self.todo_id = Some(todo_id);
        self
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn status(mut self, status: ReminderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub department: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagListQuery {
    pub dimension_id: Option<TagDimensionId>,
    pub name: Option<String>,
    pub pagination: Option<Pagination>,
}

impl TagListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(mut self, dimension_id: TagDimensionId) -> Self {
        self.dimension_id = Some(dimension_id);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

pub trait CustomerReader {
    fn get_customer_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>>;
    fn get_customers_by_ids(&self, ids: &[CustomerId]) -> RepositoryResult<Vec<Customer>>;
    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
}

pub trait CustomerWriter {
    fn create_customer(&self, customer: &NewCustomer) -> RepositoryResult<Customer>;
    fn create_customers(&self, customers: &[NewCustomer]) -> RepositoryResult<usize>;
    fn update_customer(&self, id: CustomerId, updates: &UpdateCustomer)
    -> RepositoryResult<Customer>;
    fn update_customer_favors(&self, id: CustomerId, favors: &Value) -> RepositoryResult<Customer>;
    fn update_customer_remark(
        &self,
        id: CustomerId,
        remark: &str,
        updated_by: i32,
    ) -> RepositoryResult<Customer>;
    fn update_customer_system_tags(
        &self,
        id: CustomerId,
        system_tags: &[i32],
    ) -> RepositoryResult<Customer>;
    /// Soft deletes the customer, returning the number of affected rows.
    fn delete_customer(&self, id: CustomerId) -> RepositoryResult<usize>;
}

pub trait TodoReader {
    fn get_todo_by_id(&self, id: TodoId) -> RepositoryResult<Option<Todo>>;
    fn list_todos(&self, query: TodoListQuery) -> RepositoryResult<(usize, Vec<Todo>)>;
    fn todo_stats(
        &self,
        customer_id: Option<CustomerId>,
        executor_id: Option<UserId>,
        now: NaiveDateTime,
    ) -> RepositoryResult<TodoStats>;
    fn list_todo_logs(&self, todo_id: TodoId) -> RepositoryResult<Vec<TodoLog>>;
}

pub trait TodoWriter {
    fn create_todo(&self, todo: &NewTodo) -> RepositoryResult<Todo>;
    /// Writes back every mutable column of `todo`.
    fn save_todo(&self, todo: &Todo) -> RepositoryResult<Todo>;
    fn delete_todo(&self, id: TodoId) -> RepositoryResult<usize>;
    fn create_todo_log(&self, log: &NewTodoLog) -> RepositoryResult<TodoLog>;
}

pub trait ActivityReader {
    fn get_activity_by_id(&self, id: ActivityId) -> RepositoryResult<Option<Activity>>;
    fn list_activities(&self, query: ActivityListQuery)
    -> RepositoryResult<(usize, Vec<Activity>)>;
    /// Activities whose next follow-up time has arrived, soonest first.
    fn list_due_follow_ups(&self, now: NaiveDateTime) -> RepositoryResult<Vec<Activity>>;
}

pub trait ActivityWriter {
    fn create_activity(&self, activity: &NewActivity) -> RepositoryResult<Activity>;
    fn save_activity(&self, activity: &Activity) -> RepositoryResult<Activity>;
    fn delete_activity(&self, id: ActivityId) -> RepositoryResult<usize>;
}

pub trait ReminderReader {
    fn get_reminder_by_id(&self, id: ReminderId) -> RepositoryResult<Option<Reminder>>;
    fn get_reminder_with_context(
        &self,
        id: ReminderId,
    ) -> RepositoryResult<Option<ReminderWithContext>>;
    fn list_reminders(
        &self,
        query: ReminderListQuery,
    ) -> RepositoryResult<(usize, Vec<ReminderWithContext>)>;
    /// Reminders ready for dispatch, oldest schedule first.
    fn list_due_reminders(
        &self,
        now: NaiveDateTime,
        limit: usize,
    ) -> RepositoryResult<Vec<Reminder>>;
    fn reminder_stats(
        &self,
        user_id: Option<UserId>,
        now: NaiveDateTime,
    ) -> RepositoryResult<ReminderStats>;
    fn get_default_template(
        &self,
        reminder_type: ReminderType,
    ) -> RepositoryResult<Option<ReminderTemplate>>;
    fn list_templates(
        &self,
        reminder_type: Option<ReminderType>,
    ) -> RepositoryResult<Vec<ReminderTemplate>>;
    fn get_reminder_config(&self, user_id: UserId) -> RepositoryResult<Option<ReminderConfig>>;
}

pub trait ReminderWriter {
    fn create_reminder(&self, reminder: &NewReminder) -> RepositoryResult<Reminder>;
    fn save_reminder(&self, reminder: &Reminder) -> RepositoryResult<Reminder>;
    fn delete_reminder(&self, id: ReminderId) -> RepositoryResult<usize>;
    /// Stores the result of a delivery attempt.
    fn record_delivery(
        &self,
        id: ReminderId,
        outcome: &DeliveryOutcome,
    ) -> RepositoryResult<Reminder>;
    fn create_template(&self, template: &NewReminderTemplate)
    -> RepositoryResult<ReminderTemplate>;
    /// Inserts or replaces the config row of `config.user_id`.
    fn upsert_reminder_config(&self, config: &NewReminderConfig)
    -> RepositoryResult<ReminderConfig>;
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_users_by_ids(&self, ids: &[UserId]) -> RepositoryResult<Vec<User>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    fn list_active_users(&self) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn save_user(&self, user: &User) -> RepositoryResult<User>;
    fn delete_user(&self, id: UserId) -> RepositoryResult<usize>;
}

pub trait TagReader {
    fn list_dimensions(&self) -> RepositoryResult<Vec<TagDimension>>;
    fn get_dimension_by_id(&self, id: TagDimensionId) -> RepositoryResult<Option<TagDimension>>;
    fn get_tag_by_id(&self, id: TagId) -> RepositoryResult<Option<Tag>>;
    fn list_tags(&self, query: TagListQuery) -> RepositoryResult<(usize, Vec<TagWithDimension>)>;
    /// Live tags ordered by dimension sort then tag sort.
    fn list_active_tags(&self) -> RepositoryResult<Vec<Tag>>;
}

pub trait TagWriter {
    fn create_dimension(&self, dimension: &NewTagDimension) -> RepositoryResult<TagDimension>;
    fn update_dimension(
        &self,
        id: TagDimensionId,
        updates: &UpdateTagDimension,
    ) -> RepositoryResult<TagDimension>;
    /// Soft deletes the dimension and all of its tags in one transaction.
    fn delete_dimension(&self, id: TagDimensionId) -> RepositoryResult<usize>;
    fn create_tag(&self, tag: &NewTag) -> RepositoryResult<Tag>;
    fn update_tag(&self, id: TagId, updates: &UpdateTag) -> RepositoryResult<Tag>;
    fn delete_tag(&self, id: TagId) -> RepositoryResult<usize>;
}

pub trait DashboardReader {
    /// Matching todo rows ordered by planned time, with the total match count.
    fn search_dashboard(
        &self,
        query: &DashboardQuery,
        now: NaiveDateTime,
    ) -> RepositoryResult<(usize, Vec<DashboardRow>)>;
}
