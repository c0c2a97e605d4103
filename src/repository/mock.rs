//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;
use serde_json::Value;

use crate::domain::activity::{Activity, NewActivity};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::dashboard::{DashboardQuery, DashboardRow};
use crate::domain::reminder::{
    DeliveryOutcome, NewReminder, NewReminderConfig, NewReminderTemplate, Reminder,
    ReminderConfig, ReminderStats, ReminderTemplate, ReminderType, ReminderWithContext,
};
use crate::domain::tag::{
    NewTag, NewTagDimension, Tag, TagDimension, TagWithDimension, UpdateTag, UpdateTagDimension,
};
use crate::domain::todo::{NewTodo, NewTodoLog, Todo, TodoLog, TodoStats};
use crate::domain::types::{
    ActivityId, CustomerId, ReminderId, TagDimensionId, TagId, TodoId, UserId,
};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ActivityListQuery, ActivityReader, ActivityWriter, CustomerListQuery, CustomerReader,
    CustomerWriter, DashboardReader, ReminderListQuery, ReminderReader, ReminderWriter,
    TagListQuery, TagReader, TagWriter, TodoListQuery, TodoReader, TodoWriter, UserListQuery,
    UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl CustomerReader for Repository {
        fn get_customer_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>>;
        fn get_customers_by_ids(&self, ids: &[CustomerId]) -> RepositoryResult<Vec<Customer>>;
        fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    }

    impl CustomerWriter for Repository {
        fn create_customer(&self, customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn create_customers(&self, customers: &[NewCustomer]) -> RepositoryResult<usize>;
        fn update_customer(&self, id: CustomerId, updates: &UpdateCustomer) -> RepositoryResult<Customer>;
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
        fn delete_customer(&self, id: CustomerId) -> RepositoryResult<usize>;
    }

    impl TodoReader for Repository {
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

    impl TodoWriter for Repository {
        fn create_todo(&self, todo: &NewTodo) -> RepositoryResult<Todo>;
        fn save_todo(&self, todo: &Todo) -> RepositoryResult<Todo>;
        fn delete_todo(&self, id: TodoId) -> RepositoryResult<usize>;
        fn create_todo_log(&self, log: &NewTodoLog) -> RepositoryResult<TodoLog>;
    }

    impl ActivityReader for Repository {
        fn get_activity_by_id(&self, id: ActivityId) -> RepositoryResult<Option<Activity>>;
        fn list_activities(&self, query: ActivityListQuery) -> RepositoryResult<(usize, Vec<Activity>)>;
        fn list_due_follow_ups(&self, now: NaiveDateTime) -> RepositoryResult<Vec<Activity>>;
    }

    impl ActivityWriter for Repository {
        fn create_activity(&self, activity: &NewActivity) -> RepositoryResult<Activity>;
        fn save_activity(&self, activity: &Activity) -> RepositoryResult<Activity>;
        fn delete_activity(&self, id: ActivityId) -> RepositoryResult<usize>;
    }

    impl ReminderReader for Repository {
        fn get_reminder_by_id(&self, id: ReminderId) -> RepositoryResult<Option<Reminder>>;
        fn get_reminder_with_context(
            &self,
            id: ReminderId,
        ) -> RepositoryResult<Option<ReminderWithContext>>;
        fn list_reminders(
            &self,
            query: ReminderListQuery,
        ) -> RepositoryResult<(usize, Vec<ReminderWithContext>)>;
        fn list_due_reminders(&self, now: NaiveDateTime, limit: usize) -> RepositoryResult<Vec<Reminder>>;
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

    impl ReminderWriter for Repository {
        fn create_reminder(&self, reminder: &NewReminder) -> RepositoryResult<Reminder>;
        fn save_reminder(&self, reminder: &Reminder) -> RepositoryResult<Reminder>;
        fn delete_reminder(&self, id: ReminderId) -> RepositoryResult<usize>;
        fn record_delivery(&self, id: ReminderId, outcome: &DeliveryOutcome) -> RepositoryResult<Reminder>;
        fn create_template(&self, template: &NewReminderTemplate) -> RepositoryResult<ReminderTemplate>;
        fn upsert_reminder_config(&self, config: &NewReminderConfig) -> RepositoryResult<ReminderConfig>;
    }

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_users_by_ids(&self, ids: &[UserId]) -> RepositoryResult<Vec<User>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
        fn list_active_users(&self) -> RepositoryResult<Vec<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
        fn save_user(&self, user: &User) -> RepositoryResult<User>;
        fn delete_user(&self, id: UserId) -> RepositoryResult<usize>;
    }

    impl TagReader for Repository {
        fn list_dimensions(&self) -> RepositoryResult<Vec<TagDimension>>;
        fn get_dimension_by_id(&self, id: TagDimensionId) -> RepositoryResult<Option<TagDimension>>;
        fn get_tag_by_id(&self, id: TagId) -> RepositoryResult<Option<Tag>>;
        fn list_tags(&self, query: TagListQuery) -> RepositoryResult<(usize, Vec<TagWithDimension>)>;
        fn list_active_tags(&self) -> RepositoryResult<Vec<Tag>>;
    }

    impl TagWriter for Repository {
        fn create_dimension(&self, dimension: &NewTagDimension) -> RepositoryResult<TagDimension>;
        fn update_dimension(
            &self,
            id: TagDimensionId,
            updates: &UpdateTagDimension,
        ) -> RepositoryResult<TagDimension>;
        fn delete_dimension(&self, id: TagDimensionId) -> RepositoryResult<usize>;
        fn create_tag(&self, tag: &NewTag) -> RepositoryResult<Tag>;
        fn update_tag(&self, id: TagId, updates: &UpdateTag) -> RepositoryResult<Tag>;
        fn delete_tag(&self, id: TagId) -> RepositoryResult<usize>;
    }

    impl DashboardReader for Repository {
        fn search_dashboard(
            &self,
            query: &DashboardQuery,
            now: NaiveDateTime,
        ) -> RepositoryResult<(usize, Vec<DashboardRow>)>;
    }
}
