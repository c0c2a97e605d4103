//! Diesel models for todos and their audit log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::todo::{
    NewTodo as DomainNewTodo, NewTodoLog as DomainNewTodoLog, Todo as DomainTodo,
    TodoLog as DomainTodoLog,
};
use crate::domain::types::{
    CustomerId, TodoId, TodoTitle, TypeConstraintError, UserId, parse_column,
};
use crate::models::customer::Customer;
use crate::models::decode_value;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Customer, foreign_key = customer_id))]
#[diesel(table_name = crate::schema::todos)]
pub struct Todo {
    pub id: i32,
    pub customer_id: i32,
    pub creator_id: i32,
    pub executor_id: i32,
    pub title: String,
    pub content: String,
    pub status: String,
    pub planned_time: NaiveDateTime,
    pub completed_time: Option<NaiveDateTime>,
    pub is_reminder: bool,
    pub reminder_type: Option<String>,
    pub reminder_user_id: Option<i32>,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: String,
    pub tags: String,
    pub attachments: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::todos)]
pub struct NewTodo<'a> {
    pub customer_id: i32,
    pub creator_id: i32,
    pub executor_id: i32,
    pub title: &'a str,
    pub content: &'a str,
    pub status: &'static str,
    pub planned_time: NaiveDateTime,
    pub is_reminder: bool,
    pub reminder_type: Option<&'static str>,
    pub reminder_user_id: Option<i32>,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: &'static str,
    pub tags: String,
    pub attachments: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewTodo<'a> {
    pub fn new(todo: &'a DomainNewTodo, now: NaiveDateTime) -> Self {
        Self {
            customer_id: todo.customer_id.get(),
            creator_id: todo.creator_id.get(),
            executor_id: todo.executor_id.get(),
            title: todo.title.as_str(),
            content: &todo.content,
            status: todo.status.as_str(),
            planned_time: todo.planned_time,
            is_reminder: todo.is_reminder,
            reminder_type: todo.reminder_type.map(|t| t.as_str()),
            reminder_user_id: todo.reminder_user_id.map(UserId::get),
            reminder_time: todo.reminder_time,
            priority: todo.priority.as_str(),
            tags: todo.tags.to_string(),
            attachments: todo.attachments.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full set of mutable columns, written back after a domain level update.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::todos)]
#[diesel(treat_none_as_null = true)]
pub struct TodoChangeset<'a> {
    pub customer_id: i32,
    pub executor_id: i32,
    pub title: &'a str,
    pub content: &'a str,
    pub status: &'static str,
    pub planned_time: NaiveDateTime,
    pub completed_time: Option<NaiveDateTime>,
    pub is_reminder: bool,
    pub reminder_type: Option<&'static str>,
    pub reminder_user_id: Option<i32>,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: &'static str,
    pub tags: String,
    pub attachments: String,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a DomainTodo> for TodoChangeset<'a> {
    fn from(todo: &'a DomainTodo) -> Self {
        Self {
            customer_id: todo.customer_id.get(),
            executor_id: todo.executor_id.get(),
            title: todo.title.as_str(),
            content: &todo.content,
            status: todo.status.as_str(),
            planned_time: todo.planned_time,
            completed_time: todo.completed_time,
            is_reminder: todo.is_reminder,
            reminder_type: todo.reminder_type.map(|t| t.as_str()),
            reminder_user_id: todo.reminder_user_id.map(UserId::get),
            reminder_time: todo.reminder_time,
            priority: todo.priority.as_str(),
            tags: todo.tags.to_string(),
            attachments: todo.attachments.to_string(),
            updated_at: todo.updated_at,
        }
    }
}

impl TryFrom<Todo> for DomainTodo {
    type Error = TypeConstraintError;

    fn try_from(todo: Todo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TodoId::try_from(todo.id)?,
            customer_id: CustomerId::try_from(todo.customer_id)?,
            creator_id: UserId::try_from(todo.creator_id)?,
            executor_id: UserId::try_from(todo.executor_id)?,
            title: TodoTitle::new(todo.title)?,
            content: todo.content,
            status: parse_column(&todo.status)?,
            planned_time: todo.planned_time,
            completed_time: todo.completed_time,
            is_reminder: todo.is_reminder,
            reminder_type: todo
                .reminder_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(parse_column)
                .transpose()?,
            reminder_user_id: todo.reminder_user_id.map(UserId::try_from).transpose()?,
            reminder_time: todo.reminder_time,
            priority: parse_column(&todo.priority)?,
            tags: decode_value(&todo.tags),
            attachments: decode_value(&todo.attachments),
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Todo, foreign_key = todo_id))]
#[diesel(table_name = crate::schema::todo_logs)]
pub struct TodoLog {
    pub id: i32,
    pub todo_id: i32,
    pub operator_id: i32,
    pub action: String,
    pub old_data: Option<String>,
    pub new_data: Option<String>,
    pub remark: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::todo_logs)]
pub struct NewTodoLog<'a> {
    pub todo_id: i32,
    pub operator_id: i32,
    pub action: &'static str,
    pub old_data: Option<String>,
    pub new_data: Option<String>,
    pub remark: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> NewTodoLog<'a> {
    pub fn new(log: &'a DomainNewTodoLog, now: NaiveDateTime) -> Self {
        Self {
            todo_id: log.todo_id.get(),
            operator_id: log.operator_id.get(),
            action: log.action.as_str(),
            old_data: log.old_data.as_ref().map(ToString::to_string),
            new_data: log.new_data.as_ref().map(ToString::to_string),
            remark: &log.remark,
            created_at: now,
        }
    }
}

impl TryFrom<TodoLog> for DomainTodoLog {
    type Error = TypeConstraintError;

    fn try_from(log: TodoLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: log.id,
            todo_id: TodoId::try_from(log.todo_id)?,
            operator_id: UserId::try_from(log.operator_id)?,
            action: parse_column(&log.action)?,
            old_data: log.old_data.as_deref().map(decode_value),
            new_data: log.new_data.as_deref().map(decode_value),
            remark: log.remark,
            created_at: log.created_at,
        })
    }
}
