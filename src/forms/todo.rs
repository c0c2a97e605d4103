use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::domain::reminder::ReminderType;
use crate::domain::todo::{NewTodo, Priority, TodoStatus, UpdateTodo};
use crate::domain::types::{CustomerId, TodoTitle, UserId};
use crate::forms::{FormError, parse_datetime, parse_optional_datetime};

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /todos`.
pub struct CreateTodoForm {
    pub customer_id: i32,
    /// Defaults to the acting user.
    pub executor_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub planned_time: String,
    #[serde(default)]
    pub is_reminder: bool,
    pub reminder_type: Option<ReminderType>,
    pub reminder_user_id: Option<i32>,
    pub reminder_time: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub attachments: Value,
}

fn json_or_empty(value: Value) -> Value {
    if value.is_null() {
        Value::Array(Vec::new())
    } else {
        value
    }
}

impl CreateTodoForm {
    pub fn into_new_todo(self, creator_id: UserId) -> Result<NewTodo, FormError> {
        self.validate()?;

        let executor_id = match self.executor_id {
            Some(id) => UserId::new(id)?,
            None => creator_id,
        };
        let mut todo = NewTodo::new(
            CustomerId::new(self.customer_id)?,
            creator_id,
            executor_id,
            TodoTitle::new(self.title)?,
            parse_datetime(&self.planned_time)?,
        );
        todo.content = self.content;
        todo.is_reminder = self.is_reminder;
        todo.reminder_type = self.reminder_type;
        todo.reminder_user_id = self.reminder_user_id.map(UserId::new).transpose()?;
        todo.reminder_time = parse_optional_datetime(self.reminder_time.as_deref())?;
        todo.priority = self.priority.unwrap_or_default();
        todo.tags = json_or_empty(self.tags);
        todo.attachments = json_or_empty(self.attachments);
        Ok(todo)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `PUT /todos/{id}`; absent fields stay unchanged.
pub struct UpdateTodoForm {
    pub customer_id: Option<i32>,
    pub executor_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<TodoStatus>,
    pub planned_time: Option<String>,
    pub is_reminder: Option<bool>,
    pub reminder_type: Option<ReminderType>,
    pub reminder_user_id: Option<i32>,
    pub reminder_time: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Value>,
    pub attachments: Option<Value>,
}

impl TryFrom<UpdateTodoForm> for UpdateTodo {
    type Error = FormError;

    fn try_from(form: UpdateTodoForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            customer_id: form.customer_id.map(CustomerId::new).transpose()?,
            executor_id: form.executor_id.map(UserId::new).transpose()?,
            title: form.title.map(TodoTitle::new).transpose()?,
            content: form.content,
            status: form.status,
            planned_time: parse_optional_datetime(form.planned_time.as_deref())?,
            is_reminder: form.is_reminder,
            reminder_type: form.reminder_type,
            reminder_user_id: form.reminder_user_id.map(UserId::new).transpose()?,
            reminder_time: parse_optional_datetime(form.reminder_time.as_deref())?,
            priority: form.priority,
            tags: form.tags,
            attachments: form.attachments,
        })
    }
}
