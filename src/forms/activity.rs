use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::domain::activity::{ActivityDetails, ActivityKind, NewActivity, UpdateActivity};
use crate::domain::todo::NewTodo;
use crate::domain::types::{CleanText, CustomerId, TodoTitle, UserId};
use crate::forms::{FormError, parse_datetime, parse_optional_datetime};

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /activities`.
pub struct CreateActivityForm {
    pub customer_id: i32,
    #[serde(default)]
    pub kind: ActivityKind,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 5))]
    pub satisfaction: i32,
    #[serde(default)]
    pub remark: String,
    pub duration: Option<i32>,
    #[serde(default)]
    pub location: String,
    pub next_follow_time: Option<String>,
    #[serde(default)]
    pub attachments: Value,
    /// Also create a follow-up todo planned at `todo_planned_time`.
    #[serde(default)]
    pub create_todo: bool,
    pub todo_planned_time: Option<String>,
    pub todo_executor_id: Option<i32>,
    /// Title of the follow-up todo; the activity title when blank.
    #[serde(default)]
    pub todo_content: String,
}

impl CreateActivityForm {
    /// Builds the activity and, when requested, its follow-up todo.
    pub fn into_parts(self, user_id: UserId) -> Result<(NewActivity, Option<NewTodo>), FormError> {
        self.validate()?;

        let customer_id = CustomerId::new(self.customer_id)?;
        let content = CleanText::new(&self.content);

        let follow_up = match (self.create_todo, self.todo_planned_time.as_deref()) {
            (true, Some(planned)) if !planned.trim().is_empty() => {
                let executor_id = match self.todo_executor_id {
                    Some(id) => UserId::new(id)?,
                    None => user_id,
                };
                let title = if self.todo_content.trim().is_empty() {
                    self.title.as_str()
                } else {
                    self.todo_content.as_str()
                };
                let mut todo = NewTodo::new(
                    customer_id,
                    user_id,
                    executor_id,
                    TodoTitle::new(title)?,
                    parse_datetime(planned)?,
                );
                todo.content = content.to_string();
                Some(todo)
            }
            _ => None,
        };

        let activity = NewActivity {
            customer_id,
            user_id,
            kind: self.kind,
            title: self.title.trim().to_string(),
            details: ActivityDetails {
                content: content.into(),
                result: self.result,
                amount: self.amount,
                cost: self.cost,
                feedback: CleanText::new(&self.feedback).into(),
                satisfaction: self.satisfaction,
            },
            remark: CleanText::new(&self.remark),
            duration: self.duration,
            location: self.location,
            next_follow_time: parse_optional_datetime(self.next_follow_time.as_deref())?,
            attachments: if self.attachments.is_null() {
                Value::Array(Vec::new())
            } else {
                self.attachments
            },
        };

        Ok((activity, follow_up))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `PUT /activities/{id}`.
pub struct UpdateActivityForm {
    pub kind: Option<ActivityKind>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub result: Option<String>,
    pub amount: Option<f64>,
    pub cost: Option<f64>,
    pub remark: Option<String>,
    pub duration: Option<i32>,
    pub location: Option<String>,
    pub next_follow_time: Option<String>,
    pub attachments: Option<Value>,
}

impl TryFrom<UpdateActivityForm> for UpdateActivity {
    type Error = FormError;

    fn try_from(form: UpdateActivityForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            kind: form.kind,
            title: form.title,
            content: form.content.map(CleanText::new),
            result: form.result,
            amount: form.amount,
            cost: form.cost,
            remark: form.remark.map(CleanText::new),
            duration: form.duration,
            location: form.location,
            next_follow_time: parse_optional_datetime(form.next_follow_time.as_deref())?,
            attachments: form.attachments,
        })
    }
}

#[derive(Debug, Deserialize)]
/// Body of `PUT /activities/{id}/feedback`.
pub struct FeedbackForm {
    #[serde(default)]
    pub feedback: String,
    pub satisfaction: Option<i32>,
}
