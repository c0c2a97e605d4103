//! Diesel models for follow-up activities.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::activity::{Activity as DomainActivity, NewActivity as DomainNewActivity};
use crate::domain::types::{ActivityId, CustomerId, TypeConstraintError, UserId, parse_column};
use crate::models::customer::Customer;
use crate::models::{decode_or_default, decode_value};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Customer, foreign_key = customer_id))]
#[diesel(table_name = crate::schema::activities)]
pub struct Activity {
    pub id: i32,
    pub customer_id: i32,
    pub user_id: i32,
    pub kind: String,
    pub title: String,
    pub data: String, // JSON blob with content/result/amount/cost/feedback/satisfaction
    pub remark: String,
    pub duration: Option<i32>,
    pub location: String,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::activities)]
pub struct NewActivity<'a> {
    pub customer_id: i32,
    pub user_id: i32,
    pub kind: &'static str,
    pub title: &'a str,
    pub data: String,
    pub remark: &'a str,
    pub duration: Option<i32>,
    pub location: &'a str,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewActivity<'a> {
    pub fn new(activity: &'a DomainNewActivity, now: NaiveDateTime) -> Self {
        Self {
            customer_id: activity.customer_id.get(),
            user_id: activity.user_id.get(),
            kind: activity.kind.as_str(),
            title: &activity.title,
            data: serde_json::to_string(&activity.details).unwrap_or_else(|_| "{}".to_string()),
            remark: activity.remark.as_str(),
            duration: activity.duration,
            location: &activity.location,
            next_follow_time: activity.next_follow_time,
            attachments: activity.attachments.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::activities)]
#[diesel(treat_none_as_null = true)]
pub struct ActivityChangeset<'a> {
    pub kind: &'static str,
    pub title: &'a str,
    pub data: String,
    pub remark: &'a str,
    pub duration: Option<i32>,
    pub location: &'a str,
    pub next_follow_time: Option<NaiveDateTime>,
    pub attachments: String,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a DomainActivity> for ActivityChangeset<'a> {
    fn from(activity: &'a DomainActivity) -> Self {
        Self {
            kind: activity.kind.as_str(),
            title: &activity.title,
            data: serde_json::to_string(&activity.details).unwrap_or_else(|_| "{}".to_string()),
            remark: &activity.remark,
            duration: activity.duration,
            location: &activity.location,
            next_follow_time: activity.next_follow_time,
            attachments: activity.attachments.to_string(),
            updated_at: activity.updated_at,
        }
    }
}

impl TryFrom<Activity> for DomainActivity {
    type Error = TypeConstraintError;

    fn try_from(activity: Activity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActivityId::try_from(activity.id)?,
            customer_id: CustomerId::try_from(activity.customer_id)?,
            user_id: UserId::try_from(activity.user_id)?,
            kind: parse_column(&activity.kind)?,
            title: activity.title,
            details: decode_or_default(&activity.data),
            remark: activity.remark,
            duration: activity.duration,
            location: activity.location,
            next_follow_time: activity.next_follow_time,
            attachments: decode_value(&activity.attachments),
            created_at: activity.created_at,
            updated_at: activity.updated_at,
        })
    }
}
