//! Diesel models representing users (sales staff).

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, UserEmail, UserId, UserName};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub name: String,
    pub manager_id: Option<i32>,
    pub email: Option<String>,
    pub phone: String,
    pub department: String,
    pub department_leader_id: Option<i32>,
    pub position: String,
    pub wechat_work_id: String,
    pub wechat_id: String,
    pub status: String,
    pub avatar_url: String,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub name: &'a str,
    pub manager_id: Option<i32>,
    pub email: Option<&'a str>,
    pub phone: &'a str,
    pub department: &'a str,
    pub department_leader_id: Option<i32>,
    pub position: &'a str,
    pub wechat_work_id: &'a str,
    pub wechat_id: &'a str,
    pub status: &'a str,
    pub avatar_url: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewUser<'a> {
    pub fn new(user: &'a DomainNewUser, now: NaiveDateTime) -> Self {
        Self {
            name: user.name.as_str(),
            manager_id: user.manager_id.map(UserId::get),
            email: user.email.as_ref().map(UserEmail::as_str),
            phone: &user.phone,
            department: &user.department,
            department_leader_id: user.department_leader_id.map(UserId::get),
            position: &user.position,
            wechat_work_id: &user.wechat_work_id,
            wechat_id: &user.wechat_id,
            status: &user.status,
            avatar_url: &user.avatar_url,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`User`] record.
pub struct UpdateUser<'a> {
    pub name: &'a str,
    pub manager_id: Option<i32>,
    pub email: Option<&'a str>,
    pub phone: &'a str,
    pub department: &'a str,
    pub department_leader_id: Option<i32>,
    pub position: &'a str,
    pub wechat_work_id: &'a str,
    pub wechat_id: &'a str,
    pub status: &'a str,
    pub avatar_url: &'a str,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a DomainUser> for UpdateUser<'a> {
    fn from(user: &'a DomainUser) -> Self {
        Self {
            name: user.name.as_str(),
            manager_id: user.manager_id.map(UserId::get),
            email: user.email.as_ref().map(UserEmail::as_str),
            phone: &user.phone,
            department: &user.department,
            department_leader_id: user.department_leader_id.map(UserId::get),
            position: &user.position,
            wechat_work_id: &user.wechat_work_id,
            wechat_id: &user.wechat_id,
            status: &user.status,
            avatar_url: &user.avatar_url,
            updated_at: user.updated_at,
        }
    }
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            name: UserName::new(user.name)?,
            // zero is used by some imports as "no manager"
            manager_id: user.manager_id.filter(|id| *id > 0).map(UserId::try_from).transpose()?,
            email: user
                .email
                .filter(|e| !e.trim().is_empty())
                .map(UserEmail::new)
                .transpose()?,
            phone: user.phone,
            department: user.department,
            department_leader_id: user
                .department_leader_id
                .filter(|id| *id > 0)
                .map(UserId::try_from)
                .transpose()?,
            position: user.position,
            wechat_work_id: user.wechat_work_id,
            wechat_id: user.wechat_id,
            status: user.status,
            avatar_url: user.avatar_url,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn from_domain_new_user() {
        let mut domain = DomainNewUser::new(UserName::new("李雷").expect("valid user name"));
        domain.email = Some(UserEmail::new("li@example.com").expect("valid email"));
        let new = NewUser::new(&domain, now());
        assert_eq!(new.name, "李雷");
        assert_eq!(new.email, Some("li@example.com"));
        assert_eq!(new.status, "active");
    }

    #[test]
    fn zero_manager_is_treated_as_none() {
        let db = User {
            id: 3,
            name: "韩梅梅".into(),
            manager_id: Some(0),
            email: Some(String::new()),
            phone: String::new(),
            department: String::new(),
            department_leader_id: None,
            position: String::new(),
            wechat_work_id: String::new(),
            wechat_id: String::new(),
            status: "active".into(),
            avatar_url: String::new(),
            last_login_at: None,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
            is_deleted: false,
        };
        let domain = DomainUser::try_from(db).expect("valid user");
        assert!(domain.manager_id.is_none());
        assert!(domain.email.is_none());
    }
}
