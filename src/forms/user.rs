use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{UserEmail, UserId, UserName};
use crate::domain::user::{ACTIVE_STATUS, NewUser, UpdateUser};
use crate::forms::FormError;

fn optional_email(raw: Option<String>) -> Result<Option<UserEmail>, FormError> {
    match raw {
        Some(email) if !email.trim().is_empty() => Ok(Some(UserEmail::new(email)?)),
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /users`.
pub struct CreateUserForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub manager_id: Option<i32>,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    pub department_leader_id: Option<i32>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub wechat_work_id: String,
    #[serde(default)]
    pub wechat_id: String,
    pub status: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

impl TryFrom<CreateUserForm> for NewUser {
    type Error = FormError;

    fn try_from(form: CreateUserForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let mut user = NewUser::new(UserName::new(form.name)?);
        user.manager_id = form.manager_id.map(UserId::new).transpose()?;
        user.email = optional_email(form.email)?;
        user.phone = form.phone.trim().to_string();
        user.department = form.department.trim().to_string();
        user.department_leader_id = form.department_leader_id.map(UserId::new).transpose()?;
        user.position = form.position.trim().to_string();
        user.wechat_work_id = form.wechat_work_id.trim().to_string();
        user.wechat_id = form.wechat_id.trim().to_string();
        user.status = form
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ACTIVE_STATUS.to_string());
        user.avatar_url = form.avatar_url.trim().to_string();
        Ok(user)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `PUT /users/{id}`.
pub struct UpdateUserForm {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub manager_id: Option<i32>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub department_leader_id: Option<i32>,
    pub position: Option<String>,
    pub wechat_work_id: Option<String>,
    pub wechat_id: Option<String>,
    pub status: Option<String>,
    pub avatar_url: Option<String>,
}

impl TryFrom<UpdateUserForm> for UpdateUser {
    type Error = FormError;

    fn try_from(form: UpdateUserForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: form.name.map(UserName::new).transpose()?,
            manager_id: form.manager_id.map(UserId::new).transpose()?,
            email: optional_email(form.email)?,
            phone: form.phone,
            department: form.department,
            department_leader_id: form.department_leader_id.map(UserId::new).transpose()?,
            position: form.position,
            wechat_work_id: form.wechat_work_id,
            wechat_id: form.wechat_id,
            status: form.status,
            avatar_url: form.avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults_to_active() {
        let form: CreateUserForm =
            serde_json::from_str(r#"{"name": "张三", "email": "ZS@Example.com"}"#)
                .expect("valid json");
        let user = NewUser::try_from(form).expect("valid form");
        assert_eq!(user.status, ACTIVE_STATUS);
        assert_eq!(user.email.map(|e| e.as_str().to_string()), Some("zs@example.com".into()));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let form: CreateUserForm =
            serde_json::from_str(r#"{"name": "张三", "email": "nope"}"#).expect("valid json");
        assert!(NewUser::try_from(form).is_err());
    }
}
