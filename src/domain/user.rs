use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::activity::Activity;
use crate::domain::todo::Todo;
use crate::domain::types::{UserEmail, UserId, UserName};

/// Status assigned to newly created users.
pub const ACTIVE_STATUS: &str = "active";

/// Sales staff member.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub manager_id: Option<UserId>,
    pub email: Option<UserEmail>,
    pub phone: String,
    pub department: String,
    pub department_leader_id: Option<UserId>,
    pub position: String,
    pub wechat_work_id: String,
    pub wechat_id: String,
    pub status: String,
    pub avatar_url: String,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: UserName,
    pub manager_id: Option<UserId>,
    pub email: Option<UserEmail>,
    pub phone: String,
    pub department: String,
    pub department_leader_id: Option<UserId>,
    pub position: String,
    pub wechat_work_id: String,
    pub wechat_id: String,
    pub status: String,
    pub avatar_url: String,
}

impl NewUser {
    pub fn new(name: UserName) -> Self {
        Self {
            name,
            manager_id: None,
            email: None,
            phone: String::new(),
            department: String::new(),
            department_leader_id: None,
            position: String::new(),
            wechat_work_id: String::new(),
            wechat_id: String::new(),
            status: ACTIVE_STATUS.to_string(),
            avatar_url: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UpdateUser {
    pub name: Option<UserName>,
    pub manager_id: Option<UserId>,
    pub email: Option<UserEmail>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub department_leader_id: Option<UserId>,
    pub position: Option<String>,
    pub wechat_work_id: Option<String>,
    pub wechat_id: Option<String>,
    pub status: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateUser {
    #[must_use]
    pub fn apply(&self, user: &User, now: NaiveDateTime) -> User {
        let mut next = user.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if self.manager_id.is_some() {
            next.manager_id = self.manager_id;
        }
        if self.email.is_some() {
            next.email = self.email.clone();
        }
        if self.department_leader_id.is_some() {
            next.department_leader_id = self.department_leader_id;
        }
        for (target, value) in [
            (&mut next.phone, &self.phone),
            (&mut next.department, &self.department),
            (&mut next.position, &self.position),
            (&mut next.wechat_work_id, &self.wechat_work_id),
            (&mut next.wechat_id, &self.wechat_id),
            (&mut next.status, &self.status),
            (&mut next.avatar_url, &self.avatar_url),
        ] {
            if let Some(value) = value {
                *target = value.trim().to_string();
            }
        }
        next.updated_at = now;
        next
    }
}

/// User with the resolved name of their manager.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserWithManager {
    #[serde(flatten)]
    pub user: User,
    pub manager_name: Option<String>,
}

/// Day overview shown on a user's homepage.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserHomepage {
    pub user: User,
    /// Open todos planned for today where the user is the executor.
    pub todos: Vec<Todo>,
    /// Activities the user recorded today.
    pub activities: Vec<Activity>,
    pub follow_up_count: usize,
}

impl UserHomepage {
    pub fn new(user: User, todos: Vec<Todo>, activities: Vec<Activity>) -> Self {
        let follow_up_count = todos.len() + activities.len();
        Self {
            user,
            todos,
            activities,
            follow_up_count,
        }
    }
}
