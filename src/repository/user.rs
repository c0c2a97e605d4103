use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::local_now;
use crate::domain::types::UserId;
use crate::domain::user::{ACTIVE_STATUS, NewUser, User};
use crate::models::user::{NewUser as DbNewUser, UpdateUser as DbUpdateUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserListQuery, UserReader, UserWriter};
use crate::schema::users;

fn into_domain(rows: Vec<DbUser>) -> RepositoryResult<Vec<User>> {
    rows.into_iter()
        .map(|u| User::try_from(u).map_err(RepositoryError::from))
        .collect()
}

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::is_deleted.eq(false))
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_users_by_ids(&self, ids: &[UserId]) -> RepositoryResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let rows = users::table
            .filter(users::id.eq_any(raw_ids))
            .load::<DbUser>(&mut conn)?;

        into_domain(rows)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = users::table
                .filter(users::is_deleted.eq(false))
                .into_boxed::<Sqlite>();

            if let Some(department) = &query.department {
                items = items.filter(users::department.eq(department.clone()));
            }
            if let Some(status) = &query.status {
                items = items.filter(users::status.eq(status.clone()));
            }
            if let Some(name) = &query.name {
                items = items.filter(users::name.like(format!("%{name}%")));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((users::created_at.desc(), users::id.desc()))
            .load::<DbUser>(&mut conn)?;

        Ok((total, into_domain(rows)?))
    }

    fn list_active_users(&self) -> RepositoryResult<Vec<User>> {
        let mut conn = self.conn()?;

        let rows = users::table
            .filter(users::is_deleted.eq(false))
            .filter(users::status.eq(ACTIVE_STATUS))
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?;

        into_domain(rows)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;

        let new_user = DbNewUser::new(user, local_now());
        let created = diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(created).map_err(RepositoryError::from)
    }

    fn save_user(&self, user: &User) -> RepositoryResult<User> {
        let mut conn = self.conn()?;

        let changeset = DbUpdateUser::from(user);
        let saved = diesel::update(
            users::table
                .filter(users::id.eq(user.id.get()))
                .filter(users::is_deleted.eq(false)),
        )
        .set(&changeset)
        .get_result::<DbUser>(&mut conn)?;

        User::try_from(saved).map_err(RepositoryError::from)
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        let affected = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::is_deleted.eq(false)),
        )
        .set((
            users::is_deleted.eq(true),
            users::deleted_at.eq(Some(now)),
            users::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
