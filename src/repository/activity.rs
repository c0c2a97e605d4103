use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity::{Activity, NewActivity};
use crate::domain::local_now;
use crate::domain::types::ActivityId;
use crate::models::activity::{
    Activity as DbActivity, ActivityChangeset, NewActivity as DbNewActivity,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ActivityListQuery, ActivityReader, ActivityWriter, DieselRepository};
use crate::schema::activities;

fn into_domain(rows: Vec<DbActivity>) -> RepositoryResult<Vec<Activity>> {
    rows.into_iter()
        .map(|a| Activity::try_from(a).map_err(RepositoryError::from))
        .collect()
}

impl ActivityReader for DieselRepository {
    fn get_activity_by_id(&self, id: ActivityId) -> RepositoryResult<Option<Activity>> {
        let mut conn = self.conn()?;

        let activity = activities::table
            .filter(activities::id.eq(id.get()))
            .filter(activities::is_deleted.eq(false))
            .first::<DbActivity>(&mut conn)
            .optional()?;

        activity
            .map(Activity::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_activities(
        &self,
        query: ActivityListQuery,
    ) -> RepositoryResult<(usize, Vec<Activity>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = activities::table
                .filter(activities::is_deleted.eq(false))
                .into_boxed::<Sqlite>();

            if let Some(customer_id) = query.customer_id {
                items = items.filter(activities::customer_id.eq(customer_id.get()));
            }
            if let Some(user_id) = query.user_id {
                items = items.filter(activities::user_id.eq(user_id.get()));
            }
            if let Some(kind) = query.kind {
                items = items.filter(activities::kind.eq(kind.as_str()));
            }
            if let Some(start) = query.start {
                items = items.filter(activities::created_at.ge(start));
            }
            if let Some(end) = query.end {
                items = items.filter(activities::created_at.le(end));
            }
            if let Some(keyword) = &query.keyword {
                let pattern = format!("%{keyword}%");
                items = items.filter(
                    activities::title
                        .like(pattern.clone())
                        .or(activities::remark.like(pattern)),
                );
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((activities::created_at.desc(), activities::id.desc()))
            .load::<DbActivity>(&mut conn)?;

        Ok((total, into_domain(rows)?))
    }

    fn list_due_follow_ups(&self, now: NaiveDateTime) -> RepositoryResult<Vec<Activity>> {
        let mut conn = self.conn()?;

        let rows = activities::table
            .filter(activities::is_deleted.eq(false))
            .filter(activities::next_follow_time.is_not_null())
            .filter(activities::next_follow_time.le(now))
            .order(activities::next_follow_time.asc())
            .load::<DbActivity>(&mut conn)?;

        into_domain(rows)
    }
}

impl ActivityWriter for DieselRepository {
    fn create_activity(&self, activity: &NewActivity) -> RepositoryResult<Activity> {
        let mut conn = self.conn()?;

        let new_activity = DbNewActivity::new(activity, local_now());
        let created = diesel::insert_into(activities::table)
            .values(&new_activity)
            .get_result::<DbActivity>(&mut conn)?;

        Activity::try_from(created).map_err(RepositoryError::from)
    }

    fn save_activity(&self, activity: &Activity) -> RepositoryResult<Activity> {
        let mut conn = self.conn()?;

        let changeset = ActivityChangeset::from(activity);
        let saved = diesel::update(
            activities::table
                .filter(activities::id.eq(activity.id.get()))
                .filter(activities::is_deleted.eq(false)),
        )
        .set(&changeset)
        .get_result::<DbActivity>(&mut conn)?;

        Activity::try_from(saved).map_err(RepositoryError::from)
    }

    fn delete_activity(&self, id: ActivityId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        let affected = diesel::update(
            activities::table
                .filter(activities::id.eq(id.get()))
                .filter(activities::is_deleted.eq(false)),
        )
        .set((
            activities::is_deleted.eq(true),
            activities::deleted_at.eq(Some(now)),
            activities::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
