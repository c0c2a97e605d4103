use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::local_now;
use crate::domain::tag::{
    NewTag, NewTagDimension, Tag, TagDimension, TagWithDimension, UpdateTag, UpdateTagDimension,
};
use crate::domain::types::{TagDimensionId, TagId};
use crate::models::tag::{
    NewTag as DbNewTag, NewTagDimension as DbNewTagDimension, Tag as DbTag,
    TagDimension as DbTagDimension, UpdateTag as DbUpdateTag,
    UpdateTagDimension as DbUpdateTagDimension,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TagListQuery, TagReader, TagWriter};
use crate::schema::{tag_dimensions, tags};

impl TagReader for DieselRepository {
    fn list_dimensions(&self) -> RepositoryResult<Vec<TagDimension>> {
        let mut conn = self.conn()?;

        let rows = tag_dimensions::table
            .filter(tag_dimensions::is_deleted.eq(false))
            .order((tag_dimensions::sort_order.asc(), tag_dimensions::id.asc()))
            .load::<DbTagDimension>(&mut conn)?;

        rows.into_iter()
            .map(|d| TagDimension::try_from(d).map_err(RepositoryError::from))
            .collect()
    }

    fn get_dimension_by_id(&self, id: TagDimensionId) -> RepositoryResult<Option<TagDimension>> {
        let mut conn = self.conn()?;

        let dimension = tag_dimensions::table
            .filter(tag_dimensions::id.eq(id.get()))
            .filter(tag_dimensions::is_deleted.eq(false))
            .first::<DbTagDimension>(&mut conn)
            .optional()?;

        dimension
            .map(TagDimension::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_tag_by_id(&self, id: TagId) -> RepositoryResult<Option<Tag>> {
        let mut conn = self.conn()?;

        let tag = tags::table
            .filter(tags::id.eq(id.get()))
            .filter(tags::is_deleted.eq(false))
            .first::<DbTag>(&mut conn)
            .optional()?;

        tag.map(Tag::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_tags(&self, query: TagListQuery) -> RepositoryResult<(usize, Vec<TagWithDimension>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = tags::table
                .inner_join(tag_dimensions::table)
                .filter(tags::is_deleted.eq(false))
                .filter(tag_dimensions::is_deleted.eq(false))
                .into_boxed::<Sqlite>();

            if let Some(dimension_id) = query.dimension_id {
                items = items.filter(tags::dimension_id.eq(dimension_id.get()));
            }
            if let Some(name) = &query.name {
                items = items.filter(tags::name.like(format!("%{name}%")));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((
                tag_dimensions::sort_order.asc(),
                tags::sort_order.asc(),
                tags::id.asc(),
            ))
            .select((DbTag::as_select(), tag_dimensions::name))
            .load::<(DbTag, String)>(&mut conn)?;

        let tags = rows
            .into_iter()
            .map(|(tag, dimension_name)| {
                Ok(TagWithDimension {
                    tag: Tag::try_from(tag)?,
                    dimension_name,
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, tags))
    }

    fn list_active_tags(&self) -> RepositoryResult<Vec<Tag>> {
        let mut conn = self.conn()?;

        let rows = tags::table
            .inner_join(tag_dimensions::table)
            .filter(tags::is_deleted.eq(false))
            .filter(tag_dimensions::is_deleted.eq(false))
            .order((
                tag_dimensions::sort_order.asc(),
                tags::sort_order.asc(),
                tags::id.asc(),
            ))
            .select(DbTag::as_select())
            .load::<DbTag>(&mut conn)?;

        rows.into_iter()
            .map(|t| Tag::try_from(t).map_err(RepositoryError::from))
            .collect()
    }
}

impl TagWriter for DieselRepository {
    fn create_dimension(&self, dimension: &NewTagDimension) -> RepositoryResult<TagDimension> {
        let mut conn = self.conn()?;

        let new_dimension = DbNewTagDimension::new(dimension, local_now());
        let created = diesel::insert_into(tag_dimensions::table)
            .values(&new_dimension)
            .get_result::<DbTagDimension>(&mut conn)?;

        TagDimension::try_from(created).map_err(RepositoryError::from)
    }

    fn update_dimension(
        &self,
        id: TagDimensionId,
        updates: &UpdateTagDimension,
    ) -> RepositoryResult<TagDimension> {
        let mut conn = self.conn()?;

        let changeset = DbUpdateTagDimension::new(updates, local_now());
        let updated = diesel::update(
            tag_dimensions::table
                .filter(tag_dimensions::id.eq(id.get()))
                .filter(tag_dimensions::is_deleted.eq(false)),
        )
        .set(&changeset)
        .get_result::<DbTagDimension>(&mut conn)?;

        TagDimension::try_from(updated).map_err(RepositoryError::from)
    }

    fn delete_dimension(&self, id: TagDimensionId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::update(
                tags::table
                    .filter(tags::dimension_id.eq(id.get()))
                    .filter(tags::is_deleted.eq(false)),
            )
            .set((
                tags::is_deleted.eq(true),
                tags::deleted_at.eq(Some(now)),
                tags::updated_at.eq(now),
            ))
            .execute(conn)?;

            diesel::update(
                tag_dimensions::table
                    .filter(tag_dimensions::id.eq(id.get()))
                    .filter(tag_dimensions::is_deleted.eq(false)),
            )
            .set((
                tag_dimensions::is_deleted.eq(true),
                tag_dimensions::deleted_at.eq(Some(now)),
                tag_dimensions::updated_at.eq(now),
            ))
            .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn create_tag(&self, tag: &NewTag) -> RepositoryResult<Tag> {
        let mut conn = self.conn()?;

        let new_tag = DbNewTag::new(tag, local_now());
        let created = diesel::insert_into(tags::table)
            .values(&new_tag)
            .get_result::<DbTag>(&mut conn)?;

        Tag::try_from(created).map_err(RepositoryError::from)
    }

    fn update_tag(&self, id: TagId, updates: &UpdateTag) -> RepositoryResult<Tag> {
        let mut conn = self.conn()?;

        let changeset = DbUpdateTag::new(updates, local_now());
        let updated = diesel::update(
            tags::table
                .filter(tags::id.eq(id.get()))
                .filter(tags::is_deleted.eq(false)),
        )
        .set(&changeset)
        .get_result::<DbTag>(&mut conn)?;

        Tag::try_from(updated).map_err(RepositoryError::from)
    }

    fn delete_tag(&self, id: TagId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        let affected = diesel::update(
            tags::table
                .filter(tags::id.eq(id.get()))
                .filter(tags::is_deleted.eq(false)),
        )
        .set((
            tags::is_deleted.eq(true),
            tags::deleted_at.eq(Some(now)),
            tags::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
