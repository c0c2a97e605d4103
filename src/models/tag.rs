//! Diesel models for tag dimensions and tags.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::tag::{
    NewTag as DomainNewTag, NewTagDimension as DomainNewTagDimension, Tag as DomainTag,
    TagDimension as DomainTagDimension, UpdateTag as DomainUpdateTag,
    UpdateTagDimension as DomainUpdateTagDimension,
};
use crate::domain::types::{
    DimensionName, TagColor, TagDimensionId, TagId, TagName, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tag_dimensions)]
pub struct TagDimension {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tag_dimensions)]
pub struct NewTagDimension<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewTagDimension<'a> {
    pub fn new(dimension: &'a DomainNewTagDimension, now: NaiveDateTime) -> Self {
        Self {
            name: dimension.name.as_str(),
            description: &dimension.description,
            sort_order: dimension.sort_order,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tag_dimensions)]
pub struct UpdateTagDimension<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub sort_order: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl<'a> UpdateTagDimension<'a> {
    pub fn new(update: &'a DomainUpdateTagDimension, now: NaiveDateTime) -> Self {
        Self {
            name: update.name.as_ref().map(DimensionName::as_str),
            description: update.description.as_deref(),
            sort_order: update.sort_order,
            updated_at: now,
        }
    }
}

impl TryFrom<TagDimension> for DomainTagDimension {
    type Error = TypeConstraintError;

    fn try_from(dimension: TagDimension) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TagDimensionId::try_from(dimension.id)?,
            name: DimensionName::new(dimension.name)?,
            description: dimension.description,
            sort_order: dimension.sort_order,
            created_at: dimension.created_at,
            updated_at: dimension.updated_at,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(TagDimension, foreign_key = dimension_id))]
#[diesel(table_name = crate::schema::tags)]
pub struct Tag {
    pub id: i32,
    pub dimension_id: i32,
    pub name: String,
    pub color: String,
    pub description: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub dimension_id: i32,
    pub name: &'a str,
    pub color: &'a str,
    pub description: &'a str,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewTag<'a> {
    pub fn new(tag: &'a DomainNewTag, now: NaiveDateTime) -> Self {
        Self {
            dimension_id: tag.dimension_id.get(),
            name: tag.name.as_str(),
            color: tag.color.as_str(),
            description: &tag.description,
            sort_order: tag.sort_order,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tags)]
pub struct UpdateTag<'a> {
    pub dimension_id: Option<i32>,
    pub name: Option<&'a str>,
    pub color: Option<&'a str>,
    pub description: Option<&'a str>,
    pub sort_order: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl<'a> UpdateTag<'a> {
    pub fn new(update: &'a DomainUpdateTag, now: NaiveDateTime) -> Self {
        Self {
            dimension_id: update.dimension_id.map(TagDimensionId::get),
            name: update.name.as_ref().map(TagName::as_str),
            color: update.color.as_ref().map(TagColor::as_str),
            description: update.description.as_deref(),
            sort_order: update.sort_order,
            updated_at: now,
        }
    }
}

impl TryFrom<Tag> for DomainTag {
    type Error = TypeConstraintError;

    fn try_from(tag: Tag) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TagId::try_from(tag.id)?,
            dimension_id: TagDimensionId::try_from(tag.dimension_id)?,
            name: TagName::new(tag.name)?,
            color: TagColor::new(tag.color)?,
            description: tag.description,
            sort_order: tag.sort_order,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
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
    fn blank_stored_color_falls_back_to_default() {
        let db = Tag {
            id: 1,
            dimension_id: 1,
            name: "VIP".into(),
            color: String::new(),
            description: String::new(),
            sort_order: 0,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
            is_deleted: false,
        };
        let domain = DomainTag::try_from(db).expect("valid tag");
        assert_eq!(domain.color.as_str(), "#2196F3");
    }

    #[test]
    fn partial_update_leaves_missing_fields_out() {
        let update = DomainUpdateTag {
            name: Some(TagName::new("重点").unwrap()),
            ..Default::default()
        };
        let changeset = UpdateTag::new(&update, now());
        assert_eq!(changeset.name, Some("重点"));
        assert!(changeset.color.is_none());
        assert!(changeset.dimension_id.is_none());
    }
}
