use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{DimensionName, TagColor, TagDimensionId, TagId, TagName};

/// Group of tags (e.g. "客户等级").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TagDimension {
    pub id: TagDimensionId,
    pub name: DimensionName,
    pub description: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewTagDimension {
    pub name: DimensionName,
    pub description: String,
    pub sort_order: i32,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateTagDimension {
    pub name: Option<DimensionName>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// Dimension together with its live tags.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DimensionWithTags {
    #[serde(flatten)]
    pub dimension: TagDimension,
    pub tags: Vec<Tag>,
    pub tag_count: usize,
}

impl DimensionWithTags {
    pub fn new(dimension: TagDimension, tags: Vec<Tag>) -> Self {
        let tag_count = tags.len();
        Self {
            dimension,
            tags,
            tag_count,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: TagId,
    pub dimension_id: TagDimensionId,
    pub name: TagName,
    pub color: TagColor,
    pub description: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewTag {
    pub dimension_id: TagDimensionId,
    pub name: TagName,
    pub color: TagColor,
    pub description: String,
    pub sort_order: i32,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateTag {
    pub dimension_id: Option<TagDimensionId>,
    pub name: Option<TagName>,
    pub color: Option<TagColor>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// Tag with the name of its dimension, as listed by `GET /tags`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TagWithDimension {
    #[serde(flatten)]
    pub tag: Tag,
    pub dimension_name: String,
}
