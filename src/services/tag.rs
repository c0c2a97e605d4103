use std::collections::HashMap;

use log::info;

use crate::domain::tag::{
    DimensionWithTags, NewTag, NewTagDimension, Tag, TagDimension, TagWithDimension, UpdateTag,
    UpdateTagDimension,
};
use crate::domain::types::{TagDimensionId, TagId};
use crate::dto::tag::TagQuery;
use crate::forms::tag::{CreateDimensionForm, CreateTagForm, UpdateDimensionForm, UpdateTagForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{TagListQuery, TagReader, TagWriter};
use crate::services::{ServiceError, ServiceResult};

fn load_dimension<R>(repo: &R, id: TagDimensionId) -> ServiceResult<TagDimension>
where
    R: TagReader + ?Sized,
{
    repo.get_dimension_by_id(id)?.ok_or(ServiceError::NotFound)
}

/// Tags may only be attached to a live dimension.
fn ensure_dimension<R>(repo: &R, id: TagDimensionId) -> ServiceResult<()>
where
    R: TagReader + ?Sized,
{
    match repo.get_dimension_by_id(id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Validation(format!(
            "tag dimension {id} does not exist"
        ))),
    }
}

/// Every live dimension in sort order, each with its live tags.
pub fn list_dimensions_with_tags<R>(repo: &R) -> ServiceResult<Vec<DimensionWithTags>>
where
    R: TagReader + ?Sized,
{
    let dimensions = repo.list_dimensions()?;
    let mut by_dimension: HashMap<TagDimensionId, Vec<Tag>> = HashMap::new();
    for tag in repo.list_active_tags()? {
        by_dimension.entry(tag.dimension_id).or_default().push(tag);
    }

    Ok(dimensions
        .into_iter()
        .map(|dimension| {
            let tags = by_dimension.remove(&dimension.id).unwrap_or_default();
            DimensionWithTags::new(dimension, tags)
        })
        .collect())
}

pub fn get_dimension<R>(repo: &R, id: i32) -> ServiceResult<DimensionWithTags>
where
    R: TagReader + ?Sized,
{
    let dimension = load_dimension(repo, TagDimensionId::new(id)?)?;
    let tags = tags_by_dimension(repo, id)?;
    Ok(DimensionWithTags::new(dimension, tags))
}

pub fn create_dimension<R>(repo: &R, form: CreateDimensionForm) -> ServiceResult<TagDimension>
where
    R: TagWriter + ?Sized,
{
    let dimension = repo.create_dimension(&NewTagDimension::try_from(form)?)?;
    info!("Created tag dimension {} ({})", dimension.id, dimension.name);
    Ok(dimension)
}

pub fn update_dimension<R>(
    repo: &R,
    id: i32,
    form: UpdateDimensionForm,
) -> ServiceResult<TagDimension>
where
    R: TagReader + TagWriter + ?Sized,
{
    let dimension = load_dimension(repo, TagDimensionId::new(id)?)?;
    let updates = UpdateTagDimension::try_from(form)?;
    Ok(repo.update_dimension(dimension.id, &updates)?)
}

/// Soft deletes the dimension together with its tags.
pub fn delete_dimension<R>(repo: &R, id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    match repo.delete_dimension(TagDimensionId::new(id)?)? {
        0 => Err(ServiceError::NotFound),
        _ => Ok(()),
    }
}

pub fn list_tags<R>(repo: &R, params: TagQuery) -> ServiceResult<Paginated<TagWithDimension>>
where
    R: TagReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let query = TagListQuery {
        dimension_id: params.dimension_id.map(TagDimensionId::new).transpose()?,
        name: params
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        pagination: Some(pagination),
    };
    let (total, tags) = repo.list_tags(query)?;
    Ok(Paginated::new(tags, total, pagination))
}

pub fn list_active_tags<R>(repo: &R) -> ServiceResult<Vec<Tag>>
where
    R: TagReader + ?Sized,
{
    Ok(repo.list_active_tags()?)
}

pub fn get_tag<R>(repo: &R, id: i32) -> ServiceResult<Tag>
where
    R: TagReader + ?Sized,
{
    repo.get_tag_by_id(TagId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_tag<R>(repo: &R, form: CreateTagForm) -> ServiceResult<Tag>
where
    R: TagReader + TagWriter + ?Sized,
{
    let new_tag = NewTag::try_from(form)?;
    ensure_dimension(repo, new_tag.dimension_id)?;
    let tag = repo.create_tag(&new_tag)?;
    info!("Created tag {} ({}) in dimension {}", tag.id, tag.name, tag.dimension_id);
    Ok(tag)
}

pub fn update_tag<R>(repo: &R, id: i32, form: UpdateTagForm) -> ServiceResult<Tag>
where
    R: TagReader + TagWriter + ?Sized,
{
    let tag = get_tag(repo, id)?;
    let updates = UpdateTag::try_from(form)?;
    if let Some(dimension_id) = updates.dimension_id {
        ensure_dimension(repo, dimension_id)?;
    }
    Ok(repo.update_tag(tag.id, &updates)?)
}

pub fn delete_tag<R>(repo: &R, id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    match repo.delete_tag(TagId::new(id)?)? {
        0 => Err(ServiceError::NotFound),
        _ => Ok(()),
    }
}

pub fn tags_by_dimension<R>(repo: &R, dimension_id: i32) -> ServiceResult<Vec<Tag>>
where
    R: TagReader + ?Sized,
{
    let query = TagListQuery::new().dimension(TagDimensionId::new(dimension_id)?);
    let (_, tags) = repo.list_tags(query)?;
    Ok(tags.into_iter().map(|t| t.tag).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{DimensionName, TagColor, TagName};
    use crate::repository::mock::MockRepository;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn dimension(id: i32, name: &str) -> TagDimension {
        TagDimension {
            id: TagDimensionId::new(id).unwrap(),
            name: DimensionName::new(name).unwrap(),
            description: String::new(),
            sort_order: id,
            created_at: at(),
            updated_at: at(),
        }
    }

    fn tag(id: i32, dimension_id: i32, name: &str) -> Tag {
        Tag {
            id: TagId::new(id).unwrap(),
            dimension_id: TagDimensionId::new(dimension_id).unwrap(),
            name: TagName::new(name).unwrap(),
            color: TagColor::default(),
            description: String::new(),
            sort_order: 0,
            created_at: at(),
            updated_at: at(),
        }
    }

    #[test]
    fn dimensions_carry_their_tags() {
        let mut repo = MockRepository::new();
        repo.expect_list_dimensions()
            .returning(|| Ok(vec![dimension(1, "客户等级"), dimension(2, "渠道")]));
        repo.expect_list_active_tags().returning(|| {
            Ok(vec![tag(1, 1, "A"), tag(2, 1, "B"), tag(3, 3, "孤儿")])
        });

        let dims = list_dimensions_with_tags(&repo).unwrap();
        assert_eq!(dims.len(), 2);
        assert_eq!(dims[0].tag_count, 2);
        assert_eq!(dims[1].tag_count, 0);
    }

    #[test]
    fn tag_needs_live_dimension() {
        let mut repo = MockRepository::new();
        repo.expect_get_dimension_by_id().returning(|_| Ok(None));
        repo.expect_create_tag().never();

        let form: CreateTagForm =
            serde_json::from_str(r#"{"dimension_id": 7, "name": "VIP"}"#).unwrap();
        assert!(matches!(
            create_tag(&repo, form),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn moving_a_tag_checks_the_target_dimension() {
        let mut repo = MockRepository::new();
        repo.expect_get_tag_by_id()
            .returning(|_| Ok(Some(tag(1, 1, "A"))));
        repo.expect_get_dimension_by_id()
            .returning(|id| Ok(Some(dimension(id.get(), "渠道"))));
        repo.expect_update_tag().returning(|id, updates| {
            let mut moved = tag(id.get(), 1, "A");
            if let Some(dimension_id) = updates.dimension_id {
                moved.dimension_id = dimension_id;
            }
            Ok(moved)
        });

        let form = UpdateTagForm {
            dimension_id: Some(2),
            ..Default::default()
        };
        let moved = update_tag(&repo, 1, form).unwrap();
        assert_eq!(moved.dimension_id.get(), 2);
    }

    #[test]
    fn deleting_missing_dimension_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_dimension().returning(|_| Ok(0));
        assert!(matches!(
            delete_dimension(&repo, 3),
            Err(ServiceError::NotFound)
        ));
    }
}
