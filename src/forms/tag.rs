use serde::Deserialize;
use validator::Validate;

use crate::domain::tag::{NewTag, NewTagDimension, UpdateTag, UpdateTagDimension};
use crate::domain::types::{DimensionName, TagColor, TagDimensionId, TagName};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDimensionForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
}

impl TryFrom<CreateDimensionForm> for NewTagDimension {
    type Error = FormError;

    fn try_from(form: CreateDimensionForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: DimensionName::new(form.name)?,
            description: form.description.trim().to_string(),
            sort_order: form.sort_order,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDimensionForm {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl TryFrom<UpdateDimensionForm> for UpdateTagDimension {
    type Error = FormError;

    fn try_from(form: UpdateDimensionForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: form.name.map(DimensionName::new).transpose()?,
            description: form.description,
            sort_order: form.sort_order,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagForm {
    pub dimension_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Falls back to the default blue when blank.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
}

impl TryFrom<CreateTagForm> for NewTag {
    type Error = FormError;

    fn try_from(form: CreateTagForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            dimension_id: TagDimensionId::new(form.dimension_id)?,
            name: TagName::new(form.name)?,
            color: TagColor::new(form.color)?,
            description: form.description.trim().to_string(),
            sort_order: form.sort_order,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTagForm {
    pub dimension_id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl TryFrom<UpdateTagForm> for UpdateTag {
    type Error = FormError;

    fn try_from(form: UpdateTagForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            dimension_id: form.dimension_id.map(TagDimensionId::new).transpose()?,
            name: form.name.map(TagName::new).transpose()?,
            color: form.color.map(TagColor::new).transpose()?,
            description: form.description,
            sort_order: form.sort_order,
        })
    }
}
