use serde::Deserialize;

/// Query parameters of `GET /tags`.
#[derive(Debug, Default, Deserialize)]
pub struct TagQuery {
    pub dimension_id: Option<i32>,
    pub name: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}
