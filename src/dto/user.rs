use serde::Deserialize;

/// Query parameters of `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub department: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}
