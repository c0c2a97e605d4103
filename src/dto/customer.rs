//! Query strings accepted by the customer endpoints.

use serde::Deserialize;

/// Query parameters of `GET /customers`.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Query parameters of `GET /customers/special`.
#[derive(Debug, Default, Deserialize)]
pub struct SpecialCustomerQuery {
    #[serde(rename = "type", default)]
    pub segment: String,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Outcome of a CSV import.
#[derive(Debug, serde::Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
}
