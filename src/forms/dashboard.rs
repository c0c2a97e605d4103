use serde::Deserialize;

use crate::domain::dashboard::DashboardQuery;
use crate::domain::types::UserId;
use crate::forms::FormError;
use crate::pagination::Pagination;

#[derive(Debug, Default, Deserialize)]
/// Body of `POST /dashboard/search`.
pub struct DashboardSearchForm {
    /// Executor whose todos are searched; the acting user when absent.
    pub user_id: Option<i32>,
    #[serde(default)]
    pub time_filter: String,
    #[serde(default)]
    pub status_filter: String,
    #[serde(default)]
    pub show_all: bool,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl DashboardSearchForm {
    /// Resolves the Chinese filter labels. `show_all` drops paging.
    pub fn into_query(self, acting_user: UserId) -> Result<DashboardQuery, FormError> {
        let user_id = match self.user_id {
            Some(id) => UserId::new(id)?,
            None => acting_user,
        };
        let pagination = if self.show_all {
            None
        } else {
            Some(Pagination::new(self.page, self.page_size))
        };
        Ok(DashboardQuery {
            user_id,
            time_filter: self.time_filter.parse()?,
            status_filter: self.status_filter.parse()?,
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{StatusFilter, TimeFilter};

    fn acting() -> UserId {
        UserId::new(1).expect("valid id")
    }

    #[test]
    fn labels_and_paging_resolve() {
        let form: DashboardSearchForm = serde_json::from_str(
            r#"{"user_id": 3, "time_filter": "今日待跟进", "status_filter": "定期", "page": 2}"#,
        )
        .expect("valid json");
        let query = form.into_query(acting()).expect("valid form");
        assert_eq!(query.user_id.get(), 3);
        assert_eq!(query.time_filter, TimeFilter::Today);
        assert_eq!(query.status_filter, StatusFilter::Recurring);
        let pagination = query.pagination.expect("paged");
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.per_page, 20);
    }

    #[test]
    fn show_all_disables_paging() {
        let form: DashboardSearchForm =
            serde_json::from_str(r#"{"show_all": true}"#).expect("valid json");
        let query = form.into_query(acting()).expect("valid form");
        assert!(query.pagination.is_none());
        assert_eq!(query.user_id, acting());
    }

    #[test]
    fn unknown_label_is_rejected() {
        let form: DashboardSearchForm =
            serde_json::from_str(r#"{"time_filter": "明天"}"#).expect("valid json");
        assert!(form.into_query(acting()).is_err());
    }
}
