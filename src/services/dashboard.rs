use chrono::NaiveDateTime;

use crate::domain::dashboard::group_by_customer;
use crate::domain::types::UserId;
use crate::dto::dashboard::DashboardEntry;
use crate::forms::dashboard::DashboardSearchForm;
use crate::repository::DashboardReader;
use crate::services::ServiceResult;

/// Runs the dashboard search and groups matching todos per customer.
///
/// The returned total counts matching todos, not customers.
pub fn search_dashboard<R>(
    repo: &R,
    acting_user: UserId,
    form: DashboardSearchForm,
    now: NaiveDateTime,
) -> ServiceResult<(usize, Vec<DashboardEntry>)>
where
    R: DashboardReader + ?Sized,
{
    let query = form.into_query(acting_user)?;
    let (total, rows) = repo.search_dashboard(&query, now)?;
    let entries = group_by_customer(rows)
        .into_iter()
        .map(DashboardEntry::from)
        .collect();
    Ok((total, entries))
}
