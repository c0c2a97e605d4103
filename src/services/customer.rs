//! Customer workflows, including CSV import and export.

use chrono::NaiveDateTime;
use log::info;
use validator::Validate;

use crate::domain::customer::{Customer, CustomerProfile, NewCustomer, SpecialSegment, UpdateCustomer};
use crate::domain::types::{CustomerId, UserId};
use crate::dto::customer::{CustomerQuery, ImportSummary, SpecialCustomerQuery};
use crate::forms::customer::{
    CustomerCsvRecord, CustomerForm, CustomerSearchForm, FavorsForm, ImportCustomersForm,
    RemarkForm, SystemTagsForm,
};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{CustomerListQuery, CustomerReader, CustomerWriter};
use crate::services::{ServiceError, ServiceResult};

/// Resolves the identifier, failing with `NotFound` for missing or deleted rows.
fn existing_customer<R>(repo: &R, id: i32) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    repo.get_customer_by_id(CustomerId::new(id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_customers<R>(repo: &R, params: CustomerQuery) -> ServiceResult<Paginated<Customer>>
where
    R: CustomerReader + ?Sized,
{
    let pagination = Pagination::new(params.page, params.page_size);
    let mut query = CustomerListQuery::new().paginate(pagination);
    if let Some(term) = params.search {
        query = query.search(term);
    }
    let (total, customers) = repo.list_customers(query)?;
    Ok(Paginated::new(customers, total, pagination))
}

/// Keyword search combined with an any-of match on system tags.
pub fn search_customers<R>(repo: &R, form: CustomerSearchForm) -> ServiceResult<Paginated<Customer>>
where
    R: CustomerReader + ?Sized,
{
    let pagination = Pagination::new(form.page, form.page_size);
    let query = CustomerListQuery::new()
        .search(form.keyword)
        .system_tags(form.system_tags)
        .paginate(pagination);
    let (total, customers) = repo.list_customers(query)?;
    Ok(Paginated::new(customers, total, pagination))
}

pub fn special_customers<R>(
    repo: &R,
    params: SpecialCustomerQuery,
    now: NaiveDateTime,
) -> ServiceResult<Paginated<Customer>>
where
    R: CustomerReader + ?Sized,
{
    let segment = params
        .segment
        .parse::<SpecialSegment>()
        .map_err(|e| ServiceError::Form(e.to_string()))?;
    let pagination = Pagination::new(params.page, params.page_size);
    let query = CustomerListQuery::new()
        .segment(segment, now)
        .paginate(pagination);
    let (total, customers) = repo.list_customers(query)?;
    Ok(Paginated::new(customers, total, pagination))
}

pub fn get_customer<R>(repo: &R, id: i32) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    existing_customer(repo, id)
}

pub fn create_customer<R>(
    repo: &R,
    acting_user: UserId,
    form: CustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + ?Sized,
{
    let profile = CustomerProfile::try_from(form)?;
    let customer = repo.create_customer(&NewCustomer::new(profile, acting_user.get()))?;
    info!("Created customer {} ({})", customer.id, customer.name());
    Ok(customer)
}

/// Replaces every editable attribute; audit columns stay untouched.
pub fn update_customer<R>(
    repo: &R,
    acting_user: UserId,
    id: i32,
    form: CustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    let customer = existing_customer(repo, id)?;
    let profile = CustomerProfile::try_from(form)?;
    Ok(repo.update_customer(customer.id, &UpdateCustomer::new(profile, acting_user.get()))?)
}

pub fn update_favors<R>(repo: &R, id: i32, form: FavorsForm) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    let customer = existing_customer(repo, id)?;
    if !form.favors.is_array() {
        return Err(ServiceError::Form("favors must be an array".to_string()));
    }
    Ok(repo.update_customer_favors(customer.id, &form.favors)?)
}

pub fn update_remark<R>(
    repo: &R,
    acting_user: UserId,
    id: i32,
    form: RemarkForm,
) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    form.validate().map_err(|e| ServiceError::Validation(e.to_string()))?;
    let customer = existing_customer(repo, id)?;
    Ok(repo.update_customer_remark(customer.id, form.remark.trim(), acting_user.get())?)
}

pub fn update_system_tags<R>(repo: &R, id: i32, form: SystemTagsForm) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    let customer = existing_customer(repo, id)?;
    let mut tags = form.system_tags;
    tags.sort_unstable();
    tags.dedup();
    Ok(repo.update_customer_system_tags(customer.id, &tags)?)
}

pub fn delete_customer<R>(repo: &R, id: i32) -> ServiceResult<()>
where
    R: CustomerWriter + ?Sized,
{
    match repo.delete_customer(CustomerId::new(id)?)? {
        0 => Err(ServiceError::NotFound),
        _ => Ok(()),
    }
}

/// Imports every named row of the uploaded CSV in one transaction.
pub fn import_customers<R>(
    repo: &R,
    acting_user: UserId,
    form: &ImportCustomersForm,
) -> ServiceResult<ImportSummary>
where
    R: CustomerWriter + ?Sized,
{
    let customers = form.parse(acting_user.get())?;
    if customers.is_empty() {
        return Err(ServiceError::Form("the file contains no customers".to_string()));
    }
    let imported = repo.create_customers(&customers)?;
    info!("Imported {imported} customers");
    Ok(ImportSummary { imported })
}

/// Serializes every live customer as CSV, newest first.
pub fn export_customers<R>(repo: &R) -> ServiceResult<Vec<u8>>
where
    R: CustomerReader + ?Sized,
{
    let (_, customers) = repo.list_customers(CustomerListQuery::new())?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for customer in &customers {
        writer
            .serialize(CustomerCsvRecord::from(customer))
            .map_err(|e| ServiceError::Internal(format!("csv export: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(format!("csv export: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CustomerName;
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;

    fn customer(id: i32, name: &str) -> Customer {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut profile = CustomerProfile::named(CustomerName::new(name).unwrap());
        profile.phones = vec!["138".into(), "139".into()];
        Customer {
            id: CustomerId::new(id).unwrap(),
            profile,
            created_by: 1,
            updated_by: 1,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn unknown_segment_is_a_parameter_error() {
        let repo = MockRepository::new();
        let params = SpecialCustomerQuery {
            segment: "vip".into(),
            ..Default::default()
        };
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            special_customers(&repo, params, now),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn list_reports_paging() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers().returning(|query| {
            assert_eq!(query.search.as_deref(), Some("阿里"));
            assert_eq!(query.pagination.map(|p| p.page), Some(2));
            Ok((21, vec![customer(1, "阿里小店")]))
        });

        let page = list_customers(
            &repo,
            CustomerQuery {
                search: Some(" 阿里 ".into()),
                page: Some(2),
                page_size: None,
            },
        )
        .unwrap();
        assert_eq!(page.total, 21);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn delete_of_missing_customer_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_customer().returning(|_| Ok(0));
        assert!(matches!(
            delete_customer(&repo, 5),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn favors_must_be_a_list() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|_| Ok(Some(customer(1, "阿里小店"))));
        repo.expect_update_customer_favors().never();

        let form = FavorsForm {
            favors: serde_json::json!({"tea": true}),
        };
        assert!(matches!(
            update_favors(&repo, 1, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn export_writes_header_and_rows() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .returning(|_| Ok((1, vec![customer(1, "阿里小店")])));

        let bytes = export_customers(&repo).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("name,contact_name,gender,phones"));
        assert!(lines.next().unwrap().starts_with("阿里小店,,,138;139"));
    }
}
