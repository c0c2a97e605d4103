use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use serde_json::Value;

use crate::domain::customer::{
    Customer, NewCustomer, SpecialSegment, UpdateCustomer, half_year_before,
};
use crate::domain::local_now;
use crate::domain::types::CustomerId;
use crate::models::customer::{
    Customer as DbCustomer, NewCustomer as DbNewCustomer, UpdateCustomer as DbUpdateCustomer,
};
use crate::models::encode_list;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository};
use crate::schema::customers;

/// SQL fragment matching customers carrying any of the given system tag ids.
fn system_tags_any_of(tag_ids: &[i32]) -> String {
    let ids = tag_ids
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "EXISTS (SELECT 1 FROM json_each(customers.system_tags) WHERE json_each.value IN ({ids}))"
    )
}

fn into_domain(rows: Vec<DbCustomer>) -> RepositoryResult<Vec<Customer>> {
    rows.into_iter()
        .map(|c| Customer::try_from(c).map_err(RepositoryError::from))
        .collect()
}

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        let mut conn = self.conn()?;

        let customer = customers::table
            .filter(customers::id.eq(id.get()))
            .filter(customers::is_deleted.eq(false))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        customer
            .map(Customer::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_customers_by_ids(&self, ids: &[CustomerId]) -> RepositoryResult<Vec<Customer>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        // Soft-deleted customers are still returned so that historic todos
        // and activities keep their customer name.
        let rows = customers::table
            .filter(customers::id.eq_any(raw_ids))
            .load::<DbCustomer>(&mut conn)?;

        into_domain(rows)
    }

    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = customers::table
                .filter(customers::is_deleted.eq(false))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(term) = &query.search {
                let pattern = format!("%{term}%");
                items = items.filter(
                    customers::name
                        .like(pattern.clone())
                        .or(customers::contact_name.like(pattern.clone()))
                        .or(customers::remark.like(pattern.clone()))
                        .or(customers::phones.like(pattern.clone()))
                        .or(customers::wechats.like(pattern.clone()))
                        .or(customers::address.like(pattern.clone()))
                        .or(customers::province.like(pattern.clone()))
                        .or(customers::city.like(pattern.clone()))
                        .or(customers::district.like(pattern)),
                );
            }

            if !query.system_tags.is_empty() {
                items = items.filter(sql::<Bool>(&system_tags_any_of(&query.system_tags)));
            }

            match query.segment {
                Some((SpecialSegment::NeverOrdered, _)) => {
                    items = items.filter(customers::last_order_date.is_null());
                }
                Some((SpecialSegment::NoOrderHalfYear, now)) => {
                    items = items
                        .filter(customers::last_order_date.is_not_null())
                        .filter(customers::last_order_date.lt(half_year_before(now)));
                }
                None => {}
            }

            items
        };

        // Get the total count before applying pagination
        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items
            .order((customers::created_at.desc(), customers::id.desc()))
            .load::<DbCustomer>(&mut conn)?;

        Ok((total, into_domain(rows)?))
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(&self, customer: &NewCustomer) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let new_customer = DbNewCustomer::new(customer, local_now());
        let created = diesel::insert_into(customers::table)
            .values(&new_customer)
            .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(created).map_err(RepositoryError::from)
    }

    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        let insertables: Vec<DbNewCustomer> = new_customers
            .iter()
            .map(|c| DbNewCustomer::new(c, now))
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let mut affected = 0;
            for insertable in &insertables {
                affected += diesel::insert_into(customers::table)
                    .values(insertable)
                    .execute(conn)?;
            }
            Ok(affected)
        })
        .map_err(RepositoryError::from)
    }

    fn update_customer(
        &self,
        id: CustomerId,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let changeset = DbUpdateCustomer::new(updates, local_now());
        let updated = diesel::update(
            customers::table
                .filter(customers::id.eq(id.get()))
                .filter(customers::is_deleted.eq(false)),
        )
        .set(&changeset)
        .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(updated).map_err(RepositoryError::from)
    }

    fn update_customer_favors(&self, id: CustomerId, favors: &Value) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            customers::table
                .filter(customers::id.eq(id.get()))
                .filter(customers::is_deleted.eq(false)),
        )
        .set((
            customers::favors.eq(favors.to_string()),
            customers::updated_at.eq(local_now()),
        ))
        .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(updated).map_err(RepositoryError::from)
    }

    fn update_customer_remark(
        &self,
        id: CustomerId,
        remark: &str,
        updated_by: i32,
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            customers::table
                .filter(customers::id.eq(id.get()))
                .filter(customers::is_deleted.eq(false)),
        )
        .set((
            customers::remark.eq(remark),
            customers::updated_by.eq(updated_by),
            customers::updated_at.eq(local_now()),
        ))
        .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(updated).map_err(RepositoryError::from)
    }

    fn update_customer_system_tags(
        &self,
        id: CustomerId,
        system_tags: &[i32],
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            customers::table
                .filter(customers::id.eq(id.get()))
                .filter(customers::is_deleted.eq(false)),
        )
        .set((
            customers::system_tags.eq(encode_list(system_tags)),
            customers::updated_at.eq(local_now()),
        ))
        .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(updated).map_err(RepositoryError::from)
    }

    fn delete_customer(&self, id: CustomerId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let now = local_now();

        let affected = diesel::update(
            customers::table
                .filter(customers::id.eq(id.get()))
                .filter(customers::is_deleted.eq(false)),
        )
        .set((
            customers::is_deleted.eq(true),
            customers::deleted_at.eq(Some(now)),
            customers::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_tag_fragment_lists_ids() {
        assert_eq!(
            system_tags_any_of(&[1, 22]),
            "EXISTS (SELECT 1 FROM json_each(customers.system_tags) WHERE json_each.value IN (1,22))"
        );
    }
}
