//! Diesel models representing customers.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, CustomerProfile, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};
use crate::domain::types::{CustomerId, CustomerName, TypeConstraintError};
use crate::models::{decode_or_default, decode_value, encode_list};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
/// Diesel model for [`crate::domain::customer::Customer`].
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub contact_name: String,
    pub gender: String,
    pub avatar: String,
    pub remark: String,
    pub source: String,
    pub phones: String,
    pub wechats: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub category: String,
    pub tags: String,
    pub level: String,
    pub state: String,
    pub kind: String,
    pub sellers: String,
    pub system_tags: String,
    pub favors: String,
    pub last_visited: Option<NaiveDateTime>,
    pub last_called: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
    pub import_source: String,
    pub saller_name: String,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
/// Insertable form of [`Customer`].
pub struct NewCustomer<'a> {
    pub name: &'a str,
    pub contact_name: &'a str,
    pub gender: &'a str,
    pub avatar: &'a str,
    pub remark: &'a str,
    pub source: &'a str,
    pub phones: String,
    pub wechats: String,
    pub province: &'a str,
    pub city: &'a str,
    pub district: &'a str,
    pub address: &'a str,
    pub category: &'a str,
    pub tags: String,
    pub level: &'a str,
    pub state: &'a str,
    pub kind: &'a str,
    pub sellers: String,
    pub system_tags: String,
    pub favors: String,
    pub last_visited: Option<NaiveDateTime>,
    pub last_called: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
    pub import_source: &'a str,
    pub saller_name: &'a str,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewCustomer<'a> {
    pub fn new(customer: &'a DomainNewCustomer, now: NaiveDateTime) -> Self {
        let profile = &customer.profile;
        Self {
            name: profile.name.as_str(),
            contact_name: &profile.contact_name,
            gender: &profile.gender,
            avatar: &profile.avatar,
            remark: &profile.remark,
            source: &profile.source,
            phones: encode_list(&profile.phones),
            wechats: encode_list(&profile.wechats),
            province: &profile.province,
            city: &profile.city,
            district: &profile.district,
            address: &profile.address,
            category: &profile.category,
            tags: encode_list(&profile.tags),
            level: &profile.level,
            state: &profile.state,
            kind: &profile.kind,
            sellers: encode_list(&profile.sellers),
            system_tags: encode_list(&profile.system_tags),
            favors: profile.favors.to_string(),
            last_visited: profile.last_visited,
            last_called: profile.last_called,
            last_order_date: profile.last_order_date,
            import_source: &profile.import_source,
            saller_name: &profile.saller_name,
            created_by: customer.created_by,
            updated_by: customer.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(treat_none_as_null = true)]
/// Full replacement of a [`Customer`] record; `created_*` stay untouched.
pub struct UpdateCustomer<'a> {
    pub name: &'a str,
    pub contact_name: &'a str,
    pub gender: &'a str,
    pub avatar: &'a str,
    pub remark: &'a str,
    pub source: &'a str,
    pub phones: String,
    pub wechats: String,
    pub province: &'a str,
    pub city: &'a str,
    pub district: &'a str,
    pub address: &'a str,
    pub category: &'a str,
    pub tags: String,
    pub level: &'a str,
    pub state: &'a str,
    pub kind: &'a str,
    pub sellers: String,
    pub system_tags: String,
    pub favors: String,
    pub last_visited: Option<NaiveDateTime>,
    pub last_called: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
    pub import_source: &'a str,
    pub saller_name: &'a str,
    pub updated_by: i32,
    pub updated_at: NaiveDateTime,
}

impl<'a> UpdateCustomer<'a> {
    pub fn new(customer: &'a DomainUpdateCustomer, now: NaiveDateTime) -> Self {
        let profile = &customer.profile;
        Self {
            name: profile.name.as_str(),
            contact_name: &profile.contact_name,
            gender: &profile.gender,
            avatar: &profile.avatar,
            remark: &profile.remark,
            source: &profile.source,
            phones: encode_list(&profile.phones),
            wechats: encode_list(&profile.wechats),
            province: &profile.province,
            city: &profile.city,
            district: &profile.district,
            address: &profile.address,
            category: &profile.category,
            tags: encode_list(&profile.tags),
            level: &profile.level,
            state: &profile.state,
            kind: &profile.kind,
            sellers: encode_list(&profile.sellers),
            system_tags: encode_list(&profile.system_tags),
            favors: profile.favors.to_string(),
            last_visited: profile.last_visited,
            last_called: profile.last_called,
            last_order_date: profile.last_order_date,
            import_source: &profile.import_source,
            saller_name: &profile.saller_name,
            updated_by: customer.updated_by,
            updated_at: now,
        }
    }
}

impl TryFrom<Customer> for DomainCustomer {
    type Error = TypeConstraintError;

    fn try_from(customer: Customer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CustomerId::try_from(customer.id)?,
            profile: CustomerProfile {
                name: CustomerName::new(customer.name)?,
                contact_name: customer.contact_name,
                gender: customer.gender,
                avatar: customer.avatar,
                remark: customer.remark,
                source: customer.source,
                phones: decode_or_default(&customer.phones),
                wechats: decode_or_default(&customer.wechats),
                province: customer.province,
                city: customer.city,
                district: customer.district,
                address: customer.address,
                category: customer.category,
                tags: decode_or_default(&customer.tags),
                level: customer.level,
                state: customer.state,
                kind: customer.kind,
                sellers: decode_or_default(&customer.sellers),
                system_tags: decode_or_default(&customer.system_tags),
                favors: decode_value(&customer.favors),
                last_visited: customer.last_visited,
                last_called: customer.last_called,
                last_order_date: customer.last_order_date,
                import_source: customer.import_source,
                saller_name: customer.saller_name,
            },
            created_by: customer.created_by,
            updated_by: customer.updated_by,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn from_domain_new_encodes_lists() {
        let mut profile =
            CustomerProfile::named(CustomerName::new("茶行").expect("valid customer name"));
        profile.phones = vec!["13800000000".into()];
        profile.sellers = vec![3, 4];
        profile.favors = json!(["绿茶"]);
        let domain = DomainNewCustomer::new(profile, 7);

        let new = NewCustomer::new(&domain, now());
        assert_eq!(new.name, "茶行");
        assert_eq!(new.phones, r#"["13800000000"]"#);
        assert_eq!(new.sellers, "[3,4]");
        assert_eq!(new.favors, r#"["绿茶"]"#);
        assert_eq!(new.created_by, 7);
        assert_eq!(new.updated_by, 7);
    }

    #[test]
    fn from_db_into_domain() {
        let db = Customer {
            id: 5,
            name: "茶行".into(),
            contact_name: "老王".into(),
            gender: String::new(),
            avatar: String::new(),
            remark: String::new(),
            source: String::new(),
            phones: r#"["1"]"#.into(),
            wechats: "[]".into(),
            province: String::new(),
            city: String::new(),
            district: String::new(),
            address: String::new(),
            category: String::new(),
            tags: r#"["黑名单"]"#.into(),
            level: String::new(),
            state: String::new(),
            kind: String::new(),
            sellers: "garbage".into(),
            system_tags: "[9]".into(),
            favors: "[]".into(),
            last_visited: None,
            last_called: None,
            last_order_date: None,
            import_source: String::new(),
            saller_name: String::new(),
            created_by: 1,
            updated_by: 1,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
            is_deleted: false,
        };
        let domain = DomainCustomer::try_from(db).expect("valid customer");
        assert_eq!(domain.id.get(), 5);
        assert_eq!(domain.profile.phones, vec!["1".to_string()]);
        assert_eq!(domain.profile.tags, vec!["黑名单".to_string()]);
        assert!(domain.profile.sellers.is_empty());
        assert_eq!(domain.profile.system_tags, vec![9]);
    }
}
