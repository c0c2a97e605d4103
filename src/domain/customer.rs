use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{CustomerId, CustomerName, TypeConstraintError};

/// Editable attributes of a customer shared by create and full-update flows.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    pub name: CustomerName,
    pub contact_name: String,
    pub gender: String,
    pub avatar: String,
    pub remark: String,
    pub source: String,
    pub phones: Vec<String>,
    pub wechats: Vec<String>,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub category: String,
    pub tags: Vec<String>,
    pub level: String,
    pub state: String,
    pub kind: String,
    /// Identifiers of the users selling to this customer.
    pub sellers: Vec<i32>,
    /// Identifiers of the tags attached by the system.
    pub system_tags: Vec<i32>,
    pub favors: Value,
    pub last_visited: Option<NaiveDateTime>,
    pub last_called: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
    pub import_source: String,
    pub saller_name: String,
}

impl CustomerProfile {
    /// Minimal profile carrying only a name; everything else empty.
    pub fn named(name: CustomerName) -> Self {
        Self {
            name,
            contact_name: String::new(),
            gender: String::new(),
            avatar: String::new(),
            remark: String::new(),
            source: String::new(),
            phones: Vec::new(),
            wechats: Vec::new(),
            province: String::new(),
            city: String::new(),
            district: String::new(),
            address: String::new(),
            category: String::new(),
            tags: Vec::new(),
            level: String::new(),
            state: String::new(),
            kind: String::new(),
            sellers: Vec::new(),
            system_tags: Vec::new(),
            favors: Value::Array(Vec::new()),
            last_visited: None,
            last_called: None,
            last_order_date: None,
            import_source: String::new(),
            saller_name: String::new(),
        }
    }

    /// Trims free-form fields and drops blank list entries.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        fn clean_list(items: Vec<String>) -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        }

        for field in [
            &mut self.contact_name,
            &mut self.gender,
            &mut self.remark,
            &mut self.source,
            &mut self.province,
            &mut self.city,
            &mut self.district,
            &mut self.address,
            &mut self.category,
            &mut self.level,
            &mut self.state,
            &mut self.kind,
            &mut self.import_source,
            &mut self.saller_name,
        ] {
            *field = field.trim().to_string();
        }
        self.phones = clean_list(self.phones);
        self.wechats = clean_list(self.wechats);
        self.tags = clean_list(self.tags);
        if self.favors.is_null() {
            self.favors = Value::Array(Vec::new());
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(flatten)]
    pub profile: CustomerProfile,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Customer {
    pub fn name(&self) -> &str {
        self.profile.name.as_str()
    }
}

#[derive(Clone, Debug)]
pub struct NewCustomer {
    pub profile: CustomerProfile,
    pub created_by: i32,
}

impl NewCustomer {
    #[must_use]
    pub fn new(profile: CustomerProfile, created_by: i32) -> Self {
        Self {
            profile: profile.normalized(),
            created_by,
        }
    }
}

/// Full replacement of a customer's editable attributes.
#[derive(Clone, Debug)]
pub struct UpdateCustomer {
    pub profile: CustomerProfile,
    pub updated_by: i32,
}

impl UpdateCustomer {
    #[must_use]
    pub fn new(profile: CustomerProfile, updated_by: i32) -> Self {
        Self {
            profile: profile.normalized(),
            updated_by,
        }
    }
}

/// Segments served by `GET /customers/special`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialSegment {
    /// An order was recorded, but the last one is older than six months.
    NoOrderHalfYear,
    /// No order was ever recorded.
    NeverOrdered,
}

impl std::str::FromStr for SpecialSegment {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_order_half_year" => Ok(Self::NoOrderHalfYear),
            "never_ordered" => Ok(Self::NeverOrdered),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown customer segment: {other}"
            ))),
        }
    }
}

/// Moment six calendar months before `now`, clamped to month end.
pub fn half_year_before(now: NaiveDateTime) -> NaiveDateTime {
    now.checked_sub_months(chrono::Months::new(6)).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn normalized_trims_and_drops_blank_entries() {
        let mut profile = CustomerProfile::named(CustomerName::new("Shop").expect("valid name"));
        profile.phones = vec![" 138 ".into(), "  ".into()];
        profile.city = "  杭州 ".into();
        profile.favors = Value::Null;

        let new = NewCustomer::new(profile, 1);
        assert_eq!(new.profile.phones, vec!["138".to_string()]);
        assert_eq!(new.profile.city, "杭州");
        assert_eq!(new.profile.favors, Value::Array(vec![]));
    }

    #[test]
    fn segment_parsing() {
        assert_eq!(
            "never_ordered".parse::<SpecialSegment>(),
            Ok(SpecialSegment::NeverOrdered)
        );
        assert!("vip".parse::<SpecialSegment>().is_err());
    }

    #[test]
    fn half_year_clamps_to_month_end() {
        let now = NaiveDate::from_ymd_opt(2024, 8, 31)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(half_year_before(now), expected);
    }
}
