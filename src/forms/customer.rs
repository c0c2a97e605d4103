use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::customer::{Customer, CustomerProfile, NewCustomer};
use crate::domain::types::CustomerName;
use crate::forms::{FormError, parse_optional_datetime};

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /customers` and `PUT /customers/{id}`.
pub struct CustomerForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub wechats: Vec<String>,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub sellers: Vec<i32>,
    #[serde(default)]
    pub system_tags: Vec<i32>,
    #[serde(default)]
    pub favors: Value,
    pub last_visited: Option<String>,
    pub last_called: Option<String>,
    pub last_order_date: Option<String>,
    #[serde(default)]
    pub import_source: String,
    #[serde(default)]
    pub saller_name: String,
}

impl TryFrom<CustomerForm> for CustomerProfile {
    type Error = FormError;

    fn try_from(form: CustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: CustomerName::new(form.name)?,
            contact_name: form.contact_name,
            gender: form.gender,
            avatar: form.avatar,
            remark: form.remark,
            source: form.source,
            phones: form.phones,
            wechats: form.wechats,
            province: form.province,
            city: form.city,
            district: form.district,
            address: form.address,
            category: form.category,
            tags: form.tags,
            level: form.level,
            state: form.state,
            kind: form.kind,
            sellers: form.sellers,
            system_tags: form.system_tags,
            favors: form.favors,
            last_visited: parse_optional_datetime(form.last_visited.as_deref())?,
            last_called: parse_optional_datetime(form.last_called.as_deref())?,
            last_order_date: parse_optional_datetime(form.last_order_date.as_deref())?,
            import_source: form.import_source,
            saller_name: form.saller_name,
        }
        .normalized())
    }
}

#[derive(Debug, Deserialize)]
pub struct FavorsForm {
    pub favors: Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemarkForm {
    #[validate(length(max = 2000))]
    pub remark: String,
}

#[derive(Debug, Deserialize)]
pub struct SystemTagsForm {
    pub system_tags: Vec<i32>,
}

#[derive(Debug, Default, Deserialize)]
/// Body of `POST /customers/search`.
pub struct CustomerSearchForm {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub system_tags: Vec<i32>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One line of the customer CSV, shared by import and export.
///
/// List columns hold `;` separated values.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CustomerCsvRecord {
    pub name: String,
    pub contact_name: String,
    pub gender: String,
    pub phones: String,
    pub wechats: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub category: String,
    pub level: String,
    pub state: String,
    pub kind: String,
    pub tags: String,
    pub source: String,
    pub remark: String,
    pub saller_name: String,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split([';', '；'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl CustomerCsvRecord {
    pub fn into_profile(self, import_source: &str) -> Result<CustomerProfile, FormError> {
        let mut profile = CustomerProfile::named(CustomerName::new(self.name)?);
        profile.contact_name = self.contact_name;
        profile.gender = self.gender;
        profile.phones = split_list(&self.phones);
        profile.wechats = split_list(&self.wechats);
        profile.province = self.province;
        profile.city = self.city;
        profile.district = self.district;
        profile.address = self.address;
        profile.category = self.category;
        profile.level = self.level;
        profile.state = self.state;
        profile.kind = self.kind;
        profile.tags = split_list(&self.tags);
        profile.source = self.source;
        profile.remark = self.remark;
        profile.saller_name = self.saller_name;
        profile.import_source = import_source.to_string();
        Ok(profile)
    }
}

impl From<&Customer> for CustomerCsvRecord {
    fn from(customer: &Customer) -> Self {
        let p = &customer.profile;
        Self {
            name: p.name.to_string(),
            contact_name: p.contact_name.clone(),
            gender: p.gender.clone(),
            phones: p.phones.join(";"),
            wechats: p.wechats.join(";"),
            province: p.province.clone(),
            city: p.city.clone(),
            district: p.district.clone(),
            address: p.address.clone(),
            category: p.category.clone(),
            level: p.level.clone(),
            state: p.state.clone(),
            kind: p.kind.clone(),
            tags: p.tags.join(";"),
            source: p.source.clone(),
            remark: p.remark.clone(),
            saller_name: p.saller_name.clone(),
        }
    }
}

/// Parses CSV text into new customers. Rows with a blank name are skipped.
pub fn parse_customers_csv<R: Read>(
    reader: R,
    created_by: i32,
    import_source: &str,
) -> Result<Vec<NewCustomer>, FormError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut customers = Vec::new();

    for (line, record) in rdr.deserialize::<CustomerCsvRecord>().enumerate() {
        let record = record.map_err(|e| FormError::InvalidCsv(format!("row {}: {e}", line + 1)))?;
        if record.name.trim().is_empty() {
            continue;
        }
        let profile = record.into_profile(import_source)?;
        customers.push(NewCustomer::new(profile, created_by));
    }

    Ok(customers)
}

#[derive(MultipartForm)]
/// Multipart body of `POST /customers/import`.
pub struct ImportCustomersForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

impl ImportCustomersForm {
    pub fn parse(&self, created_by: i32) -> Result<Vec<NewCustomer>, FormError> {
        let source = self.file.file_name.as_deref().unwrap_or("csv");
        let file = self
            .file
            .file
            .reopen()
            .map_err(|e| FormError::InvalidCsv(e.to_string()))?;
        parse_customers_csv(file, created_by, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_become_customers() {
        let csv = "name,contact_name,phones,tags\n\
                   阿里小店,王五,138;139,VIP；老客户\n\
                   ,空行,,\n";
        let customers = parse_customers_csv(csv.as_bytes(), 7, "import.csv").expect("valid csv");
        assert_eq!(customers.len(), 1);
        let profile = &customers[0].profile;
        assert_eq!(profile.name.as_str(), "阿里小店");
        assert_eq!(profile.phones, vec!["138", "139"]);
        assert_eq!(profile.tags, vec!["VIP", "老客户"]);
        assert_eq!(profile.import_source, "import.csv");
        assert_eq!(customers[0].created_by, 7);
    }

    #[test]
    fn form_requires_a_name() {
        let form: CustomerForm = serde_json::from_str(r#"{"name": ""}"#).expect("valid json");
        assert!(CustomerProfile::try_from(form).is_err());
    }

    #[test]
    fn form_parses_dates() {
        let form: CustomerForm = serde_json::from_str(
            r#"{"name": "门店", "last_order_date": "2024-01-02 10:00:00", "last_called": ""}"#,
        )
        .expect("valid json");
        let profile = CustomerProfile::try_from(form).expect("valid form");
        assert!(profile.last_order_date.is_some());
        assert!(profile.last_called.is_none());
        assert_eq!(profile.favors, Value::Array(vec![]));
    }
}
