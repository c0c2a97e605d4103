#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crm_backend::db::{DbPool, establish_connection_pool, run_migrations};
use crm_backend::domain::customer::{Customer, CustomerProfile, NewCustomer};
use crm_backend::domain::todo::{NewTodo, Todo};
use crm_backend::domain::types::{CustomerName, TodoTitle, UserName};
use crm_backend::domain::user::{NewUser, User};
use crm_backend::repository::{CustomerWriter, DieselRepository, TodoWriter, UserWriter};

/// Migrated SQLite database living in a temporary directory.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let url = path.to_str().expect("utf-8 temp path").to_string();
        let pool = establish_connection_pool(&url).expect("open test database");
        run_migrations(&pool).expect("run migrations");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub fn seed_user(repo: &DieselRepository, name: &str) -> User {
    let user = NewUser::new(UserName::new(name).expect("valid name"));
    repo.create_user(&user).expect("create user")
}

pub fn seed_customer(repo: &DieselRepository, name: &str) -> Customer {
    seed_customer_with(repo, name, |_| {})
}

pub fn seed_customer_with(
    repo: &DieselRepository,
    name: &str,
    customize: impl FnOnce(&mut CustomerProfile),
) -> Customer {
    let mut profile = CustomerProfile::named(CustomerName::new(name).expect("valid name"));
    customize(&mut profile);
    repo.create_customer(&NewCustomer::new(profile, 1))
        .expect("create customer")
}

pub fn seed_todo(
    repo: &DieselRepository,
    customer: &Customer,
    executor: &User,
    title: &str,
    planned_time: NaiveDateTime,
) -> Todo {
    let mut todo = NewTodo::new(
        customer.id,
        executor.id,
        executor.id,
        TodoTitle::new(title).expect("valid title"),
        planned_time,
    );
    todo.content = title.to_string();
    repo.create_todo(&todo).expect("create todo")
}
