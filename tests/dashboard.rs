use crm_backend::domain::dashboard::{DashboardQuery, StatusFilter, TimeFilter};
use crm_backend::domain::reminder::{
    DEFAULT_MAX_RETRIES, NewReminder, ReminderFrequency, ReminderType,
};
use crm_backend::domain::todo::TodoStatus;
use crm_backend::domain::types::ReminderTitle;
use crm_backend::forms::dashboard::DashboardSearchForm;
use crm_backend::repository::{
    CustomerWriter, DashboardReader, ReminderWriter, TodoWriter,
};
use crm_backend::services::ServiceError;
use crm_backend::services::dashboard::search_dashboard;

mod common;

#[test]
fn test_dashboard_filters_and_grouping() {
    let test_db = common::TestDb::new("test_dashboard_filters_and_grouping.db");
    let repo = test_db.repo();
    let now = common::at(2024, 7, 10, 10, 0);

    let seller = common::seed_user(&repo, "Seller");
    let other = common::seed_user(&repo, "Other");

    let tea = common::seed_customer_with(&repo, "Tea House", |p| {
        p.contact_name = "Li".into();
        p.tags = vec!["黑名单".into()];
        p.last_called = Some(common::at(2024, 7, 1, 15, 0));
        p.sellers = vec![seller.id.get()];
    });
    let shoes = common::seed_customer_with(&repo, "Shoe Store", |p| {
        p.remark = "暂时不用跟进".into();
        p.last_order_date = Some(common::at(2024, 6, 20, 0, 0));
    });

    common::seed_todo(&repo, &tea, &seller, "寄样 已发样", common::at(2024, 7, 10, 9, 0));
    let recurring = common::seed_todo(&repo, &tea, &seller, "回访", common::at(2024, 7, 10, 16, 0));
    common::seed_todo(&repo, &shoes, &seller, "已发货 确认", common::at(2024, 7, 12, 9, 0));
    let mut done = common::seed_todo(&repo, &shoes, &seller, "结款", common::at(2024, 7, 9, 9, 0));
    done.status = TodoStatus::Completed;
    repo.save_todo(&done).unwrap();
    common::seed_todo(&repo, &tea, &other, "not mine", common::at(2024, 7, 10, 11, 0));

    repo.create_reminder(&NewReminder {
        todo_id: recurring.id,
        user_id: seller.id,
        reminder_type: ReminderType::Wechat,
        title: ReminderTitle::new("每周回访").unwrap(),
        content: String::new(),
        frequency: ReminderFrequency::Weekly,
        schedule_time: recurring.planned_time,
        max_retries: DEFAULT_MAX_RETRIES,
    })
    .unwrap();

    let search = |time_filter, status_filter| {
        repo.search_dashboard(
            &DashboardQuery {
                user_id: seller.id,
                time_filter,
                status_filter,
                pagination: None,
            },
            now,
        )
        .unwrap()
        .0
    };

    assert_eq!(search(TimeFilter::All, StatusFilter::All), 3);
    assert_eq!(search(TimeFilter::Today, StatusFilter::All), 2);
    assert_eq!(search(TimeFilter::Upcoming, StatusFilter::All), 1);
    assert_eq!(search(TimeFilter::NeverContacted, StatusFilter::All), 1);
    assert_eq!(search(TimeFilter::NeverOrdered, StatusFilter::All), 2);
    assert_eq!(search(TimeFilter::OpenSea, StatusFilter::All), 1);
    assert_eq!(search(TimeFilter::NoFollowUp, StatusFilter::All), 1);
    assert_eq!(search(TimeFilter::Blacklist, StatusFilter::All), 2);
    assert_eq!(search(TimeFilter::All, StatusFilter::DueToday), 2);
    assert_eq!(search(TimeFilter::All, StatusFilter::Recurring), 1);
    assert_eq!(search(TimeFilter::All, StatusFilter::SampleSent), 1);
    assert_eq!(search(TimeFilter::All, StatusFilter::Shipped), 1);
    assert_eq!(search(TimeFilter::All, StatusFilter::NoOrderHalfYear), 2);
    assert_eq!(search(TimeFilter::All, StatusFilter::NeverOrdered), 2);

    let form = DashboardSearchForm {
        time_filter: "全部".into(),
        status_filter: "全部".into(),
        show_all: true,
        ..Default::default()
    };
    let (total, entries) = search_dashboard(&repo, seller.id, form, now).unwrap();
    assert_eq!(total, 3);
    assert_eq!(entries.len(), 2);

    let first = &entries[0];
    assert_eq!(first.customer_id, tea.id);
    assert_eq!(first.contact_name, "Li");
    assert_eq!(first.todo_count, 2);
    assert_eq!(first.todo_contents, "寄样 已发样，回访");
    assert_eq!(first.planned_time, "2024-07-10 09:00");
    assert_eq!(first.last_call_time, "2024-07-01");
    assert_eq!(first.last_order_time, "");

    let second = &entries[1];
    assert_eq!(second.customer_id, shoes.id);
    assert_eq!(second.todo_count, 1);
    assert_eq!(second.last_order_time, "2024-06-20");
}

#[test]
fn test_dashboard_skips_deleted_customers() {
    let test_db = common::TestDb::new("test_dashboard_skips_deleted_customers.db");
    let repo = test_db.repo();
    let now = common::at(2024, 7, 10, 10, 0);
    let seller = common::seed_user(&repo, "Seller");
    let gone = common::seed_customer(&repo, "Gone");
    common::seed_todo(&repo, &gone, &seller, "回访", common::at(2024, 7, 10, 12, 0));

    repo.delete_customer(gone.id).unwrap();

    let form = DashboardSearchForm {
        show_all: true,
        ..Default::default()
    };
    let (total, entries) = search_dashboard(&repo, seller.id, form, now).unwrap();
    assert_eq!(total, 0);
    assert!(entries.is_empty());
}

#[test]
fn test_dashboard_rejects_unknown_labels() {
    let test_db = common::TestDb::new("test_dashboard_rejects_unknown_labels.db");
    let repo = test_db.repo();
    let seller = common::seed_user(&repo, "Seller");

    let form = DashboardSearchForm {
        time_filter: "明天".into(),
        ..Default::default()
    };
    let result = search_dashboard(&repo, seller.id, form, common::at(2024, 7, 10, 10, 0));
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}
