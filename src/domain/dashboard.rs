//! Business filters and result grouping for the dashboard search.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{CustomerId, TypeConstraintError, UserId};
use crate::pagination::Pagination;

/// Customer-centric filter selected in the dashboard header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeFilter {
    /// 今日待跟进
    Today,
    /// 近期待跟进
    Upcoming,
    /// 从未联系
    NeverContacted,
    /// 从未下单
    NeverOrdered,
    /// 公海
    OpenSea,
    /// 不用跟进
    NoFollowUp,
    /// 黑名单
    Blacklist,
    /// 全部
    All,
}

impl FromStr for TimeFilter {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "今日待跟进" => Ok(Self::Today),
            "近期待跟进" => Ok(Self::Upcoming),
            "从未联系" => Ok(Self::NeverContacted),
            "从未下单" => Ok(Self::NeverOrdered),
            "公海" => Ok(Self::OpenSea),
            "不用跟进" => Ok(Self::NoFollowUp),
            "黑名单" => Ok(Self::Blacklist),
            "全部" | "" => Ok(Self::All),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown time filter: {other}"
            ))),
        }
    }
}

/// Todo-centric filter selected in the dashboard tabs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    /// 全部
    All,
    /// 待办
    DueToday,
    /// 定期
    Recurring,
    /// 已发样
    SampleSent,
    /// 已发货
    Shipped,
    /// 半年未下单
    NoOrderHalfYear,
    /// 一直未下单
    NeverOrdered,
}

impl FromStr for StatusFilter {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "全部" | "" => Ok(Self::All),
            "待办" => Ok(Self::DueToday),
            "定期" => Ok(Self::Recurring),
            "已发样" => Ok(Self::SampleSent),
            "已发货" => Ok(Self::Shipped),
            "半年未下单" => Ok(Self::NoOrderHalfYear),
            "一直未下单" => Ok(Self::NeverOrdered),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown status filter: {other}"
            ))),
        }
    }
}

/// Keyword a todo title must contain for the matching status filter.
pub const SAMPLE_SENT_MARKER: &str = "已发样";
pub const SHIPPED_MARKER: &str = "已发货";
/// Remark marker for customers that should not be followed up.
pub const NO_FOLLOW_UP_MARKER: &str = "不用跟进";
/// Customer tag marking a blacklisted customer.
pub const BLACKLIST_TAG: &str = "黑名单";

/// One row of the dashboard search before grouping.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardRow {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub contact_name: String,
    pub customer_tags: Vec<String>,
    pub last_called: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
    pub todo_content: String,
    pub planned_time: NaiveDateTime,
}

/// Todos of a single customer, collapsed into one dashboard line.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardGroup {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub contact_name: String,
    pub tags: Vec<String>,
    pub content: String,
    pub todo_count: usize,
    pub planned_time: NaiveDateTime,
    pub last_call_date: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
}

/// Search request after label parsing.
#[derive(Clone, Debug)]
pub struct DashboardQuery {
    pub user_id: UserId,
    pub time_filter: TimeFilter,
    pub status_filter: StatusFilter,
    /// `None` returns every match.
    pub pagination: Option<Pagination>,
}

/// Collapses rows ordered by planned time into per-customer groups, keeping
/// the order in which customers first appear.
pub fn group_by_customer(rows: Vec<DashboardRow>) -> Vec<DashboardGroup> {
    let mut groups: Vec<DashboardGroup> = Vec::new();
    let mut contents: Vec<Vec<String>> = Vec::new();

    for row in rows {
        match groups.iter().position(|g| g.customer_id == row.customer_id) {
            Some(index) => {
                groups[index].todo_count += 1;
                contents[index].push(row.todo_content);
            }
            None => {
                contents.push(vec![row.todo_content]);
                groups.push(DashboardGroup {
                    customer_id: row.customer_id,
                    customer_name: row.customer_name,
                    contact_name: row.contact_name,
                    tags: row.customer_tags,
                    content: String::new(),
                    todo_count: 1,
                    planned_time: row.planned_time,
                    last_call_date: row.last_called,
                    last_order_date: row.last_order_date,
                });
            }
        }
    }

    for (group, parts) in groups.iter_mut().zip(contents) {
        group.content = parts
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("，");
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(customer: i32, content: &str, hour: u32) -> DashboardRow {
        DashboardRow {
            customer_id: CustomerId::new(customer).unwrap(),
            customer_name: format!("客户{customer}"),
            contact_name: String::new(),
            customer_tags: vec![],
            last_called: None,
            last_order_date: None,
            todo_content: content.to_string(),
            planned_time: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn labels_parse() {
        assert_eq!("公海".parse::<TimeFilter>(), Ok(TimeFilter::OpenSea));
        assert_eq!("定期".parse::<StatusFilter>(), Ok(StatusFilter::Recurring));
        assert_eq!("".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert!("明天".parse::<TimeFilter>().is_err());
        assert!("已付款".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let rows = vec![
            row(2, "打电话", 9),
            row(1, "发样品", 10),
            row(2, "", 11),
            row(2, "确认报价", 12),
        ];
        let groups = group_by_customer(rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].customer_id.get(), 2);
        assert_eq!(groups[0].todo_count, 3);
        assert_eq!(groups[0].content, "打电话，确认报价");
        assert_eq!(groups[0].planned_time.format("%H").to_string(), "09");
        assert_eq!(groups[1].content, "发样品");
    }
}
