//! Filtered views over a list of [`ServerRecord`]s.
//!
//! Everything here is pure: the views borrow from the records they were derived from and
//! never change them. A full scan is done for every query.

use clap::ValueEnum;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::repository::{ServerRecord, Status};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
    Maintenance,
}

impl StatusFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Online => status == Status::Online,
            Self::Offline => status == Status::Offline,
            Self::Maintenance => status == Status::Maintenance,
        }
    }
}

impl From<Status> for StatusFilter {
    fn from(status: Status) -> Self {
        match status {
            Status::Online => Self::Online,
            Status::Offline => Self::Offline,
            Status::Maintenance => Self::Maintenance,
        }
    }
}

/// The search term and status filter that decide which records are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCriteria {
    pub search_term: String,
    pub status_filter: StatusFilter,
}

impl QueryCriteria {
    pub fn new(search_term: impl Into<String>, status_filter: StatusFilter) -> Self {
        Self {
            search_term: search_term.into(),
            status_filter,
        }
    }

    /// Whether these criteria can hide any record at all.
    pub fn is_narrowed(&self) -> bool {
        !self.search_term.is_empty() || self.status_filter != StatusFilter::All
    }

    pub fn matches(&self, record: &ServerRecord) -> bool {
        self.matches_text(record) && self.status_filter.matches(*record.status())
    }

    /// Name, location, purpose and usernames match case-insensitively. The IP address only
    /// matches the term as typed.
    fn matches_text(&self, record: &ServerRecord) -> bool {
        if self.search_term.is_empty() {
            return true;
        }

        let term = self.search_term.to_lowercase();

        [
            record.name(),
            record.location(),
            record.purpose(),
            record.usernames(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
            || record.ip_address().contains(&self.search_term)
    }
}

/// Records matching `criteria`, in their original order.
pub fn filter<'a>(records: &'a [ServerRecord], criteria: &QueryCriteria) -> Vec<&'a ServerRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// Number of records in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub maintenance: usize,
}

pub fn count_by_status(records: &[ServerRecord]) -> StatusCounts {
    records
        .iter()
        .fold(StatusCounts::default(), |mut counts, record| {
            counts.total += 1;
            match record.status() {
                Status::Online => counts.online += 1,
                Status::Offline => counts.offline += 1,
                Status::Maintenance => counts.maintenance += 1,
            }
            counts
        })
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::repository::{RecordId, ServerFormData, seed};

    fn names<'a>(records: &[&'a ServerRecord]) -> Vec<&'a str> {
        records.iter().map(|r| r.name().as_str()).collect()
    }

    fn records() -> Vec<ServerRecord> {
        seed::records(Utc::now())
    }

    #[test]
    fn test_filter_by_name() {
        let records = records();

        let visible = filter(&records, &QueryCriteria::new("web", StatusFilter::All));

        assert_eq!(names(&visible), vec!["Web Server 01"]);
    }

    #[test]
    fn test_filter_by_status() {
        let records = records();

        let visible = filter(&records, &QueryCriteria::new("", StatusFilter::Online));

        assert_eq!(names(&visible), vec!["Web Server 01", "Database Server 01"]);
    }

    #[test]
    fn test_filter_matches_all() {
        let records = records();

        let visible = filter(&records, &QueryCriteria::new("server", StatusFilter::All));

        assert_eq!(visible.len(), 3);
        assert_eq!(filter(&records, &QueryCriteria::default()).len(), 3);
    }

    #[test]
    fn test_filter_combines_text_and_status() {
        let records = records();

        let visible = filter(
            &records,
            &QueryCriteria::new("server", StatusFilter::Maintenance),
        );
        assert_eq!(names(&visible), vec!["Dev Server 01"]);

        let visible = filter(&records, &QueryCriteria::new("web", StatusFilter::Offline));
        assert!(visible.is_empty());
    }

    #[test]
    fn test_filter_text_fields() {
        let records = records();

        for (term, expected) in [
            ("RACK 15", "Database Server 01"),
            ("postgresql", "Database Server 01"),
            ("Tester", "Dev Server 01"),
            ("192.168.2", "Dev Server 01"),
        ] {
            let visible = filter(&records, &QueryCriteria::new(term, StatusFilter::All));
            assert_eq!(names(&visible), vec![expected], "term {term:?}");
        }
    }

    #[test]
    fn test_filter_ip_is_case_sensitive() {
        let mut data = ServerFormData::from(records().first().unwrap());
        data.name = "Edge".into();
        data.location = "Colo".into();
        data.purpose = "Proxy".into();
        data.usernames = String::new();
        data.ip_address = "fe80::ABCD".into();
        let record = ServerRecord::new(RecordId::from("9"), data, Utc::now());
        let records = vec![record];

        assert_eq!(filter(&records, &QueryCriteria::new("ABCD", StatusFilter::All)).len(), 1);
        assert!(filter(&records, &QueryCriteria::new("abcd", StatusFilter::All)).is_empty());
    }

    #[test]
    fn test_filter_preserves_order() {
        let mut records = records();
        records.reverse();

        let visible = filter(&records, &QueryCriteria::new("", StatusFilter::Online));

        assert_eq!(names(&visible), vec!["Database Server 01", "Web Server 01"]);
    }

    #[test]
    fn test_count_by_status() {
        assert_eq!(
            count_by_status(&records()),
            StatusCounts {
                total: 3,
                online: 2,
                offline: 0,
                maintenance: 1,
            }
        );
        assert_eq!(count_by_status(&[]), StatusCounts::default());
    }

    #[test]
    fn test_is_narrowed() {
        assert!(!QueryCriteria::default().is_narrowed());
        assert!(QueryCriteria::new("db", StatusFilter::All).is_narrowed());
        assert!(QueryCriteria::new("", StatusFilter::Offline).is_narrowed());
    }

    #[test]
    fn test_status_filter() {
        for status in Status::iter() {
            assert!(StatusFilter::All.matches(status));
            assert!(StatusFilter::from(status).matches(status));
        }
        assert!(!StatusFilter::Online.matches(Status::Maintenance));
        assert_eq!("maintenance".parse::<StatusFilter>().unwrap(), StatusFilter::Maintenance);
        assert_eq!(StatusFilter::All.to_string(), "all");
    }
}
