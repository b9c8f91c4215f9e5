use chrono::{DateTime, TimeDelta, Utc};

use crate::repository::records::{ServerFormData, ServerRecord, Status};

/// The example records a store is initialized with when nothing has been persisted yet.
pub(crate) fn records(now: DateTime<Utc>) -> Vec<ServerRecord> {
    vec![
        ServerRecord::new(
            "1".into(),
            ServerFormData {
                name: "Web Server 01".into(),
                location: "Data Center A - Rack 12".into(),
                ip_address: "192.168.1.100".into(),
                operating_system: "Ubuntu 22.04 LTS".into(),
                cpu: "Intel Xeon E5-2690 v4 (14 cores)".into(),
                ram: "64GB DDR4".into(),
                storage: "2TB NVMe SSD".into(),
                status: Status::Online,
                purpose: "Primary web server for production applications".into(),
                usernames: "admin, webmaster, deploy".into(),
                notes: Some("Recently upgraded with additional memory modules".into()),
            },
            now,
        ),
        ServerRecord::new(
            "2".into(),
            ServerFormData {
                name: "Database Server 01".into(),
                location: "Data Center A - Rack 15".into(),
                ip_address: "192.168.1.101".into(),
                operating_system: "CentOS 8".into(),
                cpu: "AMD EPYC 7742 (64 cores)".into(),
                ram: "128GB DDR4".into(),
                storage: "4TB NVMe SSD RAID 10".into(),
                status: Status::Online,
                purpose: "Primary database server (PostgreSQL cluster)".into(),
                usernames: "admin, dbadmin, backup".into(),
                notes: Some("Configured with automated backups every 6 hours".into()),
            },
            now - TimeDelta::days(1),
        ),
        ServerRecord::new(
            "3".into(),
            ServerFormData {
                name: "Dev Server 01".into(),
                location: "Data Center B - Rack 5".into(),
                ip_address: "192.168.2.50".into(),
                operating_system: "Ubuntu 20.04 LTS".into(),
                cpu: "Intel Core i7-10700K (8 cores)".into(),
                ram: "32GB DDR4".into(),
                storage: "1TB SATA SSD".into(),
                status: Status::Maintenance,
                purpose: "Development and testing environment".into(),
                usernames: "admin, developer, tester".into(),
                notes: Some("Scheduled for OS upgrade to Ubuntu 22.04".into()),
            },
            now - TimeDelta::days(2),
        ),
    ]
}
