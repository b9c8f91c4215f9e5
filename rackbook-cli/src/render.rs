use chrono::Local;
use colored::{ColoredString, Colorize};
use rackbook_lib::{QueryCriteria, ServerRecord, Status, StatusCounts};

fn status(status: Status) -> ColoredString {
    match status {
        Status::Online => "Online".green(),
        Status::Offline => "Offline".red(),
        Status::Maintenance => "Maintenance".yellow(),
    }
}

pub fn list(records: &[&ServerRecord], criteria: &QueryCriteria) {
    if records.is_empty() {
        if criteria.is_narrowed() {
            println!("No servers found. Try adjusting your search or filter criteria.");
        } else {
            println!("No servers found. Get started with `rackbook add`.");
        }
        return;
    }

    for record in records {
        println!(
            "{:>6}  {:<11}  {:<28}  {:<15}  {}",
            record.id().to_string().dimmed(),
            status(*record.status()),
            record.name().bold(),
            record.ip_address(),
            record.location(),
        );
    }
}

pub fn detail(record: &ServerRecord) {
    let users = record.usernames_list();
    let users = if users.is_empty() {
        "No users specified".to_string()
    } else {
        users.join(", ")
    };

    println!("{} {}", record.name().bold(), format!("({})", record.id()).dimmed());
    println!("  Status:           {}", status(*record.status()));
    println!("  Location:         {}", record.location());
    println!("  IP address:       {}", record.ip_address());
    println!("  Operating system: {}", record.operating_system());
    println!("  CPU:              {}", record.cpu());
    println!("  Memory/storage:   {} RAM, {}", record.ram(), record.storage());
    println!("  Purpose:          {}", record.purpose());
    println!("  Users:            {users}");
    if let Some(notes) = record.notes().as_deref().filter(|n| !n.is_empty()) {
        println!("  Notes:            {notes}");
    }
    println!(
        "  Last updated:     {}",
        record
            .last_updated()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
}

pub fn stats(counts: &StatusCounts) {
    println!("Total servers: {}", counts.total.to_string().bold());
    println!("{:<12} {}", status(Status::Online), counts.online);
    println!("{:<12} {}", status(Status::Offline), counts.offline);
    println!("{:<12} {}", status(Status::Maintenance), counts.maintenance);
}
