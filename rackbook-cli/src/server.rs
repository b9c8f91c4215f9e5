use clap::{Args, Subcommand};
use dialoguer::Confirm;
use rackbook_lib::{
    QueryCriteria, RecordId, RecordStore, ServerFormData, Status, StatusFilter, Storage,
    ValidationError, query,
};
use thiserror::Error;

use crate::render;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] rackbook_lib::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Confirmation prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn exit_code(&self) -> sysexits::ExitCode {
        use rackbook_lib::Error as StoreError;
        use sysexits::ExitCode;

        match self {
            Self::Store(
                StoreError::NotFound(_)
                | StoreError::UnsupportedVersion { .. }
                | StoreError::Deserialization(_),
            )
            | Self::Validation(_) => ExitCode::DataErr,
            Self::Store(StoreError::Config(_)) => ExitCode::Config,
            Self::Store(_) | Self::Prompt(_) => ExitCode::IoErr,
            Self::Json(_) => ExitCode::Software,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List servers, optionally narrowed by a search term and status
    List {
        /// Match against name, location, IP address, purpose and usernames
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Print the matching records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every field of one server
    Show { id: String },
    /// Add a new server
    Add(NewServer),
    /// Change fields of an existing server. Fields that aren't given keep their value.
    Edit {
        id: String,
        #[command(flatten)]
        changes: ServerChanges,
    },
    /// Remove a server
    Remove {
        id: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Count servers by status
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct NewServer {
    #[arg(long)]
    name: String,
    #[arg(long)]
    location: String,
    #[arg(long = "ip")]
    ip_address: String,
    #[arg(long = "os")]
    operating_system: String,
    #[arg(long)]
    cpu: String,
    #[arg(long)]
    ram: String,
    #[arg(long)]
    storage: String,
    #[arg(long)]
    purpose: String,
    #[arg(long, value_enum, default_value_t = Status::Offline)]
    status: Status,
    /// Comma separated login names
    #[arg(long, default_value = "")]
    usernames: String,
    #[arg(long)]
    notes: Option<String>,
}

impl From<NewServer> for ServerFormData {
    fn from(args: NewServer) -> Self {
        Self {
            name: args.name,
            location: args.location,
            ip_address: args.ip_address,
            operating_system: args.operating_system,
            cpu: args.cpu,
            ram: args.ram,
            storage: args.storage,
            status: args.status,
            purpose: args.purpose,
            usernames: args.usernames,
            notes: args.notes,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServerChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long = "ip")]
    ip_address: Option<String>,
    #[arg(long = "os")]
    operating_system: Option<String>,
    #[arg(long)]
    cpu: Option<String>,
    #[arg(long)]
    ram: Option<String>,
    #[arg(long)]
    storage: Option<String>,
    #[arg(long)]
    purpose: Option<String>,
    #[arg(long, value_enum)]
    status: Option<Status>,
    #[arg(long)]
    usernames: Option<String>,
    /// Replace the notes. An empty value clears them.
    #[arg(long)]
    notes: Option<String>,
}

impl ServerChanges {
    /// Overlay the given fields on top of `data`.
    fn apply_to(self, mut data: ServerFormData) -> ServerFormData {
        fn set(field: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        set(&mut data.name, self.name);
        set(&mut data.location, self.location);
        set(&mut data.ip_address, self.ip_address);
        set(&mut data.operating_system, self.operating_system);
        set(&mut data.cpu, self.cpu);
        set(&mut data.ram, self.ram);
        set(&mut data.storage, self.storage);
        set(&mut data.purpose, self.purpose);
        set(&mut data.usernames, self.usernames);
        if let Some(status) = self.status {
            data.status = status;
        }
        if let Some(notes) = self.notes {
            data.notes = (!notes.is_empty()).then_some(notes);
        }

        data
    }
}

pub fn handle<S: Storage>(store: &mut RecordStore<S>, cmd: &Command) -> Result<(), Error> {
    match cmd {
        Command::List {
            search,
            status,
            json,
        } => {
            let criteria = QueryCriteria::new(search.as_str(), *status);
            let visible = query::filter(store.records(), &criteria);

            if *json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                render::list(&visible, &criteria);
            }
        }
        Command::Show { id } => {
            let id = RecordId::from(id.as_str());
            let record = store
                .get(&id)
                .ok_or_else(|| rackbook_lib::Error::NotFound(id.clone()))?;

            render::detail(record);
        }
        Command::Add(args) => {
            let data = ServerFormData::from(args.clone());
            data.validate()?;

            let record = store.create(data)?;

            println!("Added server {} ({})", record.name(), record.id());
        }
        Command::Edit { id, changes } => {
            let id = RecordId::from(id.as_str());
            let current = store
                .get(&id)
                .ok_or_else(|| rackbook_lib::Error::NotFound(id.clone()))?;

            let data = changes.clone().apply_to(ServerFormData::from(current));
            data.validate()?;

            let record = store.update(&id, data)?;

            println!("Updated server {} ({})", record.name(), record.id());
        }
        Command::Remove { id, yes } => {
            let id = RecordId::from(id.as_str());
            let Some(record) = store.get(&id) else {
                println!("No server with id '{id}', nothing to remove");
                return Ok(());
            };

            let confirmed = *yes
                || Confirm::new()
                    .with_prompt(format!("Remove server {} ({id})?", record.name()))
                    .default(false)
                    .interact()?;

            if confirmed {
                if let Some(removed) = store.delete(&id)? {
                    println!("Removed server {} ({})", removed.name(), removed.id());
                }
            }
        }
        Command::Stats { json } => {
            let counts = query::count_by_status(store.records());

            if *json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                render::stats(&counts);
            }
        }
    }

    Ok(())
}
