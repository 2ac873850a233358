use clap::{Args, Parser, Subcommand, ValueEnum};
use estate_portal::domain::RequestStatus;
use estate_portal::{telemetry, PortalConfig, PortalError};

use crate::commands;
use crate::infra::AppContext;

#[derive(Parser, Debug)]
#[command(
    name = "estate-portal",
    about = "Browse and manage the estate brokerage portal from the command line",
    version
)]
struct Cli {
    /// Bearer token for authenticated endpoints
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Property listings
    Estates {
        #[command(subcommand)]
        command: EstatesCommand,
    },
    /// Server notifications and their local read markers
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommand,
    },
    /// Booking calendar
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
    /// Inbound estate requests
    Requests {
        #[command(subcommand)]
        command: RequestsCommand,
    },
    /// Persisted UI preferences
    Preferences {
        #[command(subcommand)]
        command: PreferencesCommand,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum EstatesCommand {
    /// Show one page of listings
    List(EstateListArgs),
    /// Show a single listing
    Show { id: String },
    /// Walk the listing pages as an infinite list
    Browse(BrowseArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct EstateListArgs {
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: u32,
    /// Free-text search over title and address
    #[arg(long)]
    pub(crate) search: Option<String>,
    #[arg(long)]
    pub(crate) category: Option<String>,
    #[arg(long)]
    pub(crate) region: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct BrowseArgs {
    /// Items per page
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: u32,
    /// Stop after this many pages even if more exist
    #[arg(long, default_value_t = 5)]
    pub(crate) max_pages: usize,
}

#[derive(Subcommand, Debug)]
pub(crate) enum NotificationsCommand {
    /// List notifications with read markers
    List(BrowseArgs),
    /// Mark one notification read
    Read { id: String },
    /// Mark one notification unread
    Unread { id: String },
    /// Mark every loaded notification read
    ReadAll(BrowseArgs),
    /// Drop read markers older than the retention window
    Prune {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Forget every read marker
    Reset,
    /// Follow the live notification feed
    Watch,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SessionsCommand {
    /// Sessions of one month grouped by day (defaults to the current month)
    Month {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = crate::infra::parse_month)]
        month: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum RequestsCommand {
    /// List requests, optionally filtered by status
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum PreferencesCommand {
    /// Flip the collapsed state of the sidebar
    ToggleSidebar,
    /// Print the stored preferences
    Show,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum StatusArg {
    Pending,
    Accepted,
    Rejected,
}

impl From<StatusArg> for RequestStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => RequestStatus::Pending,
            StatusArg::Accepted => RequestStatus::Accepted,
            StatusArg::Rejected => RequestStatus::Rejected,
        }
    }
}

pub(crate) async fn run() -> Result<(), PortalError> {
    let cli = Cli::parse();
    let config = PortalConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let context = AppContext::from_config(config, cli.token)?;

    match cli.command {
        Command::Estates { command } => commands::estates(&context, command).await,
        Command::Notifications { command } => commands::notifications(&context, command).await,
        Command::Sessions { command } => commands::sessions(&context, command).await,
        Command::Requests { command } => commands::requests(&context, command).await,
        Command::Preferences { command } => commands::preferences(&context, command),
    }
}
