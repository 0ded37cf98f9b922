mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gomeet_core::GoMeetError;
use gomeet_core::config::GoMeetConfig;
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::Context;

#[derive(Parser)]
#[command(name = "gomeet")]
#[command(about = "Compose meetings, propose times and places, and vote on them")]
struct Cli {
    /// Backend base URL (overrides config and GOMEET_BACKEND_URL)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Log requests and decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the meeting draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },
    /// Propose candidate times for the draft
    Times {
        #[command(subcommand)]
        command: TimesCommand,
    },
    /// Propose and vote on candidate locations
    Location {
        #[command(subcommand)]
        command: LocationCommand,
    },
    /// Create the meeting from the draft and invite the guests
    Submit,
    /// Show or vote on a created meeting
    Meeting {
        #[command(subcommand)]
        command: MeetingCommand,
    },
    /// Show who the backend thinks you are
    Login {
        /// Meeting to return to after logging in
        #[arg(long)]
        meeting: Option<String>,
    },
}

#[derive(Subcommand)]
enum DraftCommand {
    /// Print everything saved so far
    Show,
    /// Throw the draft away
    Reset,
    /// Step 1: meeting name, host and guests
    Details {
        #[arg(long)]
        name: String,

        /// Host e-mail address
        #[arg(long)]
        host: String,

        /// Guest e-mail address (repeat for more guests)
        #[arg(long = "guest")]
        guests: Vec<String>,
    },
    /// Step 2: duration and how to find times
    Duration {
        #[arg(long, requires = "mins", conflicts_with = "duration")]
        hours: Option<String>,

        #[arg(long, requires = "hours", conflicts_with = "duration")]
        mins: Option<String>,

        /// Duration (e.g., "45m", "1h", "1h30m")
        #[arg(short, long)]
        duration: Option<String>,

        /// "manual" or "auto"
        #[arg(short, long)]
        method: Option<String>,
    },
}

#[derive(Subcommand)]
enum TimesCommand {
    /// Propose a time (e.g., "2025-03-20T15:00")
    Add { datetime: String },
    /// Withdraw a proposed time
    Remove { datetime: String },
    /// List proposed times
    List,
    /// Ask the backend for times when every guest is free
    Find {
        /// Period start (e.g., "2025-03-20T09:00")
        #[arg(long)]
        from: String,

        /// Period end
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand)]
enum LocationCommand {
    /// Propose a location
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long, default_value = "")]
        note: String,

        /// "permanent" stores on the backend; anything else in the draft
        #[arg(long, default_value = "session")]
        store: String,
    },
    /// List proposed locations
    List {
        #[arg(long, default_value = "session")]
        store: String,
    },
    /// Vote for a stored location
    Vote {
        id: String,

        #[arg(long, default_value = "permanent")]
        store: String,
    },
    /// Locations ranked by the backend
    Popular,
    /// Vote counts as a bar chart
    Chart,
}

#[derive(Subcommand)]
enum MeetingCommand {
    /// Show a meeting and your ballot for its times
    Show { id: String },
    /// Vote for one of a meeting's times
    Vote { meeting_id: String, time_id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<GoMeetError>() {
            Some(err) if err.is_user_input() => eprintln!("{} {}", "!".yellow().bold(), err),
            _ => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GOMEET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = GoMeetConfig::load()?;
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }
    let ctx = Context::new(config);

    match cli.command {
        Commands::Draft { command } => match command {
            DraftCommand::Show => commands::draft::show(&ctx),
            DraftCommand::Reset => commands::draft::reset(&ctx),
            DraftCommand::Details { name, host, guests } => {
                commands::draft::details(&ctx, &name, &host, &guests)
            }
            DraftCommand::Duration {
                hours,
                mins,
                duration,
                method,
            } => commands::draft::duration(&ctx, hours, mins, duration, method),
        },
        Commands::Times { command } => match command {
            TimesCommand::Add { datetime } => commands::times::add(&ctx, &datetime),
            TimesCommand::Remove { datetime } => commands::times::remove(&ctx, &datetime),
            TimesCommand::List => commands::times::list(&ctx),
            TimesCommand::Find { from, to } => commands::times::find(&ctx, &from, &to).await,
        },
        Commands::Location { command } => match command {
            LocationCommand::Add {
                title,
                lat,
                lng,
                note,
                store,
            } => commands::location::add(&ctx, &store, title, lat, lng, note).await,
            LocationCommand::List { store } => commands::location::list(&ctx, &store).await,
            LocationCommand::Vote { id, store } => {
                commands::location::vote(&ctx, &store, &id).await
            }
            LocationCommand::Popular => commands::location::popular(&ctx).await,
            LocationCommand::Chart => commands::location::chart(&ctx).await,
        },
        Commands::Submit => commands::submit::run(&ctx).await,
        Commands::Meeting { command } => match command {
            MeetingCommand::Show { id } => commands::meeting::show(&ctx, &id).await,
            MeetingCommand::Vote {
                meeting_id,
                time_id,
            } => commands::meeting::vote(&ctx, &meeting_id, &time_id).await,
        },
        Commands::Login { meeting } => commands::login::run(&ctx, meeting.as_deref()).await,
    }
}
