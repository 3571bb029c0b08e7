use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use taskerrand::models::TaskStatus;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "taskerrand")]
#[command(version, about = "Post, find and run errands on Taskerrand")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to taskerrand.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL. Overrides the config file and TASKERRAND_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the signed-in account
    Whoami,
    /// Sign out and forget the stored token
    Logout,
    /// List available tasks
    Browse {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Search tasks by title
    Search {
        query: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Your stats and tasks
    Dashboard {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Another user's stats and tasks
    User {
        id: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show or update your profile
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Task detail and lifecycle actions
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Post a new task
    Post(TaskArgs),
    /// Edit one of your available tasks
    Edit {
        id: String,
        #[command(flatten)]
        args: TaskArgs,
    },
    /// Chat on a task interactively (Enter sends)
    Chat { id: String },
    /// Print a task's message history
    Messages { id: String },
    /// Notification bell
    Notifications {
        #[command(subcommand)]
        command: Option<NotificationCommands>,
    },
    /// Report a task to the moderators
    Report {
        task_id: String,
        #[arg(long = "type")]
        report_type: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Moderation tools (admins only)
    Admin {
        #[command(subcommand)]
        command: Option<AdminCommands>,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    Show { id: String },
    /// Follow status changes until Ctrl-C
    Watch { id: String },
    /// Open the task page in a browser
    Open { id: String },
    Accept {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Mark as done (requires a proof image)
    Done {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Confirm completion as the poster
    Confirm {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    Cancel {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Rate the seeker of a completed task
    Feedback {
        id: String,
        #[arg(long)]
        rating: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Upload a proof image
    Proof { id: String, file: PathBuf },
}

/// Task form fields. Missing fields keep their current value when editing.
#[derive(Args, Clone, Default)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub payment: Option<String>,
    #[arg(long = "contact")]
    pub contact_number: Option<String>,
    /// Primary location address
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<String>,
    /// Extra location as `address:lat:lng` (repeatable)
    #[arg(long = "location")]
    pub locations: Vec<String>,
    /// Local date and time, `YYYY-MM-DDTHH:MM`
    #[arg(long)]
    pub schedule: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum NotificationCommands {
    List,
    /// Mark read and open the referenced task
    View {
        id: String,
        /// Open in a new browser tab
        #[arg(long)]
        new_tab: bool,
    },
    Delete { id: String },
    Read { id: String },
}

#[derive(Subcommand, Clone)]
pub enum AdminCommands {
    Stats,
    Users,
    Tasks {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Reports,
    /// Delete a task, clearing the given report
    DeleteTask {
        id: String,
        #[arg(long)]
        report: Option<String>,
        #[arg(long)]
        yes: bool,
    },
    /// Dismiss a report
    Dismiss { id: String },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    Show,
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("taskerrand=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskerrand=warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(cli.config.as_deref(), command.clone());
    }

    let ctx = cmd::Ctx::load(cli.config.as_deref(), cli.api_url.as_deref())?;

    match &cli.command {
        Commands::Whoami => cmd::cmd_whoami(&ctx).await?,
        Commands::Logout => cmd::cmd_logout(&ctx).await?,
        Commands::Browse { page } => cmd::cmd_browse(&ctx, *page).await?,
        Commands::Search {
            query,
            status,
            page,
        } => cmd::cmd_search(&ctx, query, *status, *page).await?,
        Commands::Dashboard { status, page } => cmd::cmd_dashboard(&ctx, *status, *page).await?,
        Commands::User { id, status, page } => cmd::cmd_user(&ctx, id, *status, *page).await?,
        Commands::Profile {
            first_name,
            last_name,
            address,
        } => {
            cmd::cmd_profile(
                &ctx,
                first_name.as_deref(),
                last_name.as_deref(),
                address.as_deref(),
            )
            .await?
        }
        Commands::Task { command } => cmd::cmd_task(&ctx, command.clone()).await?,
        Commands::Post(args) => cmd::cmd_post(&ctx, args).await?,
        Commands::Edit { id, args } => cmd::cmd_edit(&ctx, id, args).await?,
        Commands::Chat { id } => cmd::cmd_chat(&ctx, id).await?,
        Commands::Messages { id } => cmd::cmd_messages(&ctx, id).await?,
        Commands::Notifications { command } => {
            cmd::cmd_notifications(&ctx, command.clone()).await?
        }
        Commands::Report {
            task_id,
            report_type,
            description,
        } => cmd::cmd_report(&ctx, task_id, report_type, description.as_deref()).await?,
        Commands::Admin { command } => cmd::cmd_admin(&ctx, command.clone()).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}{}", taskerrand::ui::icons::CROSS, cmd::describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
