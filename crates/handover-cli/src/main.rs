mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use handover_core::schedule::SchedulePreset;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "handover",
    about = "Annotate open Jira tickets with a handover status and action, then post the summary to Slack",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding ticket_data.json (default: current directory)
    #[arg(long, global = true, env = "HANDOVER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show fetched tickets with their saved status and action
    List,

    /// Edit status and action for every ticket in $EDITOR, then save
    Edit {
        /// Post the handover to Slack after saving
        #[arg(long)]
        post: bool,
    },

    /// Give every fetched ticket the same status and action
    Fill {
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, default_value = "")]
        action: String,
        /// Post the handover to Slack after saving
        #[arg(long)]
        post: bool,
    },

    /// Post the saved handover for the current tickets to Slack
    Post,

    /// Print the plain-text handover of annotated tickets
    Report,

    /// Validate configuration and test the Jira connection
    Check,

    /// Run the web form and slash-command server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "5555")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },

    /// Install or remove the daily launch agent that runs `handover post`
    Schedule {
        /// off, day (17:16), night (23:46) or custom
        #[arg(long)]
        preset: SchedulePreset,
        #[arg(long)]
        hour: Option<u8>,
        #[arg(long)]
        minute: Option<u8>,
        /// Plist path (default: ~/Library/LaunchAgents/com.handover.lazyhand.plist)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::List => cmd::list::run(&root, cli.json),
        Commands::Edit { post } => cmd::edit::run(&root, post, cli.json),
        Commands::Fill {
            status,
            action,
            post,
        } => cmd::fill::run(&root, &status, &action, post, cli.json),
        Commands::Post => cmd::post::run(&root, cli.json),
        Commands::Report => cmd::report::run(&root, cli.json),
        Commands::Check => cmd::check::run(&root, cli.json),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
        Commands::Schedule {
            preset,
            hour,
            minute,
            output,
        } => cmd::schedule::run(&root, preset, hour, minute, output, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
