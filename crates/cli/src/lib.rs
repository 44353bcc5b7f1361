pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "scoreline",
    about = "Scoreline operator CLI",
    long_about = "Operate the scoreline SMS score reporter: migrations, demo data, config inspection, readiness checks, and reconciliation.",
    after_help = "Examples:\n  scoreline doctor --json\n  scoreline simulate --from +15550100001 --body \"3-2\"\n  scoreline conflicts"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo league (idempotent) and verify it is present")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, SMS delivery readiness, and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run one inbound SMS through the reporter with delivery disabled")]
    Simulate {
        #[arg(long, help = "Sender phone number, in any format the carrier might use")]
        from: String,
        #[arg(long, help = "Message text, e.g. \"3-2\", \"lost 2-1\", \"status\"")]
        body: String,
    },
    #[command(about = "Reconcile unscored fixtures that hold two live submissions")]
    Sweep,
    #[command(about = "List fixtures whose live submissions disagree")]
    Conflicts,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Simulate { from, body } => commands::simulate::run(&from, &body),
        Command::Sweep => commands::sweep::run(),
        Command::Conflicts => commands::conflicts::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
