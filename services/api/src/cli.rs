use crate::demo::{
    run_demo, run_eligibility_check, run_roster_outreach, CheckArgs, DemoArgs, RosterArgs,
};
use crate::server;
use blood_bank::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Blood Bank Coordinator",
    about = "Run the donor coordination service and donor eligibility tools from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Screen donors against the eligibility rules
    Eligibility {
        #[command(subcommand)]
        command: EligibilityCommand,
    },
    /// Run built-in donor scenarios through the eligibility engine
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum EligibilityCommand {
    /// Evaluate a single donor snapshot stored as JSON
    Check(CheckArgs),
    /// List roster donors who can be contacted for an urgent request
    Roster(RosterArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility {
            command: EligibilityCommand::Check(args),
        } => run_eligibility_check(args),
        Command::Eligibility {
            command: EligibilityCommand::Roster(args),
        } => run_roster_outreach(args),
        Command::Demo(args) => run_demo(args),
    }
}
