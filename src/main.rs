mod cmd;
mod tax;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ltcg",
    version,
    author = "Andrew Jones <ascjones@gmail.com>",
    about = "Capital gains summary and LTCG exemption harvesting for Indian portfolios"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Realised STCG/LTCG, set-off and remaining exemption for a fiscal year
    Summary(cmd::summary::SummaryCommand),
    /// Plan sales that use the remaining LTCG exemption
    Harvest(cmd::harvest::HarvestCommand),
    /// Exemption use and missed savings in every fiscal year
    History(cmd::history::HistoryCommand),
    /// Redeemed lots grouped by instrument
    Gains(cmd::gains::GainsCommand),
    /// Open positions with unrealised gains
    Holdings(cmd::holdings::HoldingsCommand),
    /// Check input files for data quality issues
    Validate(cmd::validate::ValidateCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Summary(summary) => summary.exec(),
        Command::Harvest(harvest) => harvest.exec(),
        Command::History(history) => history.exec(),
        Command::Gains(gains) => gains.exec(),
        Command::Holdings(holdings) => holdings.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
