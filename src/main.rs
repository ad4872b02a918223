use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "reformc")]
#[command(version, about = "Estimate the impact of the consumption tax reform on a business")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare current and reform tax for a single business
    Simulate(cmd::simulate::SimulateCommand),
    /// Simulate every row of a CSV and summarize
    Batch(cmd::batch::BatchCommand),
    /// Show the resolved rate for each rule type
    Rates(cmd::rates::RatesCommand),
    /// Show the suggestions for a sector and impact
    Suggestions(cmd::suggestions::SuggestionsCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate(simulate) => simulate.exec(),
        Command::Batch(batch) => batch.exec(),
        Command::Rates(rates) => rates.exec(),
        Command::Suggestions(suggestions) => suggestions.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
