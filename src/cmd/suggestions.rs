//! Suggestions command - resolved suggestion list for a sector and impact

use super::{ImpactArg, SectorArg, StoreArgs};
use clap::Args;
use reformc::core::{ImpactClassification, Sector};

#[derive(Args, Debug)]
pub struct SuggestionsCommand {
    /// Business sector
    #[arg(long, value_enum)]
    sector: SectorArg,

    /// Impact classification
    #[arg(long, value_enum)]
    impact: ImpactArg,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    stores: StoreArgs,
}

impl SuggestionsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let sector: Sector = self.sector.into();
        let impact: ImpactClassification = self.impact.into();
        let simulator = self.stores.simulator()?;
        let resolved = simulator.suggestions().resolve(sector, impact);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolved.suggestions)?);
            return Ok(());
        }

        println!("{} / {} ({})", sector, impact, resolved.source);
        for (i, suggestion) in resolved.suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion);
        }
        Ok(())
    }
}
