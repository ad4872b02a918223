//! Rates command - resolved rate for each rule type

use super::{RuleTypeArg, StoreArgs};
use clap::Args;
use reformc::core::RuleType;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// Only resolve this rule type
    #[arg(short = 't', long, value_enum)]
    rule_type: Option<RuleTypeArg>,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    stores: StoreArgs,
}

#[derive(Debug, Tabled, Serialize)]
struct RateRow {
    #[tabled(rename = "Rule Type")]
    rule_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Source")]
    source: String,
}

impl RatesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let simulator = self.stores.simulator()?;
        let rule_types: Vec<RuleType> = match self.rule_type {
            Some(arg) => vec![arg.into()],
            None => RuleType::ALL.to_vec(),
        };

        let rows: Vec<RateRow> = rule_types
            .into_iter()
            .map(|rule_type| {
                let resolved = simulator.rates().resolve(rule_type);
                RateRow {
                    rule_type: rule_type.to_string(),
                    name: rule_type.display_name().to_string(),
                    rate: format!("{:.4}", resolved.rate),
                    source: resolved.source.to_string(),
                }
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        Ok(())
    }
}
