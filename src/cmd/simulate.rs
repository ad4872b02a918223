//! Simulate command - current versus reform tax for one business

use super::{RegimeArg, SectorArg, StoreArgs};
use clap::Args;
use reformc::core::FinancialInput;
use reformc::tax::Simulation;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// Gross monthly revenue (e.g. 10000.00)
    #[arg(long)]
    revenue: Decimal,

    /// Deductible monthly costs
    #[arg(long, default_value_t = Decimal::ZERO)]
    costs: Decimal,

    /// Current tax regime
    #[arg(long, value_enum)]
    regime: RegimeArg,

    /// Business sector
    #[arg(long, value_enum, default_value_t = SectorArg::Other)]
    sector: SectorArg,

    /// Two letter state code (e.g. SP)
    #[arg(long)]
    state: Option<String>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    stores: StoreArgs,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl SimulateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let input = FinancialInput {
            monthly_revenue: self.revenue,
            costs: self.costs,
            tax_regime: self.regime.into(),
            sector: self.sector.into(),
            state: self.state.as_ref().map(|s| s.trim().to_uppercase()),
        };
        input.validate()?;

        let simulator = self.stores.simulator()?;
        let simulation = simulator.simulate(&input);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&simulation)?);
        } else {
            print_simulation(&simulation);
        }
        Ok(())
    }
}

pub fn print_simulation(sim: &Simulation) {
    let input = &sim.input;
    let rows = vec![
        ResultRow { item: "Monthly revenue", value: format!("{:.2}", input.monthly_revenue) },
        ResultRow { item: "Costs", value: format!("{:.2}", input.costs) },
        ResultRow { item: "Current regime", value: input.tax_regime.to_string() },
        ResultRow { item: "Sector", value: input.sector.to_string() },
        ResultRow {
            item: "State",
            value: input.state.clone().unwrap_or_else(|| "Not informed".to_string()),
        },
        ResultRow { item: "Current tax", value: sim.display.current_tax.to_string() },
        ResultRow { item: "Reform tax", value: sim.display.reform_tax.to_string() },
        ResultRow { item: "Difference", value: sim.display.delta_value.to_string() },
        ResultRow { item: "Difference %", value: format!("{}%", sim.display.delta_percentage) },
        ResultRow { item: "Impact", value: sim.analysis.impact_classification.to_string() },
    ];

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
    println!("{}", sim.analysis.message);
    println!("{}", sim.analysis.sector_detail);
    println!();
    println!("Suggestions:");
    for (i, suggestion) in sim.analysis.suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, suggestion);
    }
}
