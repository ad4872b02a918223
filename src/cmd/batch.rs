//! Batch command - simulate every row of a CSV and summarize the results

use super::{read_inputs, StoreArgs};
use clap::Args;
use reformc::tax::{BatchSummary, Simulation};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV file of financial inputs (monthly_revenue,costs,tax_regime,sector,state), or "-" for stdin
    #[arg(short, long)]
    input: PathBuf,

    /// Output rows as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,

    /// Output simulations and summary as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    stores: StoreArgs,
}

/// Row for the batch table output
#[derive(Debug, Clone, Tabled, Serialize)]
struct BatchRow {
    #[tabled(rename = "#")]
    #[serde(rename = "row_num")]
    row_num: usize,

    #[tabled(rename = "Regime")]
    regime: String,

    #[tabled(rename = "Sector")]
    sector: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Revenue")]
    revenue: String,

    #[tabled(rename = "Costs")]
    costs: String,

    #[tabled(rename = "Current")]
    current_tax: String,

    #[tabled(rename = "Reform")]
    reform_tax: String,

    #[tabled(rename = "Delta")]
    delta_value: String,

    #[tabled(rename = "Delta %")]
    delta_percentage: String,

    #[tabled(rename = "Impact")]
    impact: String,
}

impl BatchRow {
    fn new(row_num: usize, sim: &Simulation) -> Self {
        BatchRow {
            row_num,
            regime: sim.input.tax_regime.to_string(),
            sector: sim.input.sector.to_string(),
            state: sim.input.state.clone().unwrap_or_default(),
            revenue: format!("{:.2}", sim.input.monthly_revenue),
            costs: format!("{:.2}", sim.input.costs),
            current_tax: sim.display.current_tax.to_string(),
            reform_tax: sim.display.reform_tax.to_string(),
            delta_value: sim.display.delta_value.to_string(),
            delta_percentage: sim.display.delta_percentage.to_string(),
            impact: sim.analysis.impact_classification.to_string(),
        }
    }
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    simulations: &'a [Simulation],
    summary: &'a BatchSummary,
}

impl BatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let inputs = read_inputs(&self.input)?;
        let simulator = self.stores.simulator()?;
        let simulations: Vec<Simulation> = inputs.iter().map(|i| simulator.simulate(i)).collect();
        let summary = BatchSummary::from_simulations(&simulations);

        if self.json {
            let output = BatchOutput {
                simulations: &simulations,
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        let rows: Vec<BatchRow> = simulations
            .iter()
            .enumerate()
            .map(|(i, sim)| BatchRow::new(i + 1, sim))
            .collect();

        if self.csv {
            // stdout stays pure CSV
            self.write_csv(&rows)?;
            write_summary(&mut io::stderr().lock(), &summary)?;
        } else {
            self.print_table(&rows);
            write_summary(&mut io::stdout().lock(), &summary)?;
        }
        Ok(())
    }

    fn print_table(&self, rows: &[BatchRow]) {
        if rows.is_empty() {
            println!("No inputs found");
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[BatchRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &BatchSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "  Simulations:          {}", summary.total)?;
    writeln!(out, "  Average revenue:      {}", summary.average_revenue)?;
    writeln!(out, "  Average current tax:  {}", summary.average_current_tax)?;
    writeln!(out, "  Average reform tax:   {}", summary.average_reform_tax)?;
    writeln!(out)?;
    writeln!(out, "  Impact distribution:")?;
    for (impact, count) in &summary.impact_distribution {
        writeln!(out, "    {:<10} {}", impact.to_string(), count)?;
    }
    writeln!(out, "  Top sectors:")?;
    for (sector, count) in &summary.top_sectors {
        writeln!(out, "    {:<10} {}", sector.to_string(), count)?;
    }
    Ok(())
}
