//! Schema command - print expected input formats

use clap::Args;
use reformc::core::FinancialInput;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or csv-header
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for a financial input
    JsonSchema,
    /// Header row of the batch CSV
    CsvHeader,
    /// Batch CSV column descriptions
    CsvFields,
    /// Header row of the rules CSV
    RulesHeader,
    /// Header row of the suggestions CSV
    SuggestionsHeader,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => {
                println!("{}", INPUT_COLUMNS.join(","));
                Ok(())
            }
            SchemaFormat::CsvFields => self.print_csv_fields(),
            SchemaFormat::RulesHeader => {
                println!("{}", RULE_COLUMNS.join(","));
                Ok(())
            }
            SchemaFormat::SuggestionsHeader => {
                println!("{}", SUGGESTION_COLUMNS.join(","));
                Ok(())
            }
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(FinancialInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("CSV Input Format");
        println!("================");
        println!();
        for (name, required, description) in INPUT_FIELD_DESCRIPTIONS {
            let req = if *required { "required" } else { "optional" };
            println!("{:16} ({:8})  {}", name, req, description);
        }
        println!();
        println!("Inputs must satisfy monthly_revenue > 0 and 0 <= costs <= monthly_revenue");
        Ok(())
    }
}

const INPUT_COLUMNS: &[&str] = &["monthly_revenue", "costs", "tax_regime", "sector", "state"];

const RULE_COLUMNS: &[&str] = &["rule_type", "sector", "state", "rate", "active", "name"];

const SUGGESTION_COLUMNS: &[&str] = &["sector", "impact", "text"];

const INPUT_FIELD_DESCRIPTIONS: &[(&str, bool, &str)] = &[
    ("monthly_revenue", true, "Gross monthly revenue, e.g. 10000.00"),
    ("costs", true, "Deductible monthly costs"),
    ("tax_regime", true, "SIMPLES_NACIONAL or LUCRO_PRESUMIDO"),
    ("sector", false, "SERVICES, COMMERCE, INDUSTRY or OTHER (default)"),
    ("state", false, "Two letter state code, e.g. SP"),
];
