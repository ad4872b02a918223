pub mod batch;
pub mod rates;
pub mod schema;
pub mod simulate;
pub mod suggestions;

use clap::{Args, ValueEnum};
use reformc::core::{
    FinancialInput, ImpactClassification, MemoryRuleStore, MemorySuggestionStore, RuleType,
    Sector, Settings, TaxRegime,
};
use reformc::tax::Simulator;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where rules, suggestions and settings come from
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// CSV file of rate rules (rule_type,sector,state,rate,active,name); seeded defaults if omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// CSV file of suggestions (sector,impact,text); seeded defaults if omitted
    #[arg(long)]
    suggestions: Option<PathBuf>,

    /// JSON settings file overriding ttl, fallback rates and state names
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl StoreArgs {
    /// Load settings and stores, and wire them into a simulator
    pub fn simulator(&self) -> anyhow::Result<Simulator> {
        let settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let rules = match &self.rules {
            Some(path) => MemoryRuleStore::read_csv(File::open(path)?)?,
            None => MemoryRuleStore::seeded(),
        };
        let suggestions = match &self.suggestions {
            Some(path) => MemorySuggestionStore::read_csv(File::open(path)?)?,
            None => MemorySuggestionStore::seeded(),
        };
        Ok(Simulator::with_memory_stores(
            Arc::new(settings),
            Arc::new(rules),
            Arc::new(suggestions),
        ))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RegimeArg {
    SimplesNacional,
    LucroPresumido,
}

impl From<RegimeArg> for TaxRegime {
    fn from(arg: RegimeArg) -> Self {
        match arg {
            RegimeArg::SimplesNacional => TaxRegime::SimplesNacional,
            RegimeArg::LucroPresumido => TaxRegime::LucroPresumido,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SectorArg {
    Services,
    Commerce,
    Industry,
    #[default]
    Other,
}

impl From<SectorArg> for Sector {
    fn from(arg: SectorArg) -> Self {
        match arg {
            SectorArg::Services => Sector::Services,
            SectorArg::Commerce => Sector::Commerce,
            SectorArg::Industry => Sector::Industry,
            SectorArg::Other => Sector::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImpactArg {
    Positive,
    Neutral,
    Negative,
}

impl From<ImpactArg> for ImpactClassification {
    fn from(arg: ImpactArg) -> Self {
        match arg {
            ImpactArg::Positive => ImpactClassification::Positive,
            ImpactArg::Neutral => ImpactClassification::Neutral,
            ImpactArg::Negative => ImpactClassification::Negative,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleTypeArg {
    SimplesNacional,
    LucroPresumido,
    Reform,
}

impl From<RuleTypeArg> for RuleType {
    fn from(arg: RuleTypeArg) -> Self {
        match arg {
            RuleTypeArg::SimplesNacional => RuleType::SimplesNacional,
            RuleTypeArg::LucroPresumido => RuleType::LucroPresumido,
            RuleTypeArg::Reform => RuleType::Reform,
        }
    }
}

/// Read financial inputs from CSV (or stdin with "-")
pub fn read_inputs(path: &Path) -> anyhow::Result<Vec<FinancialInput>> {
    if path.as_os_str() == "-" {
        let stdin = io::stdin();
        let mut reader = BufReader::new(stdin.lock());
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
        parse_inputs(io::Cursor::new(buffer))
    } else {
        parse_inputs(BufReader::new(File::open(path)?))
    }
}

fn parse_inputs<R: Read>(reader: R) -> anyhow::Result<Vec<FinancialInput>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut inputs = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let input: FinancialInput = result?;
        input
            .validate()
            .map_err(|e| anyhow::anyhow!("row {}: {}", i + 1, e))?;
        inputs.push(input);
    }
    log::info!("Read {} financial inputs", inputs.len());
    Ok(inputs)
}
