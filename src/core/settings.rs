use super::model::RuleType;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

pub const DEFAULT_FALLBACK_SUGGESTION: &str =
    "Consider reviewing your tax credits and analyzing the impact on final pricing.";

/// Federative units and their display names
const STATE_NAMES: [(&str, &str); 27] = [
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AP", "Amapá"),
    ("AM", "Amazonas"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MT", "Mato Grosso"),
    ("MS", "Mato Grosso do Sul"),
    ("MG", "Minas Gerais"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PR", "Paraná"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RS", "Rio Grande do Sul"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("SC", "Santa Catarina"),
    ("SP", "São Paulo"),
    ("SE", "Sergipe"),
    ("TO", "Tocantins"),
];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rates used when the rule store is unreachable or has no active rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackRates {
    pub simples_nacional: Decimal,
    /// PIS 0.0065 + COFINS 0.03 + ISS 0.05 + IRPJ 0.048 + CSLL 0.0288
    pub lucro_presumido: Decimal,
    /// Estimated IBS + CBS
    pub reform: Decimal,
}

impl Default for FallbackRates {
    fn default() -> Self {
        FallbackRates {
            simples_nacional: dec!(0.1000),
            lucro_presumido: dec!(0.1633),
            reform: dec!(0.2650),
        }
    }
}

impl FallbackRates {
    pub fn rate(&self, rule_type: RuleType) -> Decimal {
        match rule_type {
            RuleType::SimplesNacional => self.simples_nacional,
            RuleType::LucroPresumido => self.lucro_presumido,
            RuleType::Reform => self.reform,
        }
    }
}

/// Immutable configuration, loaded once at startup and shared by reference.
///
/// Every field has a compiled-in default, so a settings file only needs the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Time-to-live of every cache entry, in seconds
    pub cache_ttl_secs: u64,
    pub fallback_rates: FallbackRates,
    pub fallback_suggestion: String,
    /// State code to display name. Entries in a settings file are merged
    /// over the built-in table.
    #[serde(deserialize_with = "merge_state_names")]
    pub state_names: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            fallback_rates: FallbackRates::default(),
            fallback_suggestion: DEFAULT_FALLBACK_SUGGESTION.to_string(),
            state_names: default_state_names(),
        }
    }
}

fn default_state_names() -> BTreeMap<String, String> {
    STATE_NAMES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

fn merge_state_names<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut names = default_state_names();
    names.extend(
        overrides
            .into_iter()
            .map(|(code, name)| (code.trim().to_uppercase(), name)),
    );
    Ok(names)
}

impl Settings {
    /// Read settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_reader(reader)?;
        log::debug!(
            "Loaded settings: ttl={}s, {} state names",
            settings.cache_ttl_secs,
            settings.state_names.len()
        );
        Ok(settings)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fallback_rate(&self, rule_type: RuleType) -> Decimal {
        self.fallback_rates.rate(rule_type)
    }

    /// Display name for a state code; unknown codes are returned verbatim
    pub fn state_display<'a>(&'a self, code: &'a str) -> &'a str {
        self.state_names
            .get(&code.to_uppercase())
            .map(String::as_str)
            .unwrap_or(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fallback_rates() {
        let settings = Settings::default();
        assert_eq!(settings.fallback_rate(RuleType::SimplesNacional), dec!(0.10));
        assert_eq!(settings.fallback_rate(RuleType::LucroPresumido), dec!(0.1633));
        assert_eq!(settings.fallback_rate(RuleType::Reform), dec!(0.265));
    }

    #[test]
    fn lucro_presumido_is_sum_of_components() {
        let components = dec!(0.0065) + dec!(0.03) + dec!(0.05) + dec!(0.048) + dec!(0.0288);
        assert_eq!(FallbackRates::default().lucro_presumido, components);
    }

    #[test]
    fn state_display_names() {
        let settings = Settings::default();
        assert_eq!(settings.state_names.len(), 27);
        assert_eq!(settings.state_display("SP"), "São Paulo");
        assert_eq!(settings.state_display("rs"), "Rio Grande do Sul");
        assert_eq!(settings.state_display("XX"), "XX");
    }

    #[test]
    fn partial_settings_file_keeps_defaults() {
        let json = r#"{ "cache_ttl_secs": 60, "fallback_rates": { "reform": "0.2800" } }"#;
        let settings = Settings::from_reader(json.as_bytes()).unwrap();
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.fallback_rate(RuleType::Reform), dec!(0.2800));
        assert_eq!(settings.fallback_rate(RuleType::SimplesNacional), dec!(0.1000));
        assert_eq!(settings.fallback_suggestion, DEFAULT_FALLBACK_SUGGESTION);
        assert_eq!(settings.state_display("BA"), "Bahia");
    }

    #[test]
    fn state_names_merge_over_defaults() {
        let json = r#"{ "state_names": { "df": "Federal District", "XX": "Test State" } }"#;
        let settings = Settings::from_reader(json.as_bytes()).unwrap();
        assert_eq!(settings.state_display("DF"), "Federal District");
        assert_eq!(settings.state_display("xx"), "Test State");
        assert_eq!(settings.state_display("RJ"), "Rio de Janeiro");
        assert_eq!(settings.state_names.len(), 28);
    }

    #[test]
    fn invalid_settings_file() {
        let result = Settings::from_reader("{ not json".as_bytes());
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }
}
