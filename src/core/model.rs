use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown rule type: {0}")]
    RuleType(String),
    #[error("unknown tax regime: {0}")]
    TaxRegime(String),
    #[error("unknown sector: {0}")]
    Sector(String),
    #[error("unknown impact classification: {0}")]
    Impact(String),
}

/// Which rate a rule provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    SimplesNacional,
    LucroPresumido,
    Reform,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [
        RuleType::SimplesNacional,
        RuleType::LucroPresumido,
        RuleType::Reform,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RuleType::SimplesNacional => "SIMPLES_NACIONAL",
            RuleType::LucroPresumido => "LUCRO_PRESUMIDO",
            RuleType::Reform => "REFORM",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RuleType::SimplesNacional => "Simples Nacional",
            RuleType::LucroPresumido => "Lucro Presumido",
            RuleType::Reform => "Reform (IBS/CBS)",
        }
    }
}

impl FromStr for RuleType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SIMPLES_NACIONAL" => Ok(RuleType::SimplesNacional),
            "LUCRO_PRESUMIDO" => Ok(RuleType::LucroPresumido),
            "REFORM" | "REFORMA" => Ok(RuleType::Reform),
            _ => Err(ParseError::RuleType(s.to_string())),
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tax regime a business is enrolled in today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
    SimplesNacional,
    LucroPresumido,
}

impl TaxRegime {
    /// The rule providing this regime's rate
    pub fn rule_type(&self) -> RuleType {
        match self {
            TaxRegime::SimplesNacional => RuleType::SimplesNacional,
            TaxRegime::LucroPresumido => RuleType::LucroPresumido,
        }
    }

    pub fn code(&self) -> &'static str {
        self.rule_type().code()
    }
}

impl FromStr for TaxRegime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match RuleType::from_str(s) {
            Ok(RuleType::SimplesNacional) => Ok(TaxRegime::SimplesNacional),
            Ok(RuleType::LucroPresumido) => Ok(TaxRegime::LucroPresumido),
            _ => Err(ParseError::TaxRegime(s.to_string())),
        }
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Business sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sector {
    Services,
    Commerce,
    Industry,
    #[default]
    Other,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Sector::Services,
        Sector::Commerce,
        Sector::Industry,
        Sector::Other,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Sector::Services => "SERVICES",
            Sector::Commerce => "COMMERCE",
            Sector::Industry => "INDUSTRY",
            Sector::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sector::Services => "Services",
            Sector::Commerce => "Commerce",
            Sector::Industry => "Industry",
            Sector::Other => "Other",
        }
    }
}

impl FromStr for Sector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SERVICES" | "SERVICOS" => Ok(Sector::Services),
            "COMMERCE" | "COMERCIO" => Ok(Sector::Commerce),
            "INDUSTRY" | "INDUSTRIA" => Ok(Sector::Industry),
            "OTHER" | "OUTROS" => Ok(Sector::Other),
            _ => Err(ParseError::Sector(s.to_string())),
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Qualitative effect of the reform on a business's tax burden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactClassification {
    /// Burden decreases
    Positive,
    Neutral,
    /// Burden increases
    Negative,
}

impl ImpactClassification {
    pub const ALL: [ImpactClassification; 3] = [
        ImpactClassification::Positive,
        ImpactClassification::Neutral,
        ImpactClassification::Negative,
    ];

    /// Classify a reform-minus-current delta. Exact comparison, no tolerance.
    pub fn from_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            ImpactClassification::Negative
        } else if delta < Decimal::ZERO {
            ImpactClassification::Positive
        } else {
            ImpactClassification::Neutral
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ImpactClassification::Positive => "POSITIVE",
            ImpactClassification::Neutral => "NEUTRAL",
            ImpactClassification::Negative => "NEGATIVE",
        }
    }
}

impl FromStr for ImpactClassification {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" | "POSITIVO" => Ok(ImpactClassification::Positive),
            "NEUTRAL" | "NEUTRO" => Ok(ImpactClassification::Neutral),
            "NEGATIVE" | "NEGATIVO" => Ok(ImpactClassification::Negative),
            _ => Err(ParseError::Impact(s.to_string())),
        }
    }
}

impl fmt::Display for ImpactClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Read an enumeration code through its `FromStr`, so CSV and JSON accept
/// any case and the Portuguese aliases
fn deserialize_code<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(de::Error::custom)
}

impl<'de> Deserialize<'de> for RuleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_code(deserializer)
    }
}

impl<'de> Deserialize<'de> for TaxRegime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_code(deserializer)
    }
}

impl<'de> Deserialize<'de> for Sector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_code(deserializer)
    }
}

impl<'de> Deserialize<'de> for ImpactClassification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_code(deserializer)
    }
}

/// A rate rule as held by the rule store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRule {
    /// Store-assigned identifier, also the creation order
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub rule_type: RuleType,
    /// Optional sector scope
    #[serde(default)]
    pub sector: Option<Sector>,
    /// Optional state scope (two letter code)
    #[serde(default)]
    pub state: Option<String>,
    /// Fixed-point rate with 4 fractional digits, e.g. 0.1633
    pub rate: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RateRule {
    /// An active, unscoped rule
    pub fn new(rule_type: RuleType, rate: Decimal) -> Self {
        RateRule {
            id: 0,
            name: rule_type.display_name().to_string(),
            rule_type,
            sector: None,
            state: None,
            rate,
            active: true,
        }
    }

    pub fn with_sector(mut self, sector: Sector) -> Self {
        self.sector = Some(sector);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_uppercase());
        self
    }

    /// Number of scope fields set; higher is more specific
    pub fn specificity(&self) -> usize {
        usize::from(self.sector.is_some()) + usize::from(self.state.is_some())
    }

    /// Whether this rule applies to a query for `rule_type` in the given scope.
    /// Unset scope fields on the rule match anything; set ones must be equal.
    pub fn matches(&self, rule_type: RuleType, sector: Option<Sector>, state: Option<&str>) -> bool {
        if !self.active || self.rule_type != rule_type {
            return false;
        }
        let sector_ok = self.sector.is_none() || self.sector == sector;
        let state_ok = match (&self.state, state) {
            (None, _) => true,
            (Some(own), Some(wanted)) => own.eq_ignore_ascii_case(wanted),
            (Some(_), None) => false,
        };
        sector_ok && state_ok
    }
}

/// One suggestion text for a (sector, impact) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    #[serde(default)]
    pub id: u64,
    pub sector: Sector,
    pub impact: ImpactClassification,
    pub text: String,
}

impl SuggestionEntry {
    pub fn new(sector: Sector, impact: ImpactClassification, text: impl Into<String>) -> Self {
        SuggestionEntry {
            id: 0,
            sector,
            impact,
            text: text.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("monthly revenue must be greater than zero, got {0}")]
    NonPositiveRevenue(Decimal),
    #[error("costs must not be negative, got {0}")]
    NegativeCosts(Decimal),
    #[error("costs ({costs}) must not exceed monthly revenue ({revenue})")]
    CostsExceedRevenue { costs: Decimal, revenue: Decimal },
}

/// Financial inputs for one simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialInput {
    /// Gross monthly revenue
    #[schemars(with = "f64")]
    pub monthly_revenue: Decimal,
    /// Deductible monthly costs (inputs that generate credits under the reform)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub costs: Decimal,
    /// Current tax regime
    pub tax_regime: TaxRegime,
    /// Business sector
    #[serde(default)]
    pub sector: Sector,
    /// Two letter state code (e.g. SP)
    #[serde(default)]
    pub state: Option<String>,
}

impl FinancialInput {
    /// Check the preconditions the calculator assumes: revenue > 0 and 0 <= costs <= revenue.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.monthly_revenue <= Decimal::ZERO {
            return Err(InputError::NonPositiveRevenue(self.monthly_revenue));
        }
        if self.costs < Decimal::ZERO {
            return Err(InputError::NegativeCosts(self.costs));
        }
        if self.costs > self.monthly_revenue {
            return Err(InputError::CostsExceedRevenue {
                costs: self.costs,
                revenue: self.monthly_revenue,
            });
        }
        Ok(())
    }
}

/// Outcome of comparing current and reform tax
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactResult {
    /// reform tax - current tax, full precision
    pub delta_value: Decimal,
    /// delta / current * 100, two decimals; 0.00 when current tax is zero
    pub delta_percentage: Decimal,
    pub impact_classification: ImpactClassification,
    pub message: String,
    pub suggestions: Vec<String>,
    pub sector_detail: String,
}
