use super::suggestions::SuggestionResolver;
use crate::core::{ImpactClassification, ImpactResult, Sector, Settings};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Classifies the reform delta and attaches suggestions and descriptive text
#[derive(Clone)]
pub struct ImpactAnalyzer {
    suggestions: SuggestionResolver,
    settings: Arc<Settings>,
}

impl ImpactAnalyzer {
    pub fn new(suggestions: SuggestionResolver, settings: Arc<Settings>) -> Self {
        ImpactAnalyzer {
            suggestions,
            settings,
        }
    }

    pub fn suggestions(&self) -> &SuggestionResolver {
        &self.suggestions
    }

    pub fn get_suggestions(&self, sector: Sector, impact: ImpactClassification) -> Vec<String> {
        self.suggestions.get_suggestions(sector, impact)
    }

    pub fn analyze(
        &self,
        current_tax: Decimal,
        reform_tax: Decimal,
        sector: Sector,
        state: Option<&str>,
    ) -> ImpactResult {
        let delta_value = reform_tax.saturating_sub(current_tax);
        let delta_percentage = delta_percentage(delta_value, current_tax);
        let impact_classification = ImpactClassification::from_delta(delta_value);
        let state = state.map(str::trim).filter(|s| !s.is_empty());

        log::debug!(
            "Impact {} for {}: delta={} ({}%)",
            impact_classification,
            sector,
            delta_value,
            delta_percentage
        );

        ImpactResult {
            delta_value,
            delta_percentage,
            impact_classification,
            message: message(sector, impact_classification),
            suggestions: self.suggestions.get_suggestions(sector, impact_classification),
            sector_detail: self.sector_detail(sector, state),
        }
    }

    fn sector_detail(&self, sector: Sector, state: Option<&str>) -> String {
        let mut detail = format!(
            "Analysis based on national averages for {}.",
            sector.display_name()
        );
        if let Some(code) = state {
            detail.push_str(&format!(
                " Regional particularities of {} were considered in the context of the federative transition.",
                self.settings.state_display(code)
            ));
        }
        detail
    }
}

/// `delta / current * 100` to two decimals, or exactly 0.00 when current is not positive
pub fn delta_percentage(delta: Decimal, current: Decimal) -> Decimal {
    if current <= Decimal::ZERO {
        return dec!(0.00);
    }
    match delta
        .checked_div(current)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
    {
        Some(pct) => round_half_up(pct),
        None => {
            log::warn!("Delta percentage of {} over {} overflowed", delta, current);
            dec!(0.00)
        }
    }
}

/// Round to two decimals, midpoints away from zero, keeping a scale of 2
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

fn message(sector: Sector, impact: ImpactClassification) -> String {
    match impact {
        ImpactClassification::Negative => format!(
            "Your tax burden in the {} sector is expected to increase under the reform.",
            sector.display_name()
        ),
        ImpactClassification::Positive => format!(
            "Your tax burden in the {} sector is expected to decrease under the reform.",
            sector.display_name()
        ),
        ImpactClassification::Neutral => "Your tax burden is expected to remain stable.".to_string(),
    }
}
