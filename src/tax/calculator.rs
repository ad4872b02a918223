use super::rates::RateResolver;
use crate::core::{RuleType, TaxRegime};
use rust_decimal::Decimal;

/// Current and reform tax from resolved rates.
///
/// Results are full precision; rounding for display is left to the caller.
/// Inputs are not validated here: out-of-domain values (e.g. negative revenue)
/// flow through the formulas, and arithmetic saturates rather than panicking.
#[derive(Clone)]
pub struct TaxCalculator {
    rates: RateResolver,
}

impl TaxCalculator {
    pub fn new(rates: RateResolver) -> Self {
        TaxCalculator { rates }
    }

    pub fn rates(&self) -> &RateResolver {
        &self.rates
    }

    /// `revenue * rate(regime)`
    pub fn calculate_current_tax(&self, regime: TaxRegime, revenue: Decimal) -> Decimal {
        let rate = self.rates.get_rate(regime.rule_type());
        let tax = revenue.saturating_mul(rate);
        log::debug!("Current tax ({}): {} x {} = {}", regime, revenue, rate, tax);
        tax
    }

    /// `max(0, revenue - costs) * reform rate`
    pub fn calculate_reform_tax(&self, revenue: Decimal, costs: Decimal) -> Decimal {
        let base = value_added(revenue, costs);
        let rate = self.rates.get_rate(RuleType::Reform);
        let tax = base.saturating_mul(rate);
        log::debug!("Reform tax: {} x {} = {}", base, rate, tax);
        tax
    }
}

/// Taxable base of the reform model: revenue net of deductible costs, floored at zero
pub fn value_added(revenue: Decimal, costs: Decimal) -> Decimal {
    revenue.saturating_sub(costs).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cache, MemoryRuleStore, RateRule, Settings};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;

    fn calculator(store: MemoryRuleStore) -> TaxCalculator {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let rates = RateResolver::new(Arc::new(store), cache, Arc::new(Settings::default()));
        TaxCalculator::new(rates)
    }

    #[test]
    fn simples_nacional_fallback() {
        let calc = calculator(MemoryRuleStore::new());
        let tax = calc.calculate_current_tax(TaxRegime::SimplesNacional, dec!(10000.00));
        assert_eq!(tax, dec!(1000.00));
    }

    #[test]
    fn lucro_presumido_fallback() {
        let calc = calculator(MemoryRuleStore::new());
        let tax = calc.calculate_current_tax(TaxRegime::LucroPresumido, dec!(10000.00));
        assert_eq!(tax, dec!(1633.00));
    }

    #[test]
    fn reform_on_value_added() {
        let calc = calculator(MemoryRuleStore::new());
        let tax = calc.calculate_reform_tax(dec!(10000.00), dec!(2000.00));
        // (10000 - 2000) * 0.265
        assert_eq!(tax, dec!(2120.00));
    }

    #[test]
    fn reform_base_floored_at_zero() {
        let calc = calculator(MemoryRuleStore::new());
        assert_eq!(calc.calculate_reform_tax(dec!(1000), dec!(1500)), dec!(0));
        assert_eq!(value_added(dec!(1000), dec!(1500)), dec!(0));
        assert_eq!(value_added(dec!(1000), dec!(250)), dec!(750));
    }

    #[test]
    fn store_rate_takes_precedence() {
        let calc = calculator(MemoryRuleStore::seeded());
        let store = MemoryRuleStore::new();
        store.create(RateRule::new(RuleType::SimplesNacional, dec!(0.0600)));
        let custom = calculator(store);

        assert_eq!(
            calc.calculate_current_tax(TaxRegime::SimplesNacional, dec!(5000)),
            dec!(500)
        );
        assert_eq!(
            custom.calculate_current_tax(TaxRegime::SimplesNacional, dec!(5000)),
            dec!(300)
        );
    }

    #[test]
    fn full_precision_output() {
        let calc = calculator(MemoryRuleStore::new());
        let tax = calc.calculate_current_tax(TaxRegime::LucroPresumido, dec!(1234.56));
        assert_eq!(tax, dec!(201.603648));
    }

    #[test]
    fn negative_revenue_propagates() {
        let calc = calculator(MemoryRuleStore::new());
        let tax = calc.calculate_current_tax(TaxRegime::SimplesNacional, dec!(-100));
        assert_eq!(tax, dec!(-10));
        assert_eq!(calc.calculate_reform_tax(dec!(-100), dec!(0)), dec!(0));
    }

    #[test]
    fn huge_revenue_does_not_panic() {
        let calc = calculator(MemoryRuleStore::new());
        let tax = calc.calculate_current_tax(TaxRegime::SimplesNacional, Decimal::MAX);
        assert!(tax > Decimal::ZERO);
    }
}
