//! Rate sliders and the current-period rate state behind them.

use super::calculator::Recomputation;
use super::error::CalcError;
use super::scenario::{Period, Scenario};
use super::sector::Sector;
use super::table::{BurdenTable, RateTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Order sliders are laid out in on the page
pub const SLIDER_ORDER: [Sector; 9] = [
    Sector::Residential,
    Sector::Business,
    Sector::Utilities,
    Sector::LightIndustry,
    Sector::PortProperty,
    Sector::PortImprovement,
    Sector::Recreation,
    Sector::Forests,
    Sector::Farm,
];

/// Range and step of one rate input control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderSpec {
    pub sector: Sector,
    pub start: Decimal,
    pub end: Decimal,
    pub step: Decimal,
    pub value: Decimal,
    pub title: String,
}

impl SliderSpec {
    pub fn contains(&self, rate: Decimal) -> bool {
        rate >= self.start && rate <= self.end
    }

    /// Whether `rate` is a position the control can actually take
    pub fn on_step(&self, rate: Decimal) -> bool {
        self.contains(rate) && ((rate - self.start) % self.step).is_zero()
    }

    /// The same control with its grid moved onto `rate` and its range
    /// widened to reach it
    pub fn aligned_to(&self, rate: Decimal) -> SliderSpec {
        if self.on_step(rate) {
            return SliderSpec {
                value: rate,
                ..self.clone()
            };
        }
        let below = ((rate - self.start.min(rate)) / self.step).ceil();
        let start = grid_start(rate - below * self.step, rate, self.step);
        let above = ((self.end.max(rate) - start) / self.step).ceil();
        SliderSpec {
            start,
            end: start + above * self.step,
            value: rate,
            ..self.clone()
        }
    }
}

/// Lowest point of the `step` grid through `value`, not below zero
fn grid_start(lower: Decimal, value: Decimal, step: Decimal) -> Decimal {
    if lower < Decimal::ZERO {
        value % step
    } else {
        lower
    }
}

/// (below, above, step) around the initial rate
fn slider_range(sector: Sector) -> (Decimal, Decimal, Decimal) {
    match sector {
        Sector::Residential => (dec!(0.3), dec!(0.3), dec!(0.001)),
        Sector::Business => (dec!(1), dec!(1), dec!(0.005)),
        // utilities can only come down
        Sector::Utilities => (dec!(5), dec!(0), dec!(0.1)),
        Sector::LightIndustry => (dec!(1), dec!(1), dec!(0.005)),
        Sector::PortProperty => (dec!(5), dec!(5), dec!(0.01)),
        Sector::PortImprovement => (dec!(5), dec!(5), dec!(0.01)),
        Sector::Recreation => (dec!(0.5), dec!(0.5), dec!(0.001)),
        Sector::Forests => (dec!(1), dec!(1), dec!(0.005)),
        Sector::Farm => (dec!(0.5), dec!(0.5), dec!(0.001)),
    }
}

/// One slider per sector in the period, centred on its rate
pub fn default_sliders(period: &Period) -> Vec<SliderSpec> {
    SLIDER_ORDER
        .into_iter()
        .filter_map(|sector| {
            let value = period.rates().get(sector)?;
            let (below, above, step) = slider_range(sector);
            Some(SliderSpec {
                sector,
                start: grid_start(value - below, value, step),
                end: value + above,
                step,
                value,
                title: format!("{} Tax Rate ({})", sector.label(), period.year()),
            })
        })
        .collect()
}

/// Notified after every recomputation triggered through a [`RateBoard`]
pub trait RecomputeListener {
    /// `changed` is the sector whose rate was edited, `None` on reset
    fn on_recompute(&mut self, changed: Option<Sector>, result: &Recomputation);
}

/// Logs each recomputation
pub struct LogListener;

impl RecomputeListener for LogListener {
    fn on_recompute(&mut self, changed: Option<Sector>, result: &Recomputation) {
        match changed {
            Some(sector) => log::info!(
                "{} rate changed: revenue {:.2}M, {}",
                sector,
                result.total_revenue,
                result.compliance.describe()
            ),
            None => log::info!(
                "rates reset: revenue {:.2}M, {}",
                result.total_revenue,
                result.compliance.describe()
            ),
        }
    }
}

/// Current-period rate vector for a scenario.
///
/// Every edit recomputes from the complete vector, never from a delta.
pub struct RateBoard<'a> {
    scenario: &'a Scenario,
    previous: BurdenTable,
    rates: RateTable,
    listeners: Vec<Box<dyn RecomputeListener + 'a>>,
}

impl<'a> RateBoard<'a> {
    pub fn new(scenario: &'a Scenario) -> Result<Self, CalcError> {
        Ok(RateBoard {
            scenario,
            previous: scenario.previous_burden()?,
            rates: scenario.current().rates().clone(),
            listeners: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, listener: Box<dyn RecomputeListener + 'a>) {
        self.listeners.push(listener);
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Replace one sector's rate and recompute everything
    pub fn set_rate(&mut self, sector: Sector, rate: Decimal) -> Result<Recomputation, CalcError> {
        let rates = self.rates.with(sector, rate)?;
        let result = self.recompute(&rates)?;
        self.rates = rates;
        self.notify(Some(sector), &result);
        Ok(result)
    }

    /// Restore the scenario's own rates
    pub fn reset(&mut self) -> Result<Recomputation, CalcError> {
        let rates = self.scenario.current().rates().clone();
        let result = self.recompute(&rates)?;
        self.rates = rates;
        self.notify(None, &result);
        Ok(result)
    }

    pub fn snapshot(&self) -> Result<Recomputation, CalcError> {
        self.recompute(&self.rates)
    }

    fn recompute(&self, rates: &RateTable) -> Result<Recomputation, CalcError> {
        let current = self.scenario.current();
        super::calculator::recompute_all(
            current.property_values(),
            rates,
            &self.previous,
            current.revenue_required(),
            self.scenario.tolerance(),
        )
    }

    fn notify(&mut self, changed: Option<Sector>, result: &Recomputation) {
        for listener in &mut self.listeners {
            listener.on_recompute(changed, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calculator::ComplianceVerdict;
    use crate::core::scenario::builtin;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<(Option<Sector>, Decimal)>>>);

    impl RecomputeListener for Recorder {
        fn on_recompute(&mut self, changed: Option<Sector>, result: &Recomputation) {
            self.0.borrow_mut().push((changed, result.total_revenue));
        }
    }

    #[test]
    fn default_sliders_follow_layout_order() {
        let scenario = builtin("2023").unwrap();
        let sliders = scenario.sliders();
        let sectors: Vec<_> = sliders.iter().map(|s| s.sector).collect();
        assert_eq!(sectors, SLIDER_ORDER.to_vec());

        let residential = &sliders[0];
        assert_eq!(residential.start, dec!(1.8246));
        assert_eq!(residential.end, dec!(2.4246));
        assert_eq!(residential.step, dec!(0.001));
        assert_eq!(residential.title, "Residential Tax Rate (2023)");

        let utilities = &sliders[2];
        assert_eq!(utilities.start, dec!(35));
        assert_eq!(utilities.end, dec!(40));
    }

    #[test]
    fn slider_start_never_negative() {
        let scenario = builtin("2023").unwrap();
        let rates = scenario
            .current()
            .rates()
            .with(Sector::Farm, dec!(0.2))
            .unwrap();
        let period = Period::new(
            "2023",
            scenario.current().property_values().clone(),
            rates,
            dec!(37.22),
        )
        .unwrap();
        let farm = default_sliders(&period)
            .into_iter()
            .find(|s| s.sector == Sector::Farm)
            .unwrap();
        assert_eq!(farm.start, Decimal::ZERO);
        assert!(farm.contains(dec!(0.2)));
        assert!(!farm.contains(dec!(0.8)));
    }

    fn assert_on_grid(slider: &SliderSpec) {
        let steps = (slider.value - slider.start) / slider.step;
        assert_eq!(steps, steps.trunc(), "{}: {:?}", slider.sector, slider);
        assert!(slider.start >= Decimal::ZERO, "{}", slider.sector);
        assert!(slider.contains(slider.value), "{}", slider.sector);
    }

    #[test]
    fn clamped_slider_start_stays_on_grid() {
        let scenario = builtin("2023").unwrap();
        let rates = scenario
            .current()
            .rates()
            .with(Sector::Farm, dec!(0.2123))
            .unwrap();
        let period = Period::new(
            "2023",
            scenario.current().property_values().clone(),
            rates,
            dec!(37.22),
        )
        .unwrap();
        let sliders = default_sliders(&period);
        for slider in &sliders {
            assert_on_grid(slider);
        }
        let farm = sliders.iter().find(|s| s.sector == Sector::Farm).unwrap();
        assert_eq!(farm.start, dec!(0.0003));
        assert!(farm.on_step(dec!(0.2123)));
        assert!(!farm.on_step(dec!(0.212)));
    }

    #[test]
    fn aligned_slider_reaches_off_grid_rates() {
        let scenario = builtin("2023").unwrap();
        let sliders = scenario.sliders();
        let residential = &sliders[0];

        let inside = residential.aligned_to(dec!(2.3));
        assert_on_grid(&inside);
        assert_eq!(inside.start, dec!(1.824));
        assert!(inside.end >= residential.end);

        let outside = residential.aligned_to(dec!(3.00005));
        assert_on_grid(&outside);
        assert!(outside.start <= residential.start);
        assert!(outside.end >= dec!(3.00005));

        let farm = sliders.iter().find(|s| s.sector == Sector::Farm).unwrap();
        let low = farm.aligned_to(dec!(0.0001));
        assert_on_grid(&low);
        assert_eq!(low.start, dec!(0.0001));

        assert_eq!(residential.aligned_to(residential.value), *residential);
    }

    #[test]
    fn set_rate_recomputes_and_notifies() {
        let scenario = builtin("2023").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut board = RateBoard::new(&scenario).unwrap();
        board.subscribe(Box::new(Recorder(seen.clone())));

        let result = board.set_rate(Sector::Residential, dec!(2.4)).unwrap();
        assert_eq!(board.rates().get(Sector::Residential), Some(dec!(2.4)));
        assert_eq!(result.compliance.verdict, ComplianceVerdict::Surplus);
        assert_eq!(result.previous, scenario.previous_burden().unwrap());
        assert_eq!(
            seen.borrow().as_slice(),
            &[(Some(Sector::Residential), result.total_revenue)]
        );
    }

    #[test]
    fn full_vector_recompute_is_order_independent() {
        let scenario = builtin("2023").unwrap();

        let mut a = RateBoard::new(&scenario).unwrap();
        a.set_rate(Sector::Business, dec!(5.0)).unwrap();
        let a = a.set_rate(Sector::Farm, dec!(2.0)).unwrap();

        let mut b = RateBoard::new(&scenario).unwrap();
        b.set_rate(Sector::Farm, dec!(2.0)).unwrap();
        let b = b.set_rate(Sector::Business, dec!(5.0)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn lowering_rates_gives_shortfall() {
        let scenario = builtin("2023").unwrap();
        let mut board = RateBoard::new(&scenario).unwrap();
        let result = board.set_rate(Sector::Business, dec!(4.3115)).unwrap();
        assert_eq!(result.compliance.verdict, ComplianceVerdict::Shortfall);
    }

    #[test]
    fn rejected_edit_leaves_state_untouched() {
        let scenario = builtin("2023").unwrap();
        let mut board = RateBoard::new(&scenario).unwrap();
        assert!(matches!(
            board.set_rate(Sector::Farm, dec!(-1)),
            Err(CalcError::NegativeInput { .. })
        ));
        assert_eq!(board.rates(), scenario.current().rates());
    }

    #[test]
    fn reset_restores_scenario_rates() {
        let scenario = builtin("2023").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut board = RateBoard::new(&scenario).unwrap();
        board.subscribe(Box::new(Recorder(seen.clone())));
        board.set_rate(Sector::Utilities, dec!(36)).unwrap();
        let result = board.reset().unwrap();

        assert_eq!(board.rates(), scenario.current().rates());
        assert_eq!(result, scenario.recompute().unwrap());
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1].0, None);
    }

    #[test]
    fn snapshot_matches_scenario() {
        let scenario = builtin("2023").unwrap();
        let board = RateBoard::new(&scenario).unwrap();
        assert_eq!(board.snapshot().unwrap(), scenario.recompute().unwrap());
    }
}
