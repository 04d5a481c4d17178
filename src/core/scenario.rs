use super::calculator::{compute_burden, recompute_all, Recomputation, DEFAULT_TOLERANCE};
use super::error::CalcError;
use super::rates::{default_sliders, SliderSpec};
use super::sector::Sector;
use super::table::{BurdenTable, PropertyValueTable, RateTable, SectorTable, TableKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// One year's assessed values, rates and revenue requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    year: String,
    property_values: PropertyValueTable,
    rates: RateTable,
    revenue_required: Decimal,
}

impl Period {
    pub fn new(
        year: impl Into<String>,
        property_values: PropertyValueTable,
        rates: RateTable,
        revenue_required: Decimal,
    ) -> Result<Self, CalcError> {
        let year = year.into();
        property_values.check_same_sectors(&rates)?;
        if revenue_required.is_sign_negative() && !revenue_required.is_zero() {
            return Err(CalcError::NegativeRequirement {
                year,
                value: revenue_required,
            });
        }
        Ok(Period {
            year,
            property_values,
            rates,
            revenue_required,
        })
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn property_values(&self) -> &PropertyValueTable {
        &self.property_values
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn revenue_required(&self) -> Decimal {
        self.revenue_required
    }

    pub fn burden(&self) -> Result<BurdenTable, CalcError> {
        compute_burden(&self.property_values, &self.rates)
    }
}

/// Current and previous period plus the tolerance used for the verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    current: Period,
    previous: Period,
    tolerance: Decimal,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        current: Period,
        previous: Period,
        tolerance: Decimal,
    ) -> Result<Self, CalcError> {
        current
            .property_values
            .check_same_sectors(&previous.property_values)?;
        if tolerance.is_sign_negative() && !tolerance.is_zero() {
            return Err(CalcError::NegativeTolerance(tolerance));
        }
        Ok(Scenario {
            name: name.into(),
            current,
            previous,
            tolerance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> &Period {
        &self.current
    }

    pub fn previous(&self) -> &Period {
        &self.previous
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    pub fn sectors(&self) -> impl Iterator<Item = Sector> + '_ {
        self.current.property_values.sectors()
    }

    pub fn previous_burden(&self) -> Result<BurdenTable, CalcError> {
        self.previous.burden()
    }

    /// Recompute with the scenario's own current rates
    pub fn recompute(&self) -> Result<Recomputation, CalcError> {
        self.recompute_with(&self.current.rates)
    }

    /// Recompute the current period with a replacement rate table
    pub fn recompute_with(&self, rates: &RateTable) -> Result<Recomputation, CalcError> {
        recompute_all(
            &self.current.property_values,
            rates,
            &self.previous_burden()?,
            self.current.revenue_required,
            self.tolerance,
        )
    }

    pub fn sliders(&self) -> Vec<SliderSpec> {
        default_sliders(&self.current)
    }

    /// SHA-256 over the scenario's numbers, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(format!("|tolerance={}", self.tolerance.normalize()));
        for period in [&self.current, &self.previous] {
            hasher.update(format!(
                "|{}:required={}",
                period.year,
                period.revenue_required.normalize()
            ));
            for ((sector, value), (_, rate)) in
                period.property_values.iter().zip(period.rates.iter())
            {
                hasher.update(format!(
                    "|{}={}@{}",
                    sector.key(),
                    value.normalize(),
                    rate.normalize()
                ));
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// Names accepted by [`builtin`]
pub const BUILTIN: &[&str] = &["2023"];

pub fn builtin(name: &str) -> Option<Scenario> {
    match name {
        "2023" => Some(scenario_2023()),
        _ => None,
    }
}

fn sector_table<K: TableKind>(values: [Decimal; 9]) -> SectorTable<K> {
    SectorTable::from_map(
        Sector::ALL
            .into_iter()
            .zip(values)
            .collect::<BTreeMap<_, _>>(),
    )
}

/// 2023 against 2022, amounts in millions
fn scenario_2023() -> Scenario {
    let current = Period {
        year: "2023".to_string(),
        property_values: sector_table([
            dec!(11044.472335), // Residential
            dec!(1840.787650),  // Business
            dec!(56.503260),    // Utilities
            dec!(118.545800),   // Light_Industry
            dec!(21.001570),    // Port_Property
            dec!(4.476430),     // Port_Improvement
            dec!(32.735500),    // Recreation
            dec!(1.897900),     // Forests
            dec!(0.052110),     // Farm
        ]),
        rates: sector_table([
            dec!(2.1246),
            dec!(5.3115),
            dec!(40.0000),
            dec!(8.1160),
            dec!(27.5000),
            dec!(22.5000),
            dec!(2.1246),
            dec!(5.3115),
            dec!(2.1246),
        ]),
        revenue_required: dec!(37.220),
    };
    let previous = Period {
        year: "2022".to_string(),
        property_values: sector_table([
            dec!(9910.410785),
            dec!(1341.318584),
            dec!(52.068115),
            dec!(80.846200),
            dec!(19.178700),
            dec!(5.684300),
            dec!(36.400900),
            dec!(1.897900),
            dec!(0.052109),
        ]),
        rates: sector_table([
            dec!(2.2928),
            dec!(5.8925),
            dec!(40.0000),
            dec!(8.7585),
            dec!(27.5000),
            dec!(22.5000),
            dec!(2.2928),
            dec!(5.8925),
            dec!(2.2928),
        ]),
        revenue_required: dec!(34.165),
    };
    Scenario {
        name: "2023".to_string(),
        current,
        previous,
        tolerance: DEFAULT_TOLERANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calculator::{ComplianceVerdict, PercentChange};

    #[test]
    fn builtin_2023_meets_requirement() {
        let scenario = builtin("2023").unwrap();
        let result = scenario.recompute().unwrap();
        assert_eq!(result.total_revenue, dec!(37.222681740772));
        assert_eq!(result.compliance.verdict, ComplianceVerdict::ExactMatch);
        assert_eq!(result.previous.total(), dec!(34.1671994815532));
    }

    #[test]
    fn builtin_2023_percent_change() {
        let result = builtin("2023").unwrap().recompute().unwrap();
        let residential = result.percent_change[&Sector::Residential].value().unwrap();
        assert_eq!(residential.round_dp(4), dec!(3.2677));
        let port_improvement = result.percent_change[&Sector::PortImprovement]
            .value()
            .unwrap();
        assert_eq!(port_improvement.round_dp(4), dec!(-21.2492));
        assert!(result
            .percent_change
            .values()
            .all(|p| matches!(p, PercentChange::Change(_))));
    }

    #[test]
    fn unknown_builtin() {
        assert!(builtin("1999").is_none());
    }

    #[test]
    fn negative_tolerance_rejected() {
        let scenario = builtin("2023").unwrap();
        let err = Scenario::new(
            "x",
            scenario.current().clone(),
            scenario.previous().clone(),
            dec!(-0.01),
        )
        .unwrap_err();
        assert_eq!(err, CalcError::NegativeTolerance(dec!(-0.01)));
    }

    #[test]
    fn negative_requirement_rejected() {
        let values = PropertyValueTable::new([(Sector::Farm, dec!(1))]).unwrap();
        let rates = RateTable::new([(Sector::Farm, dec!(1))]).unwrap();
        let err = Period::new("2023", values, rates, dec!(-1)).unwrap_err();
        assert!(matches!(err, CalcError::NegativeRequirement { .. }));
    }

    #[test]
    fn periods_must_cover_same_sectors() {
        let scenario = builtin("2023").unwrap();
        let values = PropertyValueTable::new([(Sector::Farm, dec!(1))]).unwrap();
        let rates = RateTable::new([(Sector::Farm, dec!(1))]).unwrap();
        let small = Period::new("2022", values, rates, dec!(1)).unwrap();
        let err = Scenario::new("x", scenario.current().clone(), small, DEFAULT_TOLERANCE)
            .unwrap_err();
        assert!(matches!(err, CalcError::ShapeMismatch { .. }));
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let scenario = builtin("2023").unwrap();
        assert_eq!(scenario.fingerprint(), builtin("2023").unwrap().fingerprint());
        assert_eq!(scenario.fingerprint().len(), 64);

        let rates = scenario
            .current()
            .rates()
            .with(Sector::Farm, dec!(2.2))
            .unwrap();
        let current = Period::new(
            "2023",
            scenario.current().property_values().clone(),
            rates,
            scenario.current().revenue_required(),
        )
        .unwrap();
        let edited = Scenario::new(
            "2023",
            current,
            scenario.previous().clone(),
            scenario.tolerance(),
        )
        .unwrap();
        assert_ne!(scenario.fingerprint(), edited.fingerprint());
    }
}
