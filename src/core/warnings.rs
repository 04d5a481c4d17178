use super::calculator::{ComplianceVerdict, PercentChange, Recomputation};
use super::rates::SliderSpec;
use super::sector::Sector;
use super::table::RateTable;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Domain warnings about a scenario and the rates applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// Previous burden was zero, so the percent change has no value.
    UndefinedPercentChange { sector: Sector },
    /// Collected revenue misses the requirement by more than the tolerance.
    RequirementMissed {
        verdict: ComplianceVerdict,
        #[schemars(with = "f64")]
        magnitude: Decimal,
    },
    /// Rate lies outside the slider range, so the page cannot reproduce it.
    RateOutsideSlider {
        sector: Sector,
        #[schemars(with = "f64")]
        rate: Decimal,
        #[schemars(with = "f64")]
        start: Decimal,
        #[schemars(with = "f64")]
        end: Decimal,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UndefinedPercentChange { sector } => {
                write!(f, "{}: previous burden is zero, percent change undefined", sector)
            }
            Warning::RequirementMissed { verdict, magnitude } => {
                write!(f, "revenue is {} by ${:.2}M", verdict, magnitude.round_dp(2))
            }
            Warning::RateOutsideSlider {
                sector,
                rate,
                start,
                end,
            } => write!(
                f,
                "{}: rate {} is outside the slider range {}..{}",
                sector, rate, start, end
            ),
        }
    }
}

/// Warnings for `result`, computed with `rates` against `sliders`.
pub fn collect_warnings(
    result: &Recomputation,
    rates: &RateTable,
    sliders: &[SliderSpec],
) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = result
        .percent_change
        .iter()
        .filter(|(_, change)| **change == PercentChange::Undefined)
        .map(|(sector, _)| Warning::UndefinedPercentChange { sector: *sector })
        .collect();

    if result.compliance.verdict != ComplianceVerdict::ExactMatch {
        warnings.push(Warning::RequirementMissed {
            verdict: result.compliance.verdict,
            magnitude: result.compliance.magnitude(),
        });
    }

    for slider in sliders {
        if let Some(rate) = rates.get(slider.sector) {
            if !slider.contains(rate) {
                warnings.push(Warning::RateOutsideSlider {
                    sector: slider.sector,
                    rate,
                    start: slider.start,
                    end: slider.end,
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scenario::builtin;
    use rust_decimal_macros::dec;

    #[test]
    fn builtin_scenario_is_clean() {
        let scenario = builtin("2023").unwrap();
        let result = scenario.recompute().unwrap();
        let warnings = collect_warnings(&result, scenario.current().rates(), &scenario.sliders());
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn rate_beyond_slider_and_surplus_reported() {
        let scenario = builtin("2023").unwrap();
        let rates = scenario
            .current()
            .rates()
            .with(Sector::Residential, dec!(3))
            .unwrap();
        let result = scenario.recompute_with(&rates).unwrap();
        let warnings = collect_warnings(&result, &rates, &scenario.sliders());

        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0],
            Warning::RequirementMissed {
                verdict: ComplianceVerdict::Surplus,
                ..
            }
        ));
        assert_eq!(
            warnings[1],
            Warning::RateOutsideSlider {
                sector: Sector::Residential,
                rate: dec!(3),
                start: dec!(1.8246),
                end: dec!(2.4246),
            }
        );
        assert_eq!(
            warnings[1].to_string(),
            "Residential: rate 3 is outside the slider range 1.8246..2.4246"
        );
    }

    #[test]
    fn serialises_with_type_tag() {
        let json = serde_json::to_value(Warning::UndefinedPercentChange {
            sector: Sector::Farm,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "UndefinedPercentChange", "sector": "Farm" })
        );
    }
}
