//! Burden, percent change and revenue-target compliance.
//!
//! Everything here is a pure function of its inputs. The arithmetic goes
//! through the shared formulas in [`super::formula`].

use super::error::CalcError;
use super::formula::{self, FormulaError};
use super::sector::Sector;
use super::table::{BurdenTable, PropertyValueTable, RateTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default tolerance in millions (i.e. $10,000)
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.01);

/// Outcome of comparing collected revenue against the requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ComplianceVerdict {
    /// Within tolerance of the requirement
    ExactMatch,
    /// Collected more than required
    Surplus,
    /// Collected less than required
    Shortfall,
}

impl ComplianceVerdict {
    pub const ALL: [ComplianceVerdict; 3] = [
        ComplianceVerdict::ExactMatch,
        ComplianceVerdict::Surplus,
        ComplianceVerdict::Shortfall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComplianceVerdict::ExactMatch => "just right",
            ComplianceVerdict::Surplus => "too much",
            ComplianceVerdict::Shortfall => "not enough",
        }
    }

    /// Indicator fill colour
    pub fn color(self) -> &'static str {
        match self {
            ComplianceVerdict::ExactMatch => "forestgreen",
            ComplianceVerdict::Surplus => "black",
            ComplianceVerdict::Shortfall => "darkred",
        }
    }
}

impl std::fmt::Display for ComplianceVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compliance {
    pub verdict: ComplianceVerdict,
    /// `required - total`, in millions
    pub balance: Decimal,
}

impl Compliance {
    /// Size of the mismatch, in millions
    pub fn magnitude(&self) -> Decimal {
        self.balance.abs()
    }

    /// e.g. "just right", "too much by $0.12M", "not enough by $3.07M"
    pub fn describe(&self) -> String {
        match self.verdict {
            ComplianceVerdict::ExactMatch => self.verdict.label().to_string(),
            _ => format!(
                "{} by ${:.2}M",
                self.verdict.label(),
                self.magnitude().round_dp(2)
            ),
        }
    }
}

/// Year-over-year change for one sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentChange {
    Change(Decimal),
    /// Previous burden was zero
    Undefined,
}

impl PercentChange {
    pub fn value(self) -> Option<Decimal> {
        match self {
            PercentChange::Change(pct) => Some(pct),
            PercentChange::Undefined => None,
        }
    }
}

impl std::fmt::Display for PercentChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PercentChange::Change(pct) => write!(f, "{:.1}%", pct.round_dp(1)),
            PercentChange::Undefined => write!(f, "n/a"),
        }
    }
}

/// Result of one full recomputation for the current period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recomputation {
    pub current: BurdenTable,
    pub previous: BurdenTable,
    pub percent_change: BTreeMap<Sector, PercentChange>,
    pub total_revenue: Decimal,
    pub compliance: Compliance,
}

/// `burden[s] = rate[s] * value[s] / 1000` for every sector
pub fn compute_burden(
    values: &PropertyValueTable,
    rates: &RateTable,
) -> Result<BurdenTable, CalcError> {
    values.check_same_sectors(rates)?;
    let burden = formula::burden();
    // same key set, so both iterate in the same order
    let burdens = values
        .iter()
        .zip(rates.iter())
        .map(|((sector, value), (_, rate))| -> Result<_, CalcError> {
            Ok((sector, burden.eval(&[rate, value])?))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(BurdenTable::from_map(burdens))
}

/// Percent change for each sector present in both tables
pub fn compute_percent_change(
    current: &BurdenTable,
    previous: &BurdenTable,
) -> BTreeMap<Sector, PercentChange> {
    let formula = formula::percent_change();
    current
        .iter()
        .filter_map(|(sector, now)| {
            let before = previous.get(sector)?;
            let change = match formula.eval(&[now, before]) {
                Ok(pct) => PercentChange::Change(pct),
                Err(FormulaError::DivisionByZero) => PercentChange::Undefined,
                Err(err) => {
                    log::warn!("percent change for {} not computable: {}", sector, err);
                    PercentChange::Undefined
                }
            };
            Some((sector, change))
        })
        .collect()
}

/// Compare collected revenue against the requirement within `tolerance`
pub fn evaluate_compliance(
    total_revenue: Decimal,
    required: Decimal,
    tolerance: Decimal,
) -> Result<Compliance, CalcError> {
    let balance = formula::balance().eval(&[required, total_revenue])?;
    let verdict = if balance < -tolerance {
        ComplianceVerdict::Surplus
    } else if balance > tolerance {
        ComplianceVerdict::Shortfall
    } else {
        ComplianceVerdict::ExactMatch
    };
    Ok(Compliance { verdict, balance })
}

/// Full recomputation after a rate change.
///
/// Recomputes the current burden from the complete rate table and leaves the
/// previous burden as given. Holds no state between calls.
pub fn recompute_all(
    values: &PropertyValueTable,
    rates: &RateTable,
    previous: &BurdenTable,
    required: Decimal,
    tolerance: Decimal,
) -> Result<Recomputation, CalcError> {
    let current = compute_burden(values, rates)?;
    current.check_same_sectors(previous)?;
    let percent_change = compute_percent_change(&current, previous);
    let total_revenue = current.total();
    let compliance = evaluate_compliance(total_revenue, required, tolerance)?;

    log::debug!(
        "recomputed: revenue {:.4} vs required {:.4} -> {}",
        total_revenue,
        required,
        compliance.describe()
    );

    Ok(Recomputation {
        current,
        previous: previous.clone(),
        percent_change,
        total_revenue,
        compliance,
    })
}
