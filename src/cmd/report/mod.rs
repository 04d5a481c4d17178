//! View model for the interactive rate tool page.

pub mod chart;
pub mod html;

use crate::core::{ComplianceVerdict, Recomputation, RateTable, Scenario, SliderSpec};
use chart::{PercentLayout, RevenueLayout, SPECTRAL9};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the page needs, embedded as JSON
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub scenario: String,
    pub fingerprint: String,
    pub generated_at: String,
    pub tolerance: f64,
    pub indicator_title: String,
    pub current: PeriodSummary,
    pub previous: PeriodSummary,
    pub sectors: Vec<SectorRow>,
    pub sliders: Vec<SliderRow>,
    pub compliance: ComplianceRow,
    /// Label and colour per verdict, keyed by variant name
    pub verdicts: BTreeMap<String, VerdictStyle>,
    pub revenue_chart: RevenueLayout,
    pub percent_chart: PercentLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub year: String,
    pub required: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorRow {
    pub key: String,
    pub label: String,
    pub color: String,
    pub property_value: f64,
    pub rate: f64,
    pub current_burden: f64,
    pub previous_burden: f64,
    /// `None` (JSON null) when the previous burden is zero
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderRow {
    pub key: String,
    pub title: String,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    pub value: f64,
    /// Where the Reset button puts the control back to
    pub reset: SliderPosition,
}

/// Range and value of a slider at the scenario's own rate
#[derive(Debug, Clone, Serialize)]
pub struct SliderPosition {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRow {
    pub verdict: ComplianceVerdict,
    pub label: String,
    pub color: String,
    pub balance: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerdictStyle {
    pub label: String,
    pub color: String,
}

/// Nearest `f64`, so short decimals print back unchanged in the page
fn num(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(f64::NAN)
}

/// Build the page view model from a recomputation made with `rates`.
///
/// Each slider opens on the applied rate, with its step grid moved and its
/// range widened as needed, so the page opens on exactly the rates given.
/// `sliders` are the scenario's own controls and become the reset positions.
pub fn build_report_data(
    scenario: &Scenario,
    rates: &RateTable,
    result: &Recomputation,
    sliders: &[SliderSpec],
    generated_at: DateTime<Utc>,
) -> ReportData {
    let current = scenario.current();
    let previous = scenario.previous();

    let sectors: Vec<SectorRow> = result
        .current
        .iter()
        .map(|(sector, burden)| SectorRow {
            key: sector.key().to_string(),
            label: sector.label().to_string(),
            color: SPECTRAL9[sector as usize].to_string(),
            property_value: num(current.property_values().get(sector).unwrap_or_default()),
            rate: num(rates.get(sector).unwrap_or_default()),
            current_burden: num(burden),
            previous_burden: num(result.previous.get(sector).unwrap_or_default()),
            percent_change: result
                .percent_change
                .get(&sector)
                .and_then(|pct| pct.value())
                .map(num),
        })
        .collect();

    let sliders = sliders
        .iter()
        .map(|slider| {
            let opening = slider.aligned_to(rates.get(slider.sector).unwrap_or(slider.value));
            SliderRow {
                key: slider.sector.key().to_string(),
                title: slider.title.clone(),
                start: num(opening.start),
                end: num(opening.end),
                step: num(slider.step),
                value: num(opening.value),
                reset: SliderPosition {
                    start: num(slider.start),
                    end: num(slider.end),
                    value: num(slider.value),
                },
            }
        })
        .collect();

    let previous_total = result.previous.total();
    let x_max = chart::revenue_axis_max([
        result.total_revenue,
        previous_total,
        current.revenue_required(),
        previous.revenue_required(),
    ]);

    let verdicts = ComplianceVerdict::ALL
        .into_iter()
        .map(|verdict| {
            (
                format!("{:?}", verdict),
                VerdictStyle {
                    label: verdict.label().to_string(),
                    color: verdict.color().to_string(),
                },
            )
        })
        .collect();

    let compliance = &result.compliance;
    ReportData {
        scenario: scenario.name().to_string(),
        fingerprint: scenario.fingerprint(),
        generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        tolerance: num(scenario.tolerance()),
        indicator_title: chart::indicator_title(scenario.tolerance()),
        current: PeriodSummary {
            year: current.year().to_string(),
            required: num(current.revenue_required()),
            total: num(result.total_revenue),
        },
        previous: PeriodSummary {
            year: previous.year().to_string(),
            required: num(previous.revenue_required()),
            total: num(previous_total),
        },
        percent_chart: PercentLayout::new(sectors.len()),
        sectors,
        sliders,
        compliance: ComplianceRow {
            verdict: compliance.verdict,
            label: compliance.verdict.label().to_string(),
            color: compliance.verdict.color().to_string(),
            balance: num(compliance.balance),
            description: compliance.describe(),
        },
        verdicts,
        revenue_chart: RevenueLayout::new(num(x_max)),
    }
}
