//! Summary command - per-sector burdens, totals and the revenue verdict

use super::{Evaluated, ScenarioArgs};
use crate::core::ComplianceVerdict;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Row for the sector table output
#[derive(Debug, Clone, Tabled)]
struct SectorRow {
    #[tabled(rename = "Sector")]
    sector: String,
    #[tabled(rename = "Value ($M)")]
    property_value: String,
    #[tabled(rename = "Prev. Rate")]
    previous_rate: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Prev. Revenue")]
    previous_burden: String,
    #[tabled(rename = "Revenue")]
    burden: String,
    #[tabled(rename = "Change")]
    change: String,
}

/// Summary data for JSON output
#[derive(Debug, Serialize)]
struct SummaryData {
    scenario: String,
    fingerprint: String,
    current_year: String,
    previous_year: String,
    sectors: Vec<SectorSummary>,
    total_revenue: String,
    previous_total_revenue: String,
    revenue_required: String,
    verdict: ComplianceVerdict,
    balance: String,
    description: String,
    /// Present when `--rate` overrides were applied
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario_rates: Option<BaselineSummary>,
}

/// Totals at the scenario's own rates
#[derive(Debug, Serialize)]
struct BaselineSummary {
    total_revenue: String,
    verdict: ComplianceVerdict,
    description: String,
}

#[derive(Debug, Serialize)]
struct SectorSummary {
    sector: String,
    property_value: String,
    rate: String,
    previous_burden: String,
    burden: String,
    /// null when the previous burden is zero
    percent_change: Option<String>,
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let evaluated = self.scenario.evaluate()?;
        if self.json {
            self.print_json(&evaluated)
        } else {
            self.print_summary(&evaluated);
            Ok(())
        }
    }

    fn print_summary(&self, evaluated: &Evaluated) {
        let Evaluated {
            scenario,
            rates,
            result,
            baseline,
        } = evaluated;
        let current = scenario.current();
        let previous = scenario.previous();

        println!();
        println!(
            "MILL RATE SUMMARY ({}: {} vs {})",
            scenario.name(),
            current.year(),
            previous.year()
        );
        println!();

        let rows: Vec<SectorRow> = result
            .current
            .iter()
            .map(|(sector, burden)| SectorRow {
                sector: sector.label().to_string(),
                property_value: format_amount(current.property_values().get(sector)),
                previous_rate: format_amount(previous.rates().get(sector)),
                rate: format_amount(rates.get(sector)),
                previous_burden: format_millions(result.previous.get(sector).unwrap_or_default()),
                burden: format_millions(burden),
                change: result
                    .percent_change
                    .get(&sector)
                    .map_or("n/a".to_string(), |pct| pct.to_string()),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();

        println!(
            "REVENUE {}: {} | Required: {}",
            current.year(),
            format_millions(result.total_revenue),
            format_millions(current.revenue_required())
        );
        println!(
            "REVENUE {}: {} | Required: {}",
            previous.year(),
            format_millions(result.previous.total()),
            format_millions(previous.revenue_required())
        );
        println!(
            "VERDICT (within ${:.2}M): {}",
            scenario.tolerance(),
            result.compliance.describe()
        );
        if let Some(baseline) = baseline {
            println!(
                "AT SCENARIO RATES: {} ({})",
                format_millions(baseline.total_revenue),
                baseline.compliance.describe()
            );
        }
        println!();
    }

    fn print_json(&self, evaluated: &Evaluated) -> anyhow::Result<()> {
        let Evaluated {
            scenario,
            rates,
            result,
            baseline,
        } = evaluated;
        let current = scenario.current();

        let sectors = result
            .current
            .iter()
            .map(|(sector, burden)| SectorSummary {
                sector: sector.key().to_string(),
                property_value: format_amount(current.property_values().get(sector)),
                rate: format_amount(rates.get(sector)),
                previous_burden: format!(
                    "{:.6}",
                    result.previous.get(sector).unwrap_or_default().round_dp(6)
                ),
                burden: format!("{:.6}", burden.round_dp(6)),
                percent_change: result
                    .percent_change
                    .get(&sector)
                    .and_then(|pct| pct.value())
                    .map(|pct| format!("{:.4}", pct.round_dp(4))),
            })
            .collect();

        let data = SummaryData {
            scenario: scenario.name().to_string(),
            fingerprint: scenario.fingerprint(),
            current_year: current.year().to_string(),
            previous_year: scenario.previous().year().to_string(),
            sectors,
            total_revenue: format!("{:.6}", result.total_revenue.round_dp(6)),
            previous_total_revenue: format!("{:.6}", result.previous.total().round_dp(6)),
            revenue_required: format!("{}", current.revenue_required()),
            verdict: result.compliance.verdict,
            balance: format!("{:.6}", result.compliance.balance.round_dp(6)),
            description: result.compliance.describe(),
            scenario_rates: baseline.as_ref().map(|baseline| BaselineSummary {
                total_revenue: format!("{:.6}", baseline.total_revenue.round_dp(6)),
                verdict: baseline.compliance.verdict,
                description: baseline.compliance.describe(),
            }),
        };

        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}

fn format_millions(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${:.2}M", amount.abs().round_dp(2))
    } else {
        format!("${:.2}M", amount.round_dp(2))
    }
}

fn format_amount(amount: Option<Decimal>) -> String {
    amount.map_or("-".to_string(), |a| a.normalize().to_string())
}
