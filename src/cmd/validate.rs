//! Validate command - surface scenario issues without generating the page

use super::ScenarioArgs;
use crate::core::{collect_warnings, Warning};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(flatten)]
    warning: Warning,
    message: String,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    scenario: String,
    fingerprint: String,
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let evaluated = self.scenario.evaluate()?;
        let scenario = &evaluated.scenario;

        let issues: Vec<ValidationIssue> =
            collect_warnings(&evaluated.result, &evaluated.rates, &scenario.sliders())
                .into_iter()
                .map(|warning| ValidationIssue {
                    message: warning.to_string(),
                    warning,
                })
                .collect();

        if self.json {
            let output = ValidationOutput {
                scenario: scenario.name().to_string(),
                fingerprint: scenario.fingerprint(),
                issue_count: issues.len(),
                issues: issues.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(scenario.name(), &issues);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn print_text(name: &str, issues: &[ValidationIssue]) {
    println!();
    println!("VALIDATION RESULTS ({})", name);
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
    } else {
        println!("\u{26A0} {} issue(s) found:", issues.len());
        println!();
        for (i, issue) in issues.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, issue_type(&issue.warning), issue.message);
        }
        println!();
    }
}

fn issue_type(warning: &Warning) -> &'static str {
    match warning {
        Warning::UndefinedPercentChange { .. } => "UndefinedPercentChange",
        Warning::RequirementMissed { .. } => "RequirementMissed",
        Warning::RateOutsideSlider { .. } => "RateOutsideSlider",
    }
}
