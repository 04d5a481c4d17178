//! Html command: write the interactive rate tool page
//!
//! Generates a self-contained HTML file with embedded CSS/JS and one slider per sector.

use super::report::{build_report_data, html::generate_html};
use super::ScenarioArgs;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HtmlCommand {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Output file path (default: opens in browser)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl HtmlCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let evaluated = self.scenario.evaluate()?;
        let data = build_report_data(
            &evaluated.scenario,
            &evaluated.rates,
            &evaluated.result,
            &evaluated.scenario.sliders(),
            Utc::now(),
        );
        let html = generate_html(&data)?;

        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &html)?;
            println!("Rate tool written to: {}", output_path.display());
        } else {
            let temp_path = std::env::temp_dir().join("tax_rate_tool.html");
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened rate tool in browser: {}", temp_path.display());
        }
        log::info!(
            "{} revenue {:.2}M ({})",
            data.current.year,
            data.current.total,
            data.compliance.description
        );

        Ok(())
    }
}
