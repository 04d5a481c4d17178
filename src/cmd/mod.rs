pub mod html_report;
pub mod report;
pub mod schema;
pub mod summary;
pub mod validate;

use crate::core::{
    builtin, read_csv, read_json, LogListener, RateBoard, RateTable, Recomputation, Scenario,
    Sector, BUILTIN,
};
use anyhow::{anyhow, bail, Context};
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Scenario selection shared by every command that computes burdens
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Built-in scenario to use
    #[arg(short, long, default_value = "2023", conflicts_with = "input")]
    scenario: String,

    /// JSON or CSV scenario file ("-" reads JSON from stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override a current-period mill rate, e.g. --rate residential=2.2
    #[arg(short, long = "rate", value_name = "SECTOR=RATE")]
    rates: Vec<RateOverride>,
}

/// `SECTOR=RATE` from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateOverride {
    pub sector: Sector,
    pub rate: Decimal,
}

impl FromStr for RateOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rate) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SECTOR=RATE, got '{}'", s))?;
        let sector = name
            .trim()
            .parse::<Sector>()
            .map_err(|_| format!("unknown sector '{}'", name))?;
        let rate = rate
            .trim()
            .parse::<Decimal>()
            .map_err(|e| format!("invalid rate '{}': {}", rate, e))?;
        Ok(RateOverride { sector, rate })
    }
}

/// A scenario with the command-line overrides applied
pub struct Evaluated {
    pub scenario: Scenario,
    pub rates: RateTable,
    pub result: Recomputation,
    /// The scenario's own rates, when `--rate` moved any of them
    pub baseline: Option<Recomputation>,
}

impl ScenarioArgs {
    pub fn load(&self) -> anyhow::Result<Scenario> {
        match &self.input {
            Some(path) => read_scenario(path),
            None => builtin(&self.scenario).ok_or_else(|| {
                anyhow!(
                    "unknown scenario '{}' (built-in: {})",
                    self.scenario,
                    BUILTIN.join(", ")
                )
            }),
        }
    }

    /// Load the scenario and apply each `--rate` as a slider move would
    pub fn evaluate(&self) -> anyhow::Result<Evaluated> {
        let scenario = self.load()?;
        let (rates, result, baseline) = {
            let mut board = RateBoard::new(&scenario)?;
            board.subscribe(Box::new(LogListener));
            let mut result = board.snapshot()?;
            for o in &self.rates {
                result = board
                    .set_rate(o.sector, o.rate)
                    .with_context(|| format!("cannot apply --rate {}={}", o.sector.key(), o.rate))?;
            }
            let rates = board.rates().clone();
            let baseline = if self.rates.is_empty() {
                None
            } else {
                Some(board.reset()?)
            };
            (rates, result, baseline)
        };
        Ok(Evaluated {
            scenario,
            rates,
            result,
            baseline,
        })
    }
}

/// Read a scenario file, choosing the format by extension (or stdin with "-")
pub fn read_scenario(path: &Path) -> anyhow::Result<Scenario> {
    if path.as_os_str() == "-" {
        return read_from_stdin();
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let reader = BufReader::new(file);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let scenario = match extension.as_deref() {
        Some("json") => read_json(reader),
        Some("csv") => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("scenario");
            read_csv(reader, name)
        }
        _ => bail!(
            "unsupported input file {} (expected .json or .csv)",
            path.display()
        ),
    };
    scenario.with_context(|| format!("failed to read scenario from {}", path.display()))
}

fn read_from_stdin() -> anyhow::Result<Scenario> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        bail!("No input received. Provide a file or pipe scenario JSON to stdin.");
    }

    read_json(io::Cursor::new(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_rate_override() {
        assert_eq!(
            "light_industry=8.5".parse::<RateOverride>(),
            Ok(RateOverride {
                sector: Sector::LightIndustry,
                rate: dec!(8.5)
            })
        );
        assert_eq!(
            " Residential = 2.2 ".parse::<RateOverride>().map(|o| o.rate),
            Ok(dec!(2.2))
        );
    }

    #[test]
    fn reject_bad_rate_override() {
        assert!("residential".parse::<RateOverride>().is_err());
        assert!("mining=2".parse::<RateOverride>().is_err());
        assert!("farm=abc".parse::<RateOverride>().is_err());
    }

    fn args(rates: &[&str]) -> ScenarioArgs {
        ScenarioArgs {
            scenario: "2023".to_string(),
            input: None,
            rates: rates.iter().map(|r| r.parse().unwrap()).collect(),
        }
    }

    #[test]
    fn overrides_applied_in_order() {
        let evaluated = args(&["farm=1", "farm=3"]).evaluate().unwrap();
        assert_eq!(evaluated.rates.get(Sector::Farm), Some(dec!(3)));
        assert_eq!(
            evaluated.result,
            evaluated.scenario.recompute_with(&evaluated.rates).unwrap()
        );
    }

    #[test]
    fn baseline_only_with_overrides() {
        let plain = args(&[]).evaluate().unwrap();
        assert_eq!(plain.baseline, None);

        let moved = args(&["residential=2.4"]).evaluate().unwrap();
        let baseline = moved.baseline.unwrap();
        assert_eq!(baseline, moved.scenario.recompute().unwrap());
        assert_ne!(baseline.total_revenue, moved.result.total_revenue);
        assert_eq!(moved.rates.get(Sector::Residential), Some(dec!(2.4)));
    }

    #[test]
    fn negative_override_rejected() {
        assert!(args(&["farm=-1"]).evaluate().is_err());
    }

    #[test]
    fn unknown_builtin_rejected() {
        let mut a = args(&[]);
        a.scenario = "1999".to_string();
        let err = a.load().unwrap_err();
        assert!(err.to_string().contains("built-in: 2023"));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let path = std::env::temp_dir().join("millrate-test-scenario.txt");
        std::fs::write(&path, "x").unwrap();
        let err = read_scenario(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported input file"));
    }
}
