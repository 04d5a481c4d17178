//! Scenario files: JSON documents or one CSV row per period and sector.

use super::calculator::DEFAULT_TOLERANCE;
use super::error::CalcError;
use super::scenario::{Period, Scenario};
use super::sector::Sector;
use super::table::{PropertyValueTable, RateTable};
use anyhow::{bail, Context};
use millrate_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Column description produced by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Two periods of property values, mill rates and revenue requirements
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioInput {
    /// Scenario name shown in reports
    pub name: String,
    /// Allowed gap between revenue and requirement, in millions (default 0.01)
    #[serde(default = "default_tolerance")]
    #[schemars(with = "f64")]
    pub tolerance: Decimal,
    /// Period whose rates can be adjusted
    pub current: PeriodInput,
    /// Period the current one is compared against
    pub previous: PeriodInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PeriodInput {
    /// Year label, e.g. "2023"
    pub year: String,
    /// Required total revenue, in millions
    #[schemars(with = "f64")]
    pub revenue_required: Decimal,
    /// Assessed property value per sector, in millions
    #[schemars(with = "BTreeMap<Sector, f64>")]
    pub property_values: BTreeMap<Sector, Decimal>,
    /// Mill rate per sector
    #[schemars(with = "BTreeMap<Sector, f64>")]
    pub rates: BTreeMap<Sector, Decimal>,
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

impl TryFrom<PeriodInput> for Period {
    type Error = CalcError;

    fn try_from(input: PeriodInput) -> Result<Self, Self::Error> {
        Period::new(
            input.year,
            PropertyValueTable::new(input.property_values)?,
            RateTable::new(input.rates)?,
            input.revenue_required,
        )
    }
}

impl TryFrom<ScenarioInput> for Scenario {
    type Error = CalcError;

    fn try_from(input: ScenarioInput) -> Result<Self, Self::Error> {
        Scenario::new(
            input.name,
            input.current.try_into()?,
            input.previous.try_into()?,
            input.tolerance,
        )
    }
}

pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Scenario> {
    let input: ScenarioInput = serde_json::from_reader(reader)?;
    let scenario = Scenario::try_from(input)?;
    log::info!(
        "Read scenario '{}' with {} sectors",
        scenario.name(),
        scenario.sectors().count()
    );
    Ok(scenario)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Current,
    Previous,
}

/// One CSV row
#[derive(Debug, Deserialize, CsvSchema)]
pub struct SectorRecord {
    /// Which period the row belongs to: current or previous
    pub period: PeriodKind,
    /// Year label shown on the chart axis (e.g. 2023)
    pub year: String,
    /// Sector name (e.g. Residential, Light_Industry)
    pub sector: String,
    /// Assessed property value, in millions
    pub property_value: Decimal,
    /// Mill rate (tax per 1,000 of assessed value)
    pub mill_rate: Decimal,
    /// Required total revenue for the period, in millions (set on at least one row per period)
    pub revenue_required: Option<Decimal>,
}

#[derive(Default)]
struct PeriodRows {
    year: Option<String>,
    values: Vec<(Sector, Decimal)>,
    rates: Vec<(Sector, Decimal)>,
    revenue_required: Option<Decimal>,
}

impl PeriodRows {
    fn push(&mut self, record: SectorRecord) -> anyhow::Result<()> {
        let sector: Sector = record.sector.parse()?;
        match &self.year {
            Some(year) if *year != record.year => {
                bail!("period has two year labels: {} and {}", year, record.year)
            }
            Some(_) => {}
            None => self.year = Some(record.year),
        }
        if let Some(required) = record.revenue_required {
            match self.revenue_required {
                Some(existing) if existing != required => {
                    bail!(
                        "conflicting revenue_required values: {} and {}",
                        existing,
                        required
                    )
                }
                _ => self.revenue_required = Some(required),
            }
        }
        self.values.push((sector, record.property_value));
        self.rates.push((sector, record.mill_rate));
        Ok(())
    }

    fn into_period(self, kind: PeriodKind) -> anyhow::Result<Period> {
        let Some(year) = self.year else {
            bail!("no rows for the {:?} period", kind);
        };
        let Some(required) = self.revenue_required else {
            bail!("no revenue_required given for {}", year);
        };
        Ok(Period::new(
            year,
            PropertyValueTable::new(self.values)?,
            RateTable::new(self.rates)?,
            required,
        )?)
    }
}

pub fn read_csv<R: Read>(reader: R, name: &str) -> anyhow::Result<Scenario> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut current = PeriodRows::default();
    let mut previous = PeriodRows::default();

    for (i, result) in rdr.deserialize::<SectorRecord>().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = result.with_context(|| format!("invalid CSV row at line {}", line))?;
        let rows = match record.period {
            PeriodKind::Current => &mut current,
            PeriodKind::Previous => &mut previous,
        };
        rows.push(record)
            .with_context(|| format!("invalid CSV row at line {}", line))?;
    }

    let scenario = Scenario::new(
        name,
        current.into_period(PeriodKind::Current)?,
        previous.into_period(PeriodKind::Previous)?,
        DEFAULT_TOLERANCE,
    )?;
    log::info!(
        "Read {} csv sectors for scenario '{}'",
        scenario.sectors().count(),
        name
    );
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const JSON: &str = r#"{
        "name": "small",
        "current": {
            "year": "2023",
            "revenue_required": 0.4,
            "property_values": { "Residential": 100, "Light_Industry": 50 },
            "rates": { "Residential": 2, "Light_Industry": "4" }
        },
        "previous": {
            "year": "2022",
            "revenue_required": "0.35",
            "property_values": { "Residential": 100, "Light_Industry": 50 },
            "rates": { "Residential": 1.5, "Light_Industry": 4 }
        }
    }"#;

    #[test]
    fn json_scenario_parsed() {
        let scenario = read_json(JSON.as_bytes()).unwrap();
        assert_eq!(scenario.name(), "small");
        assert_eq!(scenario.tolerance(), DEFAULT_TOLERANCE);
        assert_eq!(scenario.current().year(), "2023");
        assert_eq!(
            scenario.current().rates().get(Sector::LightIndustry),
            Some(dec!(4))
        );
        assert_eq!(scenario.previous().revenue_required(), dec!(0.35));
        let result = scenario.recompute().unwrap();
        assert_eq!(result.total_revenue, dec!(0.4));
    }

    #[test]
    fn json_negative_rate_rejected() {
        let json = JSON.replace("\"Residential\": 1.5", "\"Residential\": -1.5");
        let err = read_json(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::NegativeInput { .. })
        ));
    }

    #[test]
    fn json_shape_mismatch_rejected() {
        let json = JSON.replace(
            "\"rates\": { \"Residential\": 2, \"Light_Industry\": \"4\" }",
            "\"rates\": { \"Residential\": 2 }",
        );
        let err = read_json(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::ShapeMismatch { .. })
        ));
    }

    const CSV: &str = "\
period,year,sector,property_value,mill_rate,revenue_required
current,2023,Residential,100,2,0.4
current,2023,light industry,50,4,
previous,2022,Residential,100,1.5,0.35
previous,2022,Light_Industry,50,4,
";

    #[test]
    fn csv_scenario_parsed() {
        let scenario = read_csv(CSV.as_bytes(), "small").unwrap();
        assert_eq!(scenario.name(), "small");
        assert_eq!(scenario.current().revenue_required(), dec!(0.4));
        assert_eq!(
            scenario.current().property_values().get(Sector::LightIndustry),
            Some(dec!(50))
        );
        assert_eq!(scenario.previous().year(), "2022");
    }

    #[test]
    fn csv_conflicting_requirement_rejected() {
        let csv = CSV.replace("current,2023,light industry,50,4,", "current,2023,light industry,50,4,0.5");
        assert!(read_csv(csv.as_bytes(), "x").is_err());
    }

    #[test]
    fn csv_missing_requirement_rejected() {
        let csv = CSV.replace("previous,2022,Residential,100,1.5,0.35", "previous,2022,Residential,100,1.5,");
        let err = read_csv(csv.as_bytes(), "x").unwrap_err();
        assert!(err.to_string().contains("revenue_required"));
    }

    #[test]
    fn csv_unknown_sector_rejected() {
        let csv = CSV.replace("current,2023,Residential", "current,2023,Mining");
        let err = read_csv(csv.as_bytes(), "x").unwrap_err();
        assert!(format!("{:#}", err).contains("unknown sector: Mining"));
    }

    #[test]
    fn csv_schema_matches_header() {
        assert_eq!(
            SectorRecord::csv_header(),
            "period,year,sector,property_value,mill_rate,revenue_required"
        );
        let schema = SectorRecord::csv_schema();
        assert_eq!(schema.len(), 6);
        assert!(schema[0].required);
        assert!(!schema[5].required);
        assert_eq!(schema[3].description, "Assessed property value, in millions");
    }
}
