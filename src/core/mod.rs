pub mod calculator;
pub mod error;
pub mod formula;
pub mod input;
pub mod rates;
pub mod scenario;
pub mod sector;
pub mod table;
pub mod warnings;

// Flat public surface for domain types and functions.
#[allow(unused_imports)]
pub use calculator::{
    compute_burden, compute_percent_change, evaluate_compliance, recompute_all, Compliance,
    ComplianceVerdict, PercentChange, Recomputation, DEFAULT_TOLERANCE,
};
pub use error::CalcError;
#[allow(unused_imports)]
pub use input::{read_csv, read_json, CsvField, ScenarioInput, SectorRecord};
#[allow(unused_imports)]
pub use rates::{LogListener, RateBoard, RecomputeListener, SliderSpec};
pub use scenario::{builtin, Period, Scenario, BUILTIN};
pub use sector::Sector;
#[allow(unused_imports)]
pub use table::{BurdenTable, PropertyValueTable, RateTable};
pub use warnings::{collect_warnings, Warning};
