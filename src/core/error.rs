use super::formula::FormulaError;
use super::sector::Sector;
use rust_decimal::Decimal;

/// Precondition violations raised while building tables or computing burdens.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("sector tables differ: missing {missing:?}, unexpected {unexpected:?}")]
    ShapeMismatch {
        missing: Vec<Sector>,
        unexpected: Vec<Sector>,
    },
    #[error("negative {table} for {sector}: {value}")]
    NegativeInput {
        table: &'static str,
        sector: Sector,
        value: Decimal,
    },
    #[error("duplicate {table} entry for {sector}")]
    DuplicateSector { table: &'static str, sector: Sector },
    #[error("tolerance must not be negative: {0}")]
    NegativeTolerance(Decimal),
    #[error("revenue requirement for {year} must not be negative: {value}")]
    NegativeRequirement { year: String, value: Decimal },
    #[error("unknown sector: {0}")]
    UnknownSector(String),
    #[error(transparent)]
    Formula(#[from] FormulaError),
}
