use super::error::CalcError;
use super::sector::Sector;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Marker for what a [`SectorTable`] holds
pub trait TableKind {
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MillRate {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burden {}

impl TableKind for PropertyValue {
    const NAME: &'static str = "property value";
}

impl TableKind for MillRate {
    const NAME: &'static str = "mill rate";
}

impl TableKind for Burden {
    const NAME: &'static str = "burden";
}

/// Property values per sector, in millions
pub type PropertyValueTable = SectorTable<PropertyValue>;
/// Mill rates per sector
pub type RateTable = SectorTable<MillRate>;
/// Computed tax burden per sector, in millions
pub type BurdenTable = SectorTable<Burden>;

/// Non-negative amount per sector, ordered by sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorTable<K> {
    values: BTreeMap<Sector, Decimal>,
    kind: PhantomData<K>,
}

impl<K: TableKind> SectorTable<K> {
    /// Build a table, rejecting negative amounts and repeated sectors
    pub fn new<I>(entries: I) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = (Sector, Decimal)>,
    {
        let mut values = BTreeMap::new();
        for (sector, value) in entries {
            check_non_negative::<K>(sector, value)?;
            if values.insert(sector, value).is_some() {
                return Err(CalcError::DuplicateSector {
                    table: K::NAME,
                    sector,
                });
            }
        }
        Ok(Self::from_map(values))
    }

    /// Build from a table whose entries are already known to be valid
    pub(crate) fn from_map(values: BTreeMap<Sector, Decimal>) -> Self {
        SectorTable {
            values,
            kind: PhantomData,
        }
    }

    pub fn get(&self, sector: Sector) -> Option<Decimal> {
        self.values.get(&sector).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sector, Decimal)> + '_ {
        self.values.iter().map(|(s, v)| (*s, *v))
    }

    pub fn sectors(&self) -> impl Iterator<Item = Sector> + '_ {
        self.values.keys().copied()
    }

    pub fn total(&self) -> Decimal {
        self.values.values().copied().sum()
    }

    /// Copy of this table with one sector's amount replaced
    pub fn with(&self, sector: Sector, value: Decimal) -> Result<Self, CalcError> {
        check_non_negative::<K>(sector, value)?;
        if !self.values.contains_key(&sector) {
            return Err(CalcError::ShapeMismatch {
                missing: Vec::new(),
                unexpected: vec![sector],
            });
        }
        let mut values = self.values.clone();
        values.insert(sector, value);
        Ok(Self::from_map(values))
    }

    /// Fail unless `other` covers exactly the same sectors
    pub fn check_same_sectors<O>(&self, other: &SectorTable<O>) -> Result<(), CalcError> {
        let missing: Vec<Sector> = self
            .values
            .keys()
            .filter(|s| !other.values.contains_key(*s))
            .copied()
            .collect();
        let unexpected: Vec<Sector> = other
            .values
            .keys()
            .filter(|s| !self.values.contains_key(*s))
            .copied()
            .collect();
        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(CalcError::ShapeMismatch {
                missing,
                unexpected,
            })
        }
    }
}

fn check_non_negative<K: TableKind>(sector: Sector, value: Decimal) -> Result<(), CalcError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CalcError::NegativeInput {
            table: K::NAME,
            sector,
            value,
        });
    }
    Ok(())
}
