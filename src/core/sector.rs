use super::error::CalcError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Property class a mill rate applies to.
///
/// Declaration order is the legend and axis order used in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Sector {
    Residential,
    Business,
    Utilities,
    #[serde(rename = "Light_Industry")]
    LightIndustry,
    #[serde(rename = "Port_Property")]
    PortProperty,
    #[serde(rename = "Port_Improvement")]
    PortImprovement,
    Recreation,
    Forests,
    Farm,
}

impl Sector {
    pub const ALL: [Sector; 9] = [
        Sector::Residential,
        Sector::Business,
        Sector::Utilities,
        Sector::LightIndustry,
        Sector::PortProperty,
        Sector::PortImprovement,
        Sector::Recreation,
        Sector::Forests,
        Sector::Farm,
    ];

    /// Stable identifier used for data binding in the HTML page
    pub fn key(self) -> &'static str {
        match self {
            Sector::Residential => "Residential",
            Sector::Business => "Business",
            Sector::Utilities => "Utilities",
            Sector::LightIndustry => "Light_Industry",
            Sector::PortProperty => "Port_Property",
            Sector::PortImprovement => "Port_Improvement",
            Sector::Recreation => "Recreation",
            Sector::Forests => "Forests",
            Sector::Farm => "Farm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sector::LightIndustry => "Light Industry",
            Sector::PortProperty => "Port Property",
            Sector::PortImprovement => "Port Improvement",
            other => other.key(),
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parses a sector name, ignoring case and `_`, `-` or space separators
impl FromStr for Sector {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Sector::ALL
            .into_iter()
            .find(|sector| {
                let key: String = sector
                    .key()
                    .chars()
                    .filter(|c| *c != '_')
                    .flat_map(char::to_lowercase)
                    .collect();
                key == normalized
            })
            .ok_or_else(|| CalcError::UnknownSector(s.to_string()))
    }
}
