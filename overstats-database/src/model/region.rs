use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Game server region or console network a profile lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Eu,
    Us,
    Kr,
    Psn,
    Xbl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Pc,
    Console,
}

impl Region {
    pub const ALL: [Region; 5] = [Region::Eu, Region::Us, Region::Kr, Region::Psn, Region::Xbl];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Eu => "eu",
            Region::Us => "us",
            Region::Kr => "kr",
            Region::Psn => "psn",
            Region::Xbl => "xbl",
        }
    }

    pub fn platform(self) -> Platform {
        match self {
            Region::Psn | Region::Xbl => Platform::Console,
            Region::Eu | Region::Us | Region::Kr => Platform::Pc,
        }
    }

    /// Convert a user-typed handle into the form the stats API expects.
    /// PC BattleTags use `-` in place of `#`; console ids are kept as-is.
    pub fn normalize_handle(self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self.platform() {
            Platform::Pc => trimmed.replace('#', "-"),
            Platform::Console => trimmed.to_owned(),
        }
    }

    /// Inverse of [`Region::normalize_handle`] for display.
    pub fn display_handle(self, stored: &str) -> String {
        match self.platform() {
            Platform::Pc => stored.replace('-', "#"),
            Platform::Console => stored.to_owned(),
        }
    }
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::Console => "console",
        }
    }

    pub fn regions(self) -> Vec<Region> {
        Region::ALL
            .into_iter()
            .filter(|region| region.platform() == self)
            .collect()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Region::ALL
            .into_iter()
            .find(|region| region.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("unknown region `{value}`"))
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pc" => Ok(Platform::Pc),
            "console" => Ok(Platform::Console),
            _ => Err(anyhow::anyhow!("unknown platform `{value}`")),
        }
    }
}
