use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Financial-statement bucket a transaction is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FsLine {
    Salary,
    Utility,
    Rent,
    Ingredient,
    Other,
}

impl FsLine {
    pub fn as_str(self) -> &'static str {
        match self {
            FsLine::Salary => "Salary",
            FsLine::Utility => "Utility",
            FsLine::Rent => "Rent",
            FsLine::Ingredient => "Ingredient",
            FsLine::Other => "Other",
        }
    }
}

impl fmt::Display for FsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statement currency. Each bank export is in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Khr,
    Usd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Khr => write!(f, "KHR"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown currency: '{0}'")]
pub struct CurrencyParseError(pub String);

impl std::str::FromStr for Currency {
    type Err = CurrencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KHR" => Ok(Currency::Khr),
            "USD" => Ok(Currency::Usd),
            other => Err(CurrencyParseError(other.to_string())),
        }
    }
}
