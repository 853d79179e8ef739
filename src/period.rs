//! Fiscal reporting periods and their FnGuide option codes
//!
//! A period is either a full fiscal year or a single quarter of one. The target
//! site identifies periods by an option value in its period dropdown; [`encode`]
//! derives that value deterministically.

use std::fmt;
use thiserror::Error;

/// First fiscal year accepted by the period selector
pub const MIN_YEAR: i32 = 2000;

/// Last fiscal year accepted by the period selector
pub const MAX_YEAR: i32 = 2100;

/// Errors produced when constructing a period from raw input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("year must be between {MIN_YEAR} and {MAX_YEAR}, got {0}")]
    YearOutOfRange(i32),

    #[error("quarter must be between 1 and 4, got {0}")]
    QuarterOutOfRange(u8),
}

/// A fiscal quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Returns the quarter number (1-4)
    pub fn number(&self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    /// Returns the two-digit closing month of the quarter
    pub fn closing_month(&self) -> &'static str {
        match self {
            Self::Q1 => "03",
            Self::Q2 => "06",
            Self::Q3 => "09",
            Self::Q4 => "12",
        }
    }

    /// Returns all quarters in calendar order
    pub fn all() -> [Self; 4] {
        [Self::Q1, Self::Q2, Self::Q3, Self::Q4]
    }
}

impl TryFrom<u8> for Quarter {
    type Error = PeriodError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Q1),
            2 => Ok(Self::Q2),
            3 => Ok(Self::Q3),
            4 => Ok(Self::Q4),
            other => Err(PeriodError::QuarterOutOfRange(other)),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// A fiscal reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Full-year figures
    Annual { year: i32 },

    /// Figures for a single quarter
    Quarterly { year: i32, quarter: Quarter },
}

impl Period {
    /// Creates an annual period, validating the year
    pub fn annual(year: i32) -> Result<Self, PeriodError> {
        check_year(year)?;
        Ok(Self::Annual { year })
    }

    /// Creates a quarterly period, validating year and quarter
    pub fn quarterly(year: i32, quarter: u8) -> Result<Self, PeriodError> {
        check_year(year)?;
        let quarter = Quarter::try_from(quarter)?;
        Ok(Self::Quarterly { year, quarter })
    }

    /// Creates a period from a year and an optional quarter number
    ///
    /// An absent quarter means annual data.
    pub fn from_parts(year: i32, quarter: Option<u8>) -> Result<Self, PeriodError> {
        match quarter {
            Some(q) => Self::quarterly(year, q),
            None => Self::annual(year),
        }
    }

    /// Returns the fiscal year
    pub fn year(&self) -> i32 {
        match self {
            Self::Annual { year } | Self::Quarterly { year, .. } => *year,
        }
    }

    /// Returns the quarter, or None for annual periods
    pub fn quarter(&self) -> Option<Quarter> {
        match self {
            Self::Annual { .. } => None,
            Self::Quarterly { quarter, .. } => Some(*quarter),
        }
    }

    /// Returns true for annual periods
    pub fn is_annual(&self) -> bool {
        matches!(self, Self::Annual { .. })
    }

    /// Returns the site's period-selector value for this period
    pub fn code(&self) -> String {
        encode(self)
    }

    /// Returns the suffix used in output file names
    ///
    /// Quarterly runs are named after the period code; annual runs use `year`.
    pub fn file_suffix(&self) -> String {
        match self {
            Self::Annual { .. } => "year".to_string(),
            Self::Quarterly { .. } => self.code(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual { year } => write!(f, "{} annual", year),
            Self::Quarterly { year, quarter } => write!(f, "{} {}", year, quarter),
        }
    }
}

/// Encodes a period as the site's option value
///
/// Quarterly periods become `{year}{closing month}{quarter}` (2025 Q2 is
/// `2025062`); annual periods become `{year}12D`.
pub fn encode(period: &Period) -> String {
    match period {
        Period::Quarterly { year, quarter } => {
            format!("{}{}{}", year, quarter.closing_month(), quarter.number())
        }
        Period::Annual { year } => format!("{}12D", year),
    }
}

fn check_year(year: i32) -> Result<(), PeriodError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(PeriodError::YearOutOfRange(year))
    }
}
