//! Infestation severity, derived solely from the detection count.
//!
//! Every call site (live preview, printable report, map popups, exports,
//! charts) goes through [`Severity::classify`]; the thresholds exist in
//! exactly one place and the tagged variant makes an unrecognized fourth
//! severity unrepresentable downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts at or above this are classified [`Severity::Severe`].
pub const SEVERE_MIN_COUNT: u32 = 10;

/// Counts at or above this (and below [`SEVERE_MIN_COUNT`]) are classified
/// [`Severity::Moderate`].
pub const MODERATE_MIN_COUNT: u32 = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Moderate,
    Severe,
}

impl Severity {
    /// Maps a detection count to a severity class. Total over `u32`: every
    /// count lands in exactly one class, inclusive lower bounds. Negative
    /// counts are unrepresentable here; callers holding signed values from
    /// foreign payloads clamp at their own boundary.
    #[must_use]
    pub const fn classify(count: u32) -> Self {
        if count >= SEVERE_MIN_COUNT {
            Self::Severe
        } else if count >= MODERATE_MIN_COUNT {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Low => "Low Severity",
            Self::Moderate => "Moderate Severity",
            Self::Severe => "Severe Severity",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => {
                "Few cocolisap detected. Minor infestation that can be managed with basic treatment."
            }
            Self::Moderate => {
                "Multiple cocolisap detected. Noticeable infestation requiring prompt treatment."
            }
            Self::Severe => {
                "Dense cocolisap infestation detected. Immediate intervention recommended."
            }
        }
    }

    /// How quickly the farmer should act.
    #[must_use]
    pub const fn response_window(self) -> &'static str {
        match self {
            Self::Low => "Regular monitoring recommended",
            Self::Moderate => "Action required within 3-5 days",
            Self::Severe => "Immediate action required within 24 hours",
        }
    }

    /// Position of this class on the indicator bar, in percent.
    #[must_use]
    pub const fn level_percent(self) -> u8 {
        match self {
            Self::Low => 33,
            Self::Moderate => 66,
            Self::Severe => 100,
        }
    }

    /// Map-marker color for this class.
    #[must_use]
    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::Low => "#059669",
            Self::Moderate => "#f59e0b",
            Self::Severe => "#dc2626",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
