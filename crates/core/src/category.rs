//! Flight category from visibility and ceiling.

use std::fmt;

use serde::Serialize;

/// Visibility assumed when a report carries none
pub const DEFAULT_VISIBILITY_METERS: u32 = 9999;
/// Ceiling assumed when no layer forms one
pub const UNLIMITED_CEILING_FEET: u32 = 99_900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    /// Neither visibility nor ceiling was reported
    Unk,
}

impl FlightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Unk => "UNK",
        }
    }

    /// IFR or LIFR
    pub fn is_instrument(&self) -> bool {
        matches!(self, FlightCategory::Ifr | FlightCategory::Lifr)
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct CategoryLimit {
    pub category: FlightCategory,
    pub visibility_below_meters: u32,
    pub ceiling_below_feet: u32,
}

/// Worst category first; the first row either dimension falls under wins.
pub const CATEGORY_LIMITS: [CategoryLimit; 3] = [
    CategoryLimit {
        category: FlightCategory::Lifr,
        visibility_below_meters: 1600,
        ceiling_below_feet: 500,
    },
    CategoryLimit {
        category: FlightCategory::Ifr,
        visibility_below_meters: 3000,
        ceiling_below_feet: 1000,
    },
    CategoryLimit {
        category: FlightCategory::Mvfr,
        visibility_below_meters: 5000,
        ceiling_below_feet: 3000,
    },
];

pub fn classify(visibility_meters: Option<u32>, ceiling_feet: Option<u32>) -> FlightCategory {
    if visibility_meters.is_none() && ceiling_feet.is_none() {
        return FlightCategory::Unk;
    }
    let visibility = visibility_meters.unwrap_or(DEFAULT_VISIBILITY_METERS);
    let ceiling = ceiling_feet.unwrap_or(UNLIMITED_CEILING_FEET);

    CATEGORY_LIMITS
        .iter()
        .find(|limit| {
            visibility < limit.visibility_below_meters || ceiling < limit.ceiling_below_feet
        })
        .map(|limit| limit.category)
        .unwrap_or(FlightCategory::Vfr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_dimension_decides() {
        assert_eq!(classify(Some(1500), Some(400)), FlightCategory::Lifr);
        assert_eq!(classify(Some(9999), Some(400)), FlightCategory::Lifr);
        assert_eq!(classify(Some(1500), Some(25000)), FlightCategory::Lifr);
        assert_eq!(classify(Some(2500), Some(2500)), FlightCategory::Ifr);
        assert_eq!(classify(Some(9999), Some(900)), FlightCategory::Ifr);
        assert_eq!(classify(Some(16093), Some(2500)), FlightCategory::Mvfr);
        assert_eq!(classify(Some(9999), Some(3000)), FlightCategory::Vfr);
    }

    #[test]
    fn missing_dimension_counts_as_good() {
        assert_eq!(classify(Some(4000), None), FlightCategory::Mvfr);
        assert_eq!(classify(None, Some(800)), FlightCategory::Ifr);
        assert_eq!(classify(None, Some(5000)), FlightCategory::Vfr);
        assert_eq!(classify(None, None), FlightCategory::Unk);
    }

    #[test]
    fn boundaries_are_exclusive() {
        assert_eq!(classify(Some(1600), Some(500)), FlightCategory::Ifr);
        assert_eq!(classify(Some(3000), Some(1000)), FlightCategory::Mvfr);
        assert_eq!(classify(Some(5000), Some(3000)), FlightCategory::Vfr);
    }
}
