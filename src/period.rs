// Year-month period tokens.
//
// Periods are always zero-padded `YYYY-MM`, so the derived string ordering is
// also the chronological ordering. Sorting and "last N periods" slicing lean
// on that.
use crate::error::{KpiError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(String);

impl Period {
    /// Validate a `YYYY-MM` token. Surrounding whitespace is trimmed, but the
    /// month must already be zero-padded (`2024-4` is rejected).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let bytes = s.as_bytes();
        let digits = |r: std::ops::Range<usize>| bytes[r].iter().all(u8::is_ascii_digit);
        if bytes.len() != 7 || bytes[4] != b'-' || !digits(0..4) || !digits(5..7) {
            return Err(KpiError::InvalidPeriod(s.to_string()));
        }
        // Let chrono decide whether the month is a real calendar month.
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map_err(|_| KpiError::InvalidPeriod(s.to_string()))?;
        Ok(Period(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Period {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = KpiError;

    fn try_from(s: String) -> Result<Self> {
        Period::parse(&s)
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_padded_months() {
        assert_eq!(Period::parse("2024-04").unwrap().as_str(), "2024-04");
        assert_eq!(Period::parse(" 2023-12 ").unwrap().as_str(), "2023-12");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in ["2024-4", "2024/04", "2024-13", "2024-00", "24-04", "", "abcd-ef", "-024-04"] {
            assert!(Period::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn ordering_is_chronological() {
        let mut v: Vec<Period> = ["2024-10", "2023-12", "2024-02"]
            .iter()
            .map(|s| Period::parse(s).unwrap())
            .collect();
        v.sort();
        let got: Vec<&str> = v.iter().map(Period::as_str).collect();
        assert_eq!(got, vec!["2023-12", "2024-02", "2024-10"]);
    }
}
