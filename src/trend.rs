// Multi-period KPI series.
use crate::aggregate::{branch_kpi, company_kpi, site_kpi};
use crate::error::{KpiError, Result};
use crate::period::Period;
use crate::source::RecordSource;
use crate::types::KpiSnapshot;
use tracing::debug;

pub const DEFAULT_TREND_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendTarget {
    Site(String),
    Branch(String),
    Company,
}

impl TrendTarget {
    /// Build a target from a kind label (`site`, `branch`, `company`) and an
    /// optional identifier. Site and branch targets need the identifier;
    /// company ignores it.
    pub fn from_parts(kind: &str, id: Option<&str>) -> Result<Self> {
        let id = id.map(str::trim).filter(|s| !s.is_empty());
        match (kind.trim(), id) {
            ("company", _) => Ok(TrendTarget::Company),
            ("site", Some(id)) => Ok(TrendTarget::Site(id.to_string())),
            ("branch", Some(id)) => Ok(TrendTarget::Branch(id.to_string())),
            ("site" | "branch", None) => Err(KpiError::InvalidTarget(format!(
                "an identifier is required for {kind} targets"
            ))),
            (other, _) => Err(KpiError::InvalidTarget(format!(
                "`{other}` is not one of site, branch, company"
            ))),
        }
    }
}

/// The `months` most recent periods, oldest first. Fewer are returned when
/// the data does not span that many.
pub fn latest_periods<S: RecordSource + ?Sized>(source: &S, months: usize) -> Vec<Period> {
    let periods = source.available_periods();
    let start = periods.len().saturating_sub(months);
    periods[start..].to_vec()
}

/// Roll up `target` for each of the latest `months` periods.
///
/// Periods where the target does not resolve are skipped, so the series can
/// be shorter than `months`. Output is in ascending period order.
pub fn kpi_trend<S: RecordSource + ?Sized>(
    source: &S,
    target: &TrendTarget,
    months: usize,
) -> Vec<KpiSnapshot> {
    let periods = latest_periods(source, months);
    debug!(?target, months, available = periods.len(), "assembling trend");
    periods
        .iter()
        .filter_map(|period| match target {
            TrendTarget::Site(id) => site_kpi(source, id, period).map(KpiSnapshot::Site),
            TrendTarget::Branch(id) => branch_kpi(source, id, period).map(KpiSnapshot::Branch),
            TrendTarget::Company => Some(KpiSnapshot::Company(company_kpi(source, period))),
        })
        .collect()
}
