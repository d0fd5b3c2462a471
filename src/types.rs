use crate::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Site code of the pre-aggregated whole-company records.
pub const COMPANY_SITE_CODE: &str = "SITE_COMPANY";
/// Branch code of the synthetic whole-company branch.
pub const COMPANY_BRANCH_CODE: &str = "DEPT000";

// ---------------------------------------------------------------------------
// Raw CSV rows. Every cell is optional text; the loader decides what a
// missing or malformed cell turns into.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BranchRow {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SiteRow {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub branch_id: Option<String>,
    pub construction_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub construction_amount: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WasteRow {
    pub site_code: Option<String>,
    pub year_month: Option<String>,
    pub waste_type: Option<String>,
    pub total_weight: Option<String>,
    pub sorted_weight: Option<String>,
    pub mixed_weight: Option<String>,
    pub recycled_weight: Option<String>,
    pub thermal_recycled_weight: Option<String>,
    pub final_disposal_weight: Option<String>,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub id: String,
    pub code: String,
    pub name: String,
    pub region: String,
}

impl Branch {
    pub fn is_company(&self) -> bool {
        self.code == COMPANY_BRANCH_CODE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Active,
    Completed,
    Suspended,
    Unknown,
}

impl SiteStatus {
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => SiteStatus::Active,
            "completed" => SiteStatus::Completed,
            "suspended" => SiteStatus::Suspended,
            _ => SiteStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SiteStatus::Active => "active",
            SiteStatus::Completed => "completed",
            SiteStatus::Suspended => "suspended",
            SiteStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub id: String,
    pub code: String,
    pub name: String,
    pub branch_id: String,
    pub construction_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Construction investment amount; `None` when the site declares none.
    pub construction_amount: Option<f64>,
    pub status: SiteStatus,
}

impl Site {
    pub fn is_active(&self) -> bool {
        self.status == SiteStatus::Active
    }

    pub fn is_company(&self) -> bool {
        self.code == COMPANY_SITE_CODE
    }

    /// The construction amount, but only when it can serve as a denominator.
    pub fn positive_amount(&self) -> Option<f64> {
        self.construction_amount.filter(|a| *a > 0.0)
    }
}

/// One monthly observation for one site. Weights are kilograms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteRecord {
    pub site_code: String,
    pub period: Period,
    pub waste_type: String,
    pub total_weight: f64,
    pub sorted_weight: f64,
    pub mixed_weight: f64,
    pub recycled_weight: f64,
    pub thermal_recycled_weight: f64,
    pub final_disposal_weight: f64,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteMetrics {
    pub total_waste: f64,
    pub sorted_waste: f64,
    pub mixed_waste: f64,
    pub recycled_waste: f64,
    pub thermal_recycled_waste: f64,
    pub final_disposal_waste: f64,
    /// Summed construction amount. `None` means "not applicable", never zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction_amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResult {
    pub sorting_rate: f64,
    pub real_recycling_rate: f64,
    pub final_disposal_rate: f64,
    /// Tonnes per unit of construction amount; absent without a denominator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waste_intensity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteKpi {
    pub site_id: String,
    pub site_code: String,
    pub site_name: String,
    pub branch_name: String,
    #[serde(rename = "yearMonth")]
    pub period: Period,
    #[serde(flatten)]
    pub metrics: WasteMetrics,
    #[serde(flatten)]
    pub kpi: KpiResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchKpi {
    pub branch_id: String,
    pub branch_code: String,
    pub branch_name: String,
    #[serde(rename = "yearMonth")]
    pub period: Period,
    #[serde(flatten)]
    pub metrics: WasteMetrics,
    #[serde(flatten)]
    pub kpi: KpiResult,
    /// Number of active sites rolled up.
    pub site_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyKpi {
    #[serde(rename = "yearMonth")]
    pub period: Period,
    #[serde(flatten)]
    pub metrics: WasteMetrics,
    #[serde(flatten)]
    pub kpi: KpiResult,
    /// Real branches, the whole-company branch excluded.
    pub branch_count: usize,
    /// Active real sites, the whole-company site excluded.
    pub site_count: usize,
}

/// One element of a trend series; the variant follows the trend target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KpiSnapshot {
    Site(SiteKpi),
    Branch(BranchKpi),
    Company(CompanyKpi),
}

impl KpiSnapshot {
    pub fn period(&self) -> &Period {
        match self {
            KpiSnapshot::Site(k) => &k.period,
            KpiSnapshot::Branch(k) => &k.period,
            KpiSnapshot::Company(k) => &k.period,
        }
    }

    pub fn metrics(&self) -> &WasteMetrics {
        match self {
            KpiSnapshot::Site(k) => &k.metrics,
            KpiSnapshot::Branch(k) => &k.metrics,
            KpiSnapshot::Company(k) => &k.metrics,
        }
    }

    pub fn kpi(&self) -> &KpiResult {
        match self {
            KpiSnapshot::Site(k) => &k.kpi,
            KpiSnapshot::Branch(k) => &k.kpi,
            KpiSnapshot::Company(k) => &k.kpi,
        }
    }
}

/// Total waste of one site for a period, for listing views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteWasteTotal {
    pub site_id: String,
    pub site_code: String,
    pub site_name: String,
    pub branch_name: String,
    pub status: SiteStatus,
    pub total_waste: f64,
}

// ---------------------------------------------------------------------------
// Rendered table rows (CSV export + console preview)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CompanySummaryRow {
    #[serde(rename = "Indicator")]
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Grade")]
    #[tabled(rename = "Grade")]
    pub grade: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BranchComparisonRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Branch")]
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "ActiveSites")]
    #[tabled(rename = "ActiveSites")]
    pub active_sites: usize,
    #[serde(rename = "TotalWaste")]
    #[tabled(rename = "TotalWaste")]
    pub total_waste: String,
    #[serde(rename = "SortingRate")]
    #[tabled(rename = "SortingRate")]
    pub sorting_rate: String,
    #[serde(rename = "RealRecyclingRate")]
    #[tabled(rename = "RealRecyclingRate")]
    pub real_recycling_rate: String,
    #[serde(rename = "FinalDisposalRate")]
    #[tabled(rename = "FinalDisposalRate")]
    pub final_disposal_rate: String,
    #[serde(rename = "WasteIntensity")]
    #[tabled(rename = "WasteIntensity")]
    pub waste_intensity: String,
    #[serde(rename = "DisposalGrade")]
    #[tabled(rename = "DisposalGrade")]
    pub disposal_grade: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "YearMonth")]
    #[tabled(rename = "YearMonth")]
    pub year_month: String,
    #[serde(rename = "TotalWaste")]
    #[tabled(rename = "TotalWaste")]
    pub total_waste: String,
    #[serde(rename = "SortingRate")]
    #[tabled(rename = "SortingRate")]
    pub sorting_rate: String,
    #[serde(rename = "RealRecyclingRate")]
    #[tabled(rename = "RealRecyclingRate")]
    pub real_recycling_rate: String,
    #[serde(rename = "FinalDisposalRate")]
    #[tabled(rename = "FinalDisposalRate")]
    pub final_disposal_rate: String,
    #[serde(rename = "RecyclingMoM")]
    #[tabled(rename = "RecyclingMoM")]
    pub recycling_mom: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SiteListRow {
    #[serde(rename = "Code")]
    #[tabled(rename = "Code")]
    pub code: String,
    #[serde(rename = "Site")]
    #[tabled(rename = "Site")]
    pub site: String,
    #[serde(rename = "Branch")]
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "TotalWaste")]
    #[tabled(rename = "TotalWaste")]
    pub total_waste: String,
}
