// Turn KPI aggregates into display/export rows.
use crate::formulas::monthly_trend;
use crate::thresholds::{grade, KpiKind};
use crate::types::{
    BranchComparisonRow, BranchKpi, CompanyKpi, CompanySummaryRow, KpiSnapshot, SiteListRow,
    SiteWasteTotal, TrendRow,
};
use crate::util::{format_int, format_number, format_percentage, format_weight};
use std::cmp::Ordering;

const NOT_APPLICABLE: &str = "n/a";

fn intensity_text(v: Option<f64>) -> String {
    v.map(|x| format_number(x, 2))
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

pub fn company_summary_rows(kpi: &CompanyKpi) -> Vec<CompanySummaryRow> {
    let rate = |kind: KpiKind, value: f64| CompanySummaryRow {
        indicator: kind.label().to_string(),
        value: format_percentage(value, 1),
        grade: grade(kind, value).label().to_string(),
    };
    let mut rows = vec![
        CompanySummaryRow {
            indicator: "Total waste".to_string(),
            value: format_weight(kpi.metrics.total_waste),
            grade: String::new(),
        },
        rate(KpiKind::SortingRate, kpi.kpi.sorting_rate),
        rate(KpiKind::RealRecyclingRate, kpi.kpi.real_recycling_rate),
        rate(KpiKind::FinalDisposalRate, kpi.kpi.final_disposal_rate),
    ];
    if let Some(intensity) = kpi.kpi.waste_intensity {
        rows.push(CompanySummaryRow {
            indicator: KpiKind::WasteIntensity.label().to_string(),
            value: format_number(intensity, 2),
            grade: grade(KpiKind::WasteIntensity, intensity).label().to_string(),
        });
    }
    rows.push(CompanySummaryRow {
        indicator: "Branches / active sites".to_string(),
        value: format!("{} / {}", format_int(kpi.branch_count), format_int(kpi.site_count)),
        grade: String::new(),
    });
    rows
}

/// Branches ranked by real recycling rate, best first.
pub fn branch_comparison_rows(kpis: &[BranchKpi]) -> Vec<BranchComparisonRow> {
    let mut sorted: Vec<&BranchKpi> = kpis.iter().collect();
    sorted.sort_by(|a, b| {
        b.kpi
            .real_recycling_rate
            .partial_cmp(&a.kpi.real_recycling_rate)
            .unwrap_or(Ordering::Equal)
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, k)| BranchComparisonRow {
            rank: idx + 1,
            branch: k.branch_name.clone(),
            active_sites: k.site_count,
            total_waste: format_weight(k.metrics.total_waste),
            sorting_rate: format_number(k.kpi.sorting_rate, 2),
            real_recycling_rate: format_number(k.kpi.real_recycling_rate, 2),
            final_disposal_rate: format_number(k.kpi.final_disposal_rate, 2),
            waste_intensity: intensity_text(k.kpi.waste_intensity),
            disposal_grade: grade(KpiKind::FinalDisposalRate, k.kpi.final_disposal_rate)
                .label()
                .to_string(),
        })
        .collect()
}

/// One row per period; the last column compares real recycling with the
/// previous row.
pub fn trend_rows(series: &[KpiSnapshot]) -> Vec<TrendRow> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|snap| {
            let kpi = snap.kpi();
            let recycling_mom = match previous {
                Some(prev) => {
                    let t = monthly_trend(kpi.real_recycling_rate, prev);
                    format!("{} {:+.2}", t.direction.arrow(), t.delta)
                }
                None => "-".to_string(),
            };
            previous = Some(kpi.real_recycling_rate);
            TrendRow {
                year_month: snap.period().to_string(),
                total_waste: format_weight(snap.metrics().total_waste),
                sorting_rate: format_number(kpi.sorting_rate, 2),
                real_recycling_rate: format_number(kpi.real_recycling_rate, 2),
                final_disposal_rate: format_number(kpi.final_disposal_rate, 2),
                recycling_mom,
            }
        })
        .collect()
}

pub fn site_list_rows(totals: &[SiteWasteTotal]) -> Vec<SiteListRow> {
    totals
        .iter()
        .map(|s| SiteListRow {
            code: s.site_code.clone(),
            site: s.site_name.clone(),
            branch: s.branch_name.clone(),
            status: s.status.label().to_string(),
            total_waste: if s.total_waste > 0.0 {
                format_weight(s.total_waste)
            } else {
                "no data".to_string()
            },
        })
        .collect()
}
