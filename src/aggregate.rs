// Hierarchical KPI rollups: site, branch and company.
//
// Not-found identifiers come back as `None`. A valid target without records
// for the period is not an error: every weight is zero and so is every rate.
use crate::formulas::derive_kpis;
use crate::period::Period;
use crate::source::RecordSource;
use crate::types::{
    BranchKpi, CompanyKpi, Site, SiteKpi, SiteWasteTotal, WasteMetrics, WasteRecord,
    COMPANY_SITE_CODE,
};
use std::collections::HashSet;
use tracing::debug;

/// Sum the six weight fields of `records`.
///
/// A plain fold: record order has no effect on the result.
pub fn aggregate_records<'a, I>(records: I, construction_amount: Option<f64>) -> WasteMetrics
where
    I: IntoIterator<Item = &'a WasteRecord>,
{
    records.into_iter().fold(
        WasteMetrics {
            construction_amount,
            ..WasteMetrics::default()
        },
        |mut acc, r| {
            acc.total_waste += r.total_weight;
            acc.sorted_waste += r.sorted_weight;
            acc.mixed_waste += r.mixed_weight;
            acc.recycled_waste += r.recycled_weight;
            acc.thermal_recycled_waste += r.thermal_recycled_weight;
            acc.final_disposal_waste += r.final_disposal_weight;
            acc
        },
    )
}

/// Sum of construction amounts; `None` unless the sum is strictly positive.
fn summed_amount<'a>(sites: impl IntoIterator<Item = &'a Site>) -> Option<f64> {
    let sum: f64 = sites
        .into_iter()
        .filter_map(|s| s.construction_amount)
        .sum();
    (sum > 0.0).then_some(sum)
}

/// Active sites, excluding the whole-company site.
fn active_real_sites<S: RecordSource + ?Sized>(source: &S) -> impl Iterator<Item = &Site> {
    source
        .sites()
        .iter()
        .filter(|s| s.is_active() && !s.is_company())
}

pub fn site_kpi<S: RecordSource + ?Sized>(
    source: &S,
    site_id: &str,
    period: &Period,
) -> Option<SiteKpi> {
    let Some(site) = source.site_by_id(site_id) else {
        debug!(site_id, "site not found");
        return None;
    };
    let Some(branch) = source.branch_by_id(&site.branch_id) else {
        debug!(site_id, branch_id = %site.branch_id, "owning branch not found");
        return None;
    };

    let records = source
        .waste_records()
        .iter()
        .filter(|r| r.site_code == site.code && &r.period == period);
    let metrics = aggregate_records(records, site.positive_amount());
    debug!(site = %site.code, %period, total = metrics.total_waste, "site rollup");

    Some(SiteKpi {
        site_id: site.id.clone(),
        site_code: site.code.clone(),
        site_name: site.name.clone(),
        branch_name: branch.name.clone(),
        period: period.clone(),
        kpi: derive_kpis(&metrics),
        metrics,
    })
}

pub fn site_kpi_by_code<S: RecordSource + ?Sized>(
    source: &S,
    site_code: &str,
    period: &Period,
) -> Option<SiteKpi> {
    let site = source.site_by_code(site_code)?;
    site_kpi(source, &site.id, period)
}

pub fn branch_kpi<S: RecordSource + ?Sized>(
    source: &S,
    branch_id: &str,
    period: &Period,
) -> Option<BranchKpi> {
    let Some(branch) = source.branch_by_id(branch_id) else {
        debug!(branch_id, "branch not found");
        return None;
    };

    let active: Vec<&Site> = source
        .sites()
        .iter()
        .filter(|s| s.branch_id == branch.id && s.is_active())
        .collect();
    let codes: HashSet<&str> = active.iter().map(|s| s.code.as_str()).collect();

    let records = source
        .waste_records()
        .iter()
        .filter(|r| &r.period == period && codes.contains(r.site_code.as_str()));
    let metrics = aggregate_records(records, summed_amount(active.iter().copied()));
    debug!(branch = %branch.code, %period, sites = active.len(), total = metrics.total_waste, "branch rollup");

    Some(BranchKpi {
        branch_id: branch.id.clone(),
        branch_code: branch.code.clone(),
        branch_name: branch.name.clone(),
        period: period.clone(),
        kpi: derive_kpis(&metrics),
        metrics,
        site_count: active.len(),
    })
}

/// Company totals come from the pre-aggregated whole-company records, not
/// from summing branches: those records are reconciled for inter-site
/// transfers.
pub fn company_kpi<S: RecordSource + ?Sized>(source: &S, period: &Period) -> CompanyKpi {
    let records = source
        .waste_records()
        .iter()
        .filter(|r| r.site_code == COMPANY_SITE_CODE && &r.period == period);

    let site_count = active_real_sites(source).count();
    let metrics = aggregate_records(records, summed_amount(active_real_sites(source)));
    let branch_count = source.branches().iter().filter(|b| !b.is_company()).count();
    debug!(%period, branches = branch_count, sites = site_count, total = metrics.total_waste, "company rollup");

    CompanyKpi {
        period: period.clone(),
        kpi: derive_kpis(&metrics),
        metrics,
        branch_count,
        site_count,
    }
}

/// Branch comparison: every real branch with waste in the period, in source
/// order.
pub fn all_branch_kpis<S: RecordSource + ?Sized>(source: &S, period: &Period) -> Vec<BranchKpi> {
    source
        .branches()
        .iter()
        .filter(|b| !b.is_company())
        .filter_map(|b| branch_kpi(source, &b.id, period))
        .filter(|k| k.metrics.total_waste > 0.0)
        .collect()
}

/// Per-site total waste for listing views.
///
/// With `branch_id` the listing covers that branch's active sites; without
/// it, every real site regardless of status.
pub fn site_waste_totals<S: RecordSource + ?Sized>(
    source: &S,
    branch_id: Option<&str>,
    period: &Period,
) -> Vec<SiteWasteTotal> {
    source
        .sites()
        .iter()
        .filter(|s| !s.is_company())
        .filter(|s| match branch_id {
            Some(id) => s.branch_id == id && s.is_active(),
            None => true,
        })
        .map(|site| {
            let total_waste = source
                .waste_records()
                .iter()
                .filter(|r| r.site_code == site.code && &r.period == period)
                .map(|r| r.total_weight)
                .sum();
            SiteWasteTotal {
                site_id: site.id.clone(),
                site_code: site.code.clone(),
                site_name: site.name.clone(),
                branch_name: source
                    .branch_by_id(&site.branch_id)
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                status: site.status,
                total_waste,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Dataset;
    use crate::types::{Branch, SiteStatus, COMPANY_BRANCH_CODE};

    fn p(s: &str) -> Period {
        Period::parse(s).unwrap()
    }

    fn branch(id: &str, code: &str) -> Branch {
        Branch {
            id: id.into(),
            code: code.into(),
            name: format!("{id} branch"),
            region: "Kanto".into(),
        }
    }

    fn site(id: &str, code: &str, branch_id: &str, amount: Option<f64>, status: SiteStatus) -> Site {
        Site {
            id: id.into(),
            code: code.into(),
            name: format!("{id} site"),
            branch_id: branch_id.into(),
            construction_type: "building".into(),
            start_date: None,
            end_date: None,
            construction_amount: amount,
            status,
        }
    }

    fn rec(site: &str, period: &str, total: f64, mixed: f64, recycled: f64, disposal: f64) -> WasteRecord {
        WasteRecord {
            site_code: site.into(),
            period: p(period),
            waste_type: "wood waste".into(),
            total_weight: total,
            sorted_weight: total - mixed,
            mixed_weight: mixed,
            recycled_weight: recycled,
            thermal_recycled_weight: 0.0,
            final_disposal_weight: disposal,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![branch("b0", COMPANY_BRANCH_CODE), branch("b1", "DEPT001"), branch("b2", "DEPT002")],
            vec![
                site("s0", COMPANY_SITE_CODE, "b0", None, SiteStatus::Active),
                site("s1", "SITE001", "b1", Some(2.0), SiteStatus::Active),
                site("s2", "SITE002", "b1", Some(3.0), SiteStatus::Active),
                site("s3", "SITE003", "b1", Some(10.0), SiteStatus::Completed),
                site("s4", "SITE004", "b2", None, SiteStatus::Active),
                site("s5", "SITE005", "b9", Some(1.0), SiteStatus::Active),
            ],
            vec![
                rec("SITE001", "2024-04", 1000.0, 100.0, 800.0, 50.0),
                rec("SITE002", "2024-04", 500.0, 50.0, 400.0, 20.0),
                rec("SITE003", "2024-04", 9999.0, 0.0, 0.0, 0.0),
                rec("SITE001", "2024-05", 10.0, 0.0, 10.0, 0.0),
                rec(COMPANY_SITE_CODE, "2024-04", 2000.0, 200.0, 1500.0, 100.0),
            ],
        )
    }

    #[test]
    fn site_rollup_uses_own_amount() {
        let ds = dataset();
        let k = site_kpi(&ds, "s1", &p("2024-04")).unwrap();
        assert_eq!(k.site_code, "SITE001");
        assert_eq!(k.branch_name, "b1 branch");
        assert_eq!(k.metrics.total_waste, 1000.0);
        assert_eq!(k.metrics.construction_amount, Some(2.0));
        assert_eq!(k.kpi.sorting_rate, 90.0);
        assert_eq!(k.kpi.waste_intensity, Some(0.5));
    }

    #[test]
    fn site_rollup_not_found() {
        let ds = dataset();
        assert!(site_kpi(&ds, "nope", &p("2024-04")).is_none());
        // Owning branch b9 does not exist.
        assert!(site_kpi(&ds, "s5", &p("2024-04")).is_none());
        assert!(site_kpi_by_code(&ds, "SITE404", &p("2024-04")).is_none());
        assert_eq!(
            site_kpi_by_code(&ds, "SITE002", &p("2024-04")).map(|k| k.site_id),
            Some("s2".to_string())
        );
    }

    #[test]
    fn site_without_records_is_all_zero() {
        let ds = dataset();
        let k = site_kpi(&ds, "s4", &p("2024-04")).unwrap();
        assert_eq!(k.metrics, WasteMetrics::default());
        assert_eq!(k.kpi.sorting_rate, 0.0);
        assert_eq!(k.kpi.real_recycling_rate, 0.0);
        assert_eq!(k.kpi.final_disposal_rate, 0.0);
        assert_eq!(k.kpi.waste_intensity, None);
    }

    #[test]
    fn branch_rollup_only_counts_active_sites() {
        let ds = dataset();
        let k = branch_kpi(&ds, "b1", &p("2024-04")).unwrap();
        assert_eq!(k.site_count, 2);
        assert_eq!(k.metrics.total_waste, 1500.0);
        assert_eq!(k.metrics.construction_amount, Some(5.0));
        assert_eq!(k.kpi.waste_intensity, Some(0.3));
        assert!(branch_kpi(&ds, "missing", &p("2024-04")).is_none());
    }

    #[test]
    fn branch_without_amounts_omits_intensity() {
        let ds = dataset();
        let k = branch_kpi(&ds, "b2", &p("2024-04")).unwrap();
        assert_eq!(k.site_count, 1);
        assert_eq!(k.metrics.construction_amount, None);
        assert_eq!(k.kpi.waste_intensity, None);
    }

    #[test]
    fn company_reads_sentinel_records() {
        let ds = dataset();
        let k = company_kpi(&ds, &p("2024-04"));
        // Not 1500 + 9999: the pre-aggregated total wins.
        assert_eq!(k.metrics.total_waste, 2000.0);
        assert_eq!(k.branch_count, 2);
        // s1, s2, s4, s5 are active real sites.
        assert_eq!(k.site_count, 4);
        assert_eq!(k.metrics.construction_amount, Some(6.0));
        assert_eq!(k.kpi.final_disposal_rate, 5.0);
    }

    #[test]
    fn company_without_records_is_all_zero() {
        let ds = dataset();
        let k = company_kpi(&ds, &p("2023-01"));
        assert_eq!(k.metrics.total_waste, 0.0);
        assert_eq!(k.kpi.sorting_rate, 0.0);
        assert_eq!(k.kpi.waste_intensity, Some(0.0));
    }

    #[test]
    fn comparison_skips_company_and_empty_branches() {
        let ds = dataset();
        let rows = all_branch_kpis(&ds, &p("2024-04"));
        let codes: Vec<&str> = rows.iter().map(|k| k.branch_code.as_str()).collect();
        assert_eq!(codes, vec!["DEPT001"]);
    }

    #[test]
    fn site_totals_listing() {
        let ds = dataset();
        let all = site_waste_totals(&ds, None, &p("2024-04"));
        assert_eq!(all.len(), 5);
        assert!(all.iter().any(|s| s.site_code == "SITE003" && s.total_waste == 9999.0));

        let b1 = site_waste_totals(&ds, Some("b1"), &p("2024-04"));
        let codes: Vec<&str> = b1.iter().map(|s| s.site_code.as_str()).collect();
        assert_eq!(codes, vec!["SITE001", "SITE002"]);
        assert_eq!(b1[0].branch_name, "b1 branch");
    }
}
