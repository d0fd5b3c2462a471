use crate::error::Result;
use crate::period::Period;
use crate::source::Dataset;
use crate::types::{Branch, BranchRow, Site, SiteRow, SiteStatus, WasteRecord, WasteRow};
use crate::util::{parse_date_safe, parse_f64_safe, text_or};
use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const BRANCHES_FILE: &str = "branches.csv";
pub const SITES_FILE: &str = "sites.csv";
pub const WASTE_RECORDS_FILE: &str = "waste-records.csv";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub branches: usize,
    pub sites: usize,
    pub records: usize,
    /// Rows dropped: undecodable, missing a key column, or a bad period.
    pub skipped_rows: usize,
    /// Weight cells that were missing or unparseable and read as `0`.
    pub defaulted_weights: usize,
}

/// Load the three reference files from `dir`.
pub fn load_dataset(dir: &Path) -> Result<(Dataset, LoadReport)> {
    let mut report = LoadReport::default();

    let branches = read_branches(open(&dir.join(BRANCHES_FILE))?, &mut report);
    let sites = read_sites(open(&dir.join(SITES_FILE))?, &mut report);
    let records = read_waste_records(open(&dir.join(WASTE_RECORDS_FILE))?, &mut report);

    info!(
        dir = %dir.display(),
        branches = report.branches,
        sites = report.sites,
        records = report.records,
        skipped = report.skipped_rows,
        defaulted_weights = report.defaulted_weights,
        "dataset loaded"
    );
    Ok((Dataset::new(branches, sites, records), report))
}

fn open(path: &Path) -> Result<Reader<std::fs::File>> {
    debug!(path = %path.display(), "opening csv");
    Ok(ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_path(path)?)
}

pub fn read_branches<R: Read>(mut rdr: Reader<R>, report: &mut LoadReport) -> Vec<Branch> {
    let mut out = Vec::new();
    for result in rdr.deserialize::<BranchRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, file = BRANCHES_FILE, "skipping undecodable row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let (Some(id), Some(code)) = (non_blank(row.id), non_blank(row.code)) else {
            report.skipped_rows += 1;
            continue;
        };
        out.push(Branch {
            id,
            code,
            name: text_or(row.name, "Unknown"),
            region: text_or(row.region, "Unknown"),
        });
    }
    report.branches = out.len();
    out
}

pub fn read_sites<R: Read>(mut rdr: Reader<R>, report: &mut LoadReport) -> Vec<Site> {
    let mut out = Vec::new();
    for result in rdr.deserialize::<SiteRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, file = SITES_FILE, "skipping undecodable row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let (Some(id), Some(code)) = (non_blank(row.id), non_blank(row.code)) else {
            report.skipped_rows += 1;
            continue;
        };
        out.push(Site {
            id,
            code,
            name: text_or(row.name, "Unknown"),
            branch_id: text_or(row.branch_id, ""),
            construction_type: text_or(row.construction_type, "Unspecified"),
            start_date: parse_date_safe(row.start_date.as_deref()),
            end_date: parse_date_safe(row.end_date.as_deref()),
            construction_amount: parse_f64_safe(row.construction_amount.as_deref()),
            status: SiteStatus::from_label(row.status.as_deref().unwrap_or("")),
        });
    }
    report.sites = out.len();
    out
}

pub fn read_waste_records<R: Read>(mut rdr: Reader<R>, report: &mut LoadReport) -> Vec<WasteRecord> {
    let mut out = Vec::new();
    for result in rdr.deserialize::<WasteRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, file = WASTE_RECORDS_FILE, "skipping undecodable row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let Some(site_code) = non_blank(row.site_code) else {
            report.skipped_rows += 1;
            continue;
        };
        let period = match Period::parse(row.year_month.as_deref().unwrap_or("")) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, site_code = %site_code, "skipping record");
                report.skipped_rows += 1;
                continue;
            }
        };

        let mut weight = |cell: Option<String>| match parse_f64_safe(cell.as_deref()) {
            Some(v) => v,
            None => {
                report.defaulted_weights += 1;
                0.0
            }
        };
        let total_weight = weight(row.total_weight);
        let sorted_weight = weight(row.sorted_weight);
        let mixed_weight = weight(row.mixed_weight);
        let recycled_weight = weight(row.recycled_weight);
        let thermal_recycled_weight = weight(row.thermal_recycled_weight);
        let final_disposal_weight = weight(row.final_disposal_weight);

        out.push(WasteRecord {
            site_code,
            period,
            waste_type: text_or(row.waste_type, "other"),
            total_weight,
            sorted_weight,
            mixed_weight,
            recycled_weight,
            thermal_recycled_weight,
            final_disposal_weight,
        });
    }
    report.records = out.len();
    out
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> Reader<&[u8]> {
        ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes())
    }

    #[test]
    fn unparseable_weights_read_as_zero() {
        let csv = "site_code,year_month,waste_type,total_weight,sorted_weight,mixed_weight,recycled_weight,thermal_recycled_weight,final_disposal_weight\n\
                   SITE001,2024-04,wood waste,1200,1000,200,abc,,100\n";
        let mut report = LoadReport::default();
        let records = read_waste_records(reader(csv), &mut report);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.total_weight, 1200.0);
        assert_eq!(r.recycled_weight, 0.0);
        assert_eq!(r.thermal_recycled_weight, 0.0);
        assert_eq!(r.final_disposal_weight, 100.0);
        assert_eq!(report.defaulted_weights, 2);
    }

    #[test]
    fn bad_periods_and_missing_codes_are_skipped() {
        let csv = "site_code,year_month,waste_type,total_weight,sorted_weight,mixed_weight,recycled_weight,thermal_recycled_weight,final_disposal_weight\n\
                   SITE001,2024-4,wood waste,1,1,0,1,0,0\n\
                   ,2024-04,wood waste,1,1,0,1,0,0\n\
                   SITE002,2024-05,,5,5,0,5,0,0\n";
        let mut report = LoadReport::default();
        let records = read_waste_records(reader(csv), &mut report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].waste_type, "other");
        assert_eq!(report.skipped_rows, 2);
        assert_eq!(report.records, 1);
    }

    #[test]
    fn sites_keep_optional_amounts_and_status() {
        let csv = "id,code,name,branch_id,construction_type,start_date,end_date,construction_amount,status\n\
                   s1,SITE001,Tower,b1,building,2023-04-01,,12.5,active\n\
                   s2,SITE002,Bridge,b1,civil,2022-01-10,2024-03-31,,completed\n\
                   s3,SITE003,Depot,b2,building,bad-date,,0,paused\n";
        let mut report = LoadReport::default();
        let sites = read_sites(reader(csv), &mut report);
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0].construction_amount, Some(12.5));
        assert!(sites[0].is_active());
        assert_eq!(sites[0].end_date, None);
        assert_eq!(sites[1].construction_amount, None);
        assert_eq!(sites[1].status, SiteStatus::Completed);
        assert!(sites[1].end_date.is_some());
        assert_eq!(sites[2].start_date, None);
        assert_eq!(sites[2].positive_amount(), None);
        assert_eq!(sites[2].status, SiteStatus::Unknown);
    }

    #[test]
    fn branches_require_id_and_code() {
        let csv = "id,code,name,region\nb0,DEPT000,Company,All\n,DEPT009,Ghost,None\nb1,DEPT001,Tokyo,Kanto\n";
        let mut report = LoadReport::default();
        let branches = read_branches(reader(csv), &mut report);
        assert_eq!(branches.len(), 2);
        assert!(branches[0].is_company());
        assert_eq!(report.skipped_rows, 1);
    }
}
