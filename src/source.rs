// Record source: read access to branches, sites and waste records.
//
// The aggregation core only talks to this trait. Lookups and the period list
// have default implementations over the three collections, so an
// implementation only has to hand out slices.
use crate::period::Period;
use crate::types::{Branch, Site, WasteRecord};
use std::collections::BTreeSet;

pub trait RecordSource {
    fn branches(&self) -> &[Branch];
    fn sites(&self) -> &[Site];
    fn waste_records(&self) -> &[WasteRecord];

    fn branch_by_id(&self, id: &str) -> Option<&Branch> {
        self.branches().iter().find(|b| b.id == id)
    }

    fn branch_by_code(&self, code: &str) -> Option<&Branch> {
        self.branches().iter().find(|b| b.code == code)
    }

    fn site_by_id(&self, id: &str) -> Option<&Site> {
        self.sites().iter().find(|s| s.id == id)
    }

    fn site_by_code(&self, code: &str) -> Option<&Site> {
        self.sites().iter().find(|s| s.code == code)
    }

    /// Distinct periods present in the waste records, oldest first.
    fn available_periods(&self) -> Vec<Period> {
        self.waste_records()
            .iter()
            .map(|r| r.period.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Fully materialised reference data.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub branches: Vec<Branch>,
    pub sites: Vec<Site>,
    pub records: Vec<WasteRecord>,
}

impl Dataset {
    pub fn new(branches: Vec<Branch>, sites: Vec<Site>, records: Vec<WasteRecord>) -> Self {
        Dataset {
            branches,
            sites,
            records,
        }
    }
}

impl RecordSource for Dataset {
    fn branches(&self) -> &[Branch] {
        &self.branches
    }

    fn sites(&self) -> &[Site] {
        &self.sites
    }

    fn waste_records(&self) -> &[WasteRecord] {
        &self.records
    }
}
