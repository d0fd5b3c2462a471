// Waste flow graph for Sankey rendering.
//
// Nodes are addressed by position. Node 0 is the total, then one node per
// waste type in input order, then "Recycled" and "Final disposal". Links refer
// to those positions, so the node list is never reordered once built.
use crate::period::Period;
use crate::source::RecordSource;
use crate::types::{WasteRecord, COMPANY_SITE_CODE};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const TOTAL_NODE: &str = "Total waste";
pub const RECYCLED_NODE: &str = "Recycled";
pub const DISPOSAL_NODE: &str = "Final disposal";

const TOTAL_COLOR: &str = "#616161";
const RECYCLED_COLOR: &str = "#4CAF50";
const DISPOSAL_COLOR: &str = "#F44336";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Concrete,
    Wood,
    Metal,
    Plastic,
    Paper,
    Mixed,
    Glass,
    Other,
}

// Labels seen in source data, English and Japanese.
static CATEGORY_LABELS: Lazy<HashMap<&'static str, WasteCategory>> = Lazy::new(|| {
    use WasteCategory::*;
    HashMap::from([
        ("concrete debris", Concrete),
        ("コンクリートガラ", Concrete),
        ("wood waste", Wood),
        ("木くず", Wood),
        ("metal scrap", Metal),
        ("金属くず", Metal),
        ("plastic", Plastic),
        ("プラスチック", Plastic),
        ("paper", Paper),
        ("紙くず", Paper),
        ("mixed waste", Mixed),
        ("混合廃棄物", Mixed),
        ("glass", Glass),
        ("ガラス", Glass),
    ])
});

impl WasteCategory {
    /// Unrecognised labels fall into `Other`.
    pub fn from_label(label: &str) -> Self {
        let key = label.trim().to_lowercase();
        CATEGORY_LABELS
            .get(key.as_str())
            .copied()
            .unwrap_or(WasteCategory::Other)
    }

    pub fn color(self) -> &'static str {
        match self {
            WasteCategory::Concrete => "#795548",
            WasteCategory::Wood => "#8BC34A",
            WasteCategory::Metal => "#607D8B",
            WasteCategory::Plastic => "#03A9F4",
            WasteCategory::Paper => "#FFC107",
            WasteCategory::Mixed => "#9E9E9E",
            WasteCategory::Glass => "#00BCD4",
            WasteCategory::Other => "#E91E63",
        }
    }
}

pub fn waste_color(label: &str) -> &'static str {
    WasteCategory::from_label(label).color()
}

/// Flow totals for one waste type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteFlow {
    pub waste_type: String,
    pub total_weight: f64,
    pub recycled_weight: f64,
    pub thermal_recycled_weight: f64,
    pub final_disposal_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNode {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyGraph {
    /// Append a node and return its index.
    fn push_node(&mut self, name: &str, color: &str) -> usize {
        self.nodes.push(SankeyNode {
            name: name.to_string(),
            color: color.to_string(),
        });
        self.nodes.len() - 1
    }

    fn link(&mut self, source: usize, target: usize, value: f64) {
        self.links.push(SankeyLink {
            source,
            target,
            value,
        });
    }
}

/// Build the graph from flows already sorted by the caller.
///
/// Terminal links with no weight are left out entirely.
pub fn to_sankey(flows: &[WasteFlow]) -> SankeyGraph {
    let mut graph = SankeyGraph::default();
    let total = graph.push_node(TOTAL_NODE, TOTAL_COLOR);

    let type_nodes: Vec<usize> = flows
        .iter()
        .map(|f| {
            let idx = graph.push_node(&f.waste_type, waste_color(&f.waste_type));
            graph.link(total, idx, f.total_weight);
            idx
        })
        .collect();

    let recycled = graph.push_node(RECYCLED_NODE, RECYCLED_COLOR);
    let disposal = graph.push_node(DISPOSAL_NODE, DISPOSAL_COLOR);

    for (flow, &idx) in flows.iter().zip(&type_nodes) {
        let recovered = flow.recycled_weight + flow.thermal_recycled_weight;
        if recovered > 0.0 {
            graph.link(idx, recycled, recovered);
        }
        if flow.final_disposal_weight > 0.0 {
            graph.link(idx, disposal, flow.final_disposal_weight);
        }
    }
    graph
}

/// Which records a flow graph covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowScope {
    Site(String),
    /// Every site of the branch, whatever its status.
    Branch(String),
    Company,
}

/// Group the scope's records by waste type, largest total first.
pub fn waste_flows<S: RecordSource + ?Sized>(
    source: &S,
    scope: &FlowScope,
    period: &Period,
) -> Vec<WasteFlow> {
    let branch_codes: HashSet<&str> = match scope {
        FlowScope::Branch(id) => source
            .sites()
            .iter()
            .filter(|s| &s.branch_id == id)
            .map(|s| s.code.as_str())
            .collect(),
        _ => HashSet::new(),
    };
    let in_scope = |r: &WasteRecord| match scope {
        FlowScope::Site(code) => &r.site_code == code,
        FlowScope::Branch(_) => branch_codes.contains(r.site_code.as_str()),
        FlowScope::Company => r.site_code == COMPANY_SITE_CODE,
    };

    let mut flows: Vec<WasteFlow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in source
        .waste_records()
        .iter()
        .filter(|r| &r.period == period && in_scope(*r))
    {
        let i = *index.entry(r.waste_type.as_str()).or_insert_with(|| {
            flows.push(WasteFlow {
                waste_type: r.waste_type.clone(),
                total_weight: 0.0,
                recycled_weight: 0.0,
                thermal_recycled_weight: 0.0,
                final_disposal_weight: 0.0,
            });
            flows.len() - 1
        });
        let f = &mut flows[i];
        f.total_weight += r.total_weight;
        f.recycled_weight += r.recycled_weight;
        f.thermal_recycled_weight += r.thermal_recycled_weight;
        f.final_disposal_weight += r.final_disposal_weight;
    }

    // Stable: ties keep first-seen order.
    flows.sort_by(|a, b| b.total_weight.total_cmp(&a.total_weight));
    flows
}

/// Flow graph for a scope and period; `None` when nothing matches.
pub fn flow_graph<S: RecordSource + ?Sized>(
    source: &S,
    scope: &FlowScope,
    period: &Period,
) -> Option<SankeyGraph> {
    let flows = waste_flows(source, scope, period);
    if flows.is_empty() {
        debug!(?scope, %period, "no waste flows");
        return None;
    }
    Some(to_sankey(&flows))
}
