// KPI grading bands.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiKind {
    SortingRate,
    RealRecyclingRate,
    FinalDisposalRate,
    WasteIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiGrade {
    Excellent,
    Good,
    Average,
    Poor,
    Critical,
}

/// Band edges, best first: excellent, good, average, poor.
struct Bands {
    edges: [f64; 4],
    higher_is_better: bool,
}

impl KpiKind {
    fn bands(self) -> Bands {
        match self {
            KpiKind::SortingRate => Bands {
                edges: [95.0, 90.0, 80.0, 70.0],
                higher_is_better: true,
            },
            KpiKind::RealRecyclingRate => Bands {
                edges: [95.0, 90.0, 85.0, 80.0],
                higher_is_better: true,
            },
            KpiKind::FinalDisposalRate => Bands {
                edges: [2.0, 3.0, 5.0, 7.0],
                higher_is_better: false,
            },
            KpiKind::WasteIntensity => Bands {
                edges: [40.0, 50.0, 60.0, 70.0],
                higher_is_better: false,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KpiKind::SortingRate => "Sorting rate",
            KpiKind::RealRecyclingRate => "Real recycling rate",
            KpiKind::FinalDisposalRate => "Final disposal rate",
            KpiKind::WasteIntensity => "Waste intensity",
        }
    }
}

impl KpiGrade {
    pub fn label(self) -> &'static str {
        match self {
            KpiGrade::Excellent => "excellent",
            KpiGrade::Good => "good",
            KpiGrade::Average => "average",
            KpiGrade::Poor => "poor",
            KpiGrade::Critical => "critical",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            KpiGrade::Excellent => "#00E676",
            KpiGrade::Good => "#4CAF50",
            KpiGrade::Average => "#FFB300",
            KpiGrade::Poor => "#FF6F00",
            KpiGrade::Critical => "#F44336",
        }
    }
}

/// Grade a KPI value. Band edges are inclusive on the better side.
pub fn grade(kind: KpiKind, value: f64) -> KpiGrade {
    const ORDER: [KpiGrade; 4] = [
        KpiGrade::Excellent,
        KpiGrade::Good,
        KpiGrade::Average,
        KpiGrade::Poor,
    ];
    let bands = kind.bands();
    for (edge, grade) in bands.edges.iter().zip(ORDER) {
        let within = if bands.higher_is_better {
            value >= *edge
        } else {
            value <= *edge
        };
        if within {
            return grade;
        }
    }
    KpiGrade::Critical
}
