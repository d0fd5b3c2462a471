// KPI formulas.
//
// Every function here is pure and expects non-negative weights; no input is
// validated. A zero denominator yields `0.0` ("no data"), never an error.
use crate::types::{KpiResult, WasteMetrics};
use serde::Serialize;

/// Sorting rate (%) = (total - mixed) / total * 100.
pub fn sorting_rate(total: f64, mixed: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    (total - mixed) / total * 100.0
}

/// Real recycling rate (%) = (recycled + thermally recycled) / total * 100.
pub fn real_recycling_rate(recycled: f64, thermal_recycled: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    (recycled + thermal_recycled) / total * 100.0
}

/// Final disposal rate (%) = final disposal / total * 100.
pub fn final_disposal_rate(final_disposal: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    final_disposal / total * 100.0
}

/// Waste intensity = total tonnes / construction amount.
///
/// `total_kg` is converted from kilograms to tonnes first.
pub fn waste_intensity(total_kg: f64, construction_amount: f64) -> f64 {
    if construction_amount == 0.0 {
        return 0.0;
    }
    (total_kg / 1000.0) / construction_amount
}

/// Derive the KPI set for an aggregate.
///
/// `waste_intensity` is only present when the aggregate carries a strictly
/// positive construction amount; otherwise it is left out, not zero-filled.
pub fn derive_kpis(metrics: &WasteMetrics) -> KpiResult {
    KpiResult {
        sorting_rate: sorting_rate(metrics.total_waste, metrics.mixed_waste),
        real_recycling_rate: real_recycling_rate(
            metrics.recycled_waste,
            metrics.thermal_recycled_waste,
            metrics.total_waste,
        ),
        final_disposal_rate: final_disposal_rate(metrics.final_disposal_waste, metrics.total_waste),
        waste_intensity: metrics
            .construction_amount
            .filter(|amount| *amount > 0.0)
            .map(|amount| waste_intensity(metrics.total_waste, amount)),
    }
}

/// Achievement against a target (%); `0.0` for a zero target.
pub fn achievement_rate(actual: f64, target: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    actual / target * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub delta: f64,
    pub percentage: f64,
    pub direction: Direction,
}

/// Month-over-month comparison of two values.
pub fn monthly_trend(current: f64, previous: f64) -> MonthlyTrend {
    let delta = current - previous;
    let percentage = if previous != 0.0 {
        delta / previous * 100.0
    } else {
        0.0
    };
    let direction = if delta > 0.0 {
        Direction::Up
    } else if delta < 0.0 {
        Direction::Down
    } else {
        Direction::Flat
    };
    MonthlyTrend {
        delta,
        percentage,
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rates_are_zero_without_total() {
        assert_eq!(sorting_rate(0.0, 25.0), 0.0);
        assert_eq!(real_recycling_rate(10.0, 5.0, 0.0), 0.0);
        assert_eq!(final_disposal_rate(7.0, 0.0), 0.0);
    }

    #[test]
    fn rates_follow_formulas() {
        assert!(close(sorting_rate(1000.0, 150.0), 85.0));
        assert!(close(real_recycling_rate(1100.0, 50.0, 1500.0), 76.666_666_666_666_67));
        assert!(close(final_disposal_rate(350.0, 1500.0), 23.333_333_333_333_33));
    }

    #[test]
    fn intensity_converts_to_tonnes() {
        // 45,000 kg over 1.5 units = 30 t per unit.
        assert!(close(waste_intensity(45_000.0, 1.5), 30.0));
        assert_eq!(waste_intensity(45_000.0, 0.0), 0.0);
    }

    #[test]
    fn intensity_present_only_with_positive_amount() {
        let mut m = WasteMetrics {
            total_waste: 2000.0,
            mixed_waste: 200.0,
            ..WasteMetrics::default()
        };
        assert_eq!(derive_kpis(&m).waste_intensity, None);

        m.construction_amount = Some(0.0);
        assert_eq!(derive_kpis(&m).waste_intensity, None);

        m.construction_amount = Some(4.0);
        let kpi = derive_kpis(&m);
        assert!(close(kpi.waste_intensity.unwrap(), 0.5));
        assert!(close(kpi.sorting_rate, 90.0));
    }

    #[test]
    fn intensity_present_even_without_waste() {
        let m = WasteMetrics {
            construction_amount: Some(3.0),
            ..WasteMetrics::default()
        };
        let kpi = derive_kpis(&m);
        assert_eq!(kpi.waste_intensity, Some(0.0));
        assert_eq!(kpi.sorting_rate, 0.0);
    }

    #[test]
    fn monthly_trend_up() {
        let t = monthly_trend(10.0, 8.0);
        assert!(close(t.delta, 2.0));
        assert!(close(t.percentage, 25.0));
        assert_eq!(t.direction, Direction::Up);
    }

    #[test]
    fn monthly_trend_guards_zero_previous() {
        let t = monthly_trend(5.0, 0.0);
        assert!(close(t.delta, 5.0));
        assert_eq!(t.percentage, 0.0);
        assert_eq!(t.direction, Direction::Up);
    }

    #[test]
    fn monthly_trend_down_and_flat() {
        assert_eq!(monthly_trend(4.0, 8.0).direction, Direction::Down);
        assert!(close(monthly_trend(4.0, 8.0).percentage, -50.0));
        assert_eq!(monthly_trend(3.0, 3.0).direction, Direction::Flat);
    }

    #[test]
    fn achievement_guards_zero_target() {
        assert!(close(achievement_rate(45.0, 50.0), 90.0));
        assert_eq!(achievement_rate(45.0, 0.0), 0.0);
    }
}
