//! Recommended service intervals
//!
//! Derived from fuel type, displacement and emission standard of a decoded
//! record. Unknown values fall back to the generic schedule.

use crate::types::VehicleRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Displacement from which petrol engines get the longer schedule
const LARGE_ENGINE_CC: u32 = 2000;

/// Oil change interval for newer emission standards, in km
const EURO6_OIL_KM: u32 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    OilChange,
    AirFilter,
    FuelFilter,
    BrakeFluid,
    Coolant,
    TimingBelt,
    SparkPlugs,
    GlowPlugs,
    BrakeInspection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPriority {
    Low,
    Medium,
    High,
}

/// One recommended maintenance task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInterval {
    pub kind: IntervalKind,
    pub name: String,
    pub km: u32,
    pub months: u32,
    pub priority: IntervalPriority,
}

impl ServiceInterval {
    fn new(
        kind: IntervalKind,
        name: &str,
        km: u32,
        months: u32,
        priority: IntervalPriority,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            km,
            months,
            priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fuel {
    Petrol,
    Diesel,
    Other,
}

fn fuel_of(record: &VehicleRecord) -> Fuel {
    match record.fuel_type.as_deref().map(str::to_lowercase).as_deref() {
        Some("petrol") => Fuel::Petrol,
        Some("diesel") => Fuel::Diesel,
        _ => Fuel::Other,
    }
}

/// Recommended intervals for a decoded vehicle
pub fn generate_service_intervals(record: &VehicleRecord) -> Vec<ServiceInterval> {
    use IntervalKind::*;
    use IntervalPriority::*;

    let fuel = fuel_of(record);
    let displacement = record.displacement_cc.unwrap_or(0);
    let large_engine = displacement >= LARGE_ENGINE_CC;

    let mut oil_km = match fuel {
        Fuel::Petrol if large_engine => 20_000,
        _ => 15_000,
    };
    if record
        .emission_standard
        .as_deref()
        .is_some_and(|standard| standard.contains('6'))
    {
        oil_km = oil_km.max(EURO6_OIL_KM);
    }

    let mut intervals = vec![
        ServiceInterval::new(OilChange, "Oil and oil filter change", oil_km, 12, High),
        ServiceInterval::new(AirFilter, "Air filter replacement", 30_000, 24, Medium),
    ];

    if fuel == Fuel::Diesel {
        intervals.push(ServiceInterval::new(
            FuelFilter,
            "Fuel filter replacement",
            60_000,
            36,
            Medium,
        ));
    }

    intervals.push(ServiceInterval::new(BrakeFluid, "Brake fluid replacement", 60_000, 24, High));
    intervals.push(ServiceInterval::new(Coolant, "Coolant replacement", 120_000, 60, Medium));
    intervals.push(ServiceInterval::new(
        TimingBelt,
        "Timing belt inspection/replacement",
        120_000,
        72,
        High,
    ));

    match fuel {
        Fuel::Petrol => intervals.push(ServiceInterval::new(
            SparkPlugs,
            "Spark plug replacement",
            if large_engine { 60_000 } else { 40_000 },
            48,
            Medium,
        )),
        Fuel::Diesel => intervals.push(ServiceInterval::new(
            GlowPlugs,
            "Glow plug inspection/replacement",
            100_000,
            60,
            Low,
        )),
        Fuel::Other => {}
    }

    intervals.push(ServiceInterval::new(
        BrakeInspection,
        "Brake inspection (pads, discs)",
        30_000,
        24,
        High,
    ));

    debug!(count = intervals.len(), "Generated service intervals");
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fuel: Option<&str>, cc: Option<u32>, emission: Option<&str>) -> VehicleRecord {
        VehicleRecord {
            fuel_type: fuel.map(str::to_string),
            displacement_cc: cc,
            emission_standard: emission.map(str::to_string),
            ..Default::default()
        }
    }

    fn find(intervals: &[ServiceInterval], kind: IntervalKind) -> Option<&ServiceInterval> {
        intervals.iter().find(|i| i.kind == kind)
    }

    #[test]
    fn test_unknown_vehicle_gets_generic_schedule() {
        let intervals = generate_service_intervals(&VehicleRecord::default());
        let kinds: Vec<IntervalKind> = intervals.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IntervalKind::OilChange,
                IntervalKind::AirFilter,
                IntervalKind::BrakeFluid,
                IntervalKind::Coolant,
                IntervalKind::TimingBelt,
                IntervalKind::BrakeInspection,
            ]
        );
        assert_eq!(intervals[0].km, 15_000);
        assert_eq!(intervals[0].months, 12);
    }

    #[test]
    fn test_diesel_adds_fuel_filter_and_glow_plugs() {
        let intervals = generate_service_intervals(&record(Some("diesel"), Some(1598), None));
        assert_eq!(find(&intervals, IntervalKind::FuelFilter).unwrap().km, 60_000);
        let glow = find(&intervals, IntervalKind::GlowPlugs).unwrap();
        assert_eq!((glow.km, glow.months), (100_000, 60));
        assert_eq!(glow.priority, IntervalPriority::Low);
        assert!(find(&intervals, IntervalKind::SparkPlugs).is_none());
        assert_eq!(find(&intervals, IntervalKind::OilChange).unwrap().km, 15_000);
    }

    #[test]
    fn test_large_petrol_engine_longer_intervals() {
        let intervals = generate_service_intervals(&record(Some("petrol"), Some(1984), None));
        assert_eq!(find(&intervals, IntervalKind::OilChange).unwrap().km, 15_000);
        assert_eq!(find(&intervals, IntervalKind::SparkPlugs).unwrap().km, 40_000);

        let intervals = generate_service_intervals(&record(Some("petrol"), Some(2480), None));
        assert_eq!(find(&intervals, IntervalKind::OilChange).unwrap().km, 20_000);
        assert_eq!(find(&intervals, IntervalKind::SparkPlugs).unwrap().km, 60_000);
    }

    #[test]
    fn test_euro6_raises_oil_interval() {
        let intervals =
            generate_service_intervals(&record(Some("diesel"), Some(1968), Some("EURO 6")));
        assert_eq!(find(&intervals, IntervalKind::OilChange).unwrap().km, 20_000);

        let intervals =
            generate_service_intervals(&record(Some("diesel"), Some(1968), Some("EURO 5")));
        assert_eq!(find(&intervals, IntervalKind::OilChange).unwrap().km, 15_000);
    }
}
