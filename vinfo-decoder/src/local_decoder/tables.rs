//! Static reference tables for structural VIN decoding
//!
//! Built once on first use and never mutated afterwards.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Manufacturer entry keyed by World Manufacturer Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmiInfo {
    pub manufacturer: &'static str,
    pub country: &'static str,
    pub plant: Option<&'static str>,
}

/// Engine entry keyed by engine code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSpec {
    pub code: &'static str,
    pub displacement_cc: u32,
    pub power_kw: u32,
    pub fuel: &'static str,
}

const WMI_ENTRIES: &[(&str, &str, &str, Option<&str>)] = &[
    ("TMB", "Škoda", "Czech Republic", Some("Mladá Boleslav")),
    ("TMA", "Hyundai", "Czech Republic", Some("Nošovice")),
    ("TMP", "Škoda", "Czech Republic", Some("Ostrov")),
    ("TMT", "Tatra", "Czech Republic", Some("Kopřivnice")),
    ("TNE", "Karosa", "Czech Republic", Some("Vysoké Mýto")),
    ("TRU", "Audi", "Hungary", Some("Győr")),
    ("TSM", "Suzuki", "Hungary", Some("Esztergom")),
    ("U5Y", "Kia", "Slovakia", Some("Žilina")),
    ("UU1", "Dacia", "Romania", Some("Mioveni")),
    ("VF1", "Renault", "France", None),
    ("VF3", "Peugeot", "France", None),
    ("VF7", "Citroën", "France", None),
    ("VR3", "Peugeot", "France", None),
    ("VSS", "SEAT", "Spain", Some("Martorell")),
    ("W0L", "Opel", "Germany", None),
    ("WAU", "Audi", "Germany", Some("Ingolstadt")),
    ("WBA", "BMW", "Germany", None),
    ("WDB", "Mercedes-Benz", "Germany", None),
    ("WDD", "Mercedes-Benz", "Germany", None),
    ("WF0", "Ford", "Germany", Some("Köln")),
    ("WME", "Smart", "Germany", None),
    ("WP0", "Porsche", "Germany", Some("Stuttgart")),
    ("WVW", "Volkswagen", "Germany", Some("Wolfsburg")),
    ("WV1", "Volkswagen Commercial Vehicles", "Germany", Some("Hannover")),
    ("WV2", "Volkswagen Commercial Vehicles", "Germany", Some("Hannover")),
    ("YV1", "Volvo", "Sweden", None),
    ("ZFA", "Fiat", "Italy", None),
    ("SAL", "Land Rover", "United Kingdom", None),
    ("JTD", "Toyota", "Japan", None),
    ("KMH", "Hyundai", "South Korea", None),
    ("1M8", "Motor Coach Industries", "United States", None),
    ("1FA", "Ford", "United States", None),
    ("1G1", "Chevrolet", "United States", None),
];

/// Year codes in cycle order; the first cycle starts at 1980
const YEAR_CODES: &str = "ABCDEFGHJKLMNPRSTVWXY123456789";

const FIRST_CYCLE_START: i32 = 1980;
const CYCLE_YEARS: i32 = 30;

const ENGINE_ENTRIES: &[(&str, u32, u32, &str)] = &[
    ("CAYC", 1598, 77, "diesel"),
    ("CAYB", 1598, 66, "diesel"),
    ("CFHC", 1968, 103, "diesel"),
    ("CFFB", 1968, 103, "diesel"),
    ("CRLB", 1968, 110, "diesel"),
    ("DFGA", 1968, 110, "diesel"),
    ("CBZB", 1197, 77, "petrol"),
    ("CAXA", 1390, 90, "petrol"),
    ("CJSA", 1798, 132, "petrol"),
    ("CZEA", 1395, 110, "petrol"),
    ("CHYB", 999, 55, "petrol"),
    ("BKD", 1968, 103, "diesel"),
    ("BXE", 1896, 77, "diesel"),
    ("BLS", 1896, 77, "diesel"),
    ("BSE", 1595, 75, "petrol"),
    ("BZB", 1798, 118, "petrol"),
];

/// WMI -> manufacturer, country and optional plant
pub static WMI_TABLE: Lazy<HashMap<&'static str, WmiInfo>> = Lazy::new(|| {
    WMI_ENTRIES
        .iter()
        .map(|&(wmi, manufacturer, country, plant)| {
            (
                wmi,
                WmiInfo {
                    manufacturer,
                    country,
                    plant,
                },
            )
        })
        .collect()
});

/// Year code -> candidate calendar years (one per 30-year cycle)
pub static YEAR_TABLE: Lazy<HashMap<char, Vec<i32>>> = Lazy::new(|| {
    YEAR_CODES
        .chars()
        .zip(0..)
        .map(|(code, offset)| {
            let first = FIRST_CYCLE_START + offset;
            (code, vec![first, first + CYCLE_YEARS])
        })
        .collect()
});

/// Engine code -> specification
pub static ENGINE_TABLE: Lazy<HashMap<&'static str, EngineSpec>> = Lazy::new(|| {
    ENGINE_ENTRIES
        .iter()
        .map(|&(code, displacement_cc, power_kw, fuel)| {
            (
                code,
                EngineSpec {
                    code,
                    displacement_cc,
                    power_kw,
                    fuel,
                },
            )
        })
        .collect()
});
