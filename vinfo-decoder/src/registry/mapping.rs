//! Declarative field aliases and payload-to-record mapping
//!
//! Upstream naming differs between API versions (Czech PascalCase, camelCase,
//! snake_case, English). Each logical field lists its accepted keys in lookup
//! order; the first non-null key wins.

use super::normalize::{
    engine_type_label, extract_tyres, first_value, int_field, join_type_label, normalize_date_value,
    normalize_fuel, normalize_plate, parse_year, text_field, year_from_date_text,
};
use super::RegistryQuery;
use crate::types::{SourceId, VehicleRecord};
use crate::validator::normalize_vin;
use serde_json::{Map, Value};

pub const VIN: &[&str] = &["VIN", "vin"];

pub const MAKE: &[&str] = &[
    "TovarniZnacka",
    "tovarniZnacka",
    "Tovarni_Znacka",
    "brand",
    "Brand",
    "make",
    "Make",
];

pub const MODEL: &[&str] = &[
    "ObchodniOznaceni",
    "obchodniOznaceni",
    "Obchodni_Oznaceni",
    "model",
    "Model",
];

pub const VEHICLE_TYPE: &[&str] = &["Typ", "typ", "BodyType", "bodyType", "vehicle_type", "VehicleType"];

pub const VARIANT: &[&str] = &["Varianta", "varianta", "Variant", "variant"];

pub const VERSION: &[&str] = &["Verze", "verze", "Version", "version"];

pub const PRODUCTION_YEAR: &[&str] = &[
    "RokVyroby",
    "rokVyroby",
    "Rok_Vyroby",
    "year",
    "Year",
    "production_year",
    "ProductionYear",
];

pub const FIRST_REGISTRATION: &[&str] = &[
    "DatumPrvniRegistrace",
    "datumPrvniRegistrace",
    "Datum_Prvni_Registrace",
    "first_registration_date",
    "FirstRegistrationDate",
];

pub const PLATE: &[&str] = &[
    "RegistracniZnacka",
    "registracniZnacka",
    "Registracni_Znacka",
    "plate",
    "Plate",
    "registration_plate",
    "RegistrationPlate",
];

pub const ENGINE_CODE: &[&str] = &[
    "MotorTyp",
    "motorTyp",
    "Motor_Typ",
    "KodMotoru",
    "kodMotoru",
    "Kod_Motoru",
    "engine_code",
    "EngineCode",
    "motorCode",
    "MotorCode",
];

pub const POWER_KW: &[&str] = &[
    "MotorMaxVykon",
    "motorMaxVykon",
    "Motor_Max_Vykon",
    "MaxVykonKw",
    "maxVykonKw",
    "Max_Vykon_Kw",
    "VykonKw",
    "vykonKw",
    "Vykon_Kw",
    "engine_power_kw",
    "EnginePowerKw",
    "powerKw",
    "PowerKw",
];

pub const DISPLACEMENT_CC: &[&str] = &[
    "MotorZdvihObjem",
    "motorZdvihObjem",
    "Motor_Zdvih_Objem",
    "DisplacementCc",
    "displacementCc",
    "Displacement_Cc",
    "engine_displacement_cc",
    "EngineDisplacementCc",
];

pub const FUEL: &[&str] = &[
    "Palivo",
    "palivo",
    "DruhPaliva",
    "druhPaliva",
    "Druh_Paliva",
    "fuel_type",
    "FuelType",
    "fuel",
    "Fuel",
];

pub const EMISSION_STANDARD: &[&str] = &[
    "EmisniUroven",
    "emisniUroven",
    "Emisni_Uroven",
    "EmisniTrida",
    "emisniTrida",
    "Emisni_Trida",
    "EmissionStandard",
    "emissionStandard",
    "emission_standard",
    "Emission_Standard",
];

pub const CURB_WEIGHT: &[&str] = &[
    "HmotnostProvozni",
    "hmotnostProvozni",
    "Hmotnost_Provozni",
    "PohotovostniHmotnost",
    "pohotovostniHmotnost",
    "Pohotovostni_Hmotnost",
    "curb_weight_kg",
    "CurbWeightKg",
    "curbWeight",
];

pub const GROSS_WEIGHT: &[&str] = &[
    "HmotnostCelkova",
    "hmotnostCelkova",
    "Hmotnost_Celkova",
    "MaxPripustnaHmotnost",
    "maxPripustnaHmotnost",
    "Max_Pripustna_Hmotnost",
    "gross_weight_kg",
    "GrossWeightKg",
    "grossWeight",
];

pub const SEATS: &[&str] = &[
    "PocetMistKSezeni",
    "pocetMistKSezeni",
    "Pocet_Mist_K_Sezeni",
    "seats",
    "Seats",
    "numSeats",
    "NumSeats",
];

pub const INSPECTION_VALID_UNTIL: &[&str] = &[
    "PlatnostSTKDo",
    "platnostSTKDo",
    "Platnost_STK_Do",
    "STKPlatnostDo",
    "stkPlatnostDo",
    "STK_Platnost_Do",
    "TechnickaProhlidkaDo",
    "technickaProhlidkaDo",
    "Technicka_Prohlidka_Do",
    "PravidelnaTechnickaProhlidkaDo",
    "pravidelnaTechnickaProhlidkaDo",
    "stk_valid_until",
    "StkValidUntil",
    "inspection_date",
    "InspectionDate",
];

pub const TYRES_RAW: &[&str] = &[
    "NapravyPneuRafky",
    "napravyPneuRafky",
    "Napravy_Pneu_Rafky",
    "tyres_raw",
    "TyresRaw",
    "pneumatiky",
    "Pneumatiky",
];

/// Map one registry payload into a record tagged with `source`
///
/// The queried VIN or plate is echoed into the record; a plate reported by
/// the registry takes precedence over the queried one.
pub fn map_vehicle_data(
    data: &Map<String, Value>,
    query: &RegistryQuery,
    source: SourceId,
) -> VehicleRecord {
    let mut record = VehicleRecord::from_source(source);

    let (queried_vin, queried_plate) = match query {
        RegistryQuery::Vin(vin) => (Some(vin.clone()), None),
        RegistryQuery::Plate(plate) => (None, Some(plate.clone())),
    };
    record.vin = queried_vin.or_else(|| text_field(data, VIN).map(|v| normalize_vin(&v)));
    record.plate = text_field(data, PLATE)
        .map(|p| normalize_plate(&p))
        .filter(|p| !p.is_empty())
        .or(queried_plate);

    // Identity
    if let Some(make) = text_field(data, MAKE) {
        record.manufacturer = Some(make.clone());
        record.make = Some(make);
    }
    record.model = text_field(data, MODEL);

    // Years and dates
    let first_registration_text = text_field(data, FIRST_REGISTRATION);
    record.production_year = first_value(data, PRODUCTION_YEAR)
        .and_then(parse_year)
        .or_else(|| first_registration_text.as_deref().and_then(year_from_date_text));
    record.model_year = record.production_year;
    record.first_registration_date =
        first_value(data, FIRST_REGISTRATION).and_then(normalize_date_value);
    record.inspection_valid_until =
        first_value(data, INSPECTION_VALID_UNTIL).and_then(normalize_date_value);

    // Engine
    record.engine_code = text_field(data, ENGINE_CODE);
    record.power_kw = int_field(data, POWER_KW);
    record.displacement_cc = int_field(data, DISPLACEMENT_CC);
    record.fuel_type = text_field(data, FUEL).map(|f| normalize_fuel(&f));
    record.engine_type_label = engine_type_label(
        record.displacement_cc,
        record.fuel_type.as_deref(),
        record.power_kw,
    );

    // Body, weights, emissions
    let vehicle_type = text_field(data, VEHICLE_TYPE);
    record.type_label = join_type_label(&[
        vehicle_type.clone(),
        text_field(data, VARIANT),
        text_field(data, VERSION),
    ]);
    record.body_type = vehicle_type.or_else(|| {
        record
            .type_label
            .as_deref()
            .and_then(|label| label.split(" / ").next())
            .map(str::to_string)
    });
    record.emission_standard = text_field(data, EMISSION_STANDARD);
    record.curb_weight_kg = int_field(data, CURB_WEIGHT);
    record.gross_weight_kg = int_field(data, GROSS_WEIGHT);
    record.seats = int_field(data, SEATS);

    // Tyres
    record.tyres_raw_text = text_field(data, TYRES_RAW);
    record.tyres = record.tyres_raw_text.as_deref().and_then(extract_tyres);
    record.wheels_and_tyres_text = match &record.tyres {
        Some(tyres) => Some(tyres.iter().cloned().collect::<Vec<_>>().join("\n")),
        None => record.tyres_raw_text.clone(),
    };

    record.extra_records_text = extra_records(&record);
    record
}

/// "Label: value" summary lines of secondary technical data
fn extra_records(record: &VehicleRecord) -> Option<String> {
    let mut lines = Vec::new();

    if let Some(emission) = &record.emission_standard {
        lines.push(format!("Emission standard: {}", emission));
    }
    if let Some(kg) = record.curb_weight_kg {
        lines.push(format!("Curb weight: {} kg", kg));
    }
    if let Some(kg) = record.gross_weight_kg {
        lines.push(format!("Gross weight: {} kg", kg));
    }
    if let Some(seats) = record.seats {
        lines.push(format!("Seats: {}", seats));
    }
    if let Some(body) = &record.body_type {
        lines.push(format!("Body type: {}", body));
    }
    if let Some(date) = &record.first_registration_date {
        lines.push(format!("First registration: {}", date));
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}
