//! Constants used throughout the core crate.
//!
//! Code system URIs and fixed identifiers live here so the FHIR mapping code and its tests agree
//! on a single spelling.

/// Identifier system for medical record numbers issued by this service.
pub const MRN_SYSTEM: &str = "https://paeds.example.org/fhir/sid/mrn";

/// LOINC.
pub const LOINC_SYSTEM: &str = "http://loinc.org";

/// SNOMED CT.
pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

/// UCUM units of measure.
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

/// Observation category code system.
pub const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

/// Observation interpretation code system (HL7 v3).
pub const INTERPRETATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/v3-ObservationInterpretation";

/// Personal relationship role codes (HL7 v3 RoleCode).
pub const ROLE_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-RoleCode";

/// Appointment reason codes (HL7 v2 table 0276).
pub const APPOINTMENT_REASON_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0276";

/// Appointment participant roles (HL7 v3 ParticipationType).
pub const PARTICIPATION_TYPE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/v3-ParticipationType";

/// Category code applied to every vital-sign observation.
pub const VITAL_SIGNS_CATEGORY: &str = "vital-signs";

/// Default upper bound on the age of a registered patient, in completed years.
pub const DEFAULT_MAX_PATIENT_AGE_YEARS: u32 = 21;

/// Default upper bound on appointment length.
pub const DEFAULT_MAX_APPOINTMENT_MINUTES: u32 = 480;

/// Default tolerance for timestamps slightly in the future.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 300;

/// Largest tolerated clock skew: one day.
pub const MAX_CLOCK_SKEW_SECS: i64 = 86_400;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Default maximum page size for list operations.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;
