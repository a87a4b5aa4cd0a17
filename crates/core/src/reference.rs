//! Read-only views of the reference tables, shaped for the API and CLI.

use crate::scheduling::AppointmentType;
use crate::vitals::{reference_range, AgeBand, VitalSign};
use api_shared::{
    AppointmentTypeListRes, AppointmentTypeRes, VitalSignReferenceListRes, VitalSignReferenceRes,
};

/// Reference range of every vital sign for a child of `age_months` completed months.
pub fn vital_sign_table(age_months: u32) -> VitalSignReferenceListRes {
    let band = AgeBand::for_age_months(age_months);

    let items = VitalSign::all()
        .into_iter()
        .map(|vital| {
            let range = reference_range(vital, band);
            VitalSignReferenceRes {
                vital: vital.as_str().to_string(),
                loinc_code: vital.loinc_code().to_string(),
                display: vital.display().to_string(),
                unit: vital.unit().to_string(),
                low: range.map(|r| r.low),
                high: range.map(|r| r.high),
            }
        })
        .collect();

    VitalSignReferenceListRes {
        age_months,
        age_band: band.as_str().to_string(),
        items,
    }
}

/// Visit types with their codes and default slot lengths.
pub fn appointment_type_table() -> AppointmentTypeListRes {
    AppointmentTypeListRes {
        items: AppointmentType::all()
            .into_iter()
            .map(|kind| AppointmentTypeRes {
                appointment_type: kind.as_str().to_string(),
                snomed_code: kind.snomed_code().to_string(),
                display: kind.display().to_string(),
                default_minutes: kind.default_minutes(),
                reason_code: kind.reason_code().to_string(),
            })
            .collect(),
    }
}
