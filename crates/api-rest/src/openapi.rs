//! OpenAPI document served at `/api-docs/openapi.json`.

use api_shared::{
    AgeRes, AppointmentListRes, AppointmentReq, AppointmentRes, AppointmentTypeListRes,
    AppointmentTypeRes, CancelAppointmentReq, CodeDisplayRes, GuardianReq, GuardianRes, HealthRes,
    ObservationListRes, ObservationReq, ObservationRes, PatientListRes, PatientReq, PatientRes,
    ReferenceRangeRes, VitalSignReferenceListRes, VitalSignReferenceRes,
};
use utoipa::OpenApi;

use crate::handlers::{appointments, observations, patients, reference, system};

#[derive(OpenApi)]
#[openapi(
    paths(
        system::health,
        system::metadata,
        patients::create_patient,
        patients::list_patients,
        patients::read_patient,
        patients::update_patient,
        patients::delete_patient,
        observations::create_observation,
        observations::list_observations,
        observations::read_observation,
        observations::update_observation,
        observations::delete_observation,
        appointments::create_appointment,
        appointments::list_appointments,
        appointments::read_appointment,
        appointments::update_appointment,
        appointments::delete_appointment,
        appointments::cancel_appointment,
        reference::vital_sign_reference,
        reference::appointment_types,
    ),
    components(schemas(
        HealthRes,
        AgeRes,
        CodeDisplayRes,
        PatientReq,
        GuardianReq,
        GuardianRes,
        PatientRes,
        PatientListRes,
        ObservationReq,
        ObservationRes,
        ObservationListRes,
        ReferenceRangeRes,
        AppointmentReq,
        CancelAppointmentReq,
        AppointmentRes,
        AppointmentListRes,
        VitalSignReferenceRes,
        VitalSignReferenceListRes,
        AppointmentTypeRes,
        AppointmentTypeListRes,
    )),
    info(
        title = "Paeds FHIR API",
        description = "Paediatric patients, vital signs and appointments as FHIR R4 resources"
    )
)]
pub struct ApiDoc;
