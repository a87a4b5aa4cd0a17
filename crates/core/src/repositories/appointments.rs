//! Appointment scheduling.
//!
//! Appointments book one patient into a visit of a given type. When the request has no end time
//! the slot length comes from the visit type. Emergencies carry the `EMERGENCY` reason code
//! whatever the visit type.

use crate::config::CoreConfig;
use crate::constants::{
    APPOINTMENT_REASON_SYSTEM, PARTICIPATION_TYPE_SYSTEM, SNOMED_SYSTEM,
};
use crate::repositories::shared::{
    body_id, missing_patient, path_id, referenced_patient, timestamps, Page, Paged,
};
use crate::scheduling::{reason_code, reason_display, AppointmentStatus, AppointmentType, Priority};
use crate::store::{Registry, Stored};
use crate::validation::{format_datetime, is_representable, parse_datetime, Violations};
use crate::{CoreError, CoreResult};
use api_shared::{
    AppointmentListRes, AppointmentQuery, AppointmentReq, AppointmentRes, CancelAppointmentReq,
    CodeDisplayRes,
};
use chrono::{DateTime, Duration, Utc};
use fhir::{Appointment, AppointmentParticipant, CodeableConcept, Patient, Reference, Resource};
use std::sync::Arc;

const MAX_PRACTITIONER_CHARS: usize = 100;
const MAX_REASON_CHARS: usize = 500;

/// Which statuses a request may set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Intent {
    Create,
    Replace,
}

/// Service for appointment CRUD and cancellation.
#[derive(Clone)]
pub struct AppointmentService {
    cfg: Arc<CoreConfig>,
    registry: Arc<Registry>,
}

impl AppointmentService {
    pub fn new(cfg: Arc<CoreConfig>, registry: Arc<Registry>) -> Self {
        Self { cfg, registry }
    }

    /// Book an appointment.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] for invalid fields, including a status other than
    ///   `proposed`, `pending` or `booked`.
    /// - [`CoreError::InvalidReference`] when the patient does not exist.
    pub fn create(&self, req: &AppointmentReq) -> CoreResult<AppointmentRes> {
        let now = Utc::now();
        let appointment = self
            .build_appointment(req, now, Intent::Create)
            .inspect_err(|e| tracing::debug!(error = %e, "appointment rejected"))?;

        let stored = self.registry.appointments.insert(appointment, now)?;
        tracing::info!(appointment_id = %stored.id, "appointment created");
        appointment_res(&stored)
    }

    pub fn get(&self, id: &str) -> CoreResult<AppointmentRes> {
        appointment_res(&self.registry.appointments.get(&path_id(id)?)?)
    }

    pub fn get_resource(&self, id: &str) -> CoreResult<Appointment> {
        Ok(self.registry.appointments.get(&path_id(id)?)?.resource)
    }

    /// List appointments, earliest start first.
    pub fn list(&self, query: &AppointmentQuery) -> CoreResult<AppointmentListRes> {
        let paged = self.search(query)?;
        let count = paged.items.len();
        let paged = paged.map(|stored| appointment_res(&stored))?;

        Ok(AppointmentListRes {
            total: paged.total,
            offset: paged.offset,
            count,
            items: paged.items,
        })
    }

    pub fn list_resources(&self, query: &AppointmentQuery) -> CoreResult<Paged<Appointment>> {
        self.search(query)?.map(|stored| Ok(stored.resource))
    }

    fn search(&self, query: &AppointmentQuery) -> CoreResult<Paged<Stored<Appointment>>> {
        let mut v = Violations::new();
        let patient = query
            .patient
            .as_deref()
            .and_then(|p| body_id(&mut v, "patient", p))
            .map(|id| id.to_string());
        let status = match query.status.as_deref() {
            Some(status) => v.one_of::<AppointmentStatus>(
                "status",
                status,
                &AppointmentStatus::all().map(AppointmentStatus::as_str),
            ),
            None => None,
        };
        let date = match query.date.as_deref() {
            Some(date) => v.date("date", date),
            None => None,
        };
        v.finish()?;
        let page = Page::resolve(&self.cfg, query.count, query.offset)?;

        let mut matches: Vec<_> = self
            .registry
            .appointments
            .list()?
            .into_iter()
            .filter(|stored| {
                let a = &stored.resource;
                let start = a.start.as_deref().and_then(parse_datetime);
                patient
                    .as_deref()
                    .is_none_or(|id| a.actor_id(Patient::RESOURCE_TYPE) == Some(id))
                    && status.is_none_or(|s| a.status == s.as_str())
                    && date.is_none_or(|d| start.is_some_and(|s| s.date_naive() == d))
            })
            .collect();

        matches.sort_by_key(|stored| stored.resource.start.as_deref().and_then(parse_datetime));

        Ok(page.apply(matches))
    }

    /// Replace an appointment. Any status may be set; `created` is kept.
    pub fn update(&self, id: &str, req: &AppointmentReq) -> CoreResult<AppointmentRes> {
        let id = path_id(id)?;
        let now = Utc::now();
        let replacement = self
            .build_appointment(req, now, Intent::Replace)
            .inspect_err(|e| tracing::debug!(appointment_id = %id, error = %e, "appointment update rejected"))?;

        let stored = self.registry.appointments.modify(&id, now, |current| {
            let created = current.created.take();
            *current = replacement;
            current.created = created;
            Ok(())
        })?;
        tracing::info!(appointment_id = %id, version = stored.version, "appointment updated");
        appointment_res(&stored)
    }

    /// Cancel an appointment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Conflict`] if the appointment is already fulfilled or cancelled.
    pub fn cancel(&self, id: &str, req: &CancelAppointmentReq) -> CoreResult<AppointmentRes> {
        let id = path_id(id)?;

        let mut v = Violations::new();
        let reason = v.optional_text("reason", req.reason.as_deref(), MAX_REASON_CHARS);
        let Ok(reason) = reason else {
            return Err(v.into_error());
        };

        let stored = self.registry.appointments.modify(&id, Utc::now(), |current| {
            let status = current.status.parse::<AppointmentStatus>().ok();
            match status {
                Some(AppointmentStatus::Fulfilled) => Err(CoreError::Conflict(
                    "a fulfilled appointment cannot be cancelled".into(),
                )),
                Some(AppointmentStatus::Cancelled) => Err(CoreError::Conflict(
                    "appointment is already cancelled".into(),
                )),
                _ => {
                    current.status = AppointmentStatus::Cancelled.as_str().to_string();
                    current.cancelation_reason = reason.as_deref().map(CodeableConcept::text);
                    Ok(())
                }
            }
        })?;
        tracing::info!(appointment_id = %id, "appointment cancelled");
        appointment_res(&stored)
    }

    pub fn delete(&self, id: &str) -> CoreResult<()> {
        let id = path_id(id)?;
        self.registry.appointments.remove(&id)?;
        tracing::info!(appointment_id = %id, "appointment deleted");
        Ok(())
    }

    // ========================================================================
    // REQUEST -> FHIR
    // ========================================================================

    fn build_appointment(
        &self,
        req: &AppointmentReq,
        now: DateTime<Utc>,
        intent: Intent,
    ) -> CoreResult<Appointment> {
        let mut v = Violations::new();

        let patient_id = body_id(&mut v, "patient_id", &req.patient_id);
        let patient = referenced_patient(&self.registry, patient_id)?;

        let kind = v.one_of::<AppointmentType>(
            "appointment_type",
            &req.appointment_type,
            &AppointmentType::all().map(AppointmentType::as_str),
        );

        let start = v.datetime("start", &req.start);
        let end = match req.end.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(text) => v.datetime("end", text),
            None => match (start, kind) {
                (Some(start), Some(kind)) => {
                    let length = Duration::minutes(i64::from(kind.default_minutes()));
                    match start.checked_add_signed(length).filter(|end| is_representable(*end)) {
                        Some(end) => Some(end),
                        None => {
                            v.add("end", "default end would fall after 9999-12-31T23:59:59Z");
                            None
                        }
                    }
                }
                _ => None,
            },
        };

        let mut minutes = None;
        if let (Some(start), Some(end)) = (start, end) {
            let max = self.cfg.max_appointment_minutes();
            if end <= start {
                v.add("end", "must be after start");
            } else if end - start > Duration::minutes(i64::from(max)) {
                v.add("end", format!("appointment cannot be longer than {max} minutes"));
            } else {
                minutes = u32::try_from(billed_minutes(end - start)).ok();
            }
        }

        let priority = match req.priority.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(priority) => {
                v.one_of::<Priority>("priority", priority, &Priority::all().map(Priority::as_str))
            }
            None => Some(Priority::Routine),
        };

        let status = match req.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => match intent {
                Intent::Create => match text.parse::<AppointmentStatus>() {
                    Ok(status) if status.allowed_on_create() => Some(status),
                    _ => {
                        let allowed: Vec<&str> = AppointmentStatus::all()
                            .into_iter()
                            .filter(|s| s.allowed_on_create())
                            .map(AppointmentStatus::as_str)
                            .collect();
                        v.add("status", format!("must be one of: {}", allowed.join(", ")));
                        None
                    }
                },
                Intent::Replace => v.one_of::<AppointmentStatus>(
                    "status",
                    text,
                    &AppointmentStatus::all().map(AppointmentStatus::as_str),
                ),
            },
            None => Some(AppointmentStatus::Booked),
        };

        let practitioner = v.optional_text(
            "practitioner",
            req.practitioner.as_deref(),
            MAX_PRACTITIONER_CHARS,
        );
        let reason = v.optional_text("reason", req.reason.as_deref(), MAX_REASON_CHARS);

        let (
            Some(patient_id),
            Some(kind),
            Some(start),
            Some(end),
            Some(minutes),
            Some(priority),
            Some(status),
            Ok(practitioner),
            Ok(reason),
            true,
        ) = (
            patient_id,
            kind,
            start,
            end,
            minutes,
            priority,
            status,
            practitioner,
            reason,
            v.is_empty(),
        )
        else {
            return Err(v.into_error());
        };
        if patient.is_none() {
            return Err(missing_patient(Some(patient_id)));
        }

        let reason_code = reason_code(kind, priority);

        let mut appointment = Appointment::new(status.as_str());
        appointment.service_type.push(CodeableConcept::single(
            SNOMED_SYSTEM,
            kind.snomed_code(),
            kind.display(),
        ));
        appointment.appointment_type = Some(CodeableConcept::single(
            APPOINTMENT_REASON_SYSTEM,
            reason_code,
            reason_display(reason_code),
        ));
        appointment.priority = Some(priority.code());
        appointment.description = reason;
        appointment.start = Some(format_datetime(start));
        appointment.end = Some(format_datetime(end));
        appointment.minutes_duration = Some(minutes);
        appointment.created = Some(format_datetime(now));
        appointment.participant.push(AppointmentParticipant {
            actor: Some(Reference::to(Patient::RESOURCE_TYPE, &patient_id.to_string())),
            required: Some("required".into()),
            status: "accepted".into(),
            ..Default::default()
        });
        if let Some(name) = practitioner {
            appointment.participant.push(AppointmentParticipant {
                participant_type: vec![CodeableConcept::single(
                    PARTICIPATION_TYPE_SYSTEM,
                    "PPRF",
                    "primary performer",
                )],
                actor: Some(Reference {
                    reference: None,
                    display: Some(name),
                }),
                required: Some("required".into()),
                status: "accepted".into(),
            });
        }

        Ok(appointment)
    }
}

/// Whole minutes covering `length`; a part minute counts as one.
fn billed_minutes(length: Duration) -> i64 {
    (length.num_seconds() + 59) / 60
}

// ============================================================================
// FHIR -> RESPONSE
// ============================================================================

fn appointment_res(stored: &Stored<Appointment>) -> CoreResult<AppointmentRes> {
    let appt = &stored.resource;
    let corrupt = |detail: &str| CoreError::corrupt(Appointment::RESOURCE_TYPE, detail);

    let kind = appt
        .service_type
        .first()
        .and_then(|c| c.code_in(SNOMED_SYSTEM))
        .and_then(AppointmentType::from_snomed)
        .ok_or_else(|| corrupt("serviceType is not a supported SNOMED visit type"))?;
    let patient_id = appt
        .actor_id(Patient::RESOURCE_TYPE)
        .ok_or_else(|| corrupt("no Patient participant"))?
        .to_string();
    let start = appt
        .start
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| corrupt("start missing or invalid"))?;
    let end = appt
        .end
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| corrupt("end missing or invalid"))?;
    let duration_minutes = match appt.minutes_duration {
        Some(minutes) => minutes,
        None => u32::try_from((end - start).num_minutes()).unwrap_or(0),
    };
    let priority = Priority::from_code(appt.priority.unwrap_or(0));
    let practitioner = appt
        .participant
        .iter()
        .filter_map(|p| p.actor.as_ref())
        .find(|actor| actor.reference.is_none())
        .and_then(|actor| actor.display.clone());
    let (created_at, updated_at) = timestamps(stored);

    Ok(AppointmentRes {
        id: stored.id.to_string(),
        version: stored.version,
        patient_id,
        appointment_type: kind.as_str().to_string(),
        service_type: CodeDisplayRes {
            code: kind.snomed_code().to_string(),
            display: kind.display().to_string(),
        },
        start: format_datetime(start),
        end: format_datetime(end),
        duration_minutes,
        priority: priority.as_str().to_string(),
        priority_code: priority.code(),
        status: appt.status.clone(),
        practitioner,
        reason: appt.description.clone(),
        cancellation_reason: appt.cancelation_reason.as_ref().and_then(|c| c.text.clone()),
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::patients::PatientService;
    use api_shared::PatientReq;

    struct Fixture {
        patients: PatientService,
        appointments: AppointmentService,
    }

    fn fixture() -> Fixture {
        let cfg = Arc::new(CoreConfig::default());
        let registry = Arc::new(Registry::new());
        Fixture {
            patients: PatientService::new(cfg.clone(), registry.clone()),
            appointments: AppointmentService::new(cfg, registry),
        }
    }

    fn patient(fx: &Fixture) -> String {
        fx.patients
            .create(&PatientReq {
                given: vec!["Leo".into()],
                family: "Okafor".into(),
                birth_date: "2021-06-15".into(),
                gender: "male".into(),
                mrn: None,
                guardian: None,
                active: None,
            })
            .unwrap()
            .id
    }

    fn well_child(patient_id: &str, start: &str) -> AppointmentReq {
        AppointmentReq {
            patient_id: patient_id.into(),
            appointment_type: "well_child".into(),
            start: start.into(),
            end: None,
            priority: None,
            status: None,
            practitioner: Some("Dr Patel".into()),
            reason: Some("18 month review".into()),
        }
    }

    fn fields(err: CoreError) -> Vec<String> {
        match err {
            CoreError::Validation(issues) => issues.into_iter().map(|i| i.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn end_defaults_from_visit_type() {
        let fx = fixture();
        let patient = patient(&fx);
        let res = fx
            .appointments
            .create(&well_child(&patient, "2026-03-02T09:00:00Z"))
            .unwrap();

        assert_eq!(res.end, "2026-03-02T09:30:00Z");
        assert_eq!(res.duration_minutes, 30);
        assert_eq!(res.status, "booked");
        assert_eq!(res.priority, "routine");
        assert_eq!(res.priority_code, 5);
        assert_eq!(res.service_type.code, "410620009");
        assert_eq!(res.practitioner.as_deref(), Some("Dr Patel"));
        assert_eq!(res.reason.as_deref(), Some("18 month review"));
    }

    #[test]
    fn emergency_priority_sets_reason_code() {
        let fx = fixture();
        let patient = patient(&fx);
        let mut req = well_child(&patient, "2026-03-02T09:00:00+01:00");
        req.appointment_type = "sick_visit".into();
        req.priority = Some("emergency".into());

        let res = fx.appointments.create(&req).unwrap();
        assert_eq!(res.start, "2026-03-02T08:00:00Z");
        assert_eq!(res.duration_minutes, 20);
        assert_eq!(res.priority_code, 1);

        let appt = fx.appointments.get_resource(&res.id).unwrap();
        assert_eq!(
            appt.appointment_type
                .as_ref()
                .and_then(|t| t.code_in(APPOINTMENT_REASON_SYSTEM)),
            Some("EMERGENCY")
        );
        assert_eq!(appt.actor_id("Patient"), Some(patient.as_str()));
        assert_eq!(appt.participant.len(), 2);
    }

    #[test]
    fn time_window_checks() {
        let fx = fixture();
        let patient = patient(&fx);

        let mut backwards = well_child(&patient, "2026-03-02T09:00:00Z");
        backwards.end = Some("2026-03-02T08:00:00Z".into());
        assert_eq!(fields(fx.appointments.create(&backwards).unwrap_err()), ["end"]);

        let mut too_long = well_child(&patient, "2026-03-02T08:00:00Z");
        too_long.end = Some("2026-03-02T16:01:00Z".into());
        assert_eq!(fields(fx.appointments.create(&too_long).unwrap_err()), ["end"]);

        let mut full_day = well_child(&patient, "2026-03-02T08:00:00Z");
        full_day.end = Some("2026-03-02T16:00:00Z".into());
        assert_eq!(fx.appointments.create(&full_day).unwrap().duration_minutes, 480);

        let no_offset = well_child(&patient, "2026-03-02T09:00:00");
        assert_eq!(fields(fx.appointments.create(&no_offset).unwrap_err()), ["start"]);
    }

    #[test]
    fn create_only_allows_early_statuses() {
        let fx = fixture();
        let patient = patient(&fx);

        let mut fulfilled = well_child(&patient, "2026-03-02T09:00:00Z");
        fulfilled.status = Some("fulfilled".into());
        assert_eq!(fields(fx.appointments.create(&fulfilled).unwrap_err()), ["status"]);

        let mut nonsense = well_child(&patient, "2026-03-02T09:00:00Z");
        nonsense.status = Some("maybe".into());
        assert_eq!(fields(fx.appointments.create(&nonsense).unwrap_err()), ["status"]);

        let mut proposed = well_child(&patient, "2026-03-02T09:00:00Z");
        proposed.status = Some("proposed".into());
        assert_eq!(fx.appointments.create(&proposed).unwrap().status, "proposed");
    }

    #[test]
    fn update_may_set_any_status_and_keeps_created() {
        let fx = fixture();
        let patient = patient(&fx);
        let created = fx
            .appointments
            .create(&well_child(&patient, "2026-03-02T09:00:00Z"))
            .unwrap();
        let created_stamp = fx.appointments.get_resource(&created.id).unwrap().created;

        let mut arrived = well_child(&patient, "2026-03-02T09:00:00Z");
        arrived.status = Some("arrived".into());
        arrived.practitioner = None;
        let updated = fx.appointments.update(&created.id, &arrived).unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.status, "arrived");
        assert!(updated.practitioner.is_none());
        assert_eq!(
            fx.appointments.get_resource(&created.id).unwrap().created,
            created_stamp
        );
    }

    #[test]
    fn cancel_records_reason_once() {
        let fx = fixture();
        let patient = patient(&fx);
        let created = fx
            .appointments
            .create(&well_child(&patient, "2026-03-02T09:00:00Z"))
            .unwrap();

        let cancelled = fx
            .appointments
            .cancel(
                &created.id,
                &CancelAppointmentReq {
                    reason: Some("Family unwell".into()),
                },
            )
            .unwrap();
        assert_eq!(cancelled.status, "cancelled");
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Family unwell"));
        assert_eq!(cancelled.version, 2);

        let again = fx
            .appointments
            .cancel(&created.id, &CancelAppointmentReq::default());
        assert!(matches!(again, Err(CoreError::Conflict(_))));
    }

    #[test]
    fn fulfilled_cannot_be_cancelled() {
        let fx = fixture();
        let patient = patient(&fx);
        let created = fx
            .appointments
            .create(&well_child(&patient, "2026-03-02T09:00:00Z"))
            .unwrap();
        let mut done = well_child(&patient, "2026-03-02T09:00:00Z");
        done.status = Some("fulfilled".into());
        fx.appointments.update(&created.id, &done).unwrap();

        let err = fx
            .appointments
            .cancel(&created.id, &CancelAppointmentReq::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(fx.appointments.get(&created.id).unwrap().version, 2);
    }

    #[test]
    fn list_filters_and_orders_by_start() {
        let fx = fixture();
        let patient = patient(&fx);
        for start in [
            "2026-03-03T10:00:00Z",
            "2026-03-02T15:00:00Z",
            "2026-03-02T09:00:00Z",
        ] {
            fx.appointments.create(&well_child(&patient, start)).unwrap();
        }

        let day = fx
            .appointments
            .list(&AppointmentQuery {
                date: Some("2026-03-02".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(day.total, 2);
        assert_eq!(day.items[0].start, "2026-03-02T09:00:00Z");
        assert_eq!(day.items[1].start, "2026-03-02T15:00:00Z");

        let booked = fx
            .appointments
            .list(&AppointmentQuery {
                patient: Some(patient.clone()),
                status: Some("booked".into()),
                count: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(booked.total, 3);
        assert_eq!(booked.count, 2);

        let none = fx
            .appointments
            .list(&AppointmentQuery {
                status: Some("cancelled".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(none.total, 0);
    }

    #[test]
    fn missing_patient_is_rejected() {
        let fx = fixture();
        let req = well_child("550e8400e29b41d4a716446655440000", "2026-03-02T09:00:00Z");
        assert!(matches!(
            fx.appointments.create(&req),
            Err(CoreError::InvalidReference(_))
        ));
    }

    #[test]
    fn durations_round_up_and_respect_the_maximum() {
        let fx = fixture();
        let patient = patient(&fx);
        let booking = |start: &str, end: &str| {
            let mut req = well_child(&patient, start);
            req.end = Some(end.into());
            fx.appointments.create(&req)
        };

        let short = booking("2030-01-01T10:00:00Z", "2030-01-01T10:00:30Z").unwrap();
        assert_eq!(short.duration_minutes, 1);

        let same_second = booking("2030-01-01T10:00:00.2Z", "2030-01-01T10:00:00.7Z");
        assert_eq!(fields(same_second.unwrap_err()), ["end"]);

        let over_by_seconds = booking("2030-01-01T10:00:00Z", "2030-01-01T18:00:59Z");
        assert_eq!(fields(over_by_seconds.unwrap_err()), ["end"]);

        let over_by_a_minute = booking("2030-01-01T10:00:00Z", "2030-01-01T18:01:00Z");
        assert_eq!(fields(over_by_a_minute.unwrap_err()), ["end"]);

        let exactly_max = booking("2030-01-01T10:00:00Z", "2030-01-01T18:00:00Z").unwrap();
        assert_eq!(exactly_max.duration_minutes, 480);
    }

    #[test]
    fn default_end_past_year_9999_is_rejected_and_not_stored() {
        let fx = fixture();
        let patient = patient(&fx);

        let late = well_child(&patient, "9999-12-31T23:50:00Z");
        assert_eq!(fields(fx.appointments.create(&late).unwrap_err()), ["end"]);

        let listed = fx.appointments.list(&AppointmentQuery::default()).unwrap();
        assert_eq!(listed.total, 0);

        let fits = well_child(&patient, "9999-12-31T23:00:00Z");
        let res = fx.appointments.create(&fits).unwrap();
        assert_eq!(res.end, "9999-12-31T23:30:00Z");
        assert_eq!(fx.appointments.list(&AppointmentQuery::default()).unwrap().total, 1);
    }
}
