//! Appointment reference tables: visit types, default durations and priority codes.

use std::fmt;
use std::str::FromStr;

/// Kind of paediatric visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppointmentType {
    WellChild,
    SickVisit,
    FollowUp,
    Vaccination,
}

impl AppointmentType {
    pub fn all() -> [AppointmentType; 4] {
        [
            AppointmentType::WellChild,
            AppointmentType::SickVisit,
            AppointmentType::FollowUp,
            AppointmentType::Vaccination,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentType::WellChild => "well_child",
            AppointmentType::SickVisit => "sick_visit",
            AppointmentType::FollowUp => "follow_up",
            AppointmentType::Vaccination => "vaccination",
        }
    }

    /// SNOMED CT code used for `Appointment.serviceType`.
    pub fn snomed_code(self) -> &'static str {
        match self {
            AppointmentType::WellChild => "410620009",
            AppointmentType::SickVisit => "185347001",
            AppointmentType::FollowUp => "390906007",
            AppointmentType::Vaccination => "33879002",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            AppointmentType::WellChild => "Well child visit",
            AppointmentType::SickVisit => "Encounter for problem",
            AppointmentType::FollowUp => "Follow-up encounter",
            AppointmentType::Vaccination => {
                "Administration of vaccine to produce active immunity"
            }
        }
    }

    /// Slot length used when the request gives no end time.
    pub fn default_minutes(self) -> u32 {
        match self {
            AppointmentType::WellChild => 30,
            AppointmentType::SickVisit => 20,
            AppointmentType::FollowUp => 15,
            AppointmentType::Vaccination => 15,
        }
    }

    /// HL7 v2-0276 appointment reason code.
    pub fn reason_code(self) -> &'static str {
        match self {
            AppointmentType::WellChild => "CHECKUP",
            AppointmentType::SickVisit => "WALKIN",
            AppointmentType::FollowUp => "FOLLOWUP",
            AppointmentType::Vaccination => "ROUTINE",
        }
    }

    pub fn from_snomed(code: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.snomed_code() == code)
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// Scheduling priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Priority {
    Routine,
    Urgent,
    Emergency,
}

impl Priority {
    pub fn all() -> [Priority; 3] {
        [Priority::Routine, Priority::Urgent, Priority::Emergency]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Routine => "routine",
            Priority::Urgent => "urgent",
            Priority::Emergency => "emergency",
        }
    }

    /// FHIR `Appointment.priority`; lower numbers are more urgent.
    pub fn code(self) -> u32 {
        match self {
            Priority::Emergency => 1,
            Priority::Urgent => 3,
            Priority::Routine => 5,
        }
    }

    /// Map a stored priority number back to a priority. 0 (undefined) reads as routine.
    pub fn from_code(code: u32) -> Self {
        match code {
            1..=2 => Priority::Emergency,
            3..=4 => Priority::Urgent,
            _ => Priority::Routine,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

/// v2-0276 code for an appointment: emergencies override the visit type's own code.
pub fn reason_code(appointment_type: AppointmentType, priority: Priority) -> &'static str {
    match priority {
        Priority::Emergency => "EMERGENCY",
        _ => appointment_type.reason_code(),
    }
}

/// Display text for a v2-0276 appointment reason code.
pub fn reason_display(code: &str) -> &'static str {
    match code {
        "CHECKUP" => "A routine check-up, such as an annual physical",
        "EMERGENCY" => "Emergency appointment",
        "FOLLOWUP" => "A follow up visit from a previous appointment",
        "WALKIN" => "A previously unscheduled walk-in visit",
        _ => "Routine appointment - default if not valued",
    }
}

/// FHIR appointment status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Proposed,
    Pending,
    Booked,
    Arrived,
    Fulfilled,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn all() -> [AppointmentStatus; 7] {
        [
            AppointmentStatus::Proposed,
            AppointmentStatus::Pending,
            AppointmentStatus::Booked,
            AppointmentStatus::Arrived,
            AppointmentStatus::Fulfilled,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Proposed => "proposed",
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Arrived => "arrived",
            AppointmentStatus::Fulfilled => "fulfilled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "noshow",
        }
    }

    /// Statuses a new appointment may start in.
    pub fn allowed_on_create(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Proposed | AppointmentStatus::Pending | AppointmentStatus::Booked
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_durations() {
        assert_eq!(AppointmentType::WellChild.default_minutes(), 30);
        assert_eq!(AppointmentType::SickVisit.default_minutes(), 20);
        assert_eq!(AppointmentType::FollowUp.default_minutes(), 15);
        assert_eq!(AppointmentType::Vaccination.default_minutes(), 15);
    }

    #[test]
    fn priority_codes_map_both_ways() {
        for priority in Priority::all() {
            assert_eq!(Priority::from_code(priority.code()), priority);
        }
        assert_eq!(Priority::from_code(0), Priority::Routine);
        assert_eq!(Priority::from_code(9), Priority::Routine);
        assert_eq!(Priority::from_code(2), Priority::Emergency);
    }

    #[test]
    fn emergency_overrides_reason_code() {
        assert_eq!(
            reason_code(AppointmentType::WellChild, Priority::Routine),
            "CHECKUP"
        );
        assert_eq!(
            reason_code(AppointmentType::WellChild, Priority::Emergency),
            "EMERGENCY"
        );
        assert_eq!(
            reason_code(AppointmentType::SickVisit, Priority::Urgent),
            "WALKIN"
        );
        assert_eq!(reason_display("EMERGENCY"), "Emergency appointment");
    }

    #[test]
    fn only_early_statuses_allowed_on_create() {
        assert!(AppointmentStatus::Booked.allowed_on_create());
        assert!(AppointmentStatus::Proposed.allowed_on_create());
        assert!(!AppointmentStatus::Fulfilled.allowed_on_create());
        assert!(!AppointmentStatus::Cancelled.allowed_on_create());
    }

    #[test]
    fn parses_keys() {
        assert_eq!("noshow".parse::<AppointmentStatus>(), Ok(AppointmentStatus::NoShow));
        assert_eq!("follow_up".parse::<AppointmentType>(), Ok(AppointmentType::FollowUp));
        assert!("asap".parse::<Priority>().is_err());
        assert_eq!(
            AppointmentType::from_snomed("410620009"),
            Some(AppointmentType::WellChild)
        );
    }
}
