use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fhir::{AnyResource, Appointment, Observation, Patient, Resource};
use paeds_core::reference::{appointment_type_table, vital_sign_table};
use paeds_core::vitals::VitalSign;

#[derive(Parser)]
#[command(name = "paeds")]
#[command(about = "Paediatric care reference tables and FHIR resource checks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print vital-sign reference ranges for an age
    Vitals {
        /// Age in completed months
        #[arg(long)]
        age_months: u32,
    },
    /// Print appointment types with their codes and default lengths
    AppointmentTypes,
    /// Parse a FHIR JSON file (Patient, Observation or Appointment) and summarise it
    CheckResource {
        /// Path to the JSON file
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Vitals { age_months }) => {
            let table = vital_sign_table(age_months);
            println!("Age {} months ({})", table.age_months, table.age_band);
            for item in table.items {
                let range = match (item.low, item.high) {
                    (Some(low), Some(high)) => format!("{low}-{high} {}", item.unit),
                    _ => format!("no fixed range ({})", item.unit),
                };
                println!("  {:<26} {:<8} {}", item.display, item.loinc_code, range);
            }
        }
        Some(Commands::AppointmentTypes) => {
            for item in appointment_type_table().items {
                println!(
                    "{:<12} {:<10} {:<24} {:>3} min  {}",
                    item.appointment_type,
                    item.snomed_code,
                    item.display,
                    item.default_minutes,
                    item.reason_code
                );
            }
        }
        Some(Commands::CheckResource { file }) => {
            let text = std::fs::read_to_string(&file)?;
            match AnyResource::parse(&text) {
                Ok(resource) => {
                    for line in summarise(&resource) {
                        println!("{line}");
                    }
                }
                Err(e) => {
                    eprintln!("{} is not a valid resource: {}", file.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("Use 'paeds --help' for commands");
        }
    }

    Ok(())
}

/// One line per notable element of `resource`.
fn summarise(resource: &AnyResource) -> Vec<String> {
    let mut lines = vec![format!("resourceType: {}", resource.resource_type())];
    match resource {
        AnyResource::Patient(patient) => summarise_patient(patient, &mut lines),
        AnyResource::Observation(observation) => summarise_observation(observation, &mut lines),
        AnyResource::Appointment(appointment) => summarise_appointment(appointment, &mut lines),
    }
    lines
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn summarise_patient(patient: &Patient, lines: &mut Vec<String>) {
    lines.push(format!("id: {}", or_dash(patient.id.as_deref())));
    let name = patient.primary_name().map(|n| {
        n.text.clone().unwrap_or_else(|| {
            let mut parts = n.given.clone();
            parts.extend(n.family.clone());
            parts.join(" ")
        })
    });
    lines.push(format!("name: {}", or_dash(name.as_deref())));
    lines.push(format!("birthDate: {}", or_dash(patient.birth_date.as_deref())));
    lines.push(format!("gender: {}", or_dash(patient.gender.as_deref())));
    lines.push(format!("contacts: {}", patient.contact.len()));
}

fn summarise_observation(observation: &Observation, lines: &mut Vec<String>) {
    lines.push(format!("id: {}", or_dash(observation.id.as_deref())));
    lines.push(format!("status: {}", observation.status));

    let code = observation
        .code
        .coding
        .first()
        .and_then(|c| c.code.as_deref());
    let vital = code
        .and_then(VitalSign::from_loinc)
        .map(|v| v.display().to_string());
    lines.push(format!(
        "code: {} ({})",
        or_dash(code),
        vital.as_deref().unwrap_or("not a known vital sign")
    ));

    if let Some(quantity) = &observation.value_quantity {
        let value = quantity.value.map(|v| v.to_string());
        lines.push(format!(
            "value: {} {}",
            or_dash(value.as_deref()),
            quantity.unit.as_deref().unwrap_or_default()
        ));
    }
    lines.push(format!(
        "subject: {}",
        or_dash(observation.subject.as_ref().and_then(|s| s.reference.as_deref()))
    ));
    lines.push(format!(
        "effective: {}",
        or_dash(observation.effective_date_time.as_deref())
    ));
}

fn summarise_appointment(appointment: &Appointment, lines: &mut Vec<String>) {
    lines.push(format!("id: {}", or_dash(appointment.id.as_deref())));
    lines.push(format!("status: {}", appointment.status));
    lines.push(format!("start: {}", or_dash(appointment.start.as_deref())));
    lines.push(format!("end: {}", or_dash(appointment.end.as_deref())));
    lines.push(format!(
        "patient: {}",
        or_dash(appointment.actor_id(Patient::RESOURCE_TYPE))
    ));
    lines.push(format!("participants: {}", appointment.participant.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarises_observation_with_known_code() {
        let resource = AnyResource::parse(
            r#"{
                "resourceType": "Observation",
                "status": "final",
                "code": { "coding": [{ "system": "http://loinc.org", "code": "8867-4" }] },
                "subject": { "reference": "Patient/abc" },
                "valueQuantity": { "value": 96, "unit": "/min" }
            }"#,
        )
        .unwrap();

        let lines = summarise(&resource);
        assert_eq!(lines[0], "resourceType: Observation");
        assert!(lines.contains(&"code: 8867-4 (Heart rate)".to_string()));
        assert!(lines.contains(&"value: 96 /min".to_string()));
        assert!(lines.contains(&"subject: Patient/abc".to_string()));
    }

    #[test]
    fn summarises_patient_name_from_parts() {
        let resource = AnyResource::parse(
            r#"{
                "resourceType": "Patient",
                "name": [{ "family": "Lee", "given": ["Ada"] }],
                "birthDate": "2020-03-15"
            }"#,
        )
        .unwrap();

        let lines = summarise(&resource);
        assert!(lines.contains(&"name: Ada Lee".to_string()));
        assert!(lines.contains(&"gender: -".to_string()));
    }
}
