//! Paediatric vital-sign reference tables.
//!
//! Static lookup tables only: LOINC coding, canonical UCUM unit and plausibility limits per vital
//! sign, and normal ranges per age band. Nothing here is clinical decision support; the tables
//! exist to annotate stored observations with a reference range and a low/normal/high flag.

use std::fmt;
use std::str::FromStr;

/// A vital sign the API can record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VitalSign {
    HeartRate,
    RespiratoryRate,
    BodyTemperature,
    OxygenSaturation,
    SystolicBp,
    DiastolicBp,
    BodyWeight,
    BodyHeight,
}

impl VitalSign {
    /// Every supported vital sign, in table order.
    pub fn all() -> [VitalSign; 8] {
        [
            VitalSign::HeartRate,
            VitalSign::RespiratoryRate,
            VitalSign::BodyTemperature,
            VitalSign::OxygenSaturation,
            VitalSign::SystolicBp,
            VitalSign::DiastolicBp,
            VitalSign::BodyWeight,
            VitalSign::BodyHeight,
        ]
    }

    /// Key used in requests and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            VitalSign::HeartRate => "heart_rate",
            VitalSign::RespiratoryRate => "respiratory_rate",
            VitalSign::BodyTemperature => "body_temperature",
            VitalSign::OxygenSaturation => "oxygen_saturation",
            VitalSign::SystolicBp => "systolic_bp",
            VitalSign::DiastolicBp => "diastolic_bp",
            VitalSign::BodyWeight => "body_weight",
            VitalSign::BodyHeight => "body_height",
        }
    }

    pub fn loinc_code(self) -> &'static str {
        match self {
            VitalSign::HeartRate => "8867-4",
            VitalSign::RespiratoryRate => "9279-1",
            VitalSign::BodyTemperature => "8310-5",
            VitalSign::OxygenSaturation => "59408-5",
            VitalSign::SystolicBp => "8480-6",
            VitalSign::DiastolicBp => "8462-4",
            VitalSign::BodyWeight => "29463-7",
            VitalSign::BodyHeight => "8302-2",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            VitalSign::HeartRate => "Heart rate",
            VitalSign::RespiratoryRate => "Respiratory rate",
            VitalSign::BodyTemperature => "Body temperature",
            VitalSign::OxygenSaturation => {
                "Oxygen saturation in Arterial blood by Pulse oximetry"
            }
            VitalSign::SystolicBp => "Systolic blood pressure",
            VitalSign::DiastolicBp => "Diastolic blood pressure",
            VitalSign::BodyWeight => "Body weight",
            VitalSign::BodyHeight => "Body height",
        }
    }

    /// Canonical UCUM unit.
    pub fn unit(self) -> &'static str {
        match self {
            VitalSign::HeartRate | VitalSign::RespiratoryRate => "/min",
            VitalSign::BodyTemperature => "Cel",
            VitalSign::OxygenSaturation => "%",
            VitalSign::SystolicBp | VitalSign::DiastolicBp => "mm[Hg]",
            VitalSign::BodyWeight => "kg",
            VitalSign::BodyHeight => "cm",
        }
    }

    /// Physiologically plausible values (inclusive); anything outside is a data entry error.
    pub fn plausible_range(self) -> Range {
        match self {
            VitalSign::HeartRate => Range::new(20.0, 300.0),
            VitalSign::RespiratoryRate => Range::new(5.0, 120.0),
            VitalSign::BodyTemperature => Range::new(30.0, 45.0),
            VitalSign::OxygenSaturation => Range::new(50.0, 100.0),
            VitalSign::SystolicBp => Range::new(30.0, 250.0),
            VitalSign::DiastolicBp => Range::new(15.0, 150.0),
            VitalSign::BodyWeight => Range::new(0.2, 250.0),
            VitalSign::BodyHeight => Range::new(20.0, 250.0),
        }
    }

    /// Reverse lookup from a LOINC code.
    pub fn from_loinc(code: &str) -> Option<Self> {
        Self::all().into_iter().find(|v| v.loinc_code() == code)
    }
}

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VitalSign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or(())
    }
}

/// Inclusive numeric range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Paediatric age band used to select reference ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgeBand {
    Neonate,
    Infant,
    Toddler,
    Preschool,
    SchoolAge,
    Adolescent,
}

impl AgeBand {
    /// Band for an age in completed months.
    pub fn for_age_months(months: u32) -> Self {
        match months {
            0 => AgeBand::Neonate,
            1..=11 => AgeBand::Infant,
            12..=35 => AgeBand::Toddler,
            36..=71 => AgeBand::Preschool,
            72..=143 => AgeBand::SchoolAge,
            _ => AgeBand::Adolescent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeBand::Neonate => "neonate",
            AgeBand::Infant => "infant",
            AgeBand::Toddler => "toddler",
            AgeBand::Preschool => "preschool",
            AgeBand::SchoolAge => "school_age",
            AgeBand::Adolescent => "adolescent",
        }
    }

    /// Label used as `referenceRange.text`.
    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Neonate => "Neonate (0-1 month)",
            AgeBand::Infant => "Infant (1-12 months)",
            AgeBand::Toddler => "Toddler (1-3 years)",
            AgeBand::Preschool => "Preschool (3-6 years)",
            AgeBand::SchoolAge => "School age (6-12 years)",
            AgeBand::Adolescent => "Adolescent (12+ years)",
        }
    }

    /// Reverse lookup from [`AgeBand::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        [
            AgeBand::Neonate,
            AgeBand::Infant,
            AgeBand::Toddler,
            AgeBand::Preschool,
            AgeBand::SchoolAge,
            AgeBand::Adolescent,
        ]
        .into_iter()
        .find(|band| band.label() == label)
    }
}

/// Normal range for a vital sign in an age band; `None` for vitals without banded ranges.
pub fn reference_range(vital: VitalSign, band: AgeBand) -> Option<Range> {
    use AgeBand::*;

    let range = match vital {
        VitalSign::HeartRate => match band {
            Neonate => Range::new(100.0, 180.0),
            Infant => Range::new(100.0, 160.0),
            Toddler => Range::new(98.0, 140.0),
            Preschool => Range::new(80.0, 120.0),
            SchoolAge => Range::new(75.0, 118.0),
            Adolescent => Range::new(60.0, 100.0),
        },
        VitalSign::RespiratoryRate => match band {
            Neonate => Range::new(30.0, 60.0),
            Infant => Range::new(30.0, 53.0),
            Toddler => Range::new(22.0, 37.0),
            Preschool => Range::new(20.0, 28.0),
            SchoolAge => Range::new(18.0, 25.0),
            Adolescent => Range::new(12.0, 20.0),
        },
        VitalSign::SystolicBp => match band {
            Neonate => Range::new(60.0, 90.0),
            Infant => Range::new(72.0, 104.0),
            Toddler => Range::new(86.0, 106.0),
            Preschool => Range::new(89.0, 112.0),
            SchoolAge => Range::new(97.0, 115.0),
            Adolescent => Range::new(110.0, 131.0),
        },
        VitalSign::DiastolicBp => match band {
            Neonate => Range::new(30.0, 60.0),
            Infant => Range::new(37.0, 56.0),
            Toddler => Range::new(42.0, 63.0),
            Preschool => Range::new(46.0, 72.0),
            SchoolAge => Range::new(57.0, 76.0),
            Adolescent => Range::new(64.0, 83.0),
        },
        VitalSign::BodyTemperature => Range::new(36.5, 37.5),
        VitalSign::OxygenSaturation => Range::new(95.0, 100.0),
        VitalSign::BodyWeight | VitalSign::BodyHeight => return None,
    };

    Some(range)
}

/// HL7 v3 observation interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpretation {
    Low,
    Normal,
    High,
}

impl Interpretation {
    pub fn code(self) -> &'static str {
        match self {
            Interpretation::Low => "L",
            Interpretation::Normal => "N",
            Interpretation::High => "H",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Interpretation::Low => "Low",
            Interpretation::Normal => "Normal",
            Interpretation::High => "High",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Interpretation::Low),
            "N" => Some(Interpretation::Normal),
            "H" => Some(Interpretation::High),
            _ => None,
        }
    }

    pub fn is_abnormal(self) -> bool {
        self != Interpretation::Normal
    }
}

/// Flag a value against its reference range. Bounds are inclusive.
pub fn interpret(value: f64, range: Range) -> Interpretation {
    if value < range.low {
        Interpretation::Low
    } else if value > range.high {
        Interpretation::High
    } else {
        Interpretation::Normal
    }
}
