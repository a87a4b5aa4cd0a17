//! Demographic code tables: administrative gender and guardian relationship.

use std::fmt;
use std::str::FromStr;

/// FHIR administrative gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub fn all() -> [Gender; 4] {
        [Gender::Male, Gender::Female, Gender::Other, Gender::Unknown]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or(())
    }
}

/// Relationship of the guardian contact to the child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relationship {
    Mother,
    Father,
    Guardian,
    Grandparent,
    Other,
}

impl Relationship {
    pub fn all() -> [Relationship; 5] {
        [
            Relationship::Mother,
            Relationship::Father,
            Relationship::Guardian,
            Relationship::Grandparent,
            Relationship::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Mother => "mother",
            Relationship::Father => "father",
            Relationship::Guardian => "guardian",
            Relationship::Grandparent => "grandparent",
            Relationship::Other => "other",
        }
    }

    /// HL7 v3 RoleCode, when one applies.
    pub fn role_code(self) -> Option<&'static str> {
        match self {
            Relationship::Mother => Some("MTH"),
            Relationship::Father => Some("FTH"),
            Relationship::Guardian => Some("GUARD"),
            Relationship::Grandparent => Some("GRPRN"),
            Relationship::Other => None,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Relationship::Mother => "mother",
            Relationship::Father => "father",
            Relationship::Guardian => "guardian",
            Relationship::Grandparent => "grandparent",
            Relationship::Other => "other",
        }
    }

    pub fn from_role_code(code: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|r| r.role_code() == Some(code))
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes_round_trip() {
        for relationship in Relationship::all() {
            if let Some(code) = relationship.role_code() {
                assert_eq!(Relationship::from_role_code(code), Some(relationship));
            }
        }
        assert_eq!(Relationship::Other.role_code(), None);
    }

    #[test]
    fn gender_keys_parse() {
        assert_eq!("female".parse::<Gender>(), Ok(Gender::Female));
        assert!("Female".parse::<Gender>().is_err());
    }
}
