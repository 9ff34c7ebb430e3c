//! crates/lectern_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format,
//! with the exception of serde derives so the flat-file backend can persist
//! the subject map as JSON without a parallel record type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The number of units every subject is created with.
pub const DEFAULT_UNIT_COUNT: usize = 6;

/// A named subdivision of a subject's syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub title: String,
}

/// A course subject: unique code, display name, and an ordered unit list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub units: Vec<Unit>,
}

/// One lecture as persisted by the content store.
///
/// Creation order is a backend concern (a timestamp column in Postgres, file
/// order in the append log); it is exposed only through the ordering of
/// `list_lectures` and `first_lecture`.
#[derive(Debug, Clone)]
pub struct Lecture {
    pub lecture_id: String,
    pub subject_code: String,
    pub unit_id: String,
    pub title: String,
    pub html_content: String,
}

/// The sidebar view of a lecture: everything except the HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureSummary {
    pub lecture_id: String,
    pub title: String,
    pub unit_id: String,
}

/// The insert payload produced by the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct NewLecture {
    pub lecture_id: String,
    pub subject_code: String,
    pub unit_id: String,
    pub title: String,
    pub html_content: String,
}

// Represents a user's role as carried in the session token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// The identity decoded from a verified session token.
///
/// Attached to the request for its duration; never persisted.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Builds the six default units a freshly created subject starts with.
pub fn default_units() -> Vec<Unit> {
    (1..=DEFAULT_UNIT_COUNT)
        .map(|n| Unit {
            id: format!("unit{n}"),
            title: format!("Unit {n}"),
        })
        .collect()
}

/// Normalizes a subject code for storage and lookup (uppercase, trimmed).
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Groups lecture summaries under their owning unit, preserving the subject's
/// unit order and the lectures' creation order within each unit.
///
/// Lectures referencing a unit the subject no longer declares are dropped,
/// matching how the sidebar treats them.
pub fn group_by_unit<'a>(
    units: &'a [Unit],
    lectures: &[LectureSummary],
) -> Vec<(&'a Unit, Vec<LectureSummary>)> {
    units
        .iter()
        .map(|unit| {
            let owned = lectures
                .iter()
                .filter(|l| l.unit_id == unit.id)
                .cloned()
                .collect();
            (unit, owned)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_units_are_positional() {
        let units = default_units();
        assert_eq!(units.len(), DEFAULT_UNIT_COUNT);
        assert_eq!(units[0].id, "unit1");
        assert_eq!(units[0].title, "Unit 1");
        assert_eq!(units[5].id, "unit6");
    }

    #[test]
    fn code_normalization_uppercases() {
        assert_eq!(normalize_code("  ma101 "), "MA101");
    }

    #[test]
    fn grouping_places_lectures_under_their_unit() {
        let units = vec![
            Unit { id: "unit1".into(), title: "Unit 1".into() },
            Unit { id: "unit2".into(), title: "Unit 2".into() },
        ];
        let lectures = vec![
            LectureSummary { lecture_id: "limits".into(), title: "Limits".into(), unit_id: "unit1".into() },
            LectureSummary { lecture_id: "sets".into(), title: "Sets".into(), unit_id: "unit2".into() },
            LectureSummary { lecture_id: "continuity".into(), title: "Continuity".into(), unit_id: "unit1".into() },
        ];
        let grouped = group_by_unit(&units, &lectures);
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].1.len(), 1);
        assert_eq!(grouped[0].1[0].lecture_id, "limits");
        assert_eq!(grouped[0].1[1].lecture_id, "continuity");
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.as_str().parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }
}
