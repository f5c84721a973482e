//! Entity groups and the flat attribute record they are carried in.
//!
//! # Invariants
//! - Records sharing an `id` within one group describe one entity and carry
//!   the same `state`.
//! - Records are never mutated after unflattening; derived views copy.

use crate::db::FieldValue;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One logical résumé section backed by one or more tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityGroup {
    Identification,
    Summary,
    Skills,
    Glossary,
    Positions,
    Achievements,
    Education,
    Certifications,
}

impl EntityGroup {
    pub const ALL: [EntityGroup; 8] = [
        EntityGroup::Identification,
        EntityGroup::Summary,
        EntityGroup::Skills,
        EntityGroup::Glossary,
        EntityGroup::Positions,
        EntityGroup::Achievements,
        EntityGroup::Education,
        EntityGroup::Certifications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identification => "identification",
            Self::Summary => "summary",
            Self::Skills => "skills",
            Self::Glossary => "glossary",
            Self::Positions => "positions",
            Self::Achievements => "achievements",
            Self::Education => "education",
            Self::Certifications => "certifications",
        }
    }

    /// Stable slot index used by the result cache.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Identification => 0,
            Self::Summary => 1,
            Self::Skills => 2,
            Self::Glossary => 3,
            Self::Positions => 4,
            Self::Achievements => 5,
            Self::Education => 6,
            Self::Certifications => 7,
        }
    }
}

impl Display for EntityGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a group name matches none of the known entity groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityGroup(pub String);

impl Display for UnknownEntityGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown entity group `{}`", self.0)
    }
}

impl Error for UnknownEntityGroup {}

impl FromStr for EntityGroup {
    type Err = UnknownEntityGroup;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == value)
            .ok_or_else(|| UnknownEntityGroup(value.to_string()))
    }
}

/// One scalar field of one stored entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRecord {
    pub id: i64,
    pub attr: String,
    pub value: FieldValue,
    /// `false` keeps the entity in storage but out of the document.
    pub state: bool,
}

impl AttributeRecord {
    pub fn new(
        id: i64,
        attr: impl Into<String>,
        value: impl Into<FieldValue>,
        state: bool,
    ) -> Self {
        Self {
            id,
            attr: attr.into(),
            value: value.into(),
            state,
        }
    }
}
