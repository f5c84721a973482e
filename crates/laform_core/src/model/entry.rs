//! Typed per-group views over slimmed attribute maps.
//!
//! Templates read these instead of raw maps, so a missing or mistyped field
//! is reported once, with its group and attribute name.

use super::record::EntityGroup;
use crate::db::FieldValue;
use crate::listutil::{AttrMap, ContactField};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level failure while building a typed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    Missing {
        group: EntityGroup,
        attr: &'static str,
    },
    Invalid {
        group: EntityGroup,
        attr: &'static str,
        message: String,
    },
}

impl Display for EntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { group, attr } => write!(f, "{group} entry is missing `{attr}`"),
            Self::Invalid {
                group,
                attr,
                message,
            } => write!(f, "{group} entry has invalid `{attr}`: {message}"),
        }
    }
}

impl Error for EntryError {}

pub type EntryResult<T> = Result<T, EntryError>;

/// Conversion from one visible entity's attribute map.
pub trait FromAttrMap: Sized {
    const GROUP: EntityGroup;

    fn from_map(map: &AttrMap) -> EntryResult<Self>;
}

/// Converts every map, failing on the first incomplete entity.
pub fn entries<T: FromAttrMap>(maps: &[AttrMap]) -> EntryResult<Vec<T>> {
    maps.iter().map(T::from_map).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub shortdesc: String,
    pub longdesc: String,
}

impl FromAttrMap for SummaryEntry {
    const GROUP: EntityGroup = EntityGroup::Summary;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            shortdesc: text(map, Self::GROUP, "shortdesc")?,
            longdesc: text(map, Self::GROUP, "longdesc")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEntry {
    pub category: String,
    pub subcategory: String,
    /// Title of the position the skill was exercised in.
    pub position: String,
    pub shortdesc: String,
    pub longdesc: String,
}

impl FromAttrMap for SkillEntry {
    const GROUP: EntityGroup = EntityGroup::Skills;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            category: text(map, Self::GROUP, "category")?,
            subcategory: text(map, Self::GROUP, "subcategory")?,
            position: text(map, Self::GROUP, "position")?,
            shortdesc: text(map, Self::GROUP, "shortdesc")?,
            longdesc: text(map, Self::GROUP, "longdesc")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionEntry {
    pub employer: i64,
    pub position: i64,
    pub startdate: NaiveDate,
    /// `None` while the position is held.
    pub enddate: Option<NaiveDate>,
}

impl FromAttrMap for PositionEntry {
    const GROUP: EntityGroup = EntityGroup::Positions;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            employer: integer(map, Self::GROUP, "employer")?,
            position: integer(map, Self::GROUP, "position")?,
            startdate: date(map, Self::GROUP, "startdate")?,
            enddate: optional_date(map, Self::GROUP, "enddate")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementEntry {
    pub employer: i64,
    pub position: i64,
    pub shortdesc: String,
    pub longdesc: String,
}

impl FromAttrMap for AchievementEntry {
    const GROUP: EntityGroup = EntityGroup::Achievements;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            employer: integer(map, Self::GROUP, "employer")?,
            position: integer(map, Self::GROUP, "position")?,
            shortdesc: text(map, Self::GROUP, "shortdesc")?,
            longdesc: text(map, Self::GROUP, "longdesc")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EducationEntry {
    pub school: String,
    pub focus: String,
    pub startdate: NaiveDate,
    pub enddate: Option<NaiveDate>,
}

impl FromAttrMap for EducationEntry {
    const GROUP: EntityGroup = EntityGroup::Education;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            school: text(map, Self::GROUP, "school")?,
            focus: text(map, Self::GROUP, "focus")?,
            startdate: date(map, Self::GROUP, "startdate")?,
            enddate: optional_date(map, Self::GROUP, "enddate")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationEntry {
    pub certification: String,
    pub year: i64,
}

impl FromAttrMap for CertificationEntry {
    const GROUP: EntityGroup = EntityGroup::Certifications;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            certification: text(map, Self::GROUP, "certification")?,
            year: integer(map, Self::GROUP, "year")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub url: Option<String>,
    pub description: String,
}

impl FromAttrMap for GlossaryEntry {
    const GROUP: EntityGroup = EntityGroup::Glossary;

    fn from_map(map: &AttrMap) -> EntryResult<Self> {
        Ok(Self {
            term: text(map, Self::GROUP, "term")?,
            url: optional_text(map, Self::GROUP, "url")?,
            description: text(map, Self::GROUP, "description")?,
        })
    }
}

/// Contact value with its own visibility flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactValue {
    pub value: String,
    pub state: bool,
}

impl ContactValue {
    /// The value when it may be printed.
    pub fn visible(&self) -> Option<&str> {
        self.state.then_some(self.value.as_str())
    }
}

/// Identification fields needed by the contact headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub name: ContactValue,
    pub phone: ContactValue,
    pub email: ContactValue,
    pub www: ContactValue,
    pub location: ContactValue,
}

impl ContactCard {
    pub fn from_fields(fields: &BTreeMap<String, ContactField>) -> EntryResult<Self> {
        Ok(Self {
            name: contact_value(fields, "name")?,
            phone: contact_value(fields, "phone")?,
            email: contact_value(fields, "email")?,
            www: contact_value(fields, "www")?,
            location: contact_value(fields, "location")?,
        })
    }
}

fn contact_value(
    fields: &BTreeMap<String, ContactField>,
    attr: &'static str,
) -> EntryResult<ContactValue> {
    let field = fields.get(attr).ok_or(EntryError::Missing {
        group: EntityGroup::Identification,
        attr,
    })?;
    if !field.state {
        return Ok(ContactValue {
            value: String::new(),
            state: false,
        });
    }
    let value = match &field.value {
        FieldValue::Text(value) => value.clone(),
        FieldValue::Integer(value) => value.to_string(),
        other => {
            return Err(EntryError::Invalid {
                group: EntityGroup::Identification,
                attr,
                message: format!("expected text, found {}", other.kind()),
            })
        }
    };
    Ok(ContactValue { value, state: true })
}

fn required<'a>(
    map: &'a AttrMap,
    group: EntityGroup,
    attr: &'static str,
) -> EntryResult<&'a FieldValue> {
    map.get(attr).ok_or(EntryError::Missing { group, attr })
}

fn invalid(
    group: EntityGroup,
    attr: &'static str,
    expected: &str,
    found: &FieldValue,
) -> EntryError {
    EntryError::Invalid {
        group,
        attr,
        message: format!("expected {expected}, found {}", found.kind()),
    }
}

fn text(map: &AttrMap, group: EntityGroup, attr: &'static str) -> EntryResult<String> {
    let value = required(map, group, attr)?;
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| invalid(group, attr, "text", value))
}

fn optional_text(
    map: &AttrMap,
    group: EntityGroup,
    attr: &'static str,
) -> EntryResult<Option<String>> {
    match required(map, group, attr)? {
        FieldValue::Null => Ok(None),
        FieldValue::Text(value) => Ok(Some(value.clone())),
        other => Err(invalid(group, attr, "text or null", other)),
    }
}

fn integer(map: &AttrMap, group: EntityGroup, attr: &'static str) -> EntryResult<i64> {
    let value = required(map, group, attr)?;
    value
        .as_integer()
        .ok_or_else(|| invalid(group, attr, "integer", value))
}

fn date(map: &AttrMap, group: EntityGroup, attr: &'static str) -> EntryResult<NaiveDate> {
    let value = required(map, group, attr)?;
    value
        .as_date()
        .ok_or_else(|| invalid(group, attr, "date", value))
}

fn optional_date(
    map: &AttrMap,
    group: EntityGroup,
    attr: &'static str,
) -> EntryResult<Option<NaiveDate>> {
    match required(map, group, attr)? {
        FieldValue::Null => Ok(None),
        FieldValue::Date(value) => Ok(Some(*value)),
        other => Err(invalid(group, attr, "date or null", other)),
    }
}
