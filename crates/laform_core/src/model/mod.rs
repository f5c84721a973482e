//! Résumé data model.
//!
//! # Responsibility
//! - Name the entity groups a résumé is assembled from.
//! - Define the flat attribute record every group is carried in.
//! - Provide typed entries that templates read instead of raw maps.
//!
//! # Invariants
//! - Visibility is a flag on stored data; nothing is deleted at render time.

pub mod entry;
pub mod record;

pub use entry::{
    entries, AchievementEntry, CertificationEntry, ContactCard, ContactValue, EducationEntry,
    EntryError, EntryResult, FromAttrMap, GlossaryEntry, PositionEntry, SkillEntry, SummaryEntry,
};
pub use record::{AttributeRecord, EntityGroup, UnknownEntityGroup};
