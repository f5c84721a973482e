//! Résumé assembly from relational data.
//!
//! Data flows one way: SQLite rows are flattened into attribute records
//! ([`unflatten`]), memoized per entity group ([`cache`]), regrouped and
//! filtered for visibility ([`listutil`]), annotated with glossary terms
//! ([`glossary`]) and typeset by one of the layouts in [`render`].

pub mod cache;
pub mod db;
pub mod glossary;
pub mod latex;
pub mod listutil;
pub mod logging;
pub mod model;
pub mod render;
pub mod unflatten;

pub use cache::{NameKind, NameLookup, ResumeData};
pub use db::{DbError, DbResult, FieldValue, QueryExecutor, RetryPolicy, SqliteExecutor};
pub use glossary::{glossary_inject, RenderMode};
pub use listutil::{
    contact_flatten, count_instances, listify, slim, unique, AttrMap, GroupedRecord,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::{AttributeRecord, EntityGroup, UnknownEntityGroup};
pub use render::{render_resume, Layout, RenderError, RenderResult};
