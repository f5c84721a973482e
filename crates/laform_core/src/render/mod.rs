//! Résumé templates.
//!
//! # Responsibility
//! - Compose cached entity groups into complete LaTeX documents.
//! - Offer two layouts over the same data-access context.
//!
//! # Invariants
//! - A missing or mistyped field aborts the whole render; no partial
//!   document is returned.
//! - Stored free text is emitted as LaTeX source; names used as headings are
//!   escaped.

mod common;
pub mod modern;
pub mod retro;

pub use common::format_phone;

use crate::cache::{NameKind, ResumeData};
use crate::db::{DbError, QueryExecutor};
use crate::glossary::RenderMode;
use crate::latex::Document;
use crate::model::{EntityGroup, EntryError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug)]
pub enum RenderError {
    Db(DbError),
    MissingField {
        group: EntityGroup,
        attr: &'static str,
    },
    InvalidField {
        group: EntityGroup,
        attr: &'static str,
        message: String,
    },
    NameNotFound {
        kind: NameKind,
        id: i64,
    },
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingField { group, attr } => write!(f, "{group} entry is missing `{attr}`"),
            Self::InvalidField {
                group,
                attr,
                message,
            } => write!(f, "{group} entry has invalid `{attr}`: {message}"),
            Self::NameNotFound { kind, id } => write!(f, "no {kind} name for id {id}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RenderError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<EntryError> for RenderError {
    fn from(value: EntryError) -> Self {
        match value {
            EntryError::Missing { group, attr } => Self::MissingField { group, attr },
            EntryError::Invalid {
                group,
                attr,
                message,
            } => Self::InvalidField {
                group,
                attr,
                message,
            },
        }
    }
}

/// Visual layout of the rendered résumé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Modern,
    Retro,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Retro => "retro",
        }
    }

    pub fn mode(self) -> RenderMode {
        match self {
            Self::Modern => RenderMode::Modern,
            Self::Retro => RenderMode::Retro,
        }
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "modern" => Ok(Self::Modern),
            "retro" => Ok(Self::Retro),
            other => Err(format!("unknown layout `{other}`; expected modern|retro")),
        }
    }
}

/// Renders the full résumé in `layout`.
///
/// # Side effects
/// - Fills the cache slots of every group the layout reads.
/// - Emits `render` logging events with duration and status.
pub fn render_resume<E: QueryExecutor>(
    layout: Layout,
    data: &mut ResumeData<E>,
) -> RenderResult<Document> {
    let started_at = Instant::now();
    info!("event=render module=render status=start layout={}", layout);

    let result = match layout {
        Layout::Modern => modern::render(data),
        Layout::Retro => retro::render(data),
    };

    match &result {
        Ok(doc) => info!(
            "event=render module=render status=ok layout={} nodes={} duration_ms={}",
            layout,
            doc.body().len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=render module=render status=error layout={} duration_ms={} error={}",
            layout,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{Layout, RenderError};
    use crate::model::{EntityGroup, EntryError};

    #[test]
    fn layout_parses_case_insensitively() {
        assert_eq!(" Retro ".parse::<Layout>(), Ok(Layout::Retro));
        assert!("fancy".parse::<Layout>().is_err());
    }

    #[test]
    fn entry_errors_map_to_field_errors() {
        let err = RenderError::from(EntryError::Missing {
            group: EntityGroup::Skills,
            attr: "category",
        });
        assert_eq!(err.to_string(), "skills entry is missing `category`");
    }
}
