//! Per-run data-access context: memoized entity groups plus name lookup.
//!
//! # Responsibility
//! - Query each entity group at most once per run until purged.
//! - Resolve employer/position ids to display names.
//!
//! # Invariants
//! - A failed fetch leaves its slot empty so the next read re-queries.
//! - Purging one group never touches another group's slot.
//! - Single owner; the context is passed explicitly to each render pass.

use crate::db::{DbResult, FieldValue, QueryExecutor};
use crate::model::{AttributeRecord, EntityGroup, UnknownEntityGroup};
use crate::unflatten::unflatten;
use log::{debug, info};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Entity kinds whose ids the templates render by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Employer,
    Position,
}

impl NameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employer => "employer",
            Self::Position => "position",
        }
    }

    /// Single-column query resolving an id of this kind to its name.
    pub fn lookup_sql(self) -> &'static str {
        match self {
            Self::Employer => "SELECT employer FROM employers WHERE id = ?1",
            Self::Position => "SELECT position FROM positions WHERE id = ?1",
        }
    }
}

impl Display for NameKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves an entity id to its display name.
pub trait NameLookup {
    /// Returns `Ok(None)` when no entity of `kind` has this id.
    fn display_name(&self, id: i64, kind: NameKind) -> DbResult<Option<String>>;
}

/// Memoized result holder over one query executor.
pub struct ResumeData<E: QueryExecutor> {
    executor: E,
    slots: [Option<Rc<[AttributeRecord]>>; 8],
}

impl<E: QueryExecutor> ResumeData<E> {
    /// Creates a context with every group slot empty.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            slots: Default::default(),
        }
    }

    /// Returns the records for `group`, querying only when the slot is empty.
    pub fn fetch(&mut self, group: EntityGroup) -> DbResult<Rc<[AttributeRecord]>> {
        let slot = &mut self.slots[group.index()];
        if let Some(records) = slot {
            return Ok(Rc::clone(records));
        }

        let records: Rc<[AttributeRecord]> = unflatten(&self.executor, group)?.into();
        *slot = Some(Rc::clone(&records));
        Ok(records)
    }

    /// Clears exactly one group slot.
    pub fn purge(&mut self, group: EntityGroup) {
        debug!("event=cache_purge module=cache status=ok group={}", group);
        self.slots[group.index()] = None;
    }

    /// Clears the slot named `name`.
    ///
    /// Unknown names are rejected instead of falling back to a full reset.
    pub fn purge_named(&mut self, name: &str) -> Result<(), UnknownEntityGroup> {
        let group = name.parse::<EntityGroup>()?;
        self.purge(group);
        Ok(())
    }

    /// Clears every slot and optionally re-acquires the connection.
    pub fn reset(&mut self, reconnect: bool) -> DbResult<()> {
        self.slots = Default::default();
        info!(
            "event=cache_reset module=cache status=ok reconnect={}",
            reconnect
        );
        if reconnect {
            self.executor.reconnect()?;
        }
        Ok(())
    }

    /// Whether `group` currently holds a cached result.
    pub fn is_cached(&self, group: EntityGroup) -> bool {
        self.slots[group.index()].is_some()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: QueryExecutor> NameLookup for ResumeData<E> {
    fn display_name(&self, id: i64, kind: NameKind) -> DbResult<Option<String>> {
        let rows = self
            .executor
            .query(kind.lookup_sql(), &[FieldValue::Integer(id)])?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .and_then(|cell| match cell {
                FieldValue::Text(name) => Some(name),
                _ => None,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::{NameKind, NameLookup, ResumeData};
    use crate::db::{DbError, DbResult, FieldValue, QueryExecutor};
    use crate::model::EntityGroup;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct CountingStore {
        queries: RefCell<Vec<String>>,
        fail_next: Cell<bool>,
        reconnects: Cell<u32>,
    }

    impl CountingStore {
        fn count_matching(&self, fragment: &str) -> usize {
            self.queries
                .borrow()
                .iter()
                .filter(|sql| sql.contains(fragment))
                .count()
        }
    }

    impl QueryExecutor for CountingStore {
        fn query(&self, sql: &str, params: &[FieldValue]) -> DbResult<Vec<Vec<FieldValue>>> {
            self.queries.borrow_mut().push(sql.to_string());
            if self.fail_next.replace(false) {
                return Err(DbError::InvalidData("transient outage".to_string()));
            }
            if sql.contains("FROM employers WHERE id") {
                return Ok(match params.first() {
                    Some(FieldValue::Integer(1)) => vec![vec![FieldValue::from("Acme")]],
                    _ => Vec::new(),
                });
            }
            if sql.contains("FROM summary") {
                return Ok(vec![vec![
                    FieldValue::from(1),
                    FieldValue::from("Lead"),
                    FieldValue::from("Led teams"),
                    FieldValue::from(1),
                ]]);
            }
            Ok(Vec::new())
        }

        fn reconnect(&mut self) -> DbResult<()> {
            self.reconnects.set(self.reconnects.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn repeated_fetch_issues_a_single_query() {
        let mut data = ResumeData::new(CountingStore::default());

        let first = data.fetch(EntityGroup::Summary).expect("stub fetch should succeed");
        let second = data.fetch(EntityGroup::Summary).expect("stub fetch should succeed");

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(data.executor().count_matching("FROM summary"), 1);
    }

    #[test]
    fn empty_results_are_cached_too() {
        let mut data = ResumeData::new(CountingStore::default());

        assert!(data.fetch(EntityGroup::Glossary).expect("stub fetch should succeed").is_empty());
        assert!(data.fetch(EntityGroup::Glossary).expect("stub fetch should succeed").is_empty());
        assert_eq!(data.executor().count_matching("FROM glossary"), 1);
    }

    #[test]
    fn purging_one_group_keeps_the_others() {
        let mut data = ResumeData::new(CountingStore::default());
        data.fetch(EntityGroup::Summary).expect("stub fetch should succeed");
        data.fetch(EntityGroup::Glossary).expect("stub fetch should succeed");

        data.purge(EntityGroup::Summary);

        assert!(!data.is_cached(EntityGroup::Summary));
        assert!(data.is_cached(EntityGroup::Glossary));
        data.fetch(EntityGroup::Summary).expect("stub fetch should succeed");
        assert_eq!(data.executor().count_matching("FROM summary"), 2);
        assert_eq!(data.executor().count_matching("FROM glossary"), 1);
    }

    #[test]
    fn reset_clears_every_group() {
        let mut data = ResumeData::new(CountingStore::default());
        for group in EntityGroup::ALL {
            data.fetch(group).expect("stub fetch should succeed");
        }

        data.reset(false).expect("reset should succeed");

        assert!(EntityGroup::ALL.iter().all(|group| !data.is_cached(*group)));
        assert_eq!(data.executor().reconnects.get(), 0);
    }

    #[test]
    fn reset_can_reconnect() {
        let mut data = ResumeData::new(CountingStore::default());
        data.reset(true).expect("reconnecting reset should succeed");
        assert_eq!(data.executor().reconnects.get(), 1);
    }

    #[test]
    fn unknown_group_name_is_rejected_without_clearing() {
        let mut data = ResumeData::new(CountingStore::default());
        data.fetch(EntityGroup::Summary).expect("stub fetch should succeed");

        let err = data
            .purge_named("everything")
            .expect_err("unknown group should be rejected");

        assert_eq!(err.to_string(), "unknown entity group `everything`");
        assert!(data.is_cached(EntityGroup::Summary));
        data.purge_named("summary").expect("known group should purge");
        assert!(!data.is_cached(EntityGroup::Summary));
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let store = CountingStore::default();
        store.fail_next.set(true);
        let mut data = ResumeData::new(store);

        assert!(data.fetch(EntityGroup::Summary).is_err());
        assert!(!data.is_cached(EntityGroup::Summary));
        assert_eq!(data.fetch(EntityGroup::Summary).expect("stub fetch should succeed").len(), 2);
        assert_eq!(data.executor().count_matching("FROM summary"), 2);
    }

    #[test]
    fn display_name_resolves_known_ids_only() {
        let data = ResumeData::new(CountingStore::default());

        assert_eq!(
            data.display_name(1, NameKind::Employer).expect("lookup should succeed"),
            Some("Acme".to_string())
        );
        assert_eq!(data.display_name(2, NameKind::Employer).expect("lookup should succeed"), None);
    }
}
