//! Row unflattener: one fixed query per entity group, one record per field.
//!
//! # Responsibility
//! - Own the read query for every entity group.
//! - Type raw cells (dates, visibility flags) before they leave storage.
//! - Emit one [`AttributeRecord`] per named scalar column of every row.
//!
//! # Invariants
//! - Record order follows row order, then column order.
//! - Joined groups tag every record of a row with the child row's id and
//!   state; the child is the finer visibility unit.
//! - Failures are logged here and returned unchanged.

use crate::db::{DbError, DbResult, FieldValue, QueryExecutor};
use crate::model::{AttributeRecord, EntityGroup};
use chrono::NaiveDate;
use log::{debug, error};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Integer,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    /// Entity id the row's records are grouped under.
    Id,
    /// Visibility flag of the entity named by `Id`.
    State,
    /// Attribute name stored as data (identification rows).
    AttrName,
    /// Attribute value paired with `AttrName`.
    AttrValue,
    Field(&'static str, FieldKind),
}

/// Read query and column layout for one entity group.
#[derive(Debug, Clone, Copy)]
pub struct GroupQuery {
    pub sql: &'static str,
    columns: &'static [Column],
}

const IDENTIFICATION: GroupQuery = GroupQuery {
    sql: "SELECT id, attr, value, state
          FROM identification
          ORDER BY id ASC",
    columns: &[Column::Id, Column::AttrName, Column::AttrValue, Column::State],
};

const SUMMARY: GroupQuery = GroupQuery {
    sql: "SELECT id, shortdesc, longdesc, state
          FROM summary
          ORDER BY summaryorder ASC",
    columns: &[
        Column::Id,
        Column::Field("shortdesc", FieldKind::Text),
        Column::Field("longdesc", FieldKind::Text),
        Column::State,
    ],
};

const SKILLS: GroupQuery = GroupQuery {
    sql: "SELECT s.id, s.category, s.subcategory, p.position, s.shortdesc, s.longdesc, s.state
          FROM skills AS s
          JOIN positions AS p ON p.id = s.position
          ORDER BY s.categoryorder ASC, s.skillorder ASC",
    columns: &[
        Column::Id,
        Column::Field("category", FieldKind::Text),
        Column::Field("subcategory", FieldKind::Text),
        Column::Field("position", FieldKind::Text),
        Column::Field("shortdesc", FieldKind::Text),
        Column::Field("longdesc", FieldKind::Text),
        Column::State,
    ],
};

const GLOSSARY: GroupQuery = GroupQuery {
    sql: "SELECT id, term, url, description, state
          FROM glossary
          ORDER BY term ASC",
    columns: &[
        Column::Id,
        Column::Field("term", FieldKind::Text),
        Column::Field("url", FieldKind::Text),
        Column::Field("description", FieldKind::Text),
        Column::State,
    ],
};

const POSITIONS: GroupQuery = GroupQuery {
    sql: "SELECT p.id, e.id, p.id, p.startdate, p.enddate, p.state
          FROM employers AS e
          JOIN positions AS p ON e.id = p.employer
          ORDER BY p.startdate DESC",
    columns: &[
        Column::Id,
        Column::Field("employer", FieldKind::Integer),
        Column::Field("position", FieldKind::Integer),
        Column::Field("startdate", FieldKind::Date),
        Column::Field("enddate", FieldKind::Date),
        Column::State,
    ],
};

const ACHIEVEMENTS: GroupQuery = GroupQuery {
    sql: "SELECT a.id, e.id, p.id, a.shortdesc, a.longdesc, a.state
          FROM achievements AS a
          JOIN positions AS p ON a.position = p.id AND a.employer = p.employer
          JOIN employers AS e ON a.employer = e.id
          ORDER BY p.startdate DESC, a.id ASC",
    columns: &[
        Column::Id,
        Column::Field("employer", FieldKind::Integer),
        Column::Field("position", FieldKind::Integer),
        Column::Field("shortdesc", FieldKind::Text),
        Column::Field("longdesc", FieldKind::Text),
        Column::State,
    ],
};

const EDUCATION: GroupQuery = GroupQuery {
    sql: "SELECT f.id, s.school, f.focus, f.startdate, f.enddate, f.state
          FROM schools AS s
          JOIN focus AS f ON s.id = f.school
          ORDER BY f.startdate DESC",
    columns: &[
        Column::Id,
        Column::Field("school", FieldKind::Text),
        Column::Field("focus", FieldKind::Text),
        Column::Field("startdate", FieldKind::Date),
        Column::Field("enddate", FieldKind::Date),
        Column::State,
    ],
};

const CERTIFICATIONS: GroupQuery = GroupQuery {
    sql: "SELECT id, certification, year, state
          FROM certifications
          ORDER BY id ASC",
    columns: &[
        Column::Id,
        Column::Field("certification", FieldKind::Text),
        Column::Field("year", FieldKind::Integer),
        Column::State,
    ],
};

/// Returns the fixed read query for `group`.
pub fn group_query(group: EntityGroup) -> &'static GroupQuery {
    match group {
        EntityGroup::Identification => &IDENTIFICATION,
        EntityGroup::Summary => &SUMMARY,
        EntityGroup::Skills => &SKILLS,
        EntityGroup::Glossary => &GLOSSARY,
        EntityGroup::Positions => &POSITIONS,
        EntityGroup::Achievements => &ACHIEVEMENTS,
        EntityGroup::Education => &EDUCATION,
        EntityGroup::Certifications => &CERTIFICATIONS,
    }
}

/// Queries one entity group and flattens its rows into attribute records.
pub fn unflatten<E: QueryExecutor + ?Sized>(
    executor: &E,
    group: EntityGroup,
) -> DbResult<Vec<AttributeRecord>> {
    let started_at = Instant::now();
    let query = group_query(group);

    let result = executor
        .query(query.sql, &[])
        .and_then(|rows| flatten_rows(query, rows));

    match result {
        Ok(records) => {
            debug!(
                "event=group_fetch module=unflatten status=ok group={} records={} duration_ms={}",
                group,
                records.len(),
                started_at.elapsed().as_millis()
            );
            Ok(records)
        }
        Err(err) => {
            error!(
                "event=group_fetch module=unflatten status=error group={} duration_ms={} error={}",
                group,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn flatten_rows(
    query: &GroupQuery,
    rows: Vec<Vec<FieldValue>>,
) -> DbResult<Vec<AttributeRecord>> {
    let mut records = Vec::new();
    for row in rows {
        if row.len() != query.columns.len() {
            return Err(DbError::InvalidData(format!(
                "expected {} columns, got {}",
                query.columns.len(),
                row.len()
            )));
        }
        records.extend(flatten_row(query.columns, row)?);
    }
    Ok(records)
}

fn flatten_row(columns: &[Column], row: Vec<FieldValue>) -> DbResult<Vec<AttributeRecord>> {
    let mut id = None;
    let mut state = None;
    let mut dynamic_name = None;
    let mut fields = Vec::new();

    for (column, cell) in columns.iter().zip(row) {
        match column {
            Column::Id => id = Some(parse_id(cell)?),
            Column::State => state = Some(parse_state(cell)?),
            Column::AttrName => match cell {
                FieldValue::Text(name) => dynamic_name = Some(name),
                other => {
                    return Err(DbError::InvalidData(format!(
                        "attribute name must be text, found {}",
                        other.kind()
                    )))
                }
            },
            Column::AttrValue => fields.push((None, cell)),
            Column::Field(name, kind) => fields.push((Some(*name), type_cell(name, *kind, cell)?)),
        }
    }

    let id = id.ok_or_else(|| DbError::InvalidData("row has no id column".to_string()))?;
    let state = state.ok_or_else(|| DbError::InvalidData("row has no state column".to_string()))?;

    fields
        .into_iter()
        .map(|(name, value)| -> DbResult<AttributeRecord> {
            let attr = match name {
                Some(name) => name.to_string(),
                None => dynamic_name.clone().ok_or_else(|| {
                    DbError::InvalidData("row has a value but no attribute name".to_string())
                })?,
            };
            Ok(AttributeRecord {
                id,
                attr,
                value,
                state,
            })
        })
        .collect()
}

fn parse_id(cell: FieldValue) -> DbResult<i64> {
    cell.as_integer().ok_or_else(|| {
        DbError::InvalidData(format!("id must be an integer, found {}", cell.kind()))
    })
}

fn parse_state(cell: FieldValue) -> DbResult<bool> {
    match cell {
        FieldValue::Integer(0) => Ok(false),
        FieldValue::Integer(_) => Ok(true),
        other => Err(DbError::InvalidData(format!(
            "state must be an integer flag, found {}",
            other.kind()
        ))),
    }
}

fn type_cell(name: &str, kind: FieldKind, cell: FieldValue) -> DbResult<FieldValue> {
    match (kind, cell) {
        (_, FieldValue::Null) => Ok(FieldValue::Null),
        (FieldKind::Text, FieldValue::Text(value)) => Ok(FieldValue::Text(value)),
        (FieldKind::Integer, FieldValue::Integer(value)) => Ok(FieldValue::Integer(value)),
        (FieldKind::Date, FieldValue::Text(value)) => {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|err| {
                    DbError::InvalidData(format!("`{name}` value `{value}` is not a date: {err}"))
                })
        }
        (FieldKind::Date, FieldValue::Date(value)) => Ok(FieldValue::Date(value)),
        (_, other) => Err(DbError::InvalidData(format!(
            "`{name}` has unexpected {} value",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{group_query, unflatten};
    use crate::db::{DbError, DbResult, FieldValue, QueryExecutor};
    use crate::model::{AttributeRecord, EntityGroup};
    use chrono::NaiveDate;

    struct FixedRows(Vec<Vec<FieldValue>>);

    impl QueryExecutor for FixedRows {
        fn query(&self, _sql: &str, _params: &[FieldValue]) -> DbResult<Vec<Vec<FieldValue>>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl QueryExecutor for Failing {
        fn query(&self, _sql: &str, _params: &[FieldValue]) -> DbResult<Vec<Vec<FieldValue>>> {
            Err(DbError::InvalidData("store unavailable".to_string()))
        }
    }

    #[test]
    fn summary_rows_become_one_record_per_field() {
        let executor = FixedRows(vec![vec![
            FieldValue::from(4),
            FieldValue::from("Lead"),
            FieldValue::from("Led teams"),
            FieldValue::from(1),
        ]]);

        let records =
            unflatten(&executor, EntityGroup::Summary).expect("summary row should flatten");
        assert_eq!(
            records,
            vec![
                AttributeRecord::new(4, "shortdesc", "Lead", true),
                AttributeRecord::new(4, "longdesc", "Led teams", true),
            ]
        );
    }

    #[test]
    fn identification_uses_stored_attribute_names() {
        let executor = FixedRows(vec![vec![
            FieldValue::from(1),
            FieldValue::from("email"),
            FieldValue::from("ada@example.com"),
            FieldValue::from(0),
        ]]);

        let records = unflatten(&executor, EntityGroup::Identification)
            .expect("identification row should flatten");
        assert_eq!(
            records,
            vec![AttributeRecord::new(1, "email", "ada@example.com", false)]
        );
    }

    #[test]
    fn date_columns_are_parsed_and_null_end_dates_kept() {
        let executor = FixedRows(vec![vec![
            FieldValue::from(9),
            FieldValue::from(1),
            FieldValue::from(9),
            FieldValue::from("2020-01-01"),
            FieldValue::Null,
            FieldValue::from(1),
        ]]);

        let records =
            unflatten(&executor, EntityGroup::Positions).expect("position row should flatten");
        assert_eq!(records.len(), 4);
        assert_eq!(
            records[2].value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"))
        );
        assert_eq!(records[3].value, FieldValue::Null);
        assert!(records.iter().all(|record| record.id == 9));
    }

    #[test]
    fn malformed_dates_are_invalid_data() {
        let executor = FixedRows(vec![vec![
            FieldValue::from(1),
            FieldValue::from("MIT"),
            FieldValue::from("CS"),
            FieldValue::from("last spring"),
            FieldValue::Null,
            FieldValue::from(1),
        ]]);

        let err = unflatten(&executor, EntityGroup::Education).expect_err("bad date should fail");
        assert!(matches!(err, DbError::InvalidData(_)));
    }

    #[test]
    fn wrong_arity_is_invalid_data() {
        let executor = FixedRows(vec![vec![FieldValue::from(1)]]);

        let err = unflatten(&executor, EntityGroup::Glossary).expect_err("short row should fail");
        assert!(matches!(err, DbError::InvalidData(_)));
    }

    #[test]
    fn store_errors_are_returned_to_the_caller() {
        let err = unflatten(&Failing, EntityGroup::Skills).expect_err("store error should surface");
        assert_eq!(err.to_string(), "invalid stored data: store unavailable");
    }

    #[test]
    fn temporal_groups_order_by_start_date_descending() {
        assert!(group_query(EntityGroup::Positions)
            .sql
            .contains("ORDER BY p.startdate DESC"));
        assert!(group_query(EntityGroup::Education)
            .sql
            .contains("ORDER BY f.startdate DESC"));
    }
}
