mod common;

use common::sample_data;
use laform_core::model::{entries, PositionEntry};
use laform_core::{slim, EntityGroup};
use serde_json::json;

#[test]
fn slimmed_positions_serialize_with_plain_values() {
    let mut data = sample_data();
    let records = data.fetch(EntityGroup::Positions).expect("fetch should succeed");

    let value = serde_json::to_value(slim(&records)).expect("value should serialize");

    assert_eq!(
        value,
        json!([
            { "employer": 1, "position": 1, "startdate": "2020-01-01", "enddate": null },
            { "employer": 2, "position": 2, "startdate": "2018-06-01", "enddate": "2019-08-31" }
        ])
    );
}

#[test]
fn typed_entries_serialize_with_optional_end_dates() {
    let mut data = sample_data();
    let records = data.fetch(EntityGroup::Positions).expect("fetch should succeed");
    let positions: Vec<PositionEntry> =
        entries(&slim(&records)).expect("visible entries should be complete");

    let value = serde_json::to_value(&positions[0]).expect("value should serialize");

    assert_eq!(value["startdate"], json!("2020-01-01"));
    assert_eq!(value["enddate"], json!(null));
}

#[test]
fn entity_groups_serialize_as_snake_case_names() {
    assert_eq!(
        serde_json::to_value(EntityGroup::Certifications).expect("value should serialize"),
        json!("certifications")
    );
    let all = serde_json::to_value(EntityGroup::ALL).expect("groups should serialize");
    assert_eq!(all.as_array().map(Vec::len), Some(8));
}
