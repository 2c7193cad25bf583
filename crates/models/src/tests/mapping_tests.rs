use std::collections::BTreeSet;

use sea_orm::{entity::prelude::*, Iterable};

use crate::coverage::{self, Column, CoverageFields, Model, FIELDS};

#[test]
fn field_table_matches_entity_columns() {
    for def in FIELDS.iter() {
        assert_eq!(def.column.as_str(), def.column_name, "column for {}", def.name);
    }
    // every entity column except the key is listed exactly once
    let entity_columns: BTreeSet<String> = Column::iter()
        .filter(|c| !matches!(c, Column::Cid))
        .map(|c| c.as_str().to_string())
        .collect();
    let table_columns: BTreeSet<String> =
        FIELDS.iter().map(|f| f.column_name.to_string()).collect();
    assert_eq!(entity_columns, table_columns);
    assert_eq!(table_columns.len(), FIELDS.len());
}

#[test]
fn physical_names_follow_manager_suffix_convention() {
    assert_eq!(coverage::field("shortname").unwrap().column_name, "PARTNAME");
    assert_eq!(coverage::field("crosstpsm").unwrap().column_name, "CROSSTPSMGR");
    assert_eq!(Column::Cid.as_str(), "CID");
    for def in FIELDS.iter() {
        assert_eq!(
            def.name.ends_with('m'),
            def.column_name.ends_with("MGR"),
            "{} -> {}",
            def.name,
            def.column_name
        );
    }
}

#[test]
fn public_names_match_serialized_model() {
    let model: Model = serde_json::from_value(sample_json()).unwrap();
    let value = serde_json::to_value(&model).unwrap();
    let keys: BTreeSet<String> = value.as_object().unwrap().keys().cloned().collect();
    let mut expected: BTreeSet<String> = FIELDS.iter().map(|f| f.name.to_string()).collect();
    expected.insert("cid".into());
    assert_eq!(keys, expected);
}

fn sample_json() -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("cid".into(), 0.into());
    for def in FIELDS.iter() {
        map.insert(def.name.into(), serde_json::Value::Null);
    }
    serde_json::Value::Object(map)
}

#[test]
fn unknown_field_names_are_rejected() {
    assert!(CoverageFields::new().with("cid", "1").is_err());
    assert!(CoverageFields::new().with("nope", "x").is_err());
    let fields = CoverageFields::new().with("gbg", "G1").unwrap();
    assert_eq!(fields.get("gbg"), Some("G1"));
    assert_eq!(fields.len(), 1);
}

#[test]
fn missing_lists_unset_fields_in_order() {
    let fields = CoverageFields::uniform("x");
    assert!(fields.missing().is_empty());
    let partial = CoverageFields::new().with("shortname", "a").unwrap();
    let missing = partial.missing();
    assert_eq!(missing.len(), FIELDS.len() - 1);
    assert_eq!(missing[0], "gbg");
}

#[test]
fn sample_rows_are_sample_and_demonstration() {
    let rows = coverage::sample_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("gbg"), Some("Sample"));
    assert_eq!(rows[1].get("shortname"), Some("Demonstration"));
    assert_eq!(rows[1].get("csmcloud"), Some("Demonstration"));
}
