//! Integration tests for tables over both index types.

use tabledb::index::ExtHashMap;
use tabledb::{CompositeKey, Domain, Error, KeyIndex, Row, Table, Value};

fn students<I: KeyIndex<CompositeKey, Row> + Default>() -> Table<I> {
    let mut t = Table::new("A", &["id", "name"], &[Domain::Int, Domain::Text], &["id"]).unwrap();
    for (id, name) in [(1, "Ann"), (2, "Bob"), (3, "Cy")] {
        assert!(t.insert(vec![id.into(), name.into()]));
    }
    t
}

fn grades<I: KeyIndex<CompositeKey, Row> + Default>() -> Table<I> {
    let mut t = Table::new("B", &["studId", "grade"], &[Domain::Int, Domain::Text], &["studId"]).unwrap();
    for (id, grade) in [(1, "A"), (3, "C"), (4, "B")] {
        assert!(t.insert(vec![id.into(), grade.into()]));
    }
    t
}

fn check_join<I: KeyIndex<CompositeKey, Row> + Default>() {
    let a: Table<I> = students();
    let b: Table<I> = grades();

    let joined = a.join(&["id"], &["studId"], &b).unwrap();

    assert_eq!(joined.schema().attributes(), &["id", "name", "grade"]);
    assert_eq!(joined.schema().key_names(), vec!["id"]);
    assert_eq!(joined.len(), 2);

    let ann = joined.select_key(&CompositeKey::from(Value::from(1)));
    assert_eq!(ann.rows()[0].to_vec(), vec![Value::from(1), Value::from("Ann"), Value::from("A")]);
    assert!(joined.select_key(&CompositeKey::from(Value::from(2))).is_empty());
}

#[test]
fn test_join_over_btree() {
    check_join::<tabledb::BpTreeMap<CompositeKey, Row>>();
}

#[test]
fn test_join_over_hash() {
    check_join::<ExtHashMap<CompositeKey, Row>>();
}

#[test]
fn test_index_entries_cover_rows() {
    let mut t: Table<ExtHashMap<CompositeKey, Row>> =
        Table::parse("wide", "k1 k2 v", "Integer String Double", "k1 k2").unwrap();
    for i in 0..200i64 {
        let tag = if i % 2 == 0 { "even" } else { "odd" };
        assert!(t.insert(vec![Value::from(i / 2), Value::from(tag), Value::from(i as f64 * 0.5)]));
    }

    assert_eq!(t.len(), 200);
    assert_eq!(t.index_entries().len(), 200);
    t.index().check_invariants().unwrap();

    let key = CompositeKey::new(vec![Value::from(7), Value::from("odd")]);
    let hit = t.select_key(&key);
    assert_eq!(hit.rows()[0][2], Value::from(7.5));
}

#[test]
fn test_btree_index_entries_are_ordered() {
    let t: Table = students();
    let keys: Vec<String> = t.index_entries().iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["(1)", "(2)", "(3)"]);
}

#[test]
fn test_operators_chain() {
    let a: Table = students();
    let b: Table = grades();

    let name = a.col("name").unwrap();
    let not_bob = a.select(|t| t[name] != Value::from("Bob"));
    let graded = a.join(&["id"], &["studId"], &b).unwrap().project(&["id", "name"]).unwrap();

    let same = not_bob.minus(&graded).unwrap();
    assert!(same.is_empty());

    let all = not_bob.union(&a).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_derived_names_are_unique() {
    let a: Table = students();

    let x = a.select(|_| true);
    let y = a.select(|_| true);

    assert_ne!(x.name(), y.name());
    assert!(x.name().starts_with('A'));
}

#[test]
fn test_try_insert_reports_duplicate() {
    let mut a: Table = students();
    let err = a.try_insert(vec![1.into(), "Again".into()]).unwrap_err();

    assert!(matches!(err, Error::DuplicateKey(_)));
    assert_eq!(a.len(), 3);
}
