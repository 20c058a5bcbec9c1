//! Relational tables over a swappable index.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::Schema;
use crate::common::{CompositeKey, Domain, Error, Result, Row, Value};
use crate::index::{BpTreeMap, KeyIndex};

/// Counter for naming derived tables.
static DERIVED_COUNT: AtomicUsize = AtomicUsize::new(0);

fn derived_name(base: &str) -> String {
    format!("{}{}", base, DERIVED_COUNT.fetch_add(1, Ordering::Relaxed))
}

/// A relational table: a schema, a list of rows and a primary-key index.
///
/// The index type is chosen at compile time; any [`KeyIndex`] over
/// `CompositeKey -> Row` works. Rows are shared with the index (and with
/// derived tables where values are unchanged), never copied.
///
/// Relational operators return new tables with generated names and their
/// own freshly built index.
///
/// # Example
/// ```
/// use tabledb::common::{CompositeKey, Domain, Value};
/// use tabledb::table::Table;
///
/// let mut studio: Table = Table::new("studio", &["name", "address", "presNo"],
///     &[Domain::Text, Domain::Text, Domain::Int], &["name"]).unwrap();
///
/// assert!(studio.insert(vec!["Fox".into(), "Los_Angeles".into(), 7777.into()]));
/// assert!(!studio.insert(vec!["Fox".into(), "Burbank".into(), 1.into()]));
///
/// let fox = studio.select_key(&CompositeKey::from(Value::from("Fox")));
/// assert_eq!(fox.len(), 1);
/// ```
#[derive(Debug)]
pub struct Table<I = BpTreeMap<CompositeKey, Row>> {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
    index: I,
}

impl<I: KeyIndex<CompositeKey, Row> + Default> Table<I> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an empty table.
    ///
    /// # Errors
    /// - `Error::InvalidArity` if attributes and domains differ in length
    /// - `Error::UnknownAttribute` if a key column is not an attribute
    pub fn new(name: impl Into<String>, attributes: &[&str], domains: &[Domain], key: &[&str]) -> Result<Self> {
        let attributes = attributes.iter().map(|a| a.to_string()).collect();
        let schema = Schema::new(attributes, domains.to_vec(), key)?;
        Ok(Self::with_schema(name, schema))
    }

    /// Create an empty table from space-separated lists.
    ///
    /// # Errors
    /// - Anything [`Schema::parse`] returns
    pub fn parse(name: impl Into<String>, attributes: &str, domains: &str, key: &str) -> Result<Self> {
        Ok(Self::with_schema(name, Schema::parse(attributes, domains, key)?))
    }

    /// Create an empty table with an existing schema.
    pub fn with_schema(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            index: I::default(),
        }
    }

    /// A new table named after `base`, loaded with `rows`.
    ///
    /// Rows whose key is already present are dropped, which is what
    /// removes duplicate rows from projections.
    fn derived(base: &str, schema: Schema, rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Self::with_schema(derived_name(base), schema);
        for row in rows {
            if let Err(err) = table.insert_row(row) {
                debug!(table = %table.name, error = %err, "derived row dropped");
            }
        }
        table
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert a row.
    ///
    /// Returns `false` (and leaves the table unchanged) if the row has the
    /// wrong shape or its key is already present.
    pub fn insert(&mut self, values: Vec<Value>) -> bool {
        match self.try_insert(values) {
            Ok(()) => true,
            Err(err) => {
                debug!(table = %self.name, error = %err, "row rejected");
                false
            }
        }
    }

    /// Insert a row, reporting why it was rejected.
    ///
    /// # Errors
    /// - `Error::InvalidArity` / `Error::DomainMismatch` from the type check
    /// - `Error::DuplicateKey` if the primary key is already present
    pub fn try_insert(&mut self, values: Vec<Value>) -> Result<()> {
        self.insert_row(Row::from(values))
    }

    /// The index is updated first so a rejected key never leaves an
    /// unindexed row behind.
    fn insert_row(&mut self, row: Row) -> Result<()> {
        self.schema.check_row(&row)?;
        let key = self.schema.key_of(&row)?;
        self.index.put(key, Arc::clone(&row))?;
        self.rows.push(row);
        Ok(())
    }

    // ========================================================================
    // Relational operators
    // ========================================================================

    /// Rows whose primary key equals `key`, found through the index.
    pub fn select_key(&self, key: &CompositeKey) -> Self {
        let row = self.index.get(key).cloned();
        Self::derived(&self.name, self.schema.clone(), row)
    }

    /// Rows satisfying `predicate`.
    pub fn select<P: Fn(&[Value]) -> bool>(&self, predicate: P) -> Self {
        let rows = self.rows.iter().filter(|row| predicate(row)).cloned();
        Self::derived(&self.name, self.schema.clone(), rows)
    }

    /// Keep only the given attributes.
    ///
    /// The primary key survives if all of its attributes are projected;
    /// otherwise every projected attribute becomes part of the key.
    ///
    /// # Errors
    /// - `Error::UnknownAttribute` for an attribute not in the table
    pub fn project(&self, attributes: &[&str]) -> Result<Self> {
        let cols = self.schema.cols(attributes)?;
        let domains = cols.iter().map(|&c| self.schema.domains()[c]).collect();

        let own_key = self.schema.key_names();
        let key = if own_key.iter().all(|k| attributes.contains(k)) {
            own_key
        } else {
            attributes.to_vec()
        };

        let names = attributes.iter().map(|a| a.to_string()).collect();
        let schema = Schema::new(names, domains, &key)?;
        let rows = self
            .rows
            .iter()
            .map(|row| cols.iter().map(|&c| row[c].clone()).collect::<Row>());

        Ok(Self::derived(&self.name, schema, rows))
    }

    /// Rows in this table or `other`.
    ///
    /// Every distinct row is kept. If two distinct rows share a primary
    /// key, the result is keyed on all of its attributes instead.
    ///
    /// # Errors
    /// - `Error::Incompatible` if the tables differ in arity or domains
    pub fn union(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;

        let extra = other.rows.iter().filter(|row| !self.rows.contains(*row));
        let rows: Vec<Row> = self.rows.iter().chain(extra).cloned().collect();

        let mut seen = BTreeSet::new();
        let key_holds = rows
            .iter()
            .all(|row| self.schema.key_of(row).is_ok_and(|key| seen.insert(key)));
        let schema = if key_holds {
            self.schema.clone()
        } else {
            debug!(left = %self.name, right = %other.name, "union rows collide on key, keying on all attributes");
            self.schema.with_full_key()
        };

        Ok(Self::derived(&self.name, schema, rows))
    }

    /// Rows in this table but not in `other`.
    ///
    /// # Errors
    /// - `Error::Incompatible` if the tables differ in arity or domains
    pub fn minus(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;

        let rows = self.rows.iter().filter(|row| !other.rows.contains(*row)).cloned();
        Ok(Self::derived(&self.name, self.schema.clone(), rows))
    }

    /// Equijoin on `attributes1` (this table) = `attributes2` (`other`).
    ///
    /// The result has this table's attributes followed by `other`'s, minus
    /// the `attributes2` columns (their values equal the matched
    /// `attributes1` columns). A name already present gets a "2" suffix.
    ///
    /// # Errors
    /// - `Error::InvalidArity` if the attribute lists differ in length
    /// - `Error::UnknownAttribute` for an attribute not in its table
    pub fn join(&self, attributes1: &[&str], attributes2: &[&str], other: &Self) -> Result<Self> {
        if attributes1.len() != attributes2.len() {
            return Err(Error::InvalidArity {
                expected: attributes1.len(),
                actual: attributes2.len(),
            });
        }
        let left_cols = self.schema.cols(attributes1)?;
        let right_cols = other.schema.cols(attributes2)?;
        let kept: Vec<usize> = (0..other.schema.arity()).filter(|c| !right_cols.contains(c)).collect();

        let mut names: Vec<String> = self.schema.attributes().to_vec();
        let mut domains: Vec<Domain> = self.schema.domains().to_vec();
        for &c in &kept {
            let name = &other.schema.attributes()[c];
            let name = if names.contains(name) {
                format!("{}2", name)
            } else {
                name.clone()
            };
            names.push(name);
            domains.push(other.schema.domains()[c]);
        }

        // Left key, then the right key mapped into the result columns
        let mut key: Vec<&str> = self.schema.key_names();
        for &rc in other.schema.key_columns() {
            let name = match right_cols.iter().position(|&c| c == rc) {
                Some(pair) => attributes1[pair],
                None => match kept.iter().position(|&c| c == rc) {
                    Some(pos) => names[self.schema.arity() + pos].as_str(),
                    None => continue,
                },
            };
            if !key.contains(&name) {
                key.push(name);
            }
        }
        let schema = Schema::new(names.clone(), domains, &key)?;

        let mut rows = Vec::new();
        for t in &self.rows {
            for u in &other.rows {
                if left_cols.iter().zip(&right_cols).all(|(&l, &r)| t[l] == u[r]) {
                    let joined: Row = t.iter().cloned().chain(kept.iter().map(|&c| u[c].clone())).collect();
                    rows.push(joined);
                }
            }
        }

        Ok(Self::derived(&self.name, schema, rows))
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.schema.is_compatible(&other.schema) {
            Ok(())
        } else {
            Err(Error::Incompatible {
                left: self.name.clone(),
                right: other.name.clone(),
            })
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column position of an attribute.
    pub fn col(&self, attribute: &str) -> Option<usize> {
        self.schema.col(attribute)
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The primary-key index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Every (key, row) pair held by the index.
    pub fn index_entries(&self) -> Vec<(&CompositeKey, &Row)> {
        self.index.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ExtHashMap;

    fn movie() -> Table {
        let mut movie = Table::parse(
            "movie",
            "title year length genre studioName producerNo",
            "String Integer Integer String String Integer",
            "title year",
        )
        .unwrap();

        let rows = [
            ("Star_Wars", 1977, 124, "sciFi", "Fox", 12345),
            ("Star_Wars_2", 1980, 124, "sciFi", "Fox", 12345),
            ("Rocky", 1985, 200, "action", "Universal", 12125),
            ("Rambo", 1978, 100, "action", "Universal", 32355),
        ];
        for (title, year, length, genre, studio, producer) in rows {
            assert!(movie.insert(vec![
                title.into(),
                year.into(),
                length.into(),
                genre.into(),
                studio.into(),
                producer.into(),
            ]));
        }
        movie
    }

    fn key(title: &str, year: i64) -> CompositeKey {
        CompositeKey::new(vec![Value::from(title), Value::from(year)])
    }

    #[test]
    fn test_insert_indexes_row() {
        let movie = movie();

        assert_eq!(movie.len(), 4);
        assert_eq!(movie.index().len(), 4);

        let row = movie.index().get(&key("Rocky", 1985)).unwrap();
        assert_eq!(row[4], Value::from("Universal"));
        // Index holds the same allocation as the row list
        assert!(movie.rows().iter().any(|r| Arc::ptr_eq(r, row)));
    }

    #[test]
    fn test_rejected_rows_leave_table_unchanged() {
        let mut movie = movie();

        // Duplicate key
        assert!(!movie.insert(vec![
            "Rocky".into(),
            1985.into(),
            1.into(),
            "drama".into(),
            "MGM".into(),
            1.into(),
        ]));
        // Wrong arity
        assert!(!movie.insert(vec!["Jaws".into(), 1975.into()]));
        // Wrong domain
        let err = movie
            .try_insert(vec![
                "Jaws".into(),
                "1975".into(),
                124.into(),
                "horror".into(),
                "Universal".into(),
                1.into(),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::DomainMismatch { .. }));

        assert_eq!(movie.len(), 4);
        assert_eq!(movie.index().len(), 4);
    }

    #[test]
    fn test_select_key() {
        let movie = movie();

        let hit = movie.select_key(&key("Star_Wars", 1977));
        assert_eq!(hit.len(), 1);
        assert!(hit.name().starts_with("movie"));
        assert_ne!(hit.name(), "movie");

        let miss = movie.select_key(&key("Star_Wars", 1999));
        assert!(miss.is_empty());
    }

    #[test]
    fn test_select_predicate() {
        let movie = movie();
        let year = movie.col("year").unwrap();

        let old = movie.select(|t| t[year] < Value::from(1980));

        assert_eq!(old.len(), 2);
        assert!(old.select_key(&key("Rambo", 1978)).len() == 1);
    }

    #[test]
    fn test_project_keeps_key() {
        let movie = movie();
        let projected = movie.project(&["title", "year", "genre"]).unwrap();

        assert_eq!(projected.schema().key_names(), vec!["title", "year"]);
        assert_eq!(projected.len(), 4);
    }

    #[test]
    fn test_project_without_key_collapses_duplicates() {
        let movie = movie();
        let projected = movie.project(&["genre", "studioName"]).unwrap();

        assert_eq!(projected.schema().key_names(), vec!["genre", "studioName"]);
        // (sciFi, Fox) and (action, Universal) appear twice each
        assert_eq!(projected.len(), 2);
    }

    #[test]
    fn test_project_unknown_attribute() {
        let movie = movie();
        assert!(matches!(
            movie.project(&["title", "budget"]),
            Err(Error::UnknownAttribute(name)) if name == "budget"
        ));
    }

    #[test]
    fn test_union_and_minus() {
        let movie = movie();
        let mut cinema = Table::parse(
            "cinema",
            "title year length genre studioName producerNo",
            "String Integer Integer String String Integer",
            "title year",
        )
        .unwrap();
        assert!(cinema.insert(vec![
            "Rocky".into(),
            1985.into(),
            200.into(),
            "action".into(),
            "Universal".into(),
            12125.into(),
        ]));
        assert!(cinema.insert(vec![
            "Galaxy_Quest".into(),
            1999.into(),
            104.into(),
            "comedy".into(),
            "DreamWorks".into(),
            67890.into(),
        ]));

        let union = movie.union(&cinema).unwrap();
        assert_eq!(union.len(), 5);

        let minus = movie.minus(&cinema).unwrap();
        assert_eq!(minus.len(), 3);
        assert!(minus.select_key(&key("Rocky", 1985)).is_empty());
    }

    #[test]
    fn test_union_keeps_rows_sharing_a_key() {
        let mut a: Table = Table::parse("a", "id name", "Integer String", "id").unwrap();
        assert!(a.insert(vec![1.into(), "Ann".into()]));
        let mut b: Table = Table::parse("b", "id name", "Integer String", "id").unwrap();
        assert!(b.insert(vec![1.into(), "Annie".into()]));
        assert!(b.insert(vec![2.into(), "Bob".into()]));

        let union = a.union(&b).unwrap();

        assert_eq!(union.len(), 3);
        assert_eq!(union.index().len(), 3);
        assert_eq!(union.schema().key_names(), vec!["id", "name"]);
        let annie = CompositeKey::new(vec![Value::from(1), Value::from("Annie")]);
        assert_eq!(union.select_key(&annie).len(), 1);

        // No collision keeps the original key
        let mut c: Table = Table::parse("c", "id name", "Integer String", "id").unwrap();
        assert!(c.insert(vec![3.into(), "Cy".into()]));
        assert_eq!(a.union(&c).unwrap().schema().key_names(), vec!["id"]);
    }

    #[test]
    fn test_union_incompatible() {
        let movie = movie();
        let studio = Table::<BpTreeMap<CompositeKey, Row>>::parse("studio", "name address", "String String", "name")
            .unwrap();

        assert!(matches!(movie.union(&studio), Err(Error::Incompatible { .. })));
        assert!(matches!(movie.minus(&studio), Err(Error::Incompatible { .. })));
    }

    #[test]
    fn test_join_renames_duplicate_attributes() {
        let mut studio: Table = Table::parse("studio", "name address", "String String", "name").unwrap();
        assert!(studio.insert(vec!["Fox".into(), "Los_Angeles".into()]));
        assert!(studio.insert(vec!["Universal".into(), "Universal_City".into()]));

        let mut exec: Table = Table::parse("exec", "id name address", "Integer String String", "id").unwrap();
        assert!(exec.insert(vec![12345.into(), "Fox".into(), "Malibu".into()]));

        let joined = exec.join(&["name"], &["name"], &studio).unwrap();

        assert_eq!(joined.schema().attributes(), &["id", "name", "address", "address2"]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.rows()[0][3], Value::from("Los_Angeles"));
    }

    #[test]
    fn test_join_arity_mismatch() {
        let movie = movie();
        let err = movie.join(&["title", "year"], &["title"], &movie).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArity {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_hash_indexed_table() {
        let mut table: Table<ExtHashMap<CompositeKey, Row>> =
            Table::parse("t", "k v", "Integer String", "k").unwrap();
        for k in 0..50 {
            assert!(table.insert(vec![k.into(), format!("v{}", k).into()]));
        }

        assert_eq!(table.index_entries().len(), 50);
        let hit = table.select_key(&CompositeKey::from(Value::from(42)));
        assert_eq!(hit.rows()[0][1], Value::from("v42"));
    }
}
