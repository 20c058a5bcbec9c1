//! Table schemas: attribute names, domains and the primary key.

use crate::common::{CompositeKey, Domain, Error, Result, Value};

/// The shape of a table.
///
/// # Example
/// ```
/// use tabledb::table::Schema;
///
/// let schema = Schema::parse("title year studioName", "String Integer String", "title year").unwrap();
/// assert_eq!(schema.col("year"), Some(1));
/// assert_eq!(schema.key_columns(), &[0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    attributes: Vec<String>,
    domains: Vec<Domain>,
    /// Column positions of the primary key, in key order.
    key: Vec<usize>,
}

impl Schema {
    /// Build a schema.
    ///
    /// # Errors
    /// - `Error::InvalidArity` if attributes and domains differ in length
    /// - `Error::UnknownAttribute` if a key column is not an attribute
    pub fn new(attributes: Vec<String>, domains: Vec<Domain>, key: &[&str]) -> Result<Self> {
        if attributes.len() != domains.len() {
            return Err(Error::InvalidArity {
                expected: attributes.len(),
                actual: domains.len(),
            });
        }

        let mut schema = Self {
            attributes,
            domains,
            key: Vec::new(),
        };
        schema.key = schema.cols(key)?;
        Ok(schema)
    }

    /// Build a schema from space-separated lists.
    ///
    /// # Errors
    /// - `Error::UnknownDomain` for an unrecognized domain name
    /// - Anything [`Schema::new`] returns
    pub fn parse(attributes: &str, domains: &str, key: &str) -> Result<Self> {
        let attributes = attributes.split_whitespace().map(str::to_string).collect();
        let domains = domains
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Domain>>>()?;
        let key: Vec<&str> = key.split_whitespace().collect();
        Self::new(attributes, domains, &key)
    }

    /// Number of attributes.
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Column positions of the primary key.
    pub fn key_columns(&self) -> &[usize] {
        &self.key
    }

    /// Attribute names of the primary key.
    pub fn key_names(&self) -> Vec<&str> {
        self.key.iter().map(|&c| self.attributes[c].as_str()).collect()
    }

    /// Column position of an attribute.
    pub fn col(&self, attribute: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == attribute)
    }

    /// Column positions of several attributes.
    ///
    /// # Errors
    /// - `Error::UnknownAttribute` naming the first missing attribute
    pub fn cols(&self, attributes: &[&str]) -> Result<Vec<usize>> {
        attributes
            .iter()
            .map(|&a| self.col(a).ok_or_else(|| Error::UnknownAttribute(a.to_string())))
            .collect()
    }

    /// Check a row's arity and the domain of every value.
    ///
    /// # Errors
    /// - `Error::InvalidArity` if the row has the wrong number of values
    /// - `Error::DomainMismatch` for the first value of the wrong type
    pub fn check_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.arity() {
            return Err(Error::InvalidArity {
                expected: self.arity(),
                actual: row.len(),
            });
        }
        for ((value, &domain), name) in row.iter().zip(&self.domains).zip(&self.attributes) {
            if value.domain() != domain {
                return Err(Error::DomainMismatch {
                    column: name.clone(),
                    expected: domain,
                    actual: value.domain(),
                });
            }
        }
        Ok(())
    }

    /// Extract the primary key of a row.
    ///
    /// # Errors
    /// - `Error::InvalidArity` if the row is too short for the key columns
    pub fn key_of(&self, row: &[Value]) -> Result<CompositeKey> {
        CompositeKey::from_row(row, &self.key)
    }

    /// The same attributes keyed on every column.
    pub fn with_full_key(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            domains: self.domains.clone(),
            key: (0..self.arity()).collect(),
        }
    }

    /// Whether rows of `other` can mix with rows of this schema (same
    /// number of attributes, same domains in order).
    pub fn is_compatible(&self, other: &Schema) -> bool {
        self.domains == other.domains
    }
}
