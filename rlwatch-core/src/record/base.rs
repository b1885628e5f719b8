//! Base implementation of records for logging.
use crate::error::MonitorError;
use std::{
    collections::{
        hash_map::Iter,
        HashMap,
    },
    convert::Into,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics like mean reward.
    Scalar(f32),

    /// An integer value, such as the training step of a record.
    Integer(i64),

    /// A text value.
    String(String),
}

/// A container for storing key-value pairs of various data types.
///
/// # Examples
///
/// ```rust
/// use rlwatch_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("std_reward from evaluate", 0.5);
/// record.insert("note", RecordValue::String("warmup".to_string()));
///
/// let std = record.get_scalar("std_reward from evaluate").unwrap();
/// assert_eq!(std, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// If both records contain the same key, the value from the second record
    /// will overwrite the value from the first record.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Gets a scalar value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a scalar.
    pub fn get_scalar(&self, k: &str) -> Result<f32, MonitorError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Scalar(v) => Ok(*v),
                _ => Err(MonitorError::RecordValueTypeError("Scalar".to_string())),
            }
        } else {
            Err(MonitorError::RecordKeyError(k.to_string()))
        }
    }

    /// Gets an integer value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not an integer.
    pub fn get_integer(&self, k: &str) -> Result<i64, MonitorError> {
        match self.0.get(k) {
            Some(RecordValue::Integer(v)) => Ok(*v),
            Some(_) => Err(MonitorError::RecordValueTypeError("Integer".to_string())),
            None => Err(MonitorError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a string.
    pub fn get_string(&self, k: &str) -> Result<String, MonitorError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::String(s) => Ok(s.clone()),
                _ => Err(MonitorError::RecordValueTypeError("String".to_string())),
            }
        } else {
            Err(MonitorError::RecordKeyError(k.to_string()))
        }
    }

    /// Returns the number of values in the record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_with_wrong_type() {
        let mut record = Record::from_scalar("a", 1.0);
        record.insert("b", RecordValue::String("text".into()));

        assert_eq!(record.get_scalar("a").unwrap(), 1.0);
        assert_eq!(record.get_string("b").unwrap(), "text");
        assert!(matches!(
            record.get_scalar("b"),
            Err(MonitorError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_string("c"),
            Err(MonitorError::RecordKeyError(_))
        ));

        record.insert("n", RecordValue::Integer(67_108_900));
        assert_eq!(record.get_integer("n").unwrap(), 67_108_900);
        assert!(matches!(
            record.get_integer("a"),
            Err(MonitorError::RecordValueTypeError(_))
        ));
    }

    #[test]
    fn test_merge_overwrites() {
        let r1 = Record::from_slice(&[
            ("a", RecordValue::Scalar(1.0)),
            ("b", RecordValue::Scalar(2.0)),
        ]);
        let r2 = Record::from_scalar("b", 3.0);
        let merged = r1.merge(r2);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get_scalar("b").unwrap(), 3.0);
    }
}
