use std::fmt;
use std::sync::Arc;

use crate::common::{JoinError, Result, ATTRIBUTE_OVERHEAD, TUPLE_OVERHEAD};

/// An immutable row of string attributes, indexed by position.
///
/// Attribute storage is shared, so cloning a tuple (for example when a block
/// is scanned into a snapshot) does not copy the strings themselves.
///
/// ## Size Metric
///
/// ```text
/// size = TUPLE_OVERHEAD + sum(len(attribute) + ATTRIBUTE_OVERHEAD)
/// ```
///
/// The metric only decides how many tuples fit into a block; nothing is
/// actually serialized.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tuple {
    values: Arc<[String]>,
}

impl Tuple {
    /// Creates a new tuple from the given attribute values.
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Returns the attribute at the given position.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Returns the attribute at the given position, or `AttributeOutOfRange`.
    pub fn attribute(&self, index: usize) -> Result<&str> {
        self.value(index).ok_or(JoinError::AttributeOutOfRange {
            index,
            arity: self.values.len(),
        })
    }

    /// Returns all attribute values.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this tuple has no attributes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the size of this tuple in bytes according to the block size metric.
    pub fn size_in_bytes(&self) -> usize {
        self.values
            .iter()
            .fold(TUPLE_OVERHEAD, |size, v| size + v.len() + ATTRIBUTE_OVERHEAD)
    }

    /// Returns a new tuple holding this tuple's attributes followed by `other`'s.
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        Tuple::new(values)
    }
}

impl<S: Into<String>> FromIterator<S> for Tuple {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Tuple::new(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for Tuple {
    fn from(values: Vec<String>) -> Self {
        Tuple::new(values)
    }
}

impl From<&[&str]> for Tuple {
    fn from(values: &[&str]) -> Self {
        values.iter().copied().collect()
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tuple").field(&self.values).finish()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_size_in_bytes() {
        let tuple = Tuple::from(&["ab", "cde"][..]);
        // 4 + (2 + 4) + (3 + 4)
        assert_eq!(tuple.size_in_bytes(), 17);

        let empty = Tuple::new(Vec::new());
        assert_eq!(empty.size_in_bytes(), TUPLE_OVERHEAD);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_tuple_attribute_access() {
        let tuple = Tuple::new(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(tuple.len(), 2);
        assert_eq!(tuple.value(1), Some("y"));
        assert_eq!(tuple.value(2), None);
        assert_eq!(tuple.attribute(0).unwrap(), "x");
        assert!(matches!(
            tuple.attribute(5),
            Err(JoinError::AttributeOutOfRange { index: 5, arity: 2 })
        ));
    }

    #[test]
    fn test_tuple_equality_and_hash() {
        use std::collections::HashSet;

        let a = Tuple::from(&["1", "2"][..]);
        let b: Tuple = ["1", "2"].into_iter().collect();
        let c = Tuple::from(&["2", "1"][..]);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Tuple> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_tuple_size_counts_utf8_bytes() {
        // "é" is two bytes, "日本" six
        let tuple = Tuple::from(&["é", "日本"][..]);
        assert_eq!(tuple.size_in_bytes(), 4 + (2 + 4) + (6 + 4));
    }

    #[test]
    fn test_tuple_concat() {
        let left = Tuple::from(&["1", "a"][..]);
        let right = Tuple::from(&["1", "b", "c"][..]);
        let joined = left.concat(&right);
        assert_eq!(joined.values(), &["1", "a", "1", "b", "c"]);
        assert_eq!(joined.to_string(), "[1, a, 1, b, c]");
    }
}
