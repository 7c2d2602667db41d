//! Row keys

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

/// Primary key of a row: partition components followed by clustering components
///
/// Ordering is component-wise, so rows of one partition sort by their
/// clustering columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(Vec<Value>);

impl RowKey {
    pub fn new<I, V>(components: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        RowKey(components.into_iter().map(Into::into).collect())
    }

    pub fn components(&self) -> &[Value] {
        &self.0
    }

    pub fn component(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for RowKey {
    fn from(components: Vec<Value>) -> Self {
        RowKey(components)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", part)?;
        }
        f.write_str(")")
    }
}
