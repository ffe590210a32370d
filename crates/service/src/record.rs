use serde::{Deserialize, Serialize};

/// A stored record. `id` is chosen by the caller and acts as the primary key.
///
/// Fields absent from an incoming document take their zero value, so an
/// update without `name` stores an empty name rather than keeping the old one.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i64,
}

impl Record {
    pub fn new(id: i64, name: impl Into<String>, age: i64) -> Self {
        Self { id, name: name.into(), age }
    }
}
