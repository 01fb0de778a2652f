//! Stable first-seen-order label-to-`class_t` encoding (spec §4.13;
//! supplemented from `morinim/vita`'s `dataframe::encode`/`classes_map_` --
//! the distilled spec only says "stable within a single dataframe", the
//! original shows the concrete scheme: each new label gets the next integer
//! id in the order it is first encountered, and the mapping is remembered
//! so re-encoding the same label later returns the same id).

use std::collections::HashMap;

/// The integer id assigned to a classification label (`class_t` in the
/// original C++).
pub type ClassId = usize;

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassEncoder {
    by_label: HashMap<String, ClassId>,
    labels: Vec<String>,
}

impl ClassEncoder {
    pub fn new() -> Self {
        ClassEncoder::default()
    }

    /// Encodes `label`, assigning it the next id if this is the first time
    /// it has been seen.
    pub fn encode(&mut self, label: &str) -> ClassId {
        if let Some(&id) = self.by_label.get(label) {
            return id;
        }
        let id = self.labels.len();
        self.labels.push(label.to_string());
        self.by_label.insert(label.to_string(), id);
        id
    }

    pub fn class_name(&self, id: ClassId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn classes(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
