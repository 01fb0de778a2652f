//! Column metadata (spec §4.13): name, domain, and the set of distinct
//! string labels observed in a nominal/string column.

use vita_core::symbol::Category;
use vita_core::value::ValueKind;

/// How column domains map onto GP categories (spec §4.13). Weak typing
/// treats every column of a given [`ValueKind`] as one shared category --
/// the same coercion [`vita_core::value::Value::as_double`] already
/// performs for `int`/`double` elsewhere, extended to every domain; strong
/// typing instead gives each column its own category via
/// [`Category::fresh`], so two string columns get distinct categories even
/// though both carry `Value::String` payloads.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Typing {
    Weak,
    Strong,
}

/// One column of a [`crate::dataframe::Dataframe`]: its name, inferred
/// domain, and (for nominal/string columns) the labels seen so far.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    pub name: String,
    pub domain: ValueKind,
    pub states: Vec<String>,
    own_category: Category,
}

impl Column {
    pub fn new(name: impl Into<String>, domain: ValueKind) -> Self {
        Column { name: name.into(), domain, states: Vec::new(), own_category: Category::fresh() }
    }

    pub fn observe_state(&mut self, label: &str) {
        if !self.states.iter().any(|s| s == label) {
            self.states.push(label.to_string());
        }
    }

    /// The category this column presents to the GP layer under `typing`
    /// (spec §4.13): the domain's shared category under weak typing, or
    /// this column's own distinct category under strong typing.
    pub fn category(&self, typing: Typing) -> Category {
        match typing {
            Typing::Weak => match self.domain {
                ValueKind::Int => Category::of(ValueKind::Double),
                domain => Category::of(domain),
            },
            Typing::Strong => self.own_category,
        }
    }
}
