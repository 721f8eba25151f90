use crate::constants::{FORM_ENDPOINT, SPECIES_ENDPOINT};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final key -> localized name table, in output order.
pub type NameMap = IndexMap<String, String>;

/// Catalog categories that can be enumerated.
///
/// The category travels with every job but the workers treat all categories
/// the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "pokemon-species")]
    Species,
    #[serde(rename = "pokemon-form")]
    Form,
}

impl Category {
    /// Path segment of the listing endpoint for this category.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Species => SPECIES_ENDPOINT,
            Category::Form => FORM_ENDPOINT,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Pointer into the catalog as returned by a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub name: String,
    pub url: String,
}

/// One detail fetch. Created by the enumerator, consumed once by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchJob {
    /// Position in enumeration order; drives output ordering.
    pub seq: usize,
    pub key: String,
    pub url: String,
    pub category: Category,
}

/// A (locale, value) entry of a detail record's localized-name collection.
/// Either side may be missing in a malformed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePair {
    pub locale: Option<String>,
    pub value: Option<String>,
}

impl NamePair {
    pub fn new(locale: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            locale: Some(locale.into()),
            value: Some(value.into()),
        }
    }
}
