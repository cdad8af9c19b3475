// shared value types for the taxonomy hierarchy
use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry at any level of the hierarchy (layer, category or subcategory).
///
/// `numeric_code` is assigned explicitly by the reference table. It is never
/// derived from the entry's position in its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
    pub code: String,
    pub numeric_code: String,
    pub name: String,
}

impl TaxonomyNode {
    pub fn new(
        code: impl Into<String>,
        numeric_code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self { code: code.into(), numeric_code: numeric_code.into(), name: name.into() }
    }

    //"Pop_Hipster_Male_Stars" -> "Pop Hipster Male Stars"
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }

    //numeric codes compare by value so "4" and "004" are the same code
    pub fn matches_numeric(&self, value: u32) -> bool {
        numeric_value(&self.numeric_code) == Some(value)
    }

    pub fn numeric_value(&self) -> Option<u32> {
        numeric_value(&self.numeric_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub node: TaxonomyNode,
    pub subcategories: Vec<TaxonomyNode>,
}

impl Category {
    pub fn subcategory(&self, code: &str) -> Option<&TaxonomyNode> {
        self.subcategories.iter().find(|s| s.matches_code(code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub node: TaxonomyNode,
    pub categories: Vec<Category>,
}

impl Layer {
    pub fn category(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.node.matches_code(code))
    }

    pub fn category_by_numeric(&self, value: u32) -> Option<&Category> {
        self.categories.iter().find(|c| c.node.matches_numeric(value))
    }
}

/// Alphabetic `Layer.Category.Subcategory` path, always in canonical (table) case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlphaPath {
    pub layer: String,
    pub category: String,
    pub subcategory: String,
}

impl AlphaPath {
    pub fn new(
        layer: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        Self { layer: layer.into(), category: category.into(), subcategory: subcategory.into() }
    }

    //lookup key, codes are case-insensitive
    pub fn key(&self) -> AlphaPath {
        AlphaPath {
            layer: self.layer.to_ascii_uppercase(),
            category: self.category.to_ascii_uppercase(),
            subcategory: self.subcategory.to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for AlphaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.layer, self.category, self.subcategory)
    }
}

/// Numeric `layer.category.subcategory` triple, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumericPath {
    pub layer: u32,
    pub category: u32,
    pub subcategory: u32,
}

impl NumericPath {
    pub fn new(layer: u32, category: u32, subcategory: u32) -> Self {
        Self { layer, category, subcategory }
    }
}

impl fmt::Display for NumericPath {
    //layer numeric stays unpadded, the rest are 3 digits wide
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}.{:03}", self.layer, self.category, self.subcategory)
    }
}

/// HFN/MFA pair for one concrete asset address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressPair {
    pub hfn: String,
    pub mfa: String,
}

/// A numeric triple claimed by more than one alphabetic path.
///
/// `candidates[0]` is what [`crate::TaxonomyResolver::mfa_to_hfn`] returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ambiguity {
    pub numeric: String,
    pub candidates: Vec<String>,
}

pub(crate) fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn numeric_value(raw: &str) -> Option<u32> {
    if !is_digits(raw) {
        return None;
    }
    raw.parse().ok()
}
