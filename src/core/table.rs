// reference table: TOON rows -> ordered layer/category/subcategory hierarchy
use serde::Deserialize;

use crate::core::error::{IntegrityViolation, LoadError, LookupError};
use crate::core::integrity;
use crate::core::mapping::OverrideTable;
use crate::core::types::{numeric_value, AlphaPath, Category, Layer, NumericPath, TaxonomyNode};

/// Reference table compiled into the crate.
pub const EMBEDDED_TAXONOMY: &str = include_str!("../data/taxonomy.toon");

#[derive(Debug, Deserialize)]
struct LayerRow {
    code: String,
    numeric_code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    layer: String,
    code: String,
    numeric_code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubcategoryRow {
    layer: String,
    category: String,
    code: String,
    numeric_code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    layer: String,
    category: String,
    subcategory: String,
    layer_numeric: String,
    category_numeric: String,
    subcategory_numeric: String,
}

#[derive(Debug, Deserialize)]
struct TableDocument {
    layers: Vec<LayerRow>,
    categories: Vec<CategoryRow>,
    subcategories: Vec<SubcategoryRow>,
    #[serde(default)]
    overrides: Vec<OverrideRow>,
}

/// The validated, immutable taxonomy.
///
/// Row order in the source document is the canonical enumeration order.
#[derive(Debug, Clone)]
pub struct TaxonomyTable {
    layers: Vec<Layer>,
    overrides: OverrideTable,
}

/// One fully resolved subcategory entry.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub layer: &'a Layer,
    pub category: &'a Category,
    pub subcategory: &'a TaxonomyNode,
}

impl Resolved<'_> {
    pub fn alpha_path(&self) -> AlphaPath {
        AlphaPath::new(&self.layer.node.code, &self.category.node.code, &self.subcategory.code)
    }

    //None only if the table holds a non-numeric code, which integrity rejects
    pub fn table_numeric(&self) -> Option<NumericPath> {
        Some(NumericPath::new(
            self.layer.node.numeric_value()?,
            self.category.node.numeric_value()?,
            self.subcategory.numeric_value()?,
        ))
    }
}

impl TaxonomyTable {
    pub fn embedded() -> Result<Self, LoadError> {
        Self::from_toon(EMBEDDED_TAXONOMY)
    }

    pub fn from_toon(source: &str) -> Result<Self, LoadError> {
        let doc: TableDocument =
            toon_format::decode_default(source).map_err(|e| LoadError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    fn from_document(doc: TableDocument) -> Result<Self, LoadError> {
        let mut violations = Vec::new();

        let mut layers: Vec<Layer> = doc
            .layers
            .into_iter()
            .map(|r| Layer { node: TaxonomyNode::new(r.code, r.numeric_code, r.name), categories: Vec::new() })
            .collect();

        for row in doc.categories {
            match layers.iter_mut().find(|l| l.node.matches_code(&row.layer)) {
                Some(layer) => layer.categories.push(Category {
                    node: TaxonomyNode::new(row.code, row.numeric_code, row.name),
                    subcategories: Vec::new(),
                }),
                None => violations.push(IntegrityViolation::OrphanRow {
                    path: format!("{}.{}", row.layer, row.code),
                    parent: row.layer,
                }),
            }
        }

        for row in doc.subcategories {
            let category = layers
                .iter_mut()
                .find(|l| l.node.matches_code(&row.layer))
                .and_then(|l| l.categories.iter_mut().find(|c| c.node.matches_code(&row.category)));

            match category {
                Some(category) => category
                    .subcategories
                    .push(TaxonomyNode::new(row.code, row.numeric_code, row.name)),
                None => violations.push(IntegrityViolation::OrphanRow {
                    path: format!("{}.{}.{}", row.layer, row.category, row.code),
                    parent: format!("{}.{}", row.layer, row.category),
                }),
            }
        }

        let mut overrides = OverrideTable::new();
        for row in doc.overrides {
            let path = AlphaPath::new(row.layer, row.category, row.subcategory);
            let numeric = [&row.layer_numeric, &row.category_numeric, &row.subcategory_numeric]
                .map(|raw| numeric_value(raw));

            let well_formed = integrity::override_numeric_well_formed(
                &row.layer_numeric,
                &row.category_numeric,
                &row.subcategory_numeric,
            );
            let ([Some(l), Some(c), Some(s)], true) = (numeric, well_formed) else {
                violations.push(IntegrityViolation::InvalidNumeric {
                    path: path.to_string(),
                    numeric: format!(
                        "{}.{}.{}",
                        row.layer_numeric, row.category_numeric, row.subcategory_numeric
                    ),
                });
                continue;
            };

            if let Err(v) = overrides.insert(path, NumericPath::new(l, c, s)) {
                violations.push(v);
            }
        }

        let table = Self { layers, overrides };
        violations.extend(integrity::check(&table));

        if !violations.is_empty() {
            return Err(LoadError::Integrity(violations));
        }

        Ok(table)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn layer(&self, code: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.node.matches_code(code))
    }

    pub fn layer_by_numeric(&self, value: u32) -> Option<&Layer> {
        self.layers.iter().find(|l| l.node.matches_numeric(value))
    }

    pub fn category(&self, layer: &str, category: &str) -> Option<&Category> {
        self.layer(layer)?.category(category)
    }

    /// Resolve an alphabetic path, reporting the first segment that is unknown.
    pub fn resolve(&self, path: &AlphaPath) -> Result<Resolved<'_>, LookupError> {
        let layer = self
            .layer(&path.layer)
            .ok_or_else(|| LookupError::UnknownLayer(path.layer.clone()))?;

        let category = layer.category(&path.category).ok_or_else(|| LookupError::UnknownCategory {
            layer: layer.node.code.clone(),
            category: path.category.clone(),
        })?;

        let subcategory =
            category.subcategory(&path.subcategory).ok_or_else(|| LookupError::UnknownSubcategory {
                layer: layer.node.code.clone(),
                category: category.node.code.clone(),
                subcategory: path.subcategory.clone(),
            })?;

        Ok(Resolved { layer, category, subcategory })
    }

    /// Reverse-resolve a numeric path against the table alone (no overrides).
    ///
    /// Numeric codes are unique per scope after the integrity check, so at most
    /// one entry can match.
    pub fn resolve_numeric(&self, numeric: NumericPath) -> Result<Resolved<'_>, LookupError> {
        let layer = self
            .layer_by_numeric(numeric.layer)
            .ok_or_else(|| LookupError::UnknownLayer(numeric.layer.to_string()))?;

        let category = layer.category_by_numeric(numeric.category).ok_or_else(|| {
            LookupError::UnknownCategory {
                layer: layer.node.code.clone(),
                category: format!("{:03}", numeric.category),
            }
        })?;

        let subcategory = category
            .subcategories
            .iter()
            .find(|s| s.matches_numeric(numeric.subcategory))
            .ok_or_else(|| LookupError::UnknownSubcategory {
                layer: layer.node.code.clone(),
                category: category.node.code.clone(),
                subcategory: format!("{:03}", numeric.subcategory),
            })?;

        Ok(Resolved { layer, category, subcategory })
    }

    //every subcategory in canonical order
    pub fn iter_resolved(&self) -> impl Iterator<Item = Resolved<'_>> + '_ {
        self.layers.iter().flat_map(|layer| {
            layer.categories.iter().flat_map(move |category| {
                category
                    .subcategories
                    .iter()
                    .map(move |subcategory| Resolved { layer, category, subcategory })
            })
        })
    }
}
