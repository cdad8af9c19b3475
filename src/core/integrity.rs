// load-time integrity check
//
// Runs once when a table is built. Anything found here fails the load, so
// lookups never have to patch around missing or duplicated data.
use std::collections::{HashMap, HashSet};

use crate::core::error::IntegrityViolation;
use crate::core::table::TaxonomyTable;
use crate::core::types::TaxonomyNode;

const ROOT_SCOPE: &str = "<root>";
const LAYER_DIGITS: usize = 2;
const CHILD_DIGITS: usize = 3;

//codes become HFN segments, so nothing that could split or pad one
fn valid_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Raw override numerics obey the same widths as table codes.
pub(crate) fn override_numeric_well_formed(layer: &str, category: &str, subcategory: &str) -> bool {
    layer.len() <= LAYER_DIGITS && category.len() <= CHILD_DIGITS && subcategory.len() <= CHILD_DIGITS
}

fn qualify(scope: &str, code: &str) -> String {
    if scope == ROOT_SCOPE { code.to_string() } else { format!("{scope}.{code}") }
}

//well-formed unique codes (case-insensitive), unique numeric values, well-formed numerics
fn check_scope<'a>(
    scope: &str,
    nodes: impl Iterator<Item = &'a TaxonomyNode>,
    max_digits: usize,
    out: &mut Vec<IntegrityViolation>,
) {
    let mut codes = HashSet::new();
    let mut numerics: HashMap<u32, &TaxonomyNode> = HashMap::new();

    for node in nodes {
        if !valid_code(&node.code) {
            out.push(IntegrityViolation::InvalidCode {
                path: qualify(scope, &node.code),
                code: node.code.clone(),
            });
        }
        if !codes.insert(node.code.to_ascii_uppercase()) {
            out.push(IntegrityViolation::DuplicateCode { scope: scope.to_string(), code: node.code.clone() });
        }

        let well_formed = node.numeric_code.len() <= max_digits;
        match node.numeric_value().filter(|_| well_formed) {
            None => out.push(IntegrityViolation::InvalidNumeric {
                path: qualify(scope, &node.code),
                numeric: node.numeric_code.clone(),
            }),
            Some(value) => {
                if let Some(first) = numerics.insert(value, node) {
                    out.push(IntegrityViolation::DuplicateNumeric {
                        scope: scope.to_string(),
                        numeric: node.numeric_code.clone(),
                        first: first.code.clone(),
                        second: node.code.clone(),
                    });
                }
            }
        }
    }
}

pub fn check(table: &TaxonomyTable) -> Vec<IntegrityViolation> {
    let mut out = Vec::new();

    check_scope(ROOT_SCOPE, table.layers().iter().map(|l| &l.node), LAYER_DIGITS, &mut out);

    for layer in table.layers() {
        let layer_code = &layer.node.code;
        if layer.categories.is_empty() {
            out.push(IntegrityViolation::EmptyLayer(layer_code.clone()));
        }
        check_scope(layer_code, layer.categories.iter().map(|c| &c.node), CHILD_DIGITS, &mut out);

        for category in &layer.categories {
            let scope = format!("{}.{}", layer_code, category.node.code);
            if category.subcategories.is_empty() {
                out.push(IntegrityViolation::EmptyCategory(scope.clone()));
            }
            check_scope(&scope, category.subcategories.iter(), CHILD_DIGITS, &mut out);
        }
    }

    //an override may only move the subcategory numeric, never its parents
    for (path, numeric) in table.overrides().iter() {
        let Ok(target) = table.resolve(path) else {
            out.push(IntegrityViolation::OverrideTargetMissing(path.to_string()));
            continue;
        };

        let parents = (target.layer.node.numeric_value(), target.category.node.numeric_value());
        if parents != (Some(numeric.layer), Some(numeric.category)) {
            out.push(IntegrityViolation::OverrideParentMismatch {
                path: path.to_string(),
                expected: format!("{}.{}", target.layer.node.numeric_code, target.category.node.numeric_code),
                found: format!("{}.{:03}", numeric.layer, numeric.category),
            });
        }
    }

    out
}
