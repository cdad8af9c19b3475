/*
Audit helper, not used on the hot path.

For one layer:
    enumerate every category and subcategory in canonical order
    build the canonical HFN with sequential 001
    convert it to an MFA

Entries that fail to convert are skipped and recorded as warnings, so one bad
row never hides the rest of the layer. A table that passed the integrity check
converts cleanly; the conversion is injectable so the skip path stays tested.
*/
use serde::Serialize;

use crate::core::error::LookupError;
use crate::core::resolver::TaxonomyResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub hfn: String,
    pub mfa: String,
    pub category_name: String,
    pub subcategory_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    pub layer: String,
    pub entries: Vec<MappingEntry>,
    pub warnings: Vec<String>,
}

impl MappingReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl TaxonomyResolver {
    /// Every HFN/MFA pair under `layer`. Unknown layers give an empty report.
    pub fn generate_all_mappings(&self, layer: &str) -> MappingReport {
        self.generate_mappings_with(layer, |hfn| self.hfn_to_mfa(hfn))
    }

    //enumeration comes from self, conversion from `convert`
    fn generate_mappings_with<F>(&self, layer: &str, convert: F) -> MappingReport
    where
        F: Fn(&str) -> Result<String, LookupError>,
    {
        let Some(layer_node) = self.layer(layer) else {
            return MappingReport { layer: layer.to_string(), ..MappingReport::default() };
        };
        let layer_code = layer_node.code.as_str();

        let mut report = MappingReport { layer: layer_code.to_string(), ..MappingReport::default() };

        for category in self.categories(layer_code) {
            for subcategory in self.subcategories(layer_code, &category.code) {
                let hfn = format!("{}.{}.{}.001", layer_code, category.code, subcategory.code);

                match convert(&hfn) {
                    Ok(mfa) => report.entries.push(MappingEntry {
                        hfn,
                        mfa,
                        category_name: category.name.clone(),
                        subcategory_name: subcategory.name.clone(),
                    }),
                    Err(e) => {
                        tracing::warn!(%hfn, error = %e, "skipping taxonomy entry that does not convert");
                        report.warnings.push(format!("{hfn}: {e}"));
                    }
                }
            }
        }

        report
    }
}
