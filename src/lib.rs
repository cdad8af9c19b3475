//! Taxonomy code resolution for the NNA asset registry.
//!
//! Converts between Human-Friendly Names (`W.BCH.SUN.001`) and
//! Machine-Friendly Addresses (`5.004.003.001`) using a static, validated
//! layer/category/subcategory table plus a small table of explicit overrides.
//!
//! ```no_run
//! let resolver = nna_taxonomy::init()?;
//! assert_eq!(resolver.hfn_to_mfa("S.POP.HPM.001")?, "2.001.007.001");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod mapping;

pub use crate::core::config::{TaxonomySource, TAXONOMY_FILE_ENV};
pub use crate::core::error::{IntegrityViolation, LoadError, LookupError};
pub use crate::core::resolver::{init, TaxonomyResolver};
pub use crate::core::table::{TaxonomyTable, EMBEDDED_TAXONOMY};
pub use crate::core::types::{AddressPair, AlphaPath, Ambiguity, Category, Layer, NumericPath, TaxonomyNode};
pub use crate::mapping::generator::{MappingEntry, MappingReport};
