// HFN <-> MFA conversion over a validated taxonomy table
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::address::{parse_hfn, parse_mfa, Tail};
use crate::core::config::TaxonomySource;
use crate::core::error::{LoadError, LookupError};
use crate::core::table::{Resolved, TaxonomyTable};
use crate::core::types::{AddressPair, AlphaPath, Ambiguity, NumericPath, TaxonomyNode};

static RESOLVER: OnceLock<Result<TaxonomyResolver, LoadError>> = OnceLock::new();

/// Process-wide resolver, loaded once from [`TaxonomySource::from_env`].
///
/// The first call does the load; every later call returns the cached result,
/// including a cached failure.
pub fn init() -> Result<&'static TaxonomyResolver, LoadError> {
    RESOLVER
        .get_or_init(|| TaxonomyResolver::from_source(&TaxonomySource::from_env()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Resolves taxonomy selections and converts between HFN and MFA.
///
/// Immutable after construction; share it freely across threads.
///
/// Reverse conversion is not a perfect inverse: an override can move a path
/// onto a numeric triple that the table also assigns to another path (for
/// example `W.BCH.SUN` and `W.BCH.FES` both produce `5.004.003`). Such ties
/// are reported by [`ambiguities`](Self::ambiguities) and broken the same way
/// on every call: the override owner wins, then canonical table order.
///
/// The table numeric an override replaces still reverse-resolves to its row:
/// `5.004.004` gives `W.BCH.SUN` even though forward conversion only ever
/// produces `5.004.003` for it. Such legacy addresses are accepted by both
/// reverse calls.
#[derive(Debug, Clone)]
pub struct TaxonomyResolver {
    table: TaxonomyTable,
    //effective numeric path -> every alpha path converting to it, tie-break order
    claims: BTreeMap<NumericPath, Vec<AlphaPath>>,
    ambiguities: Vec<Ambiguity>,
}

impl TaxonomyResolver {
    pub fn new(table: TaxonomyTable) -> Self {
        let mut claims: BTreeMap<NumericPath, Vec<AlphaPath>> = BTreeMap::new();
        for resolved in table.iter_resolved() {
            if let Some(numeric) = effective_numeric(&table, &resolved) {
                claims.entry(numeric).or_default().push(resolved.alpha_path());
            }
        }

        for (numeric, paths) in claims.iter_mut() {
            if let Some(owner) = table.overrides().path_for(*numeric) {
                let owner = owner.key();
                if let Some(pos) = paths.iter().position(|p| p.key() == owner) {
                    let owner = paths.remove(pos);
                    paths.insert(0, owner);
                }
            }
        }

        let ambiguities: Vec<Ambiguity> = claims
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(numeric, paths)| Ambiguity {
                numeric: numeric.to_string(),
                candidates: paths.iter().map(|p| p.to_string()).collect(),
            })
            .collect();

        for a in &ambiguities {
            tracing::warn!(
                numeric = %a.numeric,
                candidates = ?a.candidates,
                "numeric path is claimed by more than one taxonomy path, reverse lookup picks {}",
                a.candidates[0]
            );
        }

        tracing::info!(
            layers = table.layers().len(),
            subcategories = claims.values().map(Vec::len).sum::<usize>(),
            overrides = table.overrides().len(),
            ambiguities = ambiguities.len(),
            "loaded taxonomy table"
        );

        Self { table, claims, ambiguities }
    }

    pub fn embedded() -> Result<Self, LoadError> {
        Ok(Self::new(TaxonomyTable::embedded()?))
    }

    pub fn from_toon(source: &str) -> Result<Self, LoadError> {
        Ok(Self::new(TaxonomyTable::from_toon(source)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Read { path: path.to_path_buf(), message: e.to_string() })?;
        Self::from_toon(&source)
    }

    pub fn from_source(source: &TaxonomySource) -> Result<Self, LoadError> {
        match source {
            TaxonomySource::Embedded => Self::embedded(),
            TaxonomySource::File(path) => Self::load(path),
        }
    }

    pub fn table(&self) -> &TaxonomyTable {
        &self.table
    }

    // ---- enumeration: unknown keys give empty lists, never errors ----

    pub fn layers(&self) -> Vec<&TaxonomyNode> {
        self.table.layers().iter().map(|l| &l.node).collect()
    }

    pub fn layer(&self, code: &str) -> Option<&TaxonomyNode> {
        self.table.layer(code).map(|l| &l.node)
    }

    /// Categories of `layer` in canonical order, empty if the layer is unknown.
    pub fn categories(&self, layer: &str) -> Vec<&TaxonomyNode> {
        match self.table.layer(layer) {
            Some(l) => l.categories.iter().map(|c| &c.node).collect(),
            None => Vec::new(),
        }
    }

    /// Subcategories of `layer.category` in canonical order, empty if the pair is unknown.
    pub fn subcategories(&self, layer: &str, category: &str) -> Vec<&TaxonomyNode> {
        match self.table.category(layer, category) {
            Some(c) => c.subcategories.iter().collect(),
            None => Vec::new(),
        }
    }

    // ---- validation / conversion ----

    /// True when the first three segments name an existing layer, category
    /// and subcategory. Never fails.
    pub fn validate_hfn(&self, hfn: &str) -> bool {
        parse_hfn(hfn).and_then(|p| self.table.resolve(&p.path).map(|_| ())).is_ok()
    }

    /// Canonical spelling of a valid HFN: table-case codes, padded sequential.
    pub fn normalize_hfn(&self, hfn: &str) -> Result<String, LookupError> {
        let parsed = parse_hfn(hfn)?;
        let path = self.table.resolve(&parsed.path)?.alpha_path();
        Ok(parsed.tail.append_to(path.to_string()))
    }

    pub fn hfn_to_mfa(&self, hfn: &str) -> Result<String, LookupError> {
        let parsed = parse_hfn(hfn)?;
        let numeric = self.forward(&parsed.path)?;
        Ok(parsed.tail.append_to(numeric.to_string()))
    }

    /// Reverse conversion with deterministic tie-breaking, see the type docs.
    pub fn mfa_to_hfn(&self, mfa: &str) -> Result<String, LookupError> {
        let parsed = parse_mfa(mfa)?;
        let path = self.reverse(parsed.path)?;

        if self.claims.get(&parsed.path).is_some_and(|c| c.len() > 1) {
            tracing::debug!(mfa, picked = %path, "ambiguous numeric path, using tie-break");
        }

        Ok(parsed.tail.append_to(path.to_string()))
    }

    /// Like [`mfa_to_hfn`](Self::mfa_to_hfn), but fails with
    /// [`LookupError::AmbiguousMapping`] instead of breaking a tie.
    pub fn mfa_to_hfn_strict(&self, mfa: &str) -> Result<String, LookupError> {
        let parsed = parse_mfa(mfa)?;
        let path = self.reverse(parsed.path)?;

        let mut candidates: Vec<AlphaPath> =
            self.claims.get(&parsed.path).cloned().unwrap_or_default();
        if !candidates.contains(&path) {
            candidates.insert(0, path.clone());
        }

        if candidates.len() > 1 {
            return Err(LookupError::AmbiguousMapping {
                mfa: mfa.trim().to_string(),
                candidates: candidates.iter().map(|p| p.to_string()).collect(),
            });
        }

        Ok(parsed.tail.append_to(path.to_string()))
    }

    /// Build the address pair for a UI selection plus sequence number.
    pub fn compose(
        &self,
        layer: &str,
        category: &str,
        subcategory: &str,
        sequence: u32,
    ) -> Result<AddressPair, LookupError> {
        let path = self.table.resolve(&AlphaPath::new(layer, category, subcategory))?.alpha_path();
        let numeric = self.forward(&path)?;
        let tail = Tail { sequential: Some(format!("{sequence:03}")), rest: Vec::new() };

        Ok(AddressPair {
            hfn: tail.append_to(path.to_string()),
            mfa: tail.append_to(numeric.to_string()),
        })
    }

    /// Numeric paths claimed by more than one alphabetic path, found at load.
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    //override first, then the table
    fn forward(&self, path: &AlphaPath) -> Result<NumericPath, LookupError> {
        if let Some(numeric) = self.table.overrides().numeric_for(path) {
            return Ok(numeric);
        }

        let resolved = self.table.resolve(path)?;
        effective_numeric(&self.table, &resolved).ok_or_else(|| LookupError::UnknownSubcategory {
            layer: resolved.layer.node.code.clone(),
            category: resolved.category.node.code.clone(),
            subcategory: resolved.subcategory.code.clone(),
        })
    }

    fn reverse(&self, numeric: NumericPath) -> Result<AlphaPath, LookupError> {
        if let Some(owner) = self.table.overrides().path_for(numeric) {
            return Ok(self.table.resolve(owner)?.alpha_path());
        }
        Ok(self.table.resolve_numeric(numeric)?.alpha_path())
    }
}

//integrity guarantees numeric table codes, so None never survives a load
fn effective_numeric(table: &TaxonomyTable, resolved: &Resolved<'_>) -> Option<NumericPath> {
    table
        .overrides()
        .numeric_for(&resolved.alpha_path())
        .or_else(|| resolved.table_numeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> TaxonomyResolver {
        TaxonomyResolver::embedded().unwrap()
    }

    fn codes(nodes: &[&TaxonomyNode]) -> Vec<String> {
        nodes.iter().map(|n| n.code.clone()).collect()
    }

    #[test]
    fn override_precedence_regressions() {
        let r = resolver();
        assert_eq!(r.hfn_to_mfa("S.POP.HPM.001").unwrap(), "2.001.007.001");
        assert_eq!(r.hfn_to_mfa("W.BCH.SUN.001").unwrap(), "5.004.003.001");
    }

    #[test]
    fn hpm_numeric_is_not_its_position() {
        let r = resolver();
        let subs = r.subcategories("S", "POP");
        let pos = subs.iter().position(|n| n.code == "HPM").unwrap();
        assert_ne!(format!("{:03}", pos + 1), "007");
        assert_eq!(subs[pos].numeric_code, "007");
    }

    #[test]
    fn extension_passes_through() {
        let r = resolver();
        assert_eq!(r.hfn_to_mfa("W.BCH.SUN.002.mp4").unwrap(), "5.004.003.002.mp4");
        assert_eq!(r.hfn_to_mfa("W.BCH.SUN.2.final.mp4").unwrap(), "5.004.003.002.final.mp4");
        assert_eq!(r.hfn_to_mfa("W.BCH.SUN.4294967296").unwrap(), "5.004.003.4294967296");
    }

    #[test]
    fn conversion_is_case_insensitive_and_deterministic() {
        let r = resolver();
        let first = r.hfn_to_mfa("w.bch.sun.001").unwrap();
        for _ in 0..10 {
            assert_eq!(r.hfn_to_mfa("w.bch.sun.001").unwrap(), first);
        }
    }

    #[test]
    fn layer_numeric_is_not_padded() {
        let r = resolver();
        assert_eq!(r.hfn_to_mfa("R.LIC.EXC.001").unwrap(), "10.001.002.001");
        assert_eq!(r.mfa_to_hfn("10.001.002.001").unwrap(), "R.LIC.EXC.001");
    }

    #[test]
    fn three_segment_hfn_converts_without_sequential() {
        let r = resolver();
        assert_eq!(r.hfn_to_mfa("G.POP.BAS").unwrap(), "1.001.001");
    }

    #[test]
    fn validation() {
        let r = resolver();
        assert!(r.validate_hfn("W.BCH.SUN.001"));
        assert!(r.validate_hfn("W.BCH.SUN"));
        assert!(!r.validate_hfn("W.NOPE.SUN.001"));
        assert!(!r.validate_hfn("garbage"));
        assert!(!r.validate_hfn(""));
    }

    #[test]
    fn enumeration_soft_fails() {
        let r = resolver();
        assert!(r.categories("ZZ").is_empty());
        assert!(r.subcategories("W", "ZZZ").is_empty());
        assert!(r.subcategories("ZZ", "BCH").is_empty());
    }

    #[test]
    fn enumeration_keeps_canonical_order() {
        let r = resolver();
        assert_eq!(codes(&r.categories("W")), vec!["CLB", "STG", "URB", "BCH", "NAT"]);
        assert_eq!(codes(&r.subcategories("w", "bch")), vec!["BAS", "TRO", "FES", "SUN", "PRT"]);
        assert_eq!(r.layers().len(), 10);
        assert_eq!(r.layer("r").map(|n| n.name.as_str()), Some("Rights"));
    }

    #[test]
    fn conversion_hard_fails() {
        let r = resolver();
        assert_eq!(r.hfn_to_mfa("ZZ.POP.BAS.001").unwrap_err(), LookupError::UnknownLayer("ZZ".into()));
        assert!(matches!(r.hfn_to_mfa("onlyonesegment").unwrap_err(), LookupError::Malformed { .. }));
        assert!(matches!(
            r.hfn_to_mfa("W.BCH.NOPE.001").unwrap_err(),
            LookupError::UnknownSubcategory { .. }
        ));
        assert!(matches!(r.mfa_to_hfn("5.099.001.001").unwrap_err(), LookupError::UnknownCategory { .. }));
        assert!(matches!(r.mfa_to_hfn("42.001.001.001").unwrap_err(), LookupError::UnknownLayer(_)));
        assert!(matches!(r.mfa_to_hfn("5.004").unwrap_err(), LookupError::Malformed { .. }));
    }

    #[test]
    fn round_trip_where_unambiguous() {
        let r = resolver();
        let ambiguous: Vec<&String> = r.ambiguities().iter().flat_map(|a| &a.candidates).collect();

        let mut checked = 0;
        for resolved in r.table().iter_resolved() {
            let path = resolved.alpha_path().to_string();
            if ambiguous.contains(&&path) {
                continue;
            }
            let hfn = format!("{path}.001");
            let mfa = r.hfn_to_mfa(&hfn).unwrap();
            assert_eq!(r.mfa_to_hfn(&mfa).unwrap(), hfn, "via {mfa}");
            checked += 1;
        }
        assert!(checked > 80);
    }

    #[test]
    fn beach_sunset_collision_is_reported_and_broken_deterministically() {
        let r = resolver();
        assert_eq!(
            r.ambiguities(),
            &[Ambiguity {
                numeric: "5.004.003".into(),
                candidates: vec!["W.BCH.SUN".into(), "W.BCH.FES".into()],
            }]
        );

        for _ in 0..5 {
            assert_eq!(r.mfa_to_hfn("5.004.003.001").unwrap(), "W.BCH.SUN.001");
        }
        assert_eq!(r.hfn_to_mfa("W.BCH.FES.001").unwrap(), "5.004.003.001");

        match r.mfa_to_hfn_strict("5.004.003.001").unwrap_err() {
            LookupError::AmbiguousMapping { mfa, candidates } => {
                assert_eq!(mfa, "5.004.003.001");
                assert_eq!(candidates, vec!["W.BCH.SUN".to_string(), "W.BCH.FES".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn replaced_table_numeric_still_reverse_resolves() {
        let r = resolver();
        assert_eq!(r.mfa_to_hfn("5.004.004.001").unwrap(), "W.BCH.SUN.001");
        assert_eq!(r.mfa_to_hfn_strict("5.004.004.001").unwrap(), "W.BCH.SUN.001");
        assert_ne!(r.hfn_to_mfa("W.BCH.SUN.001").unwrap(), "5.004.004.001");
    }

    #[test]
    fn strict_reverse_passes_unambiguous_addresses() {
        let r = resolver();
        assert_eq!(r.mfa_to_hfn_strict("2.001.007.001").unwrap(), "S.POP.HPM.001");
        assert_eq!(r.mfa_to_hfn_strict("5.4.5.1.jpg").unwrap(), "W.BCH.PRT.001.jpg");
    }

    #[test]
    fn normalize_canonicalizes_case_and_padding() {
        let r = resolver();
        assert_eq!(r.normalize_hfn("s.pop.hpm.7.png").unwrap(), "S.POP.HPM.007.png");
        assert!(r.normalize_hfn("S.POP.NOPE.001").is_err());
    }

    #[test]
    fn compose_builds_both_addresses() {
        let r = resolver();
        assert_eq!(
            r.compose("s", "pop", "hpm", 12).unwrap(),
            AddressPair { hfn: "S.POP.HPM.012".into(), mfa: "2.001.007.012".into() }
        );
        assert!(r.compose("S", "POP", "ZZZ", 1).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = TaxonomyResolver::load("/nonexistent/nna/taxonomy.toon").unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn global_resolver_initializes_once() {
        let a = init().unwrap() as *const TaxonomyResolver;
        let b = init().unwrap() as *const TaxonomyResolver;
        assert_eq!(a, b);
    }

    #[test]
    fn resolver_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TaxonomyResolver>();

        let r = std::sync::Arc::new(resolver());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = r.clone();
                std::thread::spawn(move || r.hfn_to_mfa("S.POP.HPM.001").unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "2.001.007.001");
        }
    }
}
