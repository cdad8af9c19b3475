use std::path::PathBuf;

/// Environment variable naming a TOON file that replaces the embedded table.
pub const TAXONOMY_FILE_ENV: &str = "NNA_TAXONOMY_FILE";

/// Where the reference table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaxonomySource {
    #[default]
    Embedded,
    File(PathBuf),
}

impl TaxonomySource {
    /// `NNA_TAXONOMY_FILE` if set and non-empty, otherwise the embedded table.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(TAXONOMY_FILE_ENV).ok())
    }

    fn from_env_value(value: Option<String>) -> Self {
        match value {
            Some(path) if !path.trim().is_empty() => Self::File(PathBuf::from(path.trim())),
            _ => Self::Embedded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_missing_env_falls_back_to_embedded() {
        assert_eq!(TaxonomySource::from_env_value(None), TaxonomySource::Embedded);
        assert_eq!(TaxonomySource::from_env_value(Some("  ".into())), TaxonomySource::Embedded);
    }

    #[test]
    fn env_path_selects_file() {
        assert_eq!(
            TaxonomySource::from_env_value(Some("/etc/nna/taxonomy.toon".into())),
            TaxonomySource::File(PathBuf::from("/etc/nna/taxonomy.toon"))
        );
    }
}
