use crate::medication::Medication;
use medibot_core::{MediError, MediResult};
use regex::RegexBuilder;
use std::path::Path;

/// In-process copy of the medication reference table.
///
/// Loaded once at startup and never mutated; all lookups are
/// case-insensitive substring matches, mirroring how the reference data was
/// always queried.
pub struct MedicationCatalog {
    entries: Vec<Medication>,
}

impl MedicationCatalog {
    pub fn from_entries(entries: Vec<Medication>) -> Self {
        Self { entries }
    }

    /// Loads the catalog from a JSON array file.
    pub async fn load(path: &Path) -> MediResult<Self> {
        let data = tokio::fs::read_to_string(path).await?;
        let entries: Vec<Medication> = serde_json::from_str(&data)
            .map_err(|e| MediError::Store(format!("invalid medication catalog: {e}")))?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Medications with any common-use tag matching `term`
    /// (case-insensitive substring).
    pub fn search_by_common_use(&self, term: &str) -> MediResult<Vec<&Medication>> {
        let matcher = case_insensitive(term)?;
        Ok(self
            .entries
            .iter()
            .filter(|m| m.common_uses.iter().any(|u| matcher.is_match(u)))
            .collect())
    }

    /// First medication whose commercial or generic name matches `name`
    /// (case-insensitive substring).
    pub fn find_by_name(&self, name: &str) -> MediResult<Option<&Medication>> {
        let matcher = case_insensitive(name)?;
        Ok(self
            .entries
            .iter()
            .find(|m| matcher.is_match(&m.commercial_name) || matcher.is_match(&m.generic_name)))
    }
}

fn case_insensitive(term: &str) -> MediResult<regex::Regex> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map_err(|e| MediError::Validation(format!("término de búsqueda inválido: {e}")))
}
