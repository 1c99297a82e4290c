use crate::catalog::MedicationCatalog;
use crate::log::{SearchLogEntry, SearchLogStore};
use crate::medication::{Medication, PrescriptionInfo};
use medibot_core::{MediError, MediResult};
use std::sync::Arc;
use tracing::debug;

/// Lookup operations over the reference catalog, with search auditing.
pub struct MedicationService {
    catalog: Arc<MedicationCatalog>,
    log: Arc<dyn SearchLogStore>,
}

impl MedicationService {
    pub fn new(catalog: Arc<MedicationCatalog>, log: Arc<dyn SearchLogStore>) -> Self {
        Self { catalog, log }
    }

    /// Medications matching a common-use tag. Every search — including one
    /// with zero results — appends an audit entry; an empty result is an OK
    /// outcome, not an error.
    pub async fn search_by_common_use(&self, term: &str) -> MediResult<Vec<Medication>> {
        if term.trim().is_empty() {
            return Err(MediError::Validation(
                "El parámetro uso_comun es obligatorio".into(),
            ));
        }

        let matches: Vec<Medication> = self
            .catalog
            .search_by_common_use(term)?
            .into_iter()
            .cloned()
            .collect();

        let entry = SearchLogEntry::new(
            term.trim().to_lowercase(),
            matches.iter().map(|m| m.display_name().to_string()).collect(),
        );
        debug!(term = %entry.term, results = entry.result_count, "Common-use search logged");
        self.log.append(entry).await?;

        Ok(matches)
    }

    /// Detail lookup by commercial or generic name. `None` when nothing
    /// matches.
    pub fn find_by_name(&self, name: &str) -> MediResult<Option<Medication>> {
        if name.trim().is_empty() {
            return Err(MediError::Validation(
                "El parámetro nombre es obligatorio".into(),
            ));
        }
        Ok(self.catalog.find_by_name(name)?.cloned())
    }

    /// Prescription-requirement projection of the same name lookup.
    pub fn requires_prescription(&self, name: &str) -> MediResult<Option<PrescriptionInfo>> {
        if name.trim().is_empty() {
            return Err(MediError::Validation(
                "El parámetro nombre es obligatorio".into(),
            ));
        }
        Ok(self.catalog.find_by_name(name)?.map(PrescriptionInfo::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::log::InMemorySearchLogStore;

    fn service() -> (MedicationService, Arc<InMemorySearchLogStore>) {
        let catalog = MedicationCatalog::from_entries(vec![
            Medication {
                commercial_name: "Advil".into(),
                generic_name: "ibuprofeno".into(),
                description: "AINE".into(),
                common_uses: vec!["dolor de cabeza".into()],
                recommended_dose: "400 mg".into(),
                requires_prescription: false,
                warning: String::new(),
            },
            Medication {
                commercial_name: String::new(),
                generic_name: "acetaminofen".into(),
                description: "Analgésico".into(),
                common_uses: vec!["dolor de cabeza".into()],
                recommended_dose: "500 mg".into(),
                requires_prescription: false,
                warning: String::new(),
            },
        ]);
        let log = Arc::new(InMemorySearchLogStore::new());
        (
            MedicationService::new(Arc::new(catalog), log.clone()),
            log,
        )
    }

    #[tokio::test]
    async fn search_logs_display_names() {
        let (service, log) = service();
        let hits = service.search_by_common_use("Dolor").await.unwrap();
        assert_eq!(hits.len(), 2);

        let entries = log.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].term, "dolor");
        assert_eq!(entries[0].matched, vec!["Advil", "acetaminofen"]);
    }

    #[tokio::test]
    async fn zero_result_search_is_logged_and_ok() {
        let (service, log) = service();
        let hits = service.search_by_common_use("insomnio").await.unwrap();
        assert!(hits.is_empty());

        let entries = log.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].result_count, 0);
    }

    #[tokio::test]
    async fn blank_inputs_are_validation_errors() {
        let (service, _) = service();
        assert!(matches!(
            service.search_by_common_use("  ").await,
            Err(MediError::Validation(_))
        ));
        assert!(matches!(
            service.find_by_name(""),
            Err(MediError::Validation(_))
        ));
        assert!(matches!(
            service.requires_prescription(" "),
            Err(MediError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn prescription_projection() {
        let (service, _) = service();
        let info = service.requires_prescription("advil").unwrap().unwrap();
        assert!(!info.requires_prescription);
        assert_eq!(info.generic_name, "ibuprofeno");

        assert!(service.requires_prescription("aspirina").unwrap().is_none());
    }
}
