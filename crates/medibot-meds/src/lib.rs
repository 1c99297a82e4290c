//! Static medication reference data and the append-only search audit log.
//!
//! The reference table is read-only input to keyword/tag lookups; every
//! common-use search also writes one [`SearchLogEntry`], which is the sole
//! input to the most-recommended-medications ranking.

pub mod catalog;
pub mod log;
pub mod medication;
pub mod search;

pub use catalog::MedicationCatalog;
pub use log::{FileSearchLogStore, InMemorySearchLogStore, SearchLogEntry, SearchLogStore};
pub use medication::{Medication, PrescriptionInfo};
pub use search::MedicationService;
