//! Read-only frequency rankings over accumulated history.
//!
//! These run independently from ingestion: callers fetch the raw records
//! (sessions, medication search logs) and feed the relevant values through
//! the ranking functions. Ties are broken in whatever order the counting map
//! yields them — the tie order is documented as non-deterministic.

use serde::Serialize;
use std::collections::HashMap;

/// How often one symptom value was reported across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomCount {
    #[serde(rename = "dolor")]
    pub symptom: String,
    #[serde(rename = "veces_reportado")]
    pub count: u64,
}

/// How often one medication display name appeared in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationCount {
    #[serde(rename = "medicamento")]
    pub medication: String,
    #[serde(rename = "veces_recomendado")]
    pub count: u64,
}

/// Top-`k` most-reported symptoms, descending by count. Empty symptom
/// values are excluded from the grouping.
pub fn top_symptoms<'a>(symptoms: impl IntoIterator<Item = &'a str>, k: usize) -> Vec<SymptomCount> {
    let counted = count(symptoms.into_iter().filter(|s| !s.is_empty()));
    let mut ranked: Vec<SymptomCount> = counted
        .into_iter()
        .map(|(symptom, count)| SymptomCount { symptom, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(k);
    ranked
}

/// Top-`k` most-recommended medications over the flattened result-name
/// lists of every search log entry, descending by count.
pub fn top_medications<'a>(
    names: impl IntoIterator<Item = &'a str>,
    k: usize,
) -> Vec<MedicationCount> {
    let counted = count(names.into_iter());
    let mut ranked: Vec<MedicationCount> = counted
        .into_iter()
        .map(|(medication, count)| MedicationCount { medication, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(k);
    ranked
}

fn count<'a>(values: impl Iterator<Item = &'a str>) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for value in values {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn symptoms_ranked_descending_excluding_empty() {
        let reported = ["cabeza", "espalda", "cabeza", "", "cabeza", "espalda"];
        let ranked = top_symptoms(reported.iter().copied(), 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(
            ranked[0],
            SymptomCount {
                symptom: "cabeza".into(),
                count: 3
            }
        );
        assert_eq!(ranked[1].count, 2);
    }

    #[test]
    fn top_k_truncates() {
        let reported = ["a", "a", "b", "c"];
        let ranked = top_symptoms(reported.iter().copied(), 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].symptom, "a");
    }

    #[test]
    fn single_search_counts_each_name_once() {
        let names = ["ibuprofeno", "acetaminofen"];
        let ranked = top_medications(names.iter().copied(), 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|m| m.count == 1));
    }

    #[test]
    fn repeated_searches_accumulate() {
        let names = ["ibuprofeno", "acetaminofen", "ibuprofeno"];
        let ranked = top_medications(names.iter().copied(), 10);
        assert_eq!(ranked[0].medication, "ibuprofeno");
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn empty_history_yields_empty_ranking() {
        assert!(top_symptoms(std::iter::empty(), 10).is_empty());
        assert!(top_medications(std::iter::empty(), 10).is_empty());
    }
}
