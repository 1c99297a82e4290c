use serde::{Deserialize, Serialize};

/// One row of the static medication reference table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    #[serde(rename = "nombre_comercial")]
    pub commercial_name: String,
    #[serde(rename = "nombre_generico")]
    pub generic_name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Common-use tags this medication is indicated for.
    #[serde(rename = "uso_comun", default)]
    pub common_uses: Vec<String>,
    #[serde(rename = "dosis_recomendada")]
    pub recommended_dose: String,
    #[serde(rename = "requiere_receta")]
    pub requires_prescription: bool,
    #[serde(rename = "advertencia")]
    pub warning: String,
}

impl Medication {
    /// The name recorded in search logs: commercial name, falling back to
    /// the generic one.
    pub fn display_name(&self) -> &str {
        if self.commercial_name.is_empty() {
            &self.generic_name
        } else {
            &self.commercial_name
        }
    }
}

/// Projection of a medication down to its prescription requirement.
#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionInfo {
    #[serde(rename = "nombre_comercial")]
    pub commercial_name: String,
    #[serde(rename = "nombre_generico")]
    pub generic_name: String,
    #[serde(rename = "requiere_receta")]
    pub requires_prescription: bool,
}

impl From<&Medication> for PrescriptionInfo {
    fn from(med: &Medication) -> Self {
        Self {
            commercial_name: med.commercial_name.clone(),
            generic_name: med.generic_name.clone(),
            requires_prescription: med.requires_prescription,
        }
    }
}
