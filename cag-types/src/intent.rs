//! Detected conversational intent.

use serde::{Deserialize, Serialize};

/// Coarse intent classification. Variant names keep the Spanish labels of
/// the source taxonomy since the default language model is `es`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentName {
    BuscarInformacion,
    GenerarContenido,
    SolicitarOpinion,
    AccionComando,
    Saludar,
    Agradecer,
    Despedirse,
    Confirmar,
    Negar,
    Aclarar,
    Conversar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub name: IntentName,
    pub confidence: f32,
}
