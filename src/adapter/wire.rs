//! Request and response bodies exchanged with the optimization service.

use serde::{Deserialize, Serialize};

use crate::types::{FacilityId, Patient};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundPayload {
    /// The full patient object with its coordinates re-affirmed.
    #[serde(rename = "paciente")]
    pub patient: Patient,
    #[serde(rename = "upaes")]
    pub facilities: Vec<FacilityRecord>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FacilityRecord {
    pub id: FacilityId,
    pub nome: String,
    pub municipio: String,
    pub unidade: String,
    pub endereco: String,
    pub especialidades: Vec<String>,
    pub lat: f64,
    pub lon: f64,
    pub tempo_espera_dias: u32,
    pub transport_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOptimizationResponse {
    #[serde(rename = "sucesso", default)]
    pub success: bool,
    #[serde(rename = "mensagem", default)]
    pub message: Option<String>,
    #[serde(rename = "melhor_opcao", default)]
    pub best_option: Option<RawOption>,
    #[serde(rename = "alternativas", default)]
    pub alternatives: Option<Vec<RawOption>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOption {
    #[serde(rename = "upae")]
    pub facility: RawFacility,
    #[serde(rename = "distancia_km")]
    pub distance_km: f64,
    #[serde(rename = "prob_noshow")]
    pub no_show_probability: f64,
    #[serde(rename = "tempo_espera_dias", default)]
    pub wait_days: u32,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub fitness: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFacility {
    pub id: FacilityId,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "unidade", default)]
    pub unit: Option<String>,
    #[serde(rename = "municipio", default)]
    pub municipality: Option<String>,
    #[serde(rename = "endereco", default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}
