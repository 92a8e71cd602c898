use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Facility identifier as the service knows it. The optimizer keys facilities
/// by integer, hand-maintained registries sometimes use strings; both are
/// echoed back in the form they arrived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum FacilityId {
    Number(i64),
    Text(String),
}

impl Display for FacilityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for FacilityId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FacilityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cpf", default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Forwarded as the intake form sent it, number or string.
    #[serde(rename = "idade", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    #[serde(rename = "sexo", default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    #[serde(rename = "municipio", default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(rename = "endereco", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "lat", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "lon", default)]
    pub longitude: Option<f64>,
    /// Any other fields the intake form attached; forwarded untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Patient {
    pub fn new(name: &str, specialty: &str) -> Self {
        Self {
            name: name.to_string(),
            document: None,
            age: None,
            sex: None,
            specialty: specialty.to_string(),
            municipality: None,
            address: None,
            latitude: None,
            longitude: None,
            extra: Map::new(),
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Both coordinates, if geocoding produced usable values.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        geocoded(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateFacility {
    pub id: FacilityId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "municipio", default)]
    pub municipality: String,
    #[serde(rename = "unidade", default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "lat", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "lon", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "tempoEsperaDias", default, skip_serializing_if = "Option::is_none")]
    pub wait_days: Option<u32>,
}

impl CandidateFacility {
    pub fn new(id: impl Into<FacilityId>, name: &str, municipality: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            municipality: municipality.to_string(),
            unit_name: None,
            address: String::new(),
            latitude: None,
            longitude: None,
            wait_days: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_wait_days(mut self, days: u32) -> Self {
        self.wait_days = Some(days);
        self
    }

    pub fn with_unit_name(mut self, unit: &str) -> Self {
        self.unit_name = Some(unit.to_string());
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        geocoded(self.latitude, self.longitude)
    }
}

/// Zero and NaN are what a failed geocode leaves behind, so they count as
/// missing just like an absent value.
fn geocoded(latitude: Option<f64>, longitude: Option<f64>) -> Option<(f64, f64)> {
    let usable = |v: f64| v != 0.0 && !v.is_nan();
    match (latitude, longitude) {
        (Some(lat), Some(lon)) if usable(lat) && usable(lon) => Some((lat, lon)),
        _ => None,
    }
}

/// Input document for one allocation: the CLI request file and the REST body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    #[serde(rename = "paciente")]
    pub patient: Patient,
    #[serde(rename = "upaes")]
    pub candidates: Vec<CandidateFacility>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationResult {
    #[serde(rename = "sucesso")]
    pub success: bool,
    #[serde(rename = "paciente")]
    pub patient: Patient,
    #[serde(rename = "melhorOpcao")]
    pub best_option: AllocationOption,
    #[serde(rename = "alternativas")]
    pub alternatives: Vec<AllocationOption>,
    #[serde(rename = "explicacao")]
    pub explanation: Explanation,
}

impl AllocationResult {
    /// Best option first, then alternatives in service order.
    pub fn options(&self) -> impl Iterator<Item = &AllocationOption> {
        std::iter::once(&self.best_option).chain(self.alternatives.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationOption {
    #[serde(rename = "especialista")]
    pub facility: FacilityView,
    pub score: Option<f64>,
    #[serde(rename = "detalhes")]
    pub details: OptionDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacilityView {
    pub id: FacilityId,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(rename = "lon")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionDetails {
    #[serde(rename = "distancia")]
    pub distance_km: f64,
    #[serde(rename = "tempoEspera")]
    pub wait_days: u32,
    #[serde(rename = "custo")]
    pub cost: f64,
    #[serde(rename = "probabilidadeNoShow")]
    pub no_show_probability: f64,
    #[serde(rename = "tempoViagem")]
    pub travel_time: String,
    #[serde(rename = "numeroTransferencias")]
    pub transfers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    #[serde(rename = "fatores")]
    pub factors: Vec<ExplanationFactor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplanationFactor {
    #[serde(rename = "icone")]
    pub icon: String,
    #[serde(rename = "texto")]
    pub text: String,
}

impl ExplanationFactor {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            icon: String::new(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn facility_id_accepts_numbers_and_strings() {
        let numeric: FacilityId = serde_json::from_value(json!(7)).expect("numeric id");
        let text: FacilityId = serde_json::from_value(json!("upae-caruaru")).expect("text id");
        assert_eq!(numeric, FacilityId::Number(7));
        assert_eq!(text.to_string(), "upae-caruaru");
    }

    #[test]
    fn patient_keeps_unknown_intake_fields() {
        let patient: Patient = serde_json::from_value(json!({
            "nome": "Maria",
            "especialidade": "Cardiologia",
            "lat": -8.05,
            "lon": -34.9,
            "telefone": "81 99999-0000"
        }))
        .expect("patient");
        assert_eq!(patient.extra.get("telefone"), Some(&json!("81 99999-0000")));
        assert_eq!(patient.coordinates(), Some((-8.05, -34.9)));
    }

    #[test]
    fn textual_age_from_the_form_is_accepted() {
        let patient: Patient = serde_json::from_value(json!({
            "nome": "José",
            "idade": "58",
            "especialidade": "Ortopedia"
        }))
        .expect("patient with textual age");
        assert_eq!(patient.age, Some(json!("58")));
        let echoed = serde_json::to_value(&patient).expect("serializable");
        assert_eq!(echoed["idade"], json!("58"));
    }

    #[test]
    fn text_identifiers_build_facilities() {
        let facility = CandidateFacility::new("upae-1", "UPAE Ouricuri", "Ouricuri");
        assert_eq!(facility.id, FacilityId::Text("upae-1".to_string()));
    }

    #[test]
    fn zero_or_nan_coordinates_count_as_missing() {
        let facility = CandidateFacility::new(1, "UPAE Arcoverde", "Arcoverde");
        assert!(facility.clone().with_coordinates(0.0, -37.0).coordinates().is_none());
        assert!(facility.clone().with_coordinates(-8.4, f64::NAN).coordinates().is_none());
        assert!(facility.coordinates().is_none());
    }
}
