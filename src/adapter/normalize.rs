use rust_decimal::{Decimal, RoundingStrategy};

use crate::adapter::error::AllocationError;
use crate::adapter::wire::{RawFacility, RawOption, RawOptimizationResponse};
use crate::estimates::{transfer_count, transport_cost, travel_time_estimate, DEFAULT_MUNICIPALITY};
use crate::types::{
    AllocationOption, AllocationResult, Explanation, ExplanationFactor, FacilityView,
    OptionDetails, Patient,
};

const METHOD_STATEMENT: &str = "Calculado com algoritmo genético de otimização multiobjetivo";

/// Maps a successful service reply onto the shape the results view consumes.
///
/// Each option keeps the service's `score`; when the service sent no `score`
/// the `fitness` value is used instead, and nothing else is consulted. Cost,
/// travel time and transfer count are derived from `distancia_km` alone,
/// while wait days and no-show probability pass through unchanged.
///
/// The explanation is built from the best option only. The function is pure:
/// the same response always yields an equal result.
pub fn adapt_optimization_response(
    raw: &RawOptimizationResponse,
    patient: &Patient,
) -> Result<AllocationResult, AllocationError> {
    let best = raw.best_option.as_ref().ok_or_else(|| {
        AllocationError::MalformedResponse("successful response without melhor_opcao".to_string())
    })?;

    Ok(AllocationResult {
        success: true,
        patient: patient.clone(),
        best_option: format_option(best),
        alternatives: raw
            .alternatives
            .iter()
            .flatten()
            .map(format_option)
            .collect(),
        explanation: explain(best),
    })
}

fn format_option(option: &RawOption) -> AllocationOption {
    let distance = option.distance_km;
    AllocationOption {
        facility: facility_view(&option.facility),
        score: option.score.or(option.fitness),
        details: OptionDetails {
            distance_km: distance,
            wait_days: option.wait_days,
            cost: transport_cost(distance),
            no_show_probability: option.no_show_probability,
            travel_time: travel_time_estimate(distance),
            transfers: transfer_count(distance),
        },
    }
}

fn facility_view(facility: &RawFacility) -> FacilityView {
    let display = non_blank(&facility.name)
        .or_else(|| non_blank(&facility.unit))
        .unwrap_or_default()
        .to_string();
    let municipality = non_blank(&facility.municipality)
        .unwrap_or(DEFAULT_MUNICIPALITY)
        .to_string();

    FacilityView {
        id: facility.id.clone(),
        unit: display.clone(),
        name: display,
        municipality,
        address: facility.address.clone(),
        latitude: facility.lat,
        longitude: facility.lon,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn explain(best: &RawOption) -> Explanation {
    Explanation {
        factors: vec![
            ExplanationFactor::text(format!(
                "Distância otimizada: {} km",
                one_decimal(best.distance_km)
            )),
            ExplanationFactor::text(format!("Tempo de espera: {} dias", best.wait_days)),
            ExplanationFactor::text(format!(
                "Baixa probabilidade de falta: {}%",
                one_decimal(best.no_show_probability)
            )),
            ExplanationFactor::text(METHOD_STATEMENT),
        ],
    }
}

/// One decimal place, with an exact midpoint of the stored binary value
/// rounded away from zero: 12.25 gives "12.3" while 12.35, stored just below
/// the midpoint, gives "12.3" too.
fn one_decimal(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded =
                exact.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            format!("{rounded:.1}")
        }
        None => format!("{value:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::FacilityId;

    fn raw(value: serde_json::Value) -> RawOptimizationResponse {
        serde_json::from_value(value).expect("valid raw response")
    }

    fn sample() -> RawOptimizationResponse {
        raw(json!({
            "sucesso": true,
            "melhor_opcao": {
                "upae": {
                    "id": 4,
                    "nome": "UPAE Caruaru",
                    "unidade": "Unidade Caruaru",
                    "municipio": "Caruaru",
                    "endereco": "Av. Agamenon Magalhães, s/n",
                    "lat": -8.28,
                    "lon": -35.97,
                    "especialidades": ["Cardiologia"],
                    "transport_score": 0.7
                },
                "distancia_km": 12.34,
                "prob_noshow": 7.26,
                "tempo_espera_dias": 15,
                "fitness": 0.61,
                "score": 0.83
            },
            "alternativas": [
                {
                    "upae": { "id": 5, "unidade": "UPAE Garanhuns", "lat": -8.89, "lon": -36.49 },
                    "distancia_km": 25.0,
                    "prob_noshow": 9.0,
                    "tempo_espera_dias": 3,
                    "fitness": 0.42
                }
            ],
            "diagnosticos": { "geracoes": 100 }
        }))
    }

    fn patient() -> Patient {
        Patient::new("Maria", "Cardiologia").with_coordinates(-8.06, -34.87)
    }

    #[test]
    fn details_match_the_estimate_functions() {
        let result = adapt_optimization_response(&sample(), &patient()).expect("normalized");
        let details = &result.best_option.details;
        assert_eq!(details.distance_km, 12.34);
        assert_eq!(details.wait_days, 15);
        assert_eq!(details.no_show_probability, 7.26);
        assert_eq!(details.cost, transport_cost(12.34));
        assert_eq!(details.travel_time, travel_time_estimate(12.34));
        assert_eq!(details.transfers, transfer_count(12.34));
    }

    #[test]
    fn score_prefers_score_then_fitness() {
        let result = adapt_optimization_response(&sample(), &patient()).expect("normalized");
        assert_eq!(result.best_option.score, Some(0.83));
        assert_eq!(result.alternatives[0].score, Some(0.42));
    }

    #[test]
    fn facility_view_prefers_name_and_defaults_region() {
        let result = adapt_optimization_response(&sample(), &patient()).expect("normalized");
        assert_eq!(result.best_option.facility.name, "UPAE Caruaru");
        assert_eq!(result.best_option.facility.unit, "UPAE Caruaru");
        assert_eq!(result.best_option.facility.municipality, "Caruaru");

        let alternative = &result.alternatives[0].facility;
        assert_eq!(alternative.id, FacilityId::Number(5));
        assert_eq!(alternative.name, "UPAE Garanhuns");
        assert_eq!(alternative.municipality, "RMR");
        assert_eq!(alternative.latitude, Some(-8.89));
    }

    #[test]
    fn explanation_comes_from_best_option() {
        let result = adapt_optimization_response(&sample(), &patient()).expect("normalized");
        let texts = result
            .explanation
            .factors
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            texts,
            vec![
                "Distância otimizada: 12.3 km",
                "Tempo de espera: 15 dias",
                "Baixa probabilidade de falta: 7.3%",
                METHOD_STATEMENT,
            ]
        );
    }

    #[test]
    fn explanation_rounds_exact_midpoints_up() {
        assert_eq!(one_decimal(12.25), "12.3");
        assert_eq!(one_decimal(3.25), "3.3");
        assert_eq!(one_decimal(12.35), "12.3");
        assert_eq!(one_decimal(25.0), "25.0");
        assert_eq!(one_decimal(7.26), "7.3");

        let response = raw(json!({
            "sucesso": true,
            "melhor_opcao": {
                "upae": { "id": 1, "nome": "UPAE Caruaru" },
                "distancia_km": 12.25,
                "prob_noshow": 6.25,
                "tempo_espera_dias": 10
            }
        }));
        let result = adapt_optimization_response(&response, &patient()).expect("normalized");
        assert_eq!(result.explanation.factors[0].text, "Distância otimizada: 12.3 km");
        assert_eq!(
            result.explanation.factors[2].text,
            "Baixa probabilidade de falta: 6.3%"
        );
    }

    #[test]
    fn normalizing_twice_yields_equal_results() {
        let response = sample();
        let first = adapt_optimization_response(&response, &patient()).expect("normalized");
        let second = adapt_optimization_response(&response, &patient()).expect("normalized");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_alternatives_is_an_empty_list() {
        let response = raw(json!({
            "sucesso": true,
            "melhor_opcao": {
                "upae": { "id": "upae-1", "nome": "UPAE Salgueiro" },
                "distancia_km": 4.0,
                "prob_noshow": 2.0,
                "tempo_espera_dias": 0
            }
        }));
        let result = adapt_optimization_response(&response, &patient()).expect("normalized");
        assert!(result.alternatives.is_empty());
        assert_eq!(result.best_option.score, None);
    }

    #[test]
    fn success_without_best_option_is_malformed() {
        let response = raw(json!({ "sucesso": true, "alternativas": [] }));
        let err = adapt_optimization_response(&response, &patient()).expect_err("must fail");
        assert!(matches!(err, AllocationError::MalformedResponse(_)));
    }
}
