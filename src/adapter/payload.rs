use crate::adapter::error::{AllocationError, ValidationError};
use crate::adapter::wire::{FacilityRecord, OutboundPayload};
use crate::estimates::TRANSPORT_SCORE;
use crate::types::{CandidateFacility, Patient};

/// Validates every coordinate and builds the request body. Facilities are
/// checked first, in order, and the first one without coordinates aborts the
/// whole request.
pub fn build_payload(
    patient: &Patient,
    candidates: &[CandidateFacility],
) -> Result<OutboundPayload, AllocationError> {
    let facilities = candidates
        .iter()
        .map(|facility| facility_record(facility, &patient.specialty))
        .collect::<Result<Vec<_>, _>>()?;

    let (lat, lon) = patient
        .coordinates()
        .ok_or(ValidationError::PatientMissingCoordinates)?;

    Ok(OutboundPayload {
        patient: patient.clone().with_coordinates(lat, lon),
        facilities,
    })
}

fn facility_record(
    facility: &CandidateFacility,
    specialty: &str,
) -> Result<FacilityRecord, ValidationError> {
    let (lat, lon) =
        facility
            .coordinates()
            .ok_or_else(|| ValidationError::FacilityMissingCoordinates {
                id: facility.id.clone(),
                name: facility.name.clone(),
            })?;

    let unit = facility
        .unit_name
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or(&facility.name)
        .to_string();

    Ok(FacilityRecord {
        id: facility.id.clone(),
        nome: facility.name.clone(),
        municipio: facility.municipality.clone(),
        unidade: unit,
        endereco: facility.address.clone(),
        especialidades: vec![specialty.to_string()],
        lat,
        lon,
        tempo_espera_dias: facility.wait_days.unwrap_or(0),
        transport_score: TRANSPORT_SCORE,
    })
}
