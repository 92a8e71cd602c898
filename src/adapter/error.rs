use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::types::FacilityId;

pub const GENERIC_OPTIMIZATION_FAILURE: &str = "Otimização falhou no servidor.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("facility {name} ({id}) has no valid coordinates; geocoding required")]
    FacilityMissingCoordinates { id: FacilityId, name: String },
    #[error("patient address could not be geocoded; check that the address is correct")]
    PatientMissingCoordinates,
}

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("optimization service did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("could not reach the optimization service: {0}")]
    Connectivity(String),

    #[error("optimization service returned HTTP {status}: {body_preview}")]
    Service { status: u16, body_preview: String },

    #[error("{message}")]
    OptimizationFailed { message: String },

    #[error("optimization service sent an unusable response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Timeout,
    Connectivity,
    Service,
    OptimizationFailed,
    MalformedResponse,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Validation => "validation",
            Self::Timeout => "timeout",
            Self::Connectivity => "connectivity",
            Self::Service => "service",
            Self::OptimizationFailed => "optimization_failed",
            Self::MalformedResponse => "malformed_response",
        };
        write!(f, "{display}")
    }
}

impl AllocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Connectivity(_) => ErrorKind::Connectivity,
            Self::Service { .. } => ErrorKind::Service,
            Self::OptimizationFailed { .. } => ErrorKind::OptimizationFailed,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    pub fn optimization_failed(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_OPTIMIZATION_FAILURE.to_string());
        Self::OptimizationFailed { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_kept_verbatim() {
        let err = AllocationError::optimization_failed(Some("X".to_string()));
        assert_eq!(err.kind(), ErrorKind::OptimizationFailed);
        assert_eq!(err.to_string(), "X");
    }

    #[test]
    fn missing_service_message_uses_generic_text() {
        let err = AllocationError::optimization_failed(None);
        assert_eq!(err.to_string(), GENERIC_OPTIMIZATION_FAILURE);
        let blank = AllocationError::optimization_failed(Some(String::new()));
        assert_eq!(blank.to_string(), GENERIC_OPTIMIZATION_FAILURE);
    }

    #[test]
    fn validation_error_names_the_facility() {
        let err: AllocationError = ValidationError::FacilityMissingCoordinates {
            id: FacilityId::Number(3),
            name: "UPAE Garanhuns".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("UPAE Garanhuns"));
    }
}
