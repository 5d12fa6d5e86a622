use crate::domain::permissions::{GrantResult, Permission};
use thiserror::Error;

/// Conditions the gate can end up in when a precondition is not met.
///
/// None of these escape the gate as a `Result`; they are recorded as the
/// gate's last issue and shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Permission denied: {}", join(.0))]
    PermissionDeniedRecoverable(Vec<Permission>),

    #[error("Permission permanently denied, grant it in app settings: {}", join(.0))]
    PermissionDeniedPermanent(Vec<Permission>),

    #[error("Bluetooth is disabled (declined {attempts} time(s))")]
    RadioDisabled { attempts: u32 },

    #[error("Unexpected permission result ({permissions} permission(s), {results} result(s))")]
    UnexpectedGrantState { permissions: usize, results: usize },
}

impl GateError {
    pub fn unexpected(permissions: &[Permission], grants: &[GrantResult]) -> Self {
        GateError::UnexpectedGrantState {
            permissions: permissions.len(),
            results: grants.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown permission identifier: {0}")]
pub struct ParsePermissionError(pub String);

fn join(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(", ")
}
