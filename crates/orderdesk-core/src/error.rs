use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RecordId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Agent,
    Customer,
    Order,
    Payment,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Customer => "customer",
            Self::Order => "order",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: RecordId },
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{kind} {id} is already referenced by {referrer} {referrer_id}")]
    AlreadyReferenced {
        kind: EntityKind,
        id: RecordId,
        referrer: EntityKind,
        referrer_id: RecordId,
    },
    #[error(transparent)]
    Storage(anyhow::Error),
}

/// Gateways may raise a `DeskError` through `anyhow`; it keeps its kind here.
impl From<anyhow::Error> for DeskError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DeskError>() {
            Ok(desk_err) => desk_err,
            Err(err) => Self::Storage(err),
        }
    }
}

impl DeskError {
    pub fn not_found(kind: EntityKind, id: RecordId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
