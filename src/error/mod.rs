//! Error types for the application.
//!
//! `AppError` is the top-level error type aggregating the domain-specific
//! errors from the data layer (`StoreError`), the Discord action facade
//! (`ActionError`), and infrastructure failures. Most variants use `#[from]`
//! for automatic conversion with `?`.

pub mod config;

use thiserror::Error;

use crate::{data::StoreError, discord::ActionError, error::config::ConfigError};

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Persistence error from the entity store, including version conflicts
    /// that survived the bounded retry loop.
    #[error(transparent)]
    StoreErr(#[from] StoreError),

    /// Discord platform action failure (permission denied, object gone,
    /// rate-limit retries exhausted).
    #[error(transparent)]
    ActionErr(#[from] ActionError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// A giveaway draw or reroll had no eligible participants left.
    ///
    /// Surfaced to the invoking user; no state change occurs.
    #[error("not enough eligible participants")]
    InsufficientParticipants,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Invalid caller-supplied input.
    #[error("{0}")]
    InvalidInput(String),

    /// Internal error with custom message.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Message shown to the interacting user. Internal details are logged
    /// server-side, not leaked into the reply.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ActionErr(ActionError::PermissionDenied) => {
                "I don't have permission to do that.".to_string()
            }
            AppError::InsufficientParticipants => {
                "Not enough eligible participants.".to_string()
            }
            AppError::NotFound(msg) | AppError::InvalidInput(msg) => msg.clone(),
            _ => "Something went wrong, please try again.".to_string(),
        }
    }
}
