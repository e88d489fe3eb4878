//! Mapping from driven-port failures to domain errors.
//!
//! Connection failures surface as `service_unavailable`; everything else is
//! an internal error whose message is redacted by the HTTP adapter.

use crate::domain::Error;
use crate::domain::ports::{
    CodeRepositoryError, PlayerRepositoryError, PrizeRepositoryError, SpinLogRepositoryError,
};

pub(crate) fn map_code_error(error: CodeRepositoryError) -> Error {
    match error {
        CodeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("code repository unavailable: {message}"))
        }
        CodeRepositoryError::Query { message } => {
            Error::internal(format!("code repository error: {message}"))
        }
    }
}

pub(crate) fn map_prize_error(error: PrizeRepositoryError) -> Error {
    match error {
        PrizeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("prize repository unavailable: {message}"))
        }
        PrizeRepositoryError::Query { message } => {
            Error::internal(format!("prize repository error: {message}"))
        }
        PrizeRepositoryError::UnknownPrize { id } => {
            Error::not_found(format!("Prize not found: {id}"))
        }
    }
}

pub(crate) fn map_spin_log_error(error: SpinLogRepositoryError) -> Error {
    match error {
        SpinLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("spin log repository unavailable: {message}"))
        }
        SpinLogRepositoryError::Query { message } => {
            Error::internal(format!("spin log repository error: {message}"))
        }
    }
}

pub(crate) fn map_player_error(error: PlayerRepositoryError) -> Error {
    match error {
        PlayerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("player repository unavailable: {message}"))
        }
        PlayerRepositoryError::Query { message } => {
            Error::internal(format!("player repository error: {message}"))
        }
        PlayerRepositoryError::DuplicateUsername { username } => {
            Error::conflict(format!("Username already taken: {username}"))
        }
    }
}
