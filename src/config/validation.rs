//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. All problems are
//! reported together rather than stopping at the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not a socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("files.directory {0:?} is not a directory")]
    NotADirectory(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }
    if config.limits.max_head_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_head_bytes"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if let Some(dir) = &config.files.directory {
        if !dir.is_dir() {
            errors.push(ValidationError::NotADirectory(dir.display().to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "localhost".into();
        config.listener.max_connections = 0;
        config.limits.max_body_bytes = 0;
        config.files.directory = Some("/definitely/not/here".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAddress {
                    field: "listener.bind_address",
                    value: "localhost".into(),
                },
                ValidationError::Zero("listener.max_connections"),
                ValidationError::Zero("limits.max_body_bytes"),
                ValidationError::NotADirectory("/definitely/not/here".into()),
            ]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
