//! Server configuration read from the environment.

use std::net::SocketAddr;

use chrono::TimeDelta;
use rookery_session::domain::aggregates::{DisconnectPolicy, SessionSettings};

use crate::error::AppError;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Reconnect grace window in seconds (`ROOKERY_GRACE_PERIOD_SECS`).
    pub grace_period_secs: u32,
    /// Fate of a game whose seat is vacated (`ROOKERY_DISCONNECT_POLICY`).
    pub disconnect_policy: DisconnectPolicy,
    /// Reset the board after a finished game (`ROOKERY_AUTO_RESTART`).
    pub auto_restart: bool,
    /// Custom start position in FEN (`ROOKERY_START_FEN`).
    pub start_fen: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            grace_period_secs: 30,
            disconnect_policy: DisconnectPolicy::Forfeit,
            auto_restart: false,
            start_fen: None,
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; unset keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is set but unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => defaults.port,
        };
        let grace_period_secs = match lookup("ROOKERY_GRACE_PERIOD_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                AppError::Config(format!(
                    "ROOKERY_GRACE_PERIOD_SECS must be a whole number of seconds: {e}"
                ))
            })?,
            None => defaults.grace_period_secs,
        };
        let disconnect_policy = match lookup("ROOKERY_DISCONNECT_POLICY") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("ROOKERY_DISCONNECT_POLICY: {e}")))?,
            None => defaults.disconnect_policy,
        };
        let auto_restart = match lookup("ROOKERY_AUTO_RESTART") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!(
                    "ROOKERY_AUTO_RESTART must be true or false, got '{raw}'"
                ))
            })?,
            None => defaults.auto_restart,
        };
        let start_fen = lookup("ROOKERY_START_FEN")
            .map(|fen| fen.trim().to_owned())
            .filter(|fen| !fen.is_empty());

        Ok(Self {
            host,
            port,
            grace_period_secs,
            disconnect_policy,
            auto_restart,
            start_fen,
        })
    }

    /// Session tunables derived from this configuration.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            grace_period: TimeDelta::seconds(i64::from(self.grace_period_secs)),
            disconnect_policy: self.disconnect_policy,
            auto_restart: self.auto_restart,
        }
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
