//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Catalog used when `ENCOUNTER_CATALOG` is not set.
pub const DEFAULT_CATALOG: &str = "config/catalog.yaml";

/// Accepted `TICK_HZ` range; keeps the tick period between 1 ms and 100 s.
const TICK_HZ_RANGE: std::ops::RangeInclusive<f64> = 0.01..=1000.0;

/// Runtime settings of the API server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path of the YAML trigger catalog.
    pub catalog_path: PathBuf,
    /// Simulation ticks per second.
    pub tick_hz: f64,
    /// Seed for the sandbox RNG; entropy-seeded when absent.
    pub sandbox_seed: Option<u64>,
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `ENCOUNTER_CATALOG`, `TICK_HZ` and
    /// `SANDBOX_SEED`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is set but unparsable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is set but unparsable, or
    /// when `TICK_HZ` is outside 0.01 to 1000.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let catalog_path =
            PathBuf::from(lookup("ENCOUNTER_CATALOG").unwrap_or_else(|| DEFAULT_CATALOG.to_owned()));
        let tick_hz: f64 = lookup("TICK_HZ")
            .unwrap_or_else(|| "30".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("TICK_HZ must be a number: {e}")))?;
        if !TICK_HZ_RANGE.contains(&tick_hz) {
            return Err(AppError::Config(format!(
                "TICK_HZ must be between {} and {}",
                TICK_HZ_RANGE.start(),
                TICK_HZ_RANGE.end()
            )));
        }
        let sandbox_seed = lookup("SANDBOX_SEED")
            .map(|seed| {
                seed.parse()
                    .map_err(|e| AppError::Config(format!("SANDBOX_SEED must be a valid u64: {e}")))
            })
            .transpose()?;

        Ok(Self {
            host,
            port,
            catalog_path,
            tick_hz,
            sandbox_seed,
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an invalid host/port combination.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// Seconds per simulation tick.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick_delta(&self) -> f32 {
        (1.0 / self.tick_hz) as f32
    }
}
