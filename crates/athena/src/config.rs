use serde::{Deserialize, Serialize};

use lakequery_core::config::{
    active_profile, profiled_env_opt, profiled_env_or, profiled_env_u32, profiled_env_u64,
};

pub const DEFAULT_BACKOFF_MS: u64 = 100;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_DATABASE: &str = "default";

// ── ClientOptions ────────────────────────────────────────────────

/// Retry and polling knobs held by a client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Base delay for submit retries; attempt `n` waits `2^n * backoff_ms`.
    pub backoff_ms: u64,
    /// Total submit attempts, including the first.
    pub max_retries: u32,
    /// Wait before every status check, the first one included.
    pub poll_interval_ms: u64,
    /// Status checks before giving up.
    pub max_poll_attempts: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            backoff_ms: DEFAULT_BACKOFF_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl ClientOptions {
    /// Apply per-call overrides on top of these instance defaults.
    pub fn resolve(&self, overrides: &QueryOptions) -> ClientOptions {
        ClientOptions {
            backoff_ms: overrides.backoff_ms.unwrap_or(self.backoff_ms),
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            poll_interval_ms: overrides.poll_interval_ms.unwrap_or(self.poll_interval_ms),
            max_poll_attempts: overrides.max_poll_attempts.unwrap_or(self.max_poll_attempts),
        }
    }
}

// ── QueryOptions ─────────────────────────────────────────────────

/// Per-call overrides. Unset fields fall back to the client's options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub backoff_ms: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,
}

impl QueryOptions {
    pub fn backoff_ms(mut self, ms: u64) -> Self {
        self.backoff_ms = Some(ms);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.max_poll_attempts = Some(n);
        self
    }
}

// ── AthenaConfig ─────────────────────────────────────────────────

/// Configuration for an Athena-backed client.
///
/// Reads from environment variables with optional profile prefix.
/// When `LAKEQUERY_PROFILE=PROD`, checks `PROD_ATHENA_DATABASE` before `ATHENA_DATABASE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// AWS region for Athena queries.
    pub region: String,
    /// Default database for statements that don't name one.
    pub database: String,
    /// Athena workgroup; `None` uses the account's primary workgroup.
    pub workgroup: Option<String>,
    /// S3 path for query results. Required; there is no default.
    pub output_location: String,
    /// Instance-level retry and polling defaults.
    pub options: ClientOptions,
}

impl AthenaConfig {
    /// Build config from environment variables.
    ///
    /// Reads `LAKEQUERY_PROFILE` to determine profile prefix.
    /// For each key, tries `{PROFILE}_ATHENA_*` first, then `ATHENA_*`.
    /// `ATHENA_REGION` falls back to `AWS_REGION` before using the default.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        let region = profiled_env_opt(profile, "ATHENA_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self {
            region,
            database: profiled_env_or(profile, "ATHENA_DATABASE", DEFAULT_DATABASE),
            workgroup: profiled_env_opt(profile, "ATHENA_WORKGROUP"),
            output_location: profiled_env_or(profile, "ATHENA_OUTPUT_LOCATION", ""),
            options: ClientOptions {
                backoff_ms: profiled_env_u64(profile, "ATHENA_BACKOFF_MS", DEFAULT_BACKOFF_MS),
                max_retries: profiled_env_u32(profile, "ATHENA_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                poll_interval_ms: profiled_env_u64(
                    profile,
                    "ATHENA_POLL_INTERVAL_MS",
                    DEFAULT_POLL_INTERVAL_MS,
                ),
                max_poll_attempts: profiled_env_u32(
                    profile,
                    "ATHENA_MAX_POLL_ATTEMPTS",
                    DEFAULT_MAX_POLL_ATTEMPTS,
                ),
            },
        }
    }

    /// Returns `true` when an output location has been set.
    pub fn is_configured(&self) -> bool {
        !self.output_location.trim().is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────────
