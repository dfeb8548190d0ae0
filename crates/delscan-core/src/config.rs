use std::{env, path::PathBuf};

use crate::{Error, Result};

/// Typed run configuration.
///
/// Defaults match the tuning the pipeline was profiled with; each knob can be
/// overridden from the environment. Rate-limit policy is deliberately not
/// configurable (see `ratelimit`).
#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    /// How many channel participants to seed into the identity cache before
    /// streaming the admin log.
    pub participant_limit: usize,
    /// Admin-log events accumulated per processing window.
    pub window_size: usize,
    /// User lookups resolved concurrently per rate-limited chunk.
    pub chunk_size: usize,
    /// Directory the final report is written into.
    pub output_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            participant_limit: 500,
            window_size: 20,
            chunk_size: 10,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ScrapeConfig {
    /// Defaults with environment overrides applied. A present but malformed
    /// override is an error, not a silent fallback.
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            participant_limit: env_usize("DELSCAN_PARTICIPANT_LIMIT")?
                .unwrap_or(d.participant_limit),
            window_size: env_usize("DELSCAN_WINDOW_SIZE")?
                .unwrap_or(d.window_size)
                .max(1),
            chunk_size: env_usize("DELSCAN_CHUNK_SIZE")?
                .unwrap_or(d.chunk_size)
                .max(1),
            output_dir: env::var_os("DELSCAN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.output_dir),
        })
    }
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} must be an integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}
