use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const ENV_PREFIX: &str = "LEMIVON";
const DEFAULT_FILE: &str = "lemivon";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Fixed RNG seed. Unset means OS entropy.
    pub seed: Option<u64>,
    pub max_questions: usize,
    pub pretty: bool,
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            seed: None,
            max_questions: 20,
            pretty: true,
            log: "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `lemivon.toml` if present, then `LEMIVON_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_FILE)
    }

    pub fn load_from(file_stem: &str) -> Result<Self> {
        let defaults = Settings::default();
        let settings = Config::builder()
            .set_default("max_questions", defaults.max_questions as i64)?
            .set_default("pretty", defaults.pretty)?
            .set_default("log", defaults.log)?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
