

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::Result;
use crate::guard::GuardMode;


const ENV_PREFIX: &str = "UNDELETABLE";


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndeletableConfig {
    /// Log suppressed deletes at debug level.
    #[serde(default)]
    pub debug: bool,

    /// Entity name to guard mode, registered by `Catalog::apply`.
    #[serde(default)]
    pub guards: BTreeMap<String, GuardMode>,
}

impl UndeletableConfig {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_guard(mut self, entity: impl Into<String>, mode: GuardMode) -> Self {
        self.guards.insert(entity.into(), mode);
        self
    }


    /// Reads `UNDELETABLE_DEBUG` and `UNDELETABLE_GUARDS__<ENTITY>` only.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(environment())
    }

    fn from_environment(source: Environment) -> Result<Self> {
        let settings = Config::builder().add_source(source).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Reads a config file (format from its extension) layered under the same
    /// `UNDELETABLE_*` env vars as `from_env`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading undeletable config from {}", path.display());

        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }


    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
