//! Runtime settings resolved from the environment.

use std::env;
use std::path::PathBuf;

pub const MODELS_DIR_ENV: &str = "HYDROPREDICT_MODELS_DIR";
pub const DASHBOARD_URL_ENV: &str = "HYDROPREDICT_DASHBOARD_URL";

pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_DASHBOARD_URL: &str =
    "https://public.tableau.com/views/InternalPumpLeakage/Dashboard1?:showVizHome=no&:embed=true";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding the trained artifacts.
    pub models_dir: PathBuf,
    /// Address of the embedded analytics dashboard. Opaque to this crate.
    pub dashboard_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `HYDROPREDICT_*` variables. Empty values are
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(dir) = non_empty(MODELS_DIR_ENV) {
            settings.models_dir = PathBuf::from(dir);
        }
        if let Some(url) = non_empty(DASHBOARD_URL_ENV) {
            settings.dashboard_url = url;
        }
        settings
    }

    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }
}
