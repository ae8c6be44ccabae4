use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::Value;

/// Marker for config structs that can be pulled out of a named TOML section.
/// A missing section falls back to the struct's defaults.
pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> Self {
        match section {
            Some(value) => value.clone().try_into().expect("cannot deserialize config"),
            None => {
                warn!("config section not found");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub trace: String,
    pub two_level: bool,
    /// Accesses to replay before counters are zeroed. Zero disables warm-up.
    pub warmup: u64,
    pub stats_out: Option<String>,
    pub miss_log_out: Option<String>,
    pub json_out: Option<String>,
}

impl Config for RunConfig {}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            trace: "".to_string(),
            two_level: false,
            warmup: 0,
            stats_out: None,
            miss_log_out: None,
            json_out: None,
        }
    }
}
