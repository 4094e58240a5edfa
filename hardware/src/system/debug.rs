//! Debug Output Descriptor.
//!
//! Controls which components emit debug output and how much. Filtering
//! itself happens in the components; this is only the descriptor they read.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::common::ConfigError;

const NONE: &str = "none";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    None,
    Low,
    Med,
    High,
}

impl FromStr for Verbosity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Verbosity::None),
            "low" => Ok(Verbosity::Low),
            "med" | "medium" => Ok(Verbosity::Med),
            "high" => Ok(Verbosity::High),
            _ => Err(ConfigError::InvalidVerbosity(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DebugDescriptor {
    /// Comma-separated component names, `"none"` or `"all"`.
    #[serde(default = "default_none")]
    pub filter_string: String,
    #[serde(default = "default_none")]
    pub verbosity_string: String,
    #[serde(default)]
    pub protocol_trace: bool,
}

fn default_none() -> String {
    NONE.to_string()
}

impl Default for DebugDescriptor {
    fn default() -> Self {
        Self {
            filter_string: default_none(),
            verbosity_string: default_none(),
            protocol_trace: false,
        }
    }
}

impl DebugDescriptor {
    pub fn verbosity(&self) -> Result<Verbosity, ConfigError> {
        self.verbosity_string.parse()
    }

    /// Returns `true` if debug output from `component` passes the filter.
    pub fn allows(&self, component: &str) -> bool {
        match self.filter_string.trim() {
            NONE | "" => false,
            "all" => true,
            list => list.split(',').any(|c| c.trim() == component),
        }
    }
}
