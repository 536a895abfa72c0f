//! Tunables for topology derivation.
//!
//! Every field has a serde default, so a config file only needs to name what
//! it changes:
//!
//! ```toml
//! [topology]
//! switch_impedance_ohm = 0.5
//! parallel = false
//! ```

use gridtopo_core::{GridError, GridResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Edge weight of a closed switch in the impedance graph (Ω)
    #[serde(default = "default_switch_impedance")]
    pub switch_impedance_ohm: f64,
    /// Compute weights of sibling elements on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Leave open switches out of the impedance graph
    #[serde(default = "default_skip_open_switches")]
    pub skip_open_switches: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            switch_impedance_ohm: default_switch_impedance(),
            parallel: default_parallel(),
            skip_open_switches: default_skip_open_switches(),
        }
    }
}

fn default_switch_impedance() -> f64 {
    1.0
}

fn default_parallel() -> bool {
    true
}

fn default_skip_open_switches() -> bool {
    true
}

impl TopologyConfig {
    /// Parse a config from TOML, either from a `[topology]` table or from a
    /// document holding the fields at top level.
    pub fn from_toml_str(source: &str) -> GridResult<Self> {
        let mut document: toml::Table =
            toml::from_str(source).map_err(|e| GridError::Config(e.to_string()))?;
        let section = match document.remove("topology") {
            Some(table) => table,
            None => toml::Value::Table(document),
        };
        let config: TopologyConfig = section
            .try_into()
            .map_err(|e: toml::de::Error| GridError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> GridResult<()> {
        if !(self.switch_impedance_ohm.is_finite() && self.switch_impedance_ohm > 0.0) {
            return Err(GridError::Config(format!(
                "switch_impedance_ohm must be a positive finite number, got {}",
                self.switch_impedance_ohm
            )));
        }
        Ok(())
    }
}
