use serde::{Deserialize, Serialize};

use crate::packet_network::error::ConfigError;
use crate::packet_network::graph::CapacityBoundary;
use crate::packet_network::metric::DemandNormalization;

// reroute searches a blocked flow may try within one round before it waits
pub const MAX_REROUTE_ATTEMPTS:usize = 5;
// weighted path searches per allocation call
pub const MAX_ALLOCATION_ATTEMPTS:usize = 10;
// percentage of trials that run without a failed edge
pub const DEFAULT_NO_FAILURE_PERCENT:u8 = 100;

// What the Monte Carlo harness does when a trial ends in an error.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    Abort,
    SkipTrial
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub boundary:CapacityBoundary,
    // 0 is valid: flows never reroute and wait at the first blocked edge
    pub max_reroute_attempts:usize,
    // at least one search, 0 is rejected
    pub max_allocation_attempts:usize,
    pub no_failure_percent:u8,
    pub normalization:DemandNormalization,
    pub repeat:usize,
    pub seed:u64,
    pub error_policy:ErrorPolicy
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            boundary:CapacityBoundary::default(),
            max_reroute_attempts:MAX_REROUTE_ATTEMPTS,
            max_allocation_attempts:MAX_ALLOCATION_ATTEMPTS,
            no_failure_percent:DEFAULT_NO_FAILURE_PERCENT,
            normalization:DemandNormalization::default(),
            repeat:1,
            seed:0,
            error_policy:ErrorPolicy::default()
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(),ConfigError> {
        if self.no_failure_percent > 100 {
            return Err(ConfigError::NoFailurePercentOutOfRange(self.no_failure_percent));
        }
        if self.repeat == 0 {
            return Err(ConfigError::ZeroRepeat);
        }
        // a zero reroute budget is a routing policy, a zero allocation budget routes nothing
        if self.max_allocation_attempts == 0 {
            return Err(ConfigError::ZeroAttemptBudget("allocation"));
        }
        Ok(())
    }
    // chance that a trial fails one edge
    pub fn edge_failure_probability(&self) -> f64 {
        f64::from(100 - self.no_failure_percent.min(100))/100.0
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorPolicy, SimulationConfig, MAX_ALLOCATION_ATTEMPTS, MAX_REROUTE_ATTEMPTS};
    use crate::packet_network::error::ConfigError;
    use crate::packet_network::graph::CapacityBoundary;
    use crate::packet_network::metric::DemandNormalization;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.max_reroute_attempts,MAX_REROUTE_ATTEMPTS);
        assert_eq!(config.max_allocation_attempts,MAX_ALLOCATION_ATTEMPTS);
        assert_eq!(config.edge_failure_probability(),0.0);
        config.validate().unwrap();
    }
    #[test]
    fn test_partial_json() {
        let config:SimulationConfig = serde_json::from_str(r#"{
            "boundary": "strict",
            "no_failure_percent": 75,
            "normalization": "flow_count",
            "error_policy": "skip_trial",
            "repeat": 20
        }"#).unwrap();
        assert_eq!(config.boundary,CapacityBoundary::Strict);
        assert_eq!(config.normalization,DemandNormalization::FlowCount);
        assert_eq!(config.error_policy,ErrorPolicy::SkipTrial);
        assert_eq!(config.max_reroute_attempts,MAX_REROUTE_ATTEMPTS);
        assert_eq!(config.edge_failure_probability(),0.25);
    }
    #[test]
    fn test_validation() {
        let mut config = SimulationConfig {no_failure_percent:101,..Default::default()};
        assert_eq!(config.validate(),Err(ConfigError::NoFailurePercentOutOfRange(101)));
        config.no_failure_percent = 0;
        config.repeat = 0;
        assert_eq!(config.validate(),Err(ConfigError::ZeroRepeat));
        config.repeat = 1;
        config.max_allocation_attempts = 0;
        assert_eq!(config.validate(),Err(ConfigError::ZeroAttemptBudget("allocation")));
        config.max_allocation_attempts = 1;
        config.max_reroute_attempts = 0;
        assert_eq!(config.validate(),Ok(()));
    }
}
