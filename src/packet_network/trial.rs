use rand::seq::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::packet_network::allocator::WeightedAllocator;
use crate::packet_network::config::SimulationConfig;
use crate::packet_network::error::Result;
use crate::packet_network::flow::{DemandSummary, Flow};
use crate::packet_network::graph::{EdgeKey, NetworkGraph};
use crate::packet_network::metric::{self, Delay, DemandNormalization};

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct TrialOutcome {
    pub delay:Delay,
    pub edge_failed:bool,
    pub allocation_failed:bool,
    pub failed_edge:Option<EdgeKey>,
    // flows committed before the first failure, or all of them
    pub allocated_flows:usize
}

// Runs single trials: failure injection, shuffled allocation, metric, reset.
#[derive(Debug,Clone)]
pub struct TrialRunner<R:Rng = StdRng> {
    rng:R,
    allocator:WeightedAllocator,
    edge_failure_probability:f64,
    normalization:DemandNormalization
}

impl TrialRunner<StdRng> {
    pub fn from_config(config:&SimulationConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(config.seed))
    }
}

impl<R:Rng> TrialRunner<R> {
    pub fn with_rng(config:&SimulationConfig,rng:R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng,
            allocator:WeightedAllocator::from_config(config),
            edge_failure_probability:config.edge_failure_probability(),
            normalization:config.normalization
        })
    }

    pub fn run_trial(&mut self,graph:&mut NetworkGraph,flows:&mut [Flow]) -> Result<TrialOutcome> {
        let outcome = self.allocate_and_measure(graph, flows);
        // trials never leak edge state, not even on error
        graph.reset();
        outcome
    }

    fn allocate_and_measure(&mut self,graph:&mut NetworkGraph,flows:&mut [Flow]) -> Result<TrialOutcome> {
        let mut failed_edge = None;
        if graph.edges_len() > 0 && self.rng.random_bool(self.edge_failure_probability) {
            let id = self.rng.random_range(0..graph.edges_len());
            failed_edge = Some(graph.fail_edge(id)?);
        }

        flows.shuffle(&mut self.rng);

        let mut allocated_flows = 0;
        let mut allocation_failed = false;
        for flow in flows.iter() {
            if !self.allocator.allocate(graph, flow)?.is_allocated() {
                allocation_failed = true;
                break;
            }
            allocated_flows += 1;
        }
        graph.check_invariants()?;

        let delay = metric::delay(graph, &DemandSummary::of(flows), self.normalization)?;
        let outcome = TrialOutcome {
            delay,
            edge_failed:failed_edge.is_some(),
            allocation_failed,
            failed_edge,
            allocated_flows
        };
        debug!(
            delay = ?outcome.delay,
            edge_failed = outcome.edge_failed,
            allocation_failed,
            allocated_flows,
            "trial finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::TrialRunner;
    use crate::packet_network::config::SimulationConfig;
    use crate::packet_network::error::{ConfigError, NetworkError};
    use crate::packet_network::flow::Flow;
    use crate::packet_network::graph::NetworkGraph;

    fn cycle(capacity:u64) -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        for i in 0..4 {
            graph.push_edge(i, (i+1)%4, capacity).unwrap();
        }
        graph
    }

    fn flows() -> Vec<Flow> {
        vec![Flow::new(2, 0, 2).unwrap(),Flow::new(1, 1, 3).unwrap(),Flow::new(3, 3, 0).unwrap()]
    }

    #[test]
    fn test_trial_resets_graph() {
        let mut graph = cycle(20);
        let mut flows = flows();
        let config = SimulationConfig {no_failure_percent:50,..Default::default()};
        let mut runner = TrialRunner::from_config(&config).unwrap();
        for _ in 0..20 {
            let outcome = runner.run_trial(&mut graph, &mut flows).unwrap();
            assert!(!outcome.allocation_failed);
            assert!(graph.is_clean());
            assert_eq!(outcome.edge_failed,outcome.failed_edge.is_some());
        }
    }
    #[test]
    fn test_never_fails_edges_at_p_100() {
        let mut graph = cycle(20);
        let mut flows = flows();
        let mut runner = TrialRunner::from_config(&SimulationConfig::default()).unwrap();
        for _ in 0..50 {
            let outcome = runner.run_trial(&mut graph, &mut flows).unwrap();
            assert!(!outcome.edge_failed);
            assert_eq!(outcome.allocated_flows,3);
            assert!(outcome.delay.finite().is_some());
        }
    }
    #[test]
    fn test_always_fails_an_edge_at_p_0() {
        let mut graph = cycle(20);
        let mut flows = flows();
        let config = SimulationConfig {no_failure_percent:0,..Default::default()};
        let mut runner = TrialRunner::with_rng(&config, StdRng::seed_from_u64(3)).unwrap();
        for _ in 0..20 {
            let outcome = runner.run_trial(&mut graph, &mut flows).unwrap();
            assert!(outcome.edge_failed);
            // a cycle minus one edge still connects everything
            assert!(!outcome.allocation_failed);
        }
    }
    #[test]
    fn test_first_failure_stops_allocation() {
        // a single edge fits exactly one flow of size 3
        let mut graph = NetworkGraph::new();
        graph.push_edge(0, 1, 4).unwrap();
        let mut flows = vec![Flow::new(3, 0, 1).unwrap(),Flow::new(3, 1, 0).unwrap(),Flow::new(3, 0, 1).unwrap()];
        let mut runner = TrialRunner::from_config(&SimulationConfig::default()).unwrap();
        let outcome = runner.run_trial(&mut graph, &mut flows).unwrap();
        assert!(outcome.allocation_failed);
        assert_eq!(outcome.allocated_flows,1);
        assert!(graph.is_clean());
    }
    #[test]
    fn test_same_seed_same_outcomes() {
        let config = SimulationConfig {no_failure_percent:30,seed:99,..Default::default()};
        let run = || {
            let mut graph = cycle(6);
            let mut flows = flows();
            let mut runner = TrialRunner::from_config(&config).unwrap();
            (0..10).map(|_| runner.run_trial(&mut graph, &mut flows).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(run(),run());
    }
    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {no_failure_percent:150,..Default::default()};
        let result = TrialRunner::from_config(&config);
        assert!(matches!(result,Err(NetworkError::Config(ConfigError::NoFailurePercentOutOfRange(150)))));
    }
    #[test]
    fn test_empty_demand_is_an_error_and_still_resets() {
        let mut graph = cycle(5);
        let config = SimulationConfig {no_failure_percent:0,..Default::default()};
        let mut runner = TrialRunner::from_config(&config).unwrap();
        assert_eq!(runner.run_trial(&mut graph, &mut []),Err(NetworkError::EmptyDemand));
        assert!(graph.is_clean());
    }
}
