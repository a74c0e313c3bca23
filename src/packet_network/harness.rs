use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::packet_network::config::{ErrorPolicy, SimulationConfig};
use crate::packet_network::error::Result;
use crate::packet_network::flow::Flow;
use crate::packet_network::graph::NetworkGraph;
use crate::packet_network::trial::{TrialOutcome, TrialRunner};
use crate::scientific_computing::statistics::{self, Summary};

lazy_static! {
    // 0.00, 0.05, ... 2.00
    pub static ref default_delay_thresholds:Vec<f64> = (0..=40).map(|i| i as f64*0.05).collect();
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct ThresholdPoint {
    pub threshold:f64,
    // share of all recorded trials that allocated every flow within this delay
    pub fraction_within:f64
}

#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
pub struct MonteCarloReport {
    pub outcomes:Vec<TrialOutcome>,
    // trials dropped under ErrorPolicy::SkipTrial
    pub skipped:usize
}

impl MonteCarloReport {
    pub fn trials(&self) -> usize {
        self.outcomes.len()
    }
    pub fn allocation_failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.allocation_failed).count()
    }
    pub fn edge_failure_trials(&self) -> usize {
        self.outcomes.iter().filter(|o| o.edge_failed).count()
    }
    pub fn saturated_trials(&self) -> usize {
        self.outcomes.iter().filter(|o| o.delay.is_saturated()).count()
    }
    // delays of trials that routed every flow without saturating an edge
    pub fn finite_delays(&self) -> Vec<f64> {
        self.outcomes.iter()
            .filter(|o| !o.allocation_failed)
            .filter_map(|o| o.delay.finite())
            .collect()
    }
    pub fn delay_summary(&self) -> Option<Summary> {
        statistics::summarize(&self.finite_delays())
    }
    pub fn threshold_sweep(&self,thresholds:&[f64]) -> Vec<ThresholdPoint> {
        let delays = self.finite_delays();
        thresholds.iter().map(|threshold| ThresholdPoint {
            threshold:*threshold,
            fraction_within:statistics::fraction_at_most(&delays, *threshold, self.trials())
        }).collect()
    }
    pub fn default_threshold_sweep(&self) -> Vec<ThresholdPoint> {
        self.threshold_sweep(&default_delay_thresholds)
    }
}

// Repeats trials against one graph, every trial leaves the graph reset.
#[derive(Debug,Clone)]
pub struct MonteCarloHarness {
    config:SimulationConfig
}

impl MonteCarloHarness {
    pub fn new(config:SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {config})
    }
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self,graph:&mut NetworkGraph,flows:&mut [Flow]) -> Result<MonteCarloReport> {
        let mut runner = TrialRunner::from_config(&self.config)?;
        let mut report = MonteCarloReport {
            outcomes:Vec::with_capacity(self.config.repeat),
            skipped:0
        };
        info!(
            repeat = self.config.repeat,
            flows = flows.len(),
            edges = graph.edges_len(),
            no_failure_percent = self.config.no_failure_percent,
            "monte carlo run started"
        );
        for trial in 0..self.config.repeat {
            match runner.run_trial(graph, flows) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) if self.config.error_policy == ErrorPolicy::SkipTrial => {
                    warn!(trial, error = %e, "skipping failed trial");
                    report.skipped += 1;
                },
                Err(e) => return Err(e)
            }
        }
        info!(
            trials = report.trials(),
            skipped = report.skipped,
            allocation_failures = report.allocation_failures(),
            edge_failures = report.edge_failure_trials(),
            "monte carlo run finished"
        );
        Ok(report)
    }
}
