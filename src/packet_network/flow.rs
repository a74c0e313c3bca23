use serde::{Deserialize, Serialize};

use crate::packet_network::error::{NetworkError, Result};
use crate::packet_network::graph::NodeId;

// One source to target demand. Mutated only by whichever router or
// allocator is currently driving it.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct Flow {
    size:u64,
    source:NodeId,
    target:NodeId,
    current:NodeId,
    elapsed_ticks:u64,
    completed:bool,
    waited:bool
}

impl Flow {
    pub fn new(size:u64,source:NodeId,target:NodeId) -> Result<Self> {
        if size == 0 {
            return Err(NetworkError::ZeroSizedFlow {from:source,to:target});
        }
        Ok(Self {
            size,
            source,
            target,
            current:source,
            elapsed_ticks:0,
            completed:false,
            waited:false
        })
    }
    pub fn size(&self) -> u64 {
        self.size
    }
    pub fn source(&self) -> NodeId {
        self.source
    }
    pub fn target(&self) -> NodeId {
        self.target
    }
    pub fn current(&self) -> NodeId {
        self.current
    }
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }
    pub fn is_completed(&self) -> bool {
        self.completed
    }
    pub fn has_waited(&self) -> bool {
        self.waited
    }
    pub fn at_target(&self) -> bool {
        self.current == self.target
    }
    // back to the state it was created in
    pub fn restart(&mut self) {
        self.current = self.source;
        self.elapsed_ticks = 0;
        self.completed = false;
        self.waited = false;
    }

    pub(crate) fn hop_to(&mut self,node:NodeId) {
        self.current = node;
        self.elapsed_ticks += 1;
    }
    pub(crate) fn wait(&mut self) {
        self.waited = true;
        self.elapsed_ticks += 1;
    }
    pub(crate) fn complete(&mut self) {
        debug_assert!(self.at_target());
        self.completed = true;
    }
}

// Aggregate demand of a flow batch, as consumed by the delay metric.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct DemandSummary {
    pub flow_count:usize,
    pub total_size:u64
}

impl DemandSummary {
    pub fn of(flows:&[Flow]) -> Self {
        Self {
            flow_count:flows.len(),
            total_size:flows.iter().map(|f| f.size).sum()
        }
    }
    pub fn mean_size(&self) -> Option<f64> {
        if self.flow_count == 0 {return None}
        Some(self.total_size as f64/self.flow_count as f64)
    }
}
