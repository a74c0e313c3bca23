use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dsa::bitset::BitSet;
use crate::packet_network::config::{SimulationConfig, MAX_ALLOCATION_ATTEMPTS};
use crate::packet_network::error::{NetworkError, Result};
use crate::packet_network::flow::Flow;
use crate::packet_network::graph::{CapacityBoundary, NetworkGraph, NodeId};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnroutableCause {
    // nothing connects source and target once unusable edges are left out
    NoPath,
    // every candidate within the search budget had an infeasible edge
    AttemptsExhausted
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Allocation {
    Allocated{path:Vec<NodeId>,attempts:usize},
    Unroutable{cause:UnroutableCause,attempts:usize}
}

impl Allocation {
    pub fn is_allocated(&self) -> bool {
        matches!(self,Self::Allocated {..})
    }
    pub fn attempts(&self) -> usize {
        match self {
            Self::Allocated {attempts,..} | Self::Unroutable {attempts,..} => *attempts
        }
    }
}

// Commits one whole path per flow against the current load, or nothing.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct WeightedAllocator {
    boundary:CapacityBoundary,
    max_attempts:usize
}

impl Default for WeightedAllocator {
    fn default() -> Self {
        Self::new(CapacityBoundary::default(), MAX_ALLOCATION_ATTEMPTS)
    }
}

impl WeightedAllocator {
    pub fn new(boundary:CapacityBoundary,max_attempts:usize) -> Self {
        Self {boundary,max_attempts}
    }
    pub fn from_config(config:&SimulationConfig) -> Self {
        Self::new(config.boundary, config.max_allocation_attempts)
    }

    pub fn allocate(&self,graph:&mut NetworkGraph,flow:&Flow) -> Result<Allocation> {
        for node in [flow.source(),flow.target()] {
            if !graph.contains_node(node) {
                return Err(NetworkError::UnknownNode(node));
            }
        }

        // scratch view of the graph: failed and zero capacity edges are never candidates
        let mut excluded = unusable_edges(graph);

        for attempt in 1..=self.max_attempts {
            let Some(candidate) = graph.weighted_path(flow.source(), flow.target(), &excluded) else {
                debug!(source = flow.source(), target_node = flow.target(), attempt, "no weighted path left");
                return Ok(Allocation::Unroutable {cause:UnroutableCause::NoPath,attempts:attempt});
            };

            let mut infeasible = None;
            for edge in candidate.edges.iter() {
                if !graph.edge(*edge)?.admits(flow.size(), self.boundary) {
                    infeasible = Some(*edge);
                    break;
                }
            }
            if let Some(edge) = infeasible {
                trace!(edge, size = flow.size(), attempt, "excluding infeasible edge");
                excluded.store_at(edge, true);
                continue;
            }

            // every edge on the candidate was checked above, commit on the real graph
            for edge in candidate.edges.iter() {
                graph.reserve(*edge, flow.size())?;
            }
            trace!(hops = candidate.hops(), size = flow.size(), attempt, "flow allocated");
            return Ok(Allocation::Allocated {path:candidate.nodes,attempts:attempt});
        }

        debug!(
            source = flow.source(),
            target_node = flow.target(),
            attempts = self.max_attempts,
            "allocation attempts exhausted"
        );
        Ok(Allocation::Unroutable {cause:UnroutableCause::AttemptsExhausted,attempts:self.max_attempts})
    }
}

fn unusable_edges(graph:&NetworkGraph) -> BitSet {
    let mut mask = graph.empty_mask();
    for (id,edge) in graph.edges().enumerate() {
        if edge.is_failed() || edge.capacity() == 0 {
            mask.store_at(id, true);
        }
    }
    mask
}
