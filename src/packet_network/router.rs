use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::dsa::bitset::BitSet;
use crate::dsa::graph::Path;
use crate::packet_network::config::{SimulationConfig, MAX_REROUTE_ATTEMPTS};
use crate::packet_network::error::{NetworkError, Result};
use crate::packet_network::flow::Flow;
use crate::packet_network::graph::{CapacityBoundary, EdgeId, NetworkGraph, NodeId};

// One emission of the router, each carries the flow's position afterwards.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Step {
    // crossed an edge, ticks once
    Moved(NodeId),
    // no usable edge this round, ticks once
    Waited(NodeId),
    // first terminal emission
    Arrived(NodeId),
    // second terminal emission, flow is completed
    Completed(NodeId)
}

impl Step {
    pub fn position(&self) -> NodeId {
        match self {
            Self::Moved(n) | Self::Waited(n) | Self::Arrived(n) | Self::Completed(n) => *n
        }
    }
    pub fn is_terminal(&self) -> bool {
        matches!(self,Self::Arrived(_) | Self::Completed(_))
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
enum Phase {
    Routing,
    Arrived,
    Exhausted
}

// hop by hop driver for a single flow, one action per `advance` call:
// a hop, a wait or one of the two terminal emissions.
// the edge occupied by a hop is released at the start of the next call,
// once exhausted it keeps returning None, a fresh router is needed to drive again
#[derive(Debug,Clone)]
pub struct AdaptiveRouter {
    // (edge, node behind it) still to travel
    path:Option<VecDeque<(EdgeId,NodeId)>>,
    blocked:BitSet,
    attempts:usize,
    occupied:Option<EdgeId>,
    phase:Phase,
    boundary:CapacityBoundary,
    max_attempts:usize
}

impl Default for AdaptiveRouter {
    fn default() -> Self {
        Self::new(CapacityBoundary::default(), MAX_REROUTE_ATTEMPTS)
    }
}

impl AdaptiveRouter {
    // max_attempts of 0 never reroutes, a blocked edge means waiting
    pub fn new(boundary:CapacityBoundary,max_attempts:usize) -> Self {
        Self {
            path:None,
            blocked:BitSet::new(),
            attempts:0,
            occupied:None,
            phase:Phase::Routing,
            boundary,
            max_attempts
        }
    }
    pub fn from_config(config:&SimulationConfig) -> Self {
        Self::new(config.boundary, config.max_reroute_attempts)
    }
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }
    pub fn occupied_edge(&self) -> Option<EdgeId> {
        self.occupied
    }

    // gives back the edge held from the last hop without taking another step
    pub fn abandon(&mut self,graph:&mut NetworkGraph,flow:&Flow) -> Result<()> {
        if let Some(edge) = self.occupied.take() {
            graph.release(edge, flow.size())?;
            debug!(edge, node = flow.current(), "occupancy abandoned");
        }
        Ok(())
    }

    pub fn advance(&mut self,graph:&mut NetworkGraph,flow:&mut Flow) -> Result<Option<Step>> {
        if self.phase == Phase::Exhausted {
            return Ok(None);
        }
        for node in [flow.current(),flow.target()] {
            if !graph.contains_node(node) {
                return Err(NetworkError::UnknownNode(node));
            }
        }
        if let Some(edge) = self.occupied.take() {
            graph.release(edge, flow.size())?;
        }
        match self.phase {
            Phase::Arrived => {
                flow.complete();
                self.phase = Phase::Exhausted;
                trace!(target_node = flow.target(), "flow completed");
                return Ok(Some(Step::Completed(flow.target())));
            },
            Phase::Routing if flow.at_target() => {
                self.phase = Phase::Arrived;
                trace!(target_node = flow.target(), ticks = flow.elapsed_ticks(), "flow arrived");
                return Ok(Some(Step::Arrived(flow.target())));
            },
            _ => {}
        }

        if self.path.is_none() {
            let initial = graph.hop_path(flow.current(), flow.target(), &graph.empty_mask())
                .ok_or(NetworkError::Disconnected {from:flow.current(),to:flow.target()})?;
            self.path = Some(to_hops(initial));
        }
        if self.blocked.len() != graph.edges_len() {
            self.blocked = graph.empty_mask();
        }

        let step = self.round(graph, flow)?;
        self.blocked.clear();
        self.attempts = 0;
        Ok(Some(step))
    }

    // one round: hop along the held path, reroute around blocked edges, or wait
    fn round(&mut self,graph:&mut NetworkGraph,flow:&mut Flow) -> Result<Step> {
        loop {
            let Some(&(edge,next)) = self.path.as_ref().and_then(|p| p.front()) else {
                // held path ran out before the target, search again next round
                self.path = None;
                break;
            };
            if graph.edge(edge)?.admits(flow.size(), self.boundary) {
                graph.reserve(edge, flow.size())?;
                if let Some(path) = self.path.as_mut() {
                    path.pop_front();
                }
                self.occupied = Some(edge);
                flow.hop_to(next);
                trace!(edge, node = next, ticks = flow.elapsed_ticks(), "flow moved");
                return Ok(Step::Moved(next));
            }

            self.blocked.store_at(edge, true);
            if self.attempts >= self.max_attempts {
                debug!(node = flow.current(), attempts = self.attempts, "reroute budget exhausted");
                break;
            }
            self.attempts += 1;
            match graph.hop_path(flow.current(), flow.target(), &self.blocked) {
                Some(detour) => {
                    debug!(
                        node = flow.current(),
                        blocked = self.blocked.count_ones(),
                        hops = detour.hops(),
                        "rerouting around blocked edge"
                    );
                    self.path = Some(to_hops(detour));
                },
                None => {
                    debug!(node = flow.current(), blocked = self.blocked.count_ones(), "no detour available");
                    break;
                }
            }
        }
        flow.wait();
        trace!(node = flow.current(), ticks = flow.elapsed_ticks(), "flow waited");
        Ok(Step::Waited(flow.current()))
    }
}

fn to_hops(path:Path) -> VecDeque<(EdgeId,NodeId)> {
    path.edges.into_iter().zip(path.nodes.into_iter().skip(1)).collect()
}
