// queueing style congestion indicator over the current edge state
//
//   delay = (1/D) * sum_e packet_count(e) / (capacity(e)/m - packet_count(e))
//
// m is the mean flow size, capacity(e)/m the number of mean sized slots on e.
// an edge whose packet count reaches its slot count is saturated and the
// whole metric reports saturation instead of a number

use serde::{Deserialize, Serialize};

use crate::packet_network::error::{NetworkError, Result};
use crate::packet_network::flow::DemandSummary;
use crate::packet_network::graph::NetworkGraph;

// Which total the metric is normalised by.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandNormalization {
    // sum of all flow sizes
    #[default]
    TotalSize,
    // number of flows
    FlowCount
}

impl DemandNormalization {
    pub fn denominator(&self,demand:&DemandSummary) -> u64 {
        match self {
            Self::TotalSize => demand.total_size,
            Self::FlowCount => demand.flow_count as u64
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delay {
    Finite(f64),
    Saturated{saturated_edges:usize}
}

impl Delay {
    pub fn finite(&self) -> Option<f64> {
        match self {
            Self::Finite(delay) => Some(*delay),
            Self::Saturated {..} => None
        }
    }
    pub fn is_saturated(&self) -> bool {
        matches!(self,Self::Saturated {..})
    }
}

pub fn delay(graph:&NetworkGraph,demand:&DemandSummary,normalization:DemandNormalization) -> Result<Delay> {
    let denominator = normalization.denominator(demand);
    let mean_size = demand.mean_size().ok_or(NetworkError::EmptyDemand)?;
    if denominator == 0 || mean_size <= 0.0 {
        return Err(NetworkError::EmptyDemand);
    }

    let mut sum = 0.0;
    let mut saturated_edges = 0;
    for edge in graph.edges() {
        if edge.packet_count() == 0 {
            continue;
        }
        let packets = edge.packet_count() as f64;
        let slots = edge.capacity() as f64/mean_size;
        if packets >= slots {
            saturated_edges += 1;
            continue;
        }
        sum += packets/(slots - packets);
    }

    if saturated_edges > 0 {
        return Ok(Delay::Saturated {saturated_edges});
    }
    Ok(Delay::Finite(sum/denominator as f64))
}
