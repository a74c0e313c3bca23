use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dsa::bitset::BitSet;
use crate::dsa::graph::{EdgeRejection, Path, UnDirectedGraph};
use crate::packet_network::error::{NetworkError, Result};

pub type NodeId = usize;
pub type EdgeId = usize;

// unordered node pair, always stored as low < high
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize,Deserialize)]
pub struct EdgeKey {
    pub low:NodeId,
    pub high:NodeId
}

impl EdgeKey {
    pub fn new(a:NodeId,b:NodeId) -> Self {
        Self {low:a.min(b),high:a.max(b)}
    }
    pub fn other(&self,node:NodeId) -> Option<NodeId> {
        if node == self.low {return Some(self.high)}
        if node == self.high {return Some(self.low)}
        None
    }
}

impl Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"({},{})",self.low,self.high)
    }
}

// Whether an edge with residual `r` admits a flow of size `s`.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBoundary {
    // `r >= s`
    #[default]
    Inclusive,
    // `r > s`
    Strict
}

impl CapacityBoundary {
    pub fn admits(&self,residual:u64,size:u64) -> bool {
        match self {
            Self::Inclusive => residual >= size,
            Self::Strict => residual > size
        }
    }
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Edge {
    key:EdgeKey,
    capacity:u64,
    flow:u64,
    weight:f64,
    packet_count:u64,
    failed:bool
}

impl Edge {
    fn new(key:EdgeKey,capacity:u64) -> Self {
        Self {key,capacity,flow:0,weight:0.0,packet_count:0,failed:false}
    }
    pub fn key(&self) -> EdgeKey {
        self.key
    }
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
    pub fn flow(&self) -> u64 {
        self.flow
    }
    // load ratio, 0.0 on zero capacity edges
    pub fn weight(&self) -> f64 {
        self.weight
    }
    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }
    pub fn is_failed(&self) -> bool {
        self.failed
    }
    pub fn residual(&self) -> u64 {
        self.capacity - self.flow
    }
    // failed and zero capacity edges never admit anything
    pub fn admits(&self,size:u64,boundary:CapacityBoundary) -> bool {
        !self.failed && self.capacity > 0 && boundary.admits(self.residual(), size)
    }
    fn refresh_weight(&mut self) {
        self.weight = if self.capacity == 0 {0.0} else {self.flow as f64/self.capacity as f64};
    }
}

// Capacitated undirected network. Topology is fixed once built, only the
// per-edge load state changes during a simulation.
#[derive(Debug,Clone,Default)]
pub struct NetworkGraph {
    topology:UnDirectedGraph,
    edges:Vec<Edge>
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(capacity:usize) -> Self {
        Self {
            topology:UnDirectedGraph::with_capacity(capacity),
            edges:Vec::with_capacity(capacity)
        }
    }
    // capacity of every edge is the sum of its endpoint degrees
    pub fn from_edges_with_degree_capacity(pairs:&[(NodeId,NodeId)]) -> Result<Self> {
        let mut shape = UnDirectedGraph::with_capacity(pairs.len());
        for (a,b) in pairs {
            shape.push_edge(*a, *b).map_err(|e| rejection_error(*a, *b, e))?;
        }
        let mut graph = Self::with_capacity(pairs.len());
        for (a,b) in pairs {
            let capacity = (shape.degree(*a) + shape.degree(*b)) as u64;
            graph.push_edge(*a, *b, capacity)?;
        }
        Ok(graph)
    }
    pub fn nodes_len(&self) -> usize {
        self.topology.nodes_len()
    }
    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }
    pub fn nodes(&self) -> Vec<NodeId> {
        self.topology.nodes()
    }
    pub fn contains_node(&self,node:NodeId) -> bool {
        self.topology.contains_node(node)
    }
    pub fn push_node(&mut self,node:NodeId) {
        self.topology.push_node(node);
    }
    pub fn push_edge(&mut self,a:NodeId,b:NodeId,capacity:u64) -> Result<EdgeId> {
        let id = self.topology.push_edge(a, b).map_err(|e| rejection_error(a, b, e))?;
        debug_assert_eq!(id,self.edges.len());
        self.edges.push(Edge::new(EdgeKey::new(a, b),capacity));
        Ok(id)
    }
    pub fn edge(&self,id:EdgeId) -> Result<&Edge> {
        self.edges.get(id).ok_or(NetworkError::UnknownEdge(id))
    }
    pub fn edge_id(&self,a:NodeId,b:NodeId) -> Option<EdgeId> {
        self.topology.edge_id(a, b)
    }
    pub fn edge_between(&self,a:NodeId,b:NodeId) -> Option<&Edge> {
        self.edge_id(a, b).and_then(|id| self.edges.get(id))
    }
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
    pub fn total_capacity(&self) -> u64 {
        self.edges.iter().map(|e| e.capacity).sum()
    }
    // mask sized for this graph, nothing excluded
    pub fn empty_mask(&self) -> BitSet {
        BitSet::with_len(self.edges_len())
    }

    pub fn hop_path(&self,from:NodeId,to:NodeId,excluded:&BitSet) -> Option<Path> {
        self.topology.bfs_path(from, to, excluded)
    }
    // ranked by the sum of edge load ratios
    pub fn weighted_path(&self,from:NodeId,to:NodeId,excluded:&BitSet) -> Option<Path> {
        let edges = &self.edges;
        self.topology.weighted_path(from, to, excluded, |id| edges[id].weight)
    }

    // adds `size` of load and counts one more package through the edge
    pub fn reserve(&mut self,id:EdgeId,size:u64) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or(NetworkError::UnknownEdge(id))?;
        if edge.flow.checked_add(size).is_none_or(|total| total > edge.capacity) {
            return Err(NetworkError::CapacityExceeded {
                key:edge.key,flow:edge.flow,size,capacity:edge.capacity
            });
        }
        edge.flow += size;
        edge.packet_count += 1;
        edge.refresh_weight();
        Ok(())
    }
    // takes load back off an edge, packet count is left as is
    pub fn release(&mut self,id:EdgeId,size:u64) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or(NetworkError::UnknownEdge(id))?;
        if edge.flow < size {
            return Err(NetworkError::NegativeFlow {key:edge.key,flow:edge.flow,size});
        }
        edge.flow -= size;
        edge.refresh_weight();
        Ok(())
    }
    // the edge stays in the topology but its capacity counts as consumed
    pub fn fail_edge(&mut self,id:EdgeId) -> Result<EdgeKey> {
        let edge = self.edges.get_mut(id).ok_or(NetworkError::UnknownEdge(id))?;
        edge.failed = true;
        edge.flow = edge.capacity;
        edge.refresh_weight();
        debug!(edge = %edge.key, capacity = edge.capacity, "edge failed");
        Ok(edge.key)
    }
    pub fn reset(&mut self) {
        for edge in self.edges.iter_mut() {
            edge.flow = 0;
            edge.packet_count = 0;
            edge.failed = false;
            edge.weight = 0.0;
        }
    }
    pub fn is_clean(&self) -> bool {
        self.edges.iter().all(|e| e.flow == 0 && e.packet_count == 0 && !e.failed)
    }
    pub fn check_invariants(&self) -> Result<()> {
        for edge in self.edges.iter() {
            if edge.flow > edge.capacity {
                return Err(NetworkError::CapacityExceeded {
                    key:edge.key,flow:edge.flow,size:0,capacity:edge.capacity
                });
            }
        }
        Ok(())
    }
}

fn rejection_error(a:NodeId,b:NodeId,rejection:EdgeRejection) -> NetworkError {
    match rejection {
        EdgeRejection::SelfLoop => NetworkError::SelfLoop(a),
        EdgeRejection::Duplicate(_) => {
            let key = EdgeKey::new(a, b);
            NetworkError::DuplicateEdge {low:key.low,high:key.high}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CapacityBoundary, EdgeKey, NetworkGraph};
    use crate::packet_network::error::NetworkError;

    fn cycle(len:usize,capacity:u64) -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        for i in 0..len {
            graph.push_edge(i, (i+1)%len, capacity).unwrap();
        }
        graph
    }

    #[test]
    fn test_canonical_keys() {
        let graph = cycle(4, 10);
        let edge = graph.edge_between(3, 0).unwrap();
        assert_eq!(edge.key(),EdgeKey::new(0, 3));
        assert_eq!(edge.key().low,0);
        assert_eq!(edge.key().other(3),Some(0));
        assert_eq!(graph.edge_id(0, 3),graph.edge_id(3, 0));
    }
    #[test]
    fn test_rejects_invalid_topology() {
        let mut graph = cycle(3, 5);
        assert_eq!(graph.push_edge(1, 0, 5),Err(NetworkError::DuplicateEdge {low:0,high:1}));
        assert_eq!(graph.push_edge(2, 2, 5),Err(NetworkError::SelfLoop(2)));
        assert_eq!(graph.edges_len(),3);
    }
    #[test]
    fn test_degree_capacity() {
        // star around 0 plus one extra edge
        let graph = NetworkGraph::from_edges_with_degree_capacity(&[(0,1),(0,2),(0,3),(1,2)]).unwrap();
        assert_eq!(graph.edge_between(0, 1).unwrap().capacity(),5);
        assert_eq!(graph.edge_between(0, 3).unwrap().capacity(),4);
        assert_eq!(graph.edge_between(1, 2).unwrap().capacity(),4);
        assert_eq!(graph.total_capacity(),17);
    }
    #[test]
    fn test_reserve_and_release() {
        let mut graph = cycle(4, 10);
        let id = graph.edge_id(0, 1).unwrap();
        graph.reserve(id, 4).unwrap();
        graph.reserve(id, 6).unwrap();
        let edge = graph.edge(id).unwrap();
        assert_eq!(edge.flow(),10);
        assert_eq!(edge.packet_count(),2);
        assert_eq!(edge.weight(),1.0);
        assert!(matches!(graph.reserve(id, 1),Err(NetworkError::CapacityExceeded {..})));

        graph.release(id, 10).unwrap();
        assert_eq!(graph.edge(id).unwrap().flow(),0);
        assert!(matches!(graph.release(id, 1),Err(NetworkError::NegativeFlow {..})));
        graph.check_invariants().unwrap();
    }
    #[test]
    fn test_boundary_policies() {
        assert!(CapacityBoundary::Inclusive.admits(3, 3));
        assert!(!CapacityBoundary::Strict.admits(3, 3));
        assert!(CapacityBoundary::Strict.admits(4, 3));
        assert!(!CapacityBoundary::Inclusive.admits(2, 3));
    }
    #[test]
    fn test_failure_and_reset() {
        let mut graph = cycle(4, 10);
        let id = graph.edge_id(1, 2).unwrap();
        graph.reserve(graph.edge_id(0, 1).unwrap(), 3).unwrap();
        let key = graph.fail_edge(id).unwrap();
        assert_eq!(key,EdgeKey::new(1, 2));
        let failed = graph.edge(id).unwrap();
        assert!(failed.is_failed());
        assert_eq!(failed.flow(),failed.capacity());
        assert!(!failed.admits(1, CapacityBoundary::Inclusive));
        assert!(!graph.is_clean());

        graph.reset();
        assert!(graph.is_clean());
        assert!(graph.edges().all(|e| e.weight() == 0.0));
    }
    #[test]
    fn test_zero_capacity_never_admits() {
        let mut graph = NetworkGraph::new();
        let id = graph.push_edge(0, 1, 0).unwrap();
        assert!(!graph.edge(id).unwrap().admits(0, CapacityBoundary::Inclusive));
        assert_eq!(graph.edge(id).unwrap().weight(),0.0);
    }
}
