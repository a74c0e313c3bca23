use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::dsa::bitset::BitSet;

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;

// node sequence v0..vn plus the edge ids e1..en between them
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Path {
    pub nodes:Vec<usize>,
    pub edges:Vec<usize>
}

impl Path {
    fn trivial(node:usize) -> Self {
        Self {nodes:vec![node],edges:vec![]}
    }
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

// predecessor bookkeeping for a single search from `start`
struct Visited {
    start:usize,
    previous:HashMap<usize,(usize,usize)>
}

impl Visited {
    fn with_capacity(start:usize,capacity:usize) -> Self {
        Self {
            start,
            previous:HashMap::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default())
        }
    }
    fn is_visited(&self,node:&usize) -> bool {
        *node == self.start || self.previous.contains_key(node)
    }
    fn visit(&mut self,node:usize,from:usize,edge:usize) {
        debug_assert!(!self.is_visited(&node));
        self.previous.insert(node,(from,edge));
    }
    // walks predecessors back from `end`
    fn trace(&self,end:usize) -> Option<Path> {
        let mut nodes = vec![end];
        let mut edges = vec![];
        let mut current = end;
        while current != self.start {
            let (from,edge) = self.previous.get(&current)?;
            nodes.push(*from);
            edges.push(*edge);
            current = *from;
        }
        nodes.reverse();
        edges.reverse();
        Some(Path {nodes,edges})
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum EdgeRejection {
    SelfLoop,
    Duplicate(usize)
}

// simple undirected graph, edges stored once as (low,high)
// adjacency lists are kept sorted by neighbour so searches are deterministic
#[derive(Clone,Debug,Default)]
pub struct UnDirectedGraph {
    edges:Vec<(usize,usize)>,
    adjacency_list:HashMap<usize,Vec<(usize,usize)>>
}

impl UnDirectedGraph {
    pub fn new() -> Self {
        Self {
            edges:vec![],
            adjacency_list:HashMap::with_hasher(nohash::BuildNoHashHasher::default())
        }
    }
    pub fn with_capacity(capacity:usize) -> Self {
        Self {
            edges:Vec::with_capacity(capacity),
            adjacency_list:HashMap::with_capacity_and_hasher(
                capacity,
                nohash::BuildNoHashHasher::default())
        }
    }
    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }
    pub fn nodes_len(&self) -> usize {
        self.adjacency_list.len()
    }
    pub fn contains_node(&self,node:usize) -> bool {
        self.adjacency_list.contains_key(&node)
    }
    // only push node, not adding edges
    pub fn push_node<B:Borrow<usize>>(&mut self,node:B) {
        let node = node.borrow();
        if self.adjacency_list.contains_key(node) {
            return;
        }
        self.adjacency_list.insert(*node,vec![]);
    }
    // returns the new edge id
    pub fn push_edge(&mut self,node1:usize,node2:usize) -> Result<usize,EdgeRejection> {
        if node1 == node2 {
            return Err(EdgeRejection::SelfLoop);
        }
        if let Some(edge) = self.edge_id(node1, node2) {
            return Err(EdgeRejection::Duplicate(edge));
        }
        let id = self.edges.len();
        self.edges.push((node1.min(node2),node1.max(node2)));
        for (node,neighbour) in [(node1,node2),(node2,node1)] {
            let adj = self.adjacency_list.entry(node).or_default();
            let pos = adj.partition_point(|(n,_)| *n < neighbour);
            adj.insert(pos,(neighbour,id));
        }
        Ok(id)
    }
    pub fn edge_id(&self,node1:usize,node2:usize) -> Option<usize> {
        let adj = self.adjacency_list.get(&node1)?;
        let pos = adj.binary_search_by_key(&node2,|(n,_)| *n).ok()?;
        Some(adj[pos].1)
    }
    pub fn degree(&self,node:usize) -> usize {
        self.adjacency_list.get(&node).map_or(0,|adj| adj.len())
    }
    // (neighbour, edge id) in ascending neighbour order
    pub fn neighbours(&self,node:usize) -> impl Iterator<Item = (usize,usize)> + '_ {
        self.adjacency_list.get(&node).into_iter().flatten().copied()
    }
    pub fn nodes(&self) -> Vec<usize> {
        let mut nodes:Vec<usize> = self.adjacency_list.keys().copied().collect();
        nodes.sort_unstable();
        nodes
    }

    // fewest hops, edges flagged in `excluded` are skipped, O(V + E)
    pub fn bfs_path(&self,start:usize,end:usize,excluded:&BitSet) -> Option<Path> {
        if !self.contains_node(start) || !self.contains_node(end) {
            return None;
        }
        if start == end {
            return Some(Path::trivial(start));
        }
        let mut visited = Visited::with_capacity(start,self.nodes_len());
        let mut queue = VecDeque::with_capacity(self.nodes_len());
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for (next,edge) in self.neighbours(current) {
                if excluded.contains(edge) || visited.is_visited(&next) {
                    continue;
                }
                visited.visit(next, current, edge);
                if next == end {
                    return visited.trace(end);
                }
                queue.push_back(next);
            }
        }
        None
    }

    // least total edge cost, ties go to fewer hops
    // costs must be finite and non-negative
    pub fn weighted_path<F>(&self,start:usize,end:usize,excluded:&BitSet,cost:F) -> Option<Path>
        where F:Fn(usize) -> f64
    {
        if !self.contains_node(start) || !self.contains_node(end) {
            return None;
        }
        if start == end {
            return Some(Path::trivial(start));
        }
        let mut visited = Visited::with_capacity(start,self.nodes_len());
        let mut best:HashMap<usize,Distance> = HashMap::with_capacity_and_hasher(
            self.nodes_len(),nohash::BuildNoHashHasher::default());
        let mut settled:HashMap<usize,()> = HashMap::with_capacity_and_hasher(
            self.nodes_len(),nohash::BuildNoHashHasher::default());
        let mut heap = BinaryHeap::new();

        best.insert(start,Distance::ZERO);
        heap.push(Candidate {distance:Distance::ZERO,node:start});

        while let Some(Candidate {distance,node}) = heap.pop() {
            if settled.insert(node,()).is_some() {
                continue;
            }
            if node == end {
                return visited.trace(end);
            }
            for (next,edge) in self.neighbours(node) {
                if excluded.contains(edge) || settled.contains_key(&next) || next == start {
                    continue;
                }
                let edge_cost = cost(edge);
                debug_assert!(edge_cost.is_finite() && edge_cost >= 0.0);
                let through = Distance {cost:distance.cost + edge_cost,hops:distance.hops + 1};
                let improves = best.get(&next).is_none_or(|known| through < *known);
                if improves {
                    best.insert(next,through);
                    // re-point the predecessor on every improvement
                    visited.previous.insert(next,(node,edge));
                    heap.push(Candidate {distance:through,node:next});
                }
            }
        }
        None
    }
}

#[derive(Debug,Clone,Copy)]
struct Distance {
    cost:f64,
    hops:usize
}

impl Distance {
    const ZERO:Self = Self {cost:0.0,hops:0};
}

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Distance {}
impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.total_cmp(&other.cost).then(self.hops.cmp(&other.hops))
    }
}

// min-heap entry, lower node id wins ties
#[derive(Debug,PartialEq,Eq)]
struct Candidate {
    distance:Distance,
    node:usize
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.cmp(&self.distance).then(other.node.cmp(&self.node))
    }
}

impl<B:Borrow<(usize,usize)>> FromIterator<B> for UnDirectedGraph {
    // self loops and repeated pairs are dropped
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let size_estimation = match iter.size_hint() {
            (_,Some(n)) => {n},
            (n,None) => {n}
        };
        let mut new_graph = Self::with_capacity(size_estimation);
        for b in iter {
            let (node1,node2) = b.borrow();
            let _ = new_graph.push_edge(*node1, *node2);
        }
        new_graph.edges.shrink_to_fit();
        new_graph
    }
}
