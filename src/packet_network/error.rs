use thiserror::Error;

use crate::packet_network::graph::EdgeKey;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum NetworkError {
    #[error("node {0} is not part of the network")]
    UnknownNode(usize),
    #[error("edge id {0} is not part of the network")]
    UnknownEdge(usize),
    #[error("edge {0}-{0} would be a self loop")]
    SelfLoop(usize),
    #[error("edge {low}-{high} is already present")]
    DuplicateEdge{low:usize,high:usize},
    #[error("flow {from}->{to} has zero size")]
    ZeroSizedFlow{from:usize,to:usize},
    #[error("no path at all between {from} and {to}")]
    Disconnected{from:usize,to:usize},
    #[error("edge {key} carries {flow}, adding {size} exceeds capacity {capacity}")]
    CapacityExceeded{key:EdgeKey,flow:u64,size:u64,capacity:u64},
    #[error("edge {key} carries {flow}, cannot release {size}")]
    NegativeFlow{key:EdgeKey,flow:u64,size:u64},
    #[error("delay metric needs at least one flow with non-zero demand")]
    EmptyDemand,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError)
}

#[derive(Error,Debug,Clone,PartialEq)]
pub enum ConfigError {
    #[error("no failure percentage must be within 0..=100, got {0}")]
    NoFailurePercentOutOfRange(u8),
    #[error("repeat must be at least 1")]
    ZeroRepeat,
    #[error("{0} attempt budget must be at least 1")]
    ZeroAttemptBudget(&'static str)
}

#[derive(Error,Debug,Clone,PartialEq)]
pub enum IntensityError {
    #[error("attempted to create {dim}*{dim} intensity matrix from vector with length {len}")]
    SizeMismatch{dim:usize,len:usize},
    #[error("intensity matrix is {dim}*{dim}, but ({row},{col}) was accessed")]
    IndexOutOfBounds{dim:usize,row:usize,col:usize}
}

pub type Result<T> = std::result::Result<T,NetworkError>;
