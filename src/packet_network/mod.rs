// capacitated packet network under congestion, rerouting and random edge failure
//
// two ways of moving demand through the network:
// the adaptive router walks one flow hop by hop with live capacity checks,
// the weighted allocator commits whole paths for a batch of flows at once.
// trials and the monte carlo harness build on the allocator.

pub mod allocator;
pub mod config;
pub mod error;
pub mod flow;
pub mod graph;
pub mod harness;
pub mod intensity;
pub mod metric;
pub mod router;
pub mod simulator;
pub mod trial;

pub use allocator::{Allocation, UnroutableCause, WeightedAllocator};
pub use config::{ErrorPolicy, SimulationConfig};
pub use error::{ConfigError, IntensityError, NetworkError, Result};
pub use flow::{DemandSummary, Flow};
pub use graph::{CapacityBoundary, Edge, EdgeId, EdgeKey, NetworkGraph, NodeId};
pub use harness::{MonteCarloHarness, MonteCarloReport, ThresholdPoint};
pub use intensity::IntensityMatrix;
pub use metric::{Delay, DemandNormalization};
pub use router::{AdaptiveRouter, Step};
pub use simulator::{FlowReport, RoundObserver, SimulationReport, Simulator};
pub use trial::{TrialOutcome, TrialRunner};
