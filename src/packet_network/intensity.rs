use std::fmt::Display;

use tracing::warn;

use crate::packet_network::error::{IntensityError, Result as NetworkResult};
use crate::packet_network::flow::Flow;

type Result<T> = std::result::Result<T,IntensityError>;

// square demand matrix in row major order, cell (i,j) is the size sent from i to j
// dim*dim must equal cells.len()
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct IntensityMatrix {
    dim:usize,
    cells:Vec<u64>
}

impl Display for IntensityMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"[")?;
        for (i,cell) in self.cells.iter().enumerate() {
            write!(f,"{cell}")?;
            if i+1 == self.cells.len() {
                write!(f,"]")?;
            }else if (i+1)%self.dim == 0 {
                writeln!(f,",")?;
            }else{
                write!(f,", ")?;
            }
        }
        Ok(())
    }
}

impl IntensityMatrix {
    pub fn zeros(dim:usize) -> Self {
        Self {dim,cells:vec![0;dim*dim]}
    }
    pub fn new_with_vec(cells:Vec<u64>,dim:usize) -> Result<Self> {
        if dim*dim != cells.len() {
            return Err(IntensityError::SizeMismatch {dim,len:cells.len()})
        }
        Ok(Self {dim,cells})
    }
    pub fn dim(&self) -> usize {
        self.dim
    }
    pub fn get(&self,row:usize,col:usize) -> Result<u64> {
        if row >= self.dim || col >= self.dim {
            return Err(IntensityError::IndexOutOfBounds {dim:self.dim,row,col})
        }
        Ok(self.cells[row*self.dim + col])
    }
    pub fn set(&mut self,row:usize,col:usize,size:u64) -> Result<()> {
        if row >= self.dim || col >= self.dim {
            return Err(IntensityError::IndexOutOfBounds {dim:self.dim,row,col})
        }
        self.cells[row*self.dim + col] = size;
        Ok(())
    }
    pub fn total_demand(&self) -> u64 {
        self.cells.iter().sum()
    }
    // (source, target, size) for every non zero cell
    pub fn demands(&self) -> impl Iterator<Item = (usize,usize,u64)> + '_ {
        self.cells.iter().enumerate()
            .filter(|(_,size)| **size != 0)
            .map(|(index,size)| (index/self.dim,index%self.dim,*size))
    }
    // one flow per non zero cell, diagonal cells are dropped
    pub fn flows(&self) -> NetworkResult<Vec<Flow>> {
        let mut flows = Vec::with_capacity(self.cells.len());
        for (source,target,size) in self.demands() {
            if source == target {
                warn!(node = source, size, "discarding demand from a node to itself");
                continue;
            }
            flows.push(Flow::new(size, source, target)?);
        }
        flows.shrink_to_fit();
        Ok(flows)
    }
}

#[cfg(test)]
mod tests {
    use super::IntensityMatrix;
    use crate::packet_network::error::IntensityError;

    #[test]
    fn test_size_checked() {
        assert_eq!(IntensityMatrix::new_with_vec(vec![0;5], 2),Err(IntensityError::SizeMismatch {dim:2,len:5}));
        let matrix = IntensityMatrix::zeros(3);
        assert!(matrix.get(3, 0).is_err());
        assert_eq!(matrix.total_demand(),0);
    }
    #[test]
    fn test_flows_from_matrix() {
        let matrix = IntensityMatrix::new_with_vec(vec![
            0,2,0,
            0,7,1,
            5,0,0
        ], 3).unwrap();
        let flows = matrix.flows().unwrap();
        let triples:Vec<_> = flows.iter().map(|f| (f.source(),f.target(),f.size())).collect();
        assert_eq!(triples,vec![(0,1,2),(1,2,1),(2,0,5)]);
    }
    #[test]
    fn test_display() {
        let mut matrix = IntensityMatrix::zeros(2);
        matrix.set(0, 1, 4).unwrap();
        assert_eq!(matrix.to_string(),"[0, 4,\n0, 0]");
    }
}
