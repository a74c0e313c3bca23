// fixed length bit mask, indexed by edge id
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct BitSet {
    size:usize,
    bytes:Vec<u8>
}

impl BitSet {
    pub fn new() -> Self {
        Self {size:0,bytes:vec![]}
    }
    // all bits cleared
    pub fn with_len(len:usize) -> Self {
        if len == 0 {return Self::new()}
        Self {
            size:len,
            bytes:vec![0u8;len/8 + 1]
        }
    }
    pub fn len(&self) -> usize {
        self.size
    }
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
    pub fn push_bit(&mut self, bit:bool) {
        let byte_pos = self.size / 8;
        let pos_in_byte = self.size % 8;

        debug_assert!(byte_pos <= self.bytes.len());

        if byte_pos == self.bytes.len() {
            self.bytes.push(0);
        }
        let mask = 1u8 << pos_in_byte;
        if bit {
            self.bytes[byte_pos] |= mask;
        }else{
            self.bytes[byte_pos] &= !mask;
        }
        self.size += 1;
    }
    pub fn get_at(&self,index:usize) -> Option<bool> {
        if index >= self.size {return None}
        let byte = self.bytes.get(index / 8)?;
        let mask = 1u8 << (index % 8);
        Some(*byte & mask > 0)
    }
    // out of range reads as unset
    pub fn contains(&self,index:usize) -> bool {
        self.get_at(index).unwrap_or(false)
    }
    pub fn store_at(&mut self,index:usize,bit:bool) -> Option<()> {
        if index >= self.size {return None}
        let byte = self.bytes.get_mut(index / 8)?;
        let mask = 1u8 << (index % 8);
        if bit {
            *byte |= mask;
        }else{
            *byte &= !mask;
        }
        Some(())
    }
    pub fn clear(&mut self) {
        for byte in self.bytes.iter_mut() {
            *byte = 0;
        }
    }
    pub fn count_ones(&self) -> usize {
        (0..self.size).filter(|i| self.contains(*i)).count()
    }
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(|i| self.contains(*i))
    }
}
