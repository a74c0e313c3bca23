pub mod dsa;
pub mod packet_network;
pub mod scientific_computing;
