pub mod histogram;
pub mod network;

pub use histogram::WordHistogram;
pub use network::NetworkBytes;
