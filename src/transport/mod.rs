pub mod pkt_line;
mod remote;

pub use remote::*;
