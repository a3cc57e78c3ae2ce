//! Concrete implementations of the outbound ports
//! Outbound ports are things in the outside world that we reach out to

pub mod influx;
pub mod storage;
