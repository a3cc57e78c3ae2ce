//! Monitoring shim for storage triggered pipeline stages.
//!
//! Every run handles one storage event: it resolves the tracking name of the object,
//! copies the object to the configured outputs and writes the ingress or egress time
//! of the object into InfluxDB so pipeline stages can be joined on the tracking name.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
