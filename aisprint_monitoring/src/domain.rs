//! The monitoring domain: models, the ports it reaches out through and the
//! service which sequences a run

pub mod models;
pub mod ports;
pub mod service;
pub mod tracking;
