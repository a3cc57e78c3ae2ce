//! Adapters for the data the process is triggered with

pub mod event;
