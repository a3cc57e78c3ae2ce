#![deny(missing_docs)]
//! This crate provides the initialization process shared by the monitoring binaries.
//! It loads `.env` files, installs the panic hook and configures tracing for the
//! environment the process is deployed in.

use tracing_subscriber::EnvFilter;

mod environment;

pub use environment::{Environment, UnknownValue};

/// The filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// unit struct which defines the behaviour for instantiation
#[derive(Debug)]
pub struct MonitoringEntrypoint {
    env: Environment,
}

impl Default for MonitoringEntrypoint {
    fn default() -> Self {
        Self::new(Environment::new_or_prod())
    }
}

/// sentinel struct which guarantees that we called [MonitoringEntrypoint::init]
#[derive(Debug)]
pub struct InitializedEntrypoint(());

impl MonitoringEntrypoint {
    /// create a new instance of [Self] from an input [Environment]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// consume self, initialize this binary, and return a proof that it was initialized [InitializedEntrypoint]
    pub fn init(self) -> InitializedEntrypoint {
        dotenv::dotenv().ok();
        std::panic::set_hook(Box::new(tracing_panic::panic_hook));

        match self.env {
            Environment::Local => {
                tracing_subscriber::fmt()
                    .with_ansi(true)
                    .with_env_filter(env_filter())
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .init();
            }
            Environment::Production | Environment::Develop => {
                tracing_subscriber::fmt()
                    .with_ansi(false)
                    .with_env_filter(env_filter())
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .init();
            }
        }

        tracing::debug!(environment=%self.env, "initialized tracing");

        InitializedEntrypoint(())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
