#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod asynch;
pub mod buffer;
pub mod classifier;
pub mod commands;
pub mod config;
pub mod dispatcher;
#[cfg(feature = "examples")]
pub mod example;
pub mod http;
pub mod ingress;
pub(crate) mod responses;
pub mod session;
pub mod socket;
pub mod wifi;

#[cfg(test)]
mod tests;

pub use classifier::{Classifier, CommandIdentity, MultiplexMode, Outcome, WifiMode};
pub use config::Config;
pub use dispatcher::{Dispatcher, Error};
pub use ingress::{ByteSource, Ingress};
pub use session::{SharedSession, DEFAULT_BUFFER_SIZE};
