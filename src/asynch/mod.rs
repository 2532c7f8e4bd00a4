//! # Async protocol engine
//!
//! Same engine as [crate::dispatcher::Dispatcher] for async executors. Waiting for a response
//! yields to the executor and is bounded by an [embassy_time::Timer].
//!
//! Wifi bring-up is offered by [WifiAdapter], the single connection client by inherent methods of
//! [Dispatcher].
mod dispatcher;
mod socket;
mod wifi;

pub use dispatcher::Dispatcher;
pub use wifi::WifiAdapter;
