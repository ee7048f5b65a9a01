//! # dispatch
//!
//! The update dispatch engine: per-kind handler registries with priority ordering,
//! filter matching with fail-closed semantics, the middleware pre/post pipeline,
//! and concurrent per-update processing of polled batches.
//!
//! Registration is a setup-time operation on `&mut Dispatcher`; steady-state
//! dispatch takes the dispatcher behind an [`std::sync::Arc`].

mod dispatcher;
mod matcher;
mod registry;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use registry::{Callback, HandlerRecord, HandlerResponse, Registry};
