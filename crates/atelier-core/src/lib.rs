//! Core engine for the atelier order-processing system.
//!
//! This crate wires the lifecycle services to their repositories and runs
//! the job dispatcher: lifecycle operations arrive as named jobs, are
//! executed by a bounded worker pool, retried a fixed number of times on
//! failure, and leave a polled job record behind. The HTTP layer only
//! talks to the [`Engine`].

pub mod builder;
pub mod engine;

pub use builder::{BuilderError, EngineBuilder, ServiceFactories};
pub use engine::dispatch::{JobRecord, JobStatus, Operation};
pub use engine::{DispatchError, Engine, EngineError, JobHandle};
