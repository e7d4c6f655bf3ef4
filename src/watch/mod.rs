// src/watch/mod.rs

//! Watch-driven pipeline: registry, event multiplexer, channel stages.
//!
//! This module is responsible for:
//! - Deriving the set of *directories* to watch from a set of *file*
//!   patterns (notification primitives signal at directory granularity).
//! - Owning the single `notify` subscription and turning its raw change
//!   records into coherent snapshot deliveries.
//! - Running channel-connected pipeline stages over those snapshots.
//!
//! It does **not** know what steps do with the files; it only guarantees
//! that every stage receives the right entries in the right order.

pub mod channel;
pub mod events;
pub mod multiplexer;
pub mod registry;

pub use channel::ChannelPipeline;
pub use multiplexer::{spawn_multiplexer, WatchSession};
pub use registry::WatchRegistry;
