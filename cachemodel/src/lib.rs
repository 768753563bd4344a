//! # CacheModel
//!
//! CacheModel is a library for comparing cache organisations against a trace of memory references
//!
//! It provides a generic cache implementation, parameterised by a replacement policy, which covers
//! fully associative, direct mapped and set associative caches with least recently used eviction,
//! and a simulator which feeds a trace to several caches side by side and reports their read and
//! write hit rates
//!
//! Only hits and misses are modelled. There is no data, no dirty state, and no notion of latency

/// Contains the cache model trait, the generic cache, and the enum of the provided organisations
pub mod cache;

/// Contains definitions for the JSON input format, and the default comparison
pub mod config;

/// Contains the address decoder which splits addresses into set and tag
pub mod decoder;

/// Contains cache geometries and the errors raised when one is invalid
pub mod geometry;

/// Contains a helper for opening traces efficiently
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace over a given cache configuration
pub mod simulator;

/// Contains request counters and the reports built from them
pub mod stats;

/// Contains the memory event type and the text trace parser
pub mod trace;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
