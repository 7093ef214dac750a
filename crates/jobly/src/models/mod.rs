//! Resource access layers.

pub mod job;

pub use job::{Job, JobFilter, JobPatch, NewJob};
