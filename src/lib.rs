//! suvi-forge: scrape a frame directory, download it concurrently, bake a looping GIF.
//!
//! The pipeline runs in three stages:
//! - [`listing`]: resolve a directory index into sorted, deduplicated frame URLs
//! - [`download`]: fetch them into a workspace under a concurrency cap, fail-fast
//! - [`assemble`]: decode the re-listed frames in name order and encode the GIF
//!
//! [`forge`] wires the stages together; [`cli`] is the binary's front end.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod contract;
pub mod download;
pub mod error;
pub mod forge;
pub mod listing;
pub mod load_config;

pub use error::{ForgeError, ForgeResult, TransportError};
