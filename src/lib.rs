//! The library code for the `citypages` page generator. The architecture can
//! be generally broken down into two distinct steps:
//!
//! 1. Generating a bounded daily batch of city landing pages
//!    ([`crate::build`])
//! 2. Packing and publishing the output directory ([`crate::archive`],
//!    [`crate::deploy`])
//!
//! Of the two, the first is the more involved. A run parses the city dataset
//! ([`crate::dataset`]), loads the tracker of already-generated identifiers
//! ([`crate::progress`]), selects a bounded random batch from the remaining
//! backlog ([`crate::batch`]), renders one page per selected record
//! ([`crate::render`]), commits the batch's identifiers to the tracker, and
//! writes an index of the run's pages ([`crate::manifest`]).
//!
//! The tracker is the system's only durable state: identifiers are derived
//! deterministically from each record's name and region ([`crate::ident`]),
//! and once an identifier is committed it is never regenerated, so repeated
//! daily runs walk the dataset exactly once however often they are invoked.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod batch;
pub mod build;
pub mod config;
pub mod dataset;
pub mod deploy;
pub mod ident;
pub mod manifest;
pub mod progress;
pub mod render;
