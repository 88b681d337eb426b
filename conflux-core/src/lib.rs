//! Conflux Core
//!
//! Core types shared by the Conflux runtime crates.
//!
//! This crate contains:
//! - Domain types: pipeline identity, version records, resolved versions
//! - Namespace layout: how a (pipeline, version) pair maps onto metadata keys and blob paths

pub mod domain;
pub mod namespace;

pub use namespace::Namespace;
