//! eventlogic: weighted temporal event logic over span intervals
//!
//! This crate evaluates interval-temporal sentences against models that map
//! ground atoms to sets of time intervals, simplifies hard constraints by
//! quantified unit propagation, and searches for high-scoring models with
//! MaxWalkSat or samples them with MC-SAT.

pub mod config;
pub mod domain;
pub mod error;
pub mod inference;
pub mod interval;
pub mod model;
pub mod parser;
pub mod syntax;
pub mod unitprop;

pub use error::{EngineError, Result};
