//! Domains: formulas and observations over a temporal universe, with the
//! satisfaction semantics and scoring built on them.

mod config;
mod domain;
mod semantics;

pub use config::{DomainConfig, LiquidityPolicy};
pub use domain::Domain;
