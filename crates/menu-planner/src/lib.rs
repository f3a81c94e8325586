//! Menu plan generation for institutional catering.
//!
//! The [`planning`] module holds the generation pipeline (eligibility,
//! feasibility, greedy construction, local search, validation, formatting);
//! [`catalog`] is the only place recipe records are deserialized.

pub mod catalog;
pub mod config;
pub mod error;
pub mod planning;
pub mod telemetry;
