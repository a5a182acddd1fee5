//! Eligibility scoring, ranked matching, and admission rule enforcement for course and job
//! placement.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
