//! # Integration Flows
//!
//! The scenario catalogue, configuration and report plumbing end to end.

pub mod flows;
