//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the crowdfund ledger.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `CrowdfundApi`
//! - **Driven Ports (Outbound)**: `ChainAccess`, `ValueReceiver`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
