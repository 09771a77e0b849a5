//! # Crowdfund Lab Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── exploits/         # Attack simulations, one file per flaw
//! │   ├── reentrancy.rs
//! │   ├── refund_dos.rs
//! │   └── access_control.rs
//! │
//! └── integration/      # Whole-lab flows across both crates
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cf-tests
//!
//! # By category
//! cargo test -p cf-tests integration::
//! cargo test -p cf-tests exploits::reentrancy::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
pub mod integration;
