//! # Gatepass Core
//!
//! Environment seams shared by every Gatepass crate.
//!
//! Anything that would make ticket issuance non-deterministic (the wall clock,
//! fresh identifiers) sits behind a trait defined here and is injected into the
//! services that need it. Production code wires [`environment::SystemClock`]
//! and [`environment::RandomIdGenerator`]; tests wire the doubles from
//! `gatepass-testing`.
//!
//! ## Example
//!
//! ```
//! use gatepass_core::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
//!
//! let clock = SystemClock;
//! let ids = RandomIdGenerator;
//!
//! let before = clock.now();
//! let id = ids.next_id();
//! assert!(!id.is_nil());
//! assert!(clock.now() >= before);
//! ```

pub mod environment;

pub use environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
