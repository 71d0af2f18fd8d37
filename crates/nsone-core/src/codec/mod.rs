//! Codecs between the flattened configuration and the structured record
//!
//! - [`meta`]: single metadata values (feed, scalar, list)
//! - [`answer`]: answers and their identity hash
//! - [`region`]: named regions and their identity hash
//! - [`filter`]: the ordered filter chain with config type inference
//!
//! Every function here is pure: no logging, no I/O, no shared state.

pub mod answer;
pub mod filter;
pub mod meta;
pub mod region;
