//! Deals and questions domain module.
//!
//! This crate contains the purchase-inquiry state machine and the question
//! thread rules, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). Callers load the car's owner and pass it in.

pub mod deal;
pub mod question;

pub use deal::{Deal, DealStatus, TransitionPolicy};
pub use question::Question;
