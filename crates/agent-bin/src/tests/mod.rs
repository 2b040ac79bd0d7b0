//! End-to-end scenarios for the agent, without a system bus.
//!
//! - `harness.rs`   - Supervised child plus a terminal listener on scripted input
//! - `scenarios.rs` - Single identity, choosing an identity, invalid selection
//! - `lifecycle.rs` - Child exit status and teardown ordering

mod harness;
