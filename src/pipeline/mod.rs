//! # Fetch Pipeline
//!
//! Concurrent fetch-and-aggregate over a [`HeightRange`](crate::types::HeightRange).
//!
//! ## Flow
//!
//! ```text
//!   chain_id()  ──►  producer ──► [task channel] ──► worker 0..P ──► [outcome channel] ──► collector
//!                                                        │                                   ▲
//!                                                        └──────── supervisor (join) ────────┘
//! ```
//!
//! 1. The chain identity is resolved once before anything is spawned.
//! 2. A producer feeds every height, ascending, into a bounded task channel.
//! 3. `P` workers pull heights and report one [`FetchOutcome`](crate::types::FetchOutcome)
//!    per height on a single outcome channel. A worker stops after its first failure.
//! 4. A supervisor joins the workers and then closes the outcome channel.
//! 5. The collector appends successes in arrival order. The first failure cancels
//!    the run token, the collector waits for the pool to wind down, and the run
//!    fails without any output.

mod orchestrator;
mod worker;

pub use orchestrator::Orchestrator;
