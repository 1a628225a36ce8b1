//! Remote-backed store variant.
//!
//! # Responsibility
//! - Define the request/response gateway contract (`RemoteApi`) and the
//!   server wire shapes it exchanges.
//! - Reconcile server-shaped responses into the canonical board tree and
//!   drive mutate-then-refetch store operations against it.
//!
//! # Invariants
//! - No optimistic mutation: canonical state changes only after the server
//!   confirms and a refetch lands.
//! - Transport failures propagate to callers unchanged; they never corrupt
//!   the in-memory tree.

pub mod api;
pub mod board;
pub mod manager;
