//! Scour: drain a hosted search collection of every document it holds
//! without deleting the collection itself.
//!
//! The heart of the crate is [`controller::PurgeController`], a convergence
//! loop reconciling an eventually-consistent index against the deletes this
//! run has already issued: poll the index for visible identifiers, diff them
//! against the dispatched set, fan the difference out as concurrent delete
//! requests, and wait out index propagation until the index itself reports
//! zero matches. Everything else is plumbing around that loop.

pub mod cli;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod logging;
pub mod progress;
pub mod retry;
