//! Integration tests entry point
//!
//! Includes all integration test modules from the purge/ subdirectory so the
//! tests compile as one binary while staying organized per area.

mod purge;
