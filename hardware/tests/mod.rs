//! Test module organization.
//!
//! This module organizes all integration tests for the memory system builder.



/// Configuration parsing tests.
mod config_tests;


/// Network model construction and latency tests.
mod network_tests;

/// Controller and protocol registry tests.
mod protocol_tests;
