//! Command implementations for the memload CLI

pub mod run;
pub mod selftest;
