//! Step definitions for Cucumber scenarios

pub mod proposal_steps;
