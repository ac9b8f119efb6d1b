//! Contains the building blocks the scheduler manages.
//!
//! This module provides the task definition (what to run, how often, and
//! what to do with each result) and the runner that drives one task's
//! recurring cadence. The `CadenceScheduler` owns collections of these
//! components and wires them together on `start()`.

pub mod runner;
pub mod task;
