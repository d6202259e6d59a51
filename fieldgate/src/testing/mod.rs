//! Testing utilities for gate integrations.
//!
//! This module provides:
//! - A submission builder for edit-form saves
//! - An in-memory host with every collaborator the gate needs
//! - A rule that records the values it was asked to judge

mod fixtures;
mod rules;

pub use fixtures::{SubmissionBuilder, TestHost};
pub use rules::RecordingRule;
