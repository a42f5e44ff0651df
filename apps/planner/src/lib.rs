//! Review planner: a file-backed caller of review-core.

pub mod commands;
pub mod db;
pub mod settings;
