//! Core evaluator — values, errors, templates, resolution, teardown.

pub mod error;
pub mod evaluator;
pub mod eventlog;
pub mod graph;
pub mod parser;
pub mod resource;
pub mod stack;
pub mod template;
pub mod value;
