//! Interview-prep guide pipeline: sanitize the backend's raw text, normalise it
//! into a `Document`, classify and render blocks, and merge refinements, all
//! driven by the `GenerationOrchestrator` session.

pub mod classifier;
pub mod handlers;
pub mod industry;
pub mod markdown;
pub mod merger;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod render;
pub mod sanitizer;
