//! RAG (Retrieval-Augmented Generation) answering.
//!
//! A single linear pipeline: embed the question, retrieve, prompt, complete.

pub mod ask;
pub mod types;

pub use ask::answer;
pub use types::{RagResponse, RagSettings, RagSourceRef};
