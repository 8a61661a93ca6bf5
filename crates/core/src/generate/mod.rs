//! Text generation through an upstream model service.
//!
//! This module provides:
//! - `base`: Generator trait, request and error types
//! - `reframer`: NDJSON-to-text stream conversion
//! - `ollama`: HTTP client for the upstream
//! - `synthetic`: Deterministic offline generator
//! - `service`: Upstream routing with synthetic fallback
//! - `personas`: Prompt templates for the workflow personas

pub mod base;
pub mod ollama;
pub mod personas;
pub mod reframer;
pub mod service;
pub mod synthetic;

pub use base::{GenerateError, GenerationRequest, Generator, TextStream};
pub use ollama::OllamaClient;
pub use personas::build_persona_prompt;
pub use service::GenerationService;
pub use synthetic::SyntheticGenerator;
