//! Datachat is a headless chat engine for conversing with a remote LLM while
//! augmenting prompts with context fetched from an MCP data server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns conversation state, configuration, and completion
//!   orchestration. [`core::app::ChatApp`] is the surface a presentation
//!   layer drives: `submit`, `clear`, `set_auth_token`, `set_model`, plus
//!   read-only observation of the transcript and processing flag.
//! - [`mcp`] provides the Model Context Protocol integration: a JSON-RPC 2.0
//!   client, lazy session negotiation, tool discovery, and the data-query
//!   context fetcher.
//! - [`api`] defines the chat-completions payloads used when calling the
//!   completion API.
//! - [`utils`] holds URL normalization and transcript logging helpers.
//!
//! No failure in the engine escapes to the caller as a panic or error type:
//! every failure mode resolves to a human-readable text value that is either
//! returned up the call chain or appended to the transcript as assistant
//! content.

pub mod api;
pub mod core;
pub mod mcp;
pub mod utils;
