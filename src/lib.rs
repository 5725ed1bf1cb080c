//! Claude Code Log viewer (ccl)
//!
//! Renders Claude Code JSONL conversation transcripts as readable text,
//! compact one-line summaries, or filtered JSON.
//!
//! The pipeline is: [`source`] yields lines, [`model`] decodes them into
//! records, [`correlation`] links tool results to their invocations,
//! [`filter`] decides what is shown, [`render`] formats it, and
//! [`processor`] drives the whole thing in streaming, buffered or follow
//! mode.

pub mod config;
pub mod correlation;
pub mod filter;
pub mod logging;
pub mod model;
pub mod processor;
pub mod render;
pub mod source;
