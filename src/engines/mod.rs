//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech services.
//!
//! # Available Engines
//!
//! - `ivona` - IVONA Speech Cloud (HTTP, AWS Signature V4)

pub mod ivona;
