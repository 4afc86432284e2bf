//! # Input Document
//!
//! The analysis core never parses IDL text itself. It consumes the attributed
//! tree produced by an external parser, handed over as [`Element`] values
//! (usually deserialized from JSON), and reads it through [`RegistryDocument`].
//!
//! ```text
//! IDL text → (external parser) → Element tree → RegistryDocument → CompilationContext
//! ```

pub mod element;
pub mod registry;

pub use element::{Element, Node};
pub use registry::{Extension, RegistryDocument, API_CONSTANTS};
