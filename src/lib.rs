//! # Bindspec - API Registry to Bindings Analysis Core
//!
//! Turns the machine-readable description of a native C API (types,
//! enumerations, structures, unions, handles, commands and platform-gated
//! extensions) into a resolved, ABI-aware model from which a memory-safe
//! wrapper library and its raw interop declarations can be emitted.
//!
//! ## Pipeline
//!
//! ```text
//! RegistryDocument (parsed IDL tree)
//!     │
//!     ▼
//! NameTranslator ──▶ TypeRegistry ──▶ marshalling fixpoint
//!                                          │
//!                       ScopeResolver ◀────┤
//!                                          ▼
//!                                   Command Classifier
//!                                          │
//!                                          ▼
//!                                    BindingModel (JSON)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bindspec::{CompilationContext, Element, GeneratorOptions, RegistryDocument};
//!
//! # fn main() -> bindspec::Result<()> {
//! let root = Element::new("registry").with_child(
//!     Element::new("types").with_child(
//!         Element::new("type")
//!             .with_attr("category", "struct")
//!             .with_attr("name", "VkExtent2D")
//!             .with_child(
//!                 Element::new("member")
//!                     .with_text_child("type", "uint32_t")
//!                     .with_text(" ")
//!                     .with_text_child("name", "width"),
//!             ),
//!     ),
//! );
//! let doc = RegistryDocument::new(root)?;
//!
//! let model = CompilationContext::new(GeneratorOptions::default().without_targets())
//!     .compile(&doc)?;
//!
//! let extent = model.type_named("Extent2D").unwrap().as_composite().unwrap();
//! assert!(!extent.needs_marshalling);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`document`] - attributed tree input and typed section readers
//! - [`naming`] - raw identifier → canonical display name
//! - [`registry`] - type registration and alias resolution
//! - [`marshal`] - which composites need indirection
//! - [`scope`] - per-target visibility
//! - [`command`] - parameter roles and public call shapes
//! - [`model`] - the output handed to an emitter
//! - [`context`] - the pipeline driver

#![allow(clippy::new_without_default)]
#![warn(missing_docs)]

/// Version of the bindspec crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod command;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod marshal;
pub mod model;
pub mod naming;
pub mod registry;
pub mod scope;

// Re-export main types
pub use command::{
    CallShape, Classifier, CommandClassification, CommandEntity, ParameterEntity, ParameterRole,
    ResultConvention, ReturnStrategy, ShapeKind,
};
pub use config::GeneratorOptions;
pub use context::CompilationContext;
pub use document::{Element, Node, RegistryDocument};
pub use error::{Error, ErrorSeverity, Result};
pub use marshal::MarshallingReport;
pub use model::{BindingModel, NameMap};
pub use naming::NameTranslator;
pub use registry::{EntityKind, NativeWidth, TypeEntity, TypeRegistry};
pub use scope::{Scope, ScopeSet};
