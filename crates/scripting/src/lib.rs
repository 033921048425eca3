//! # Bytecode cache (C3)
//!
//! Caches compiled script artifacts by source text. Compilation itself —
//! the scripting language's lexer, parser, and VM — is an external
//! collaborator out of scope for this crate; what lives here is the
//! content-addressed, single-flight cache and its optional worker-pool
//! drain path (§4.3).

pub mod cache;
pub mod error;

pub use cache::{Artifact, BytecodeCache, Compiler, PassthroughCompiler};
pub use error::{Result, ScriptError};
