//! Agreement Grammar: combinator-based random text generation.
//!
//! A grammar is a tree of [`core::node::Node`]s. Evaluating it picks one
//! random sentence while keeping grammatical gender in agreement across
//! distant parts of that sentence, through named tags bound per sequence.

pub mod core;
pub mod schema;

pub use crate::core::chooser::{Chooser, RandomChooser, ScriptedChooser};
pub use crate::core::context::Context;
pub use crate::core::generate::{generate, generate_with_context, GenerateError, GenerateResult};
pub use crate::core::node::{Choices, ConstructionError, Node, Tag};
pub use crate::schema::gender::Gender;
