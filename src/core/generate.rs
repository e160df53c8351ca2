//! Evaluation of a grammar tree into one string.
//!
//! Sequences run in two passes. The binding pass evaluates every direct
//! `TagDefinition` child, left to right, and binds its result context in a
//! scope private to that sequence. The render pass then renders the
//! remaining children in order, resolving each direct `TagApplication`
//! against those bindings. Because the binding pass finishes before anything
//! else renders, an application may appear before its definition.

use thiserror::Error;
use tracing::trace;

use crate::core::chooser::Chooser;
use crate::core::context::Context;
use crate::core::node::{Node, Tag};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("tag '{0}' is applied but never defined in its sequence")]
    UnresolvedTag(Tag),
}

/// Rendered text plus the context the node hands back to its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResult {
    pub value: String,
    pub context: Context,
}

/// Render `node` from a fresh context.
pub fn generate<C>(node: &Node, chooser: &mut C) -> Result<String, GenerateError>
where
    C: Chooser + ?Sized,
{
    generate_with_context(node, &Context::new(), chooser).map(|result| result.value)
}

/// Render `node` in `context`. The caller's context is never modified.
///
/// What each node hands back:
/// - literal: a new context with only the literal's gender
/// - choice: whatever the chosen alternative hands back
/// - sequence: a new empty context; sequences are opaque scopes
/// - gendered: the context it was given
/// - tag definition: the inner node's context, stamped with the tag
/// - tag application: the inner node's context
pub fn generate_with_context<C>(
    node: &Node,
    context: &Context,
    chooser: &mut C,
) -> Result<GenerateResult, GenerateError>
where
    C: Chooser + ?Sized,
{
    match node {
        Node::Literal { value, gender } => Ok(GenerateResult {
            value: value.clone(),
            context: Context::of_gender(*gender),
        }),
        Node::Choice(choices) => {
            let index = chooser.choose(choices.count());
            generate_with_context(choices.pick(index), context, chooser)
        }
        Node::Sequence(children) => generate_sequence(children, context, chooser),
        Node::Gendered { male, female } => Ok(GenerateResult {
            value: context.gender().pick(male, female).to_string(),
            context: context.clone(),
        }),
        Node::TagDefinition { inner, tag } => {
            let result = generate_with_context(inner, context, chooser)?;
            Ok(GenerateResult {
                value: result.value,
                context: result.context.with_tag(tag.clone()),
            })
        }
        // Outside a sequence there is nothing to look the tag up in.
        Node::TagApplication { inner, .. } => generate_with_context(inner, context, chooser),
    }
}

enum Pending<'a> {
    Rendered(String),
    Deferred(&'a Node),
}

fn generate_sequence<C>(
    children: &[Node],
    ambient: &Context,
    chooser: &mut C,
) -> Result<GenerateResult, GenerateError>
where
    C: Chooser + ?Sized,
{
    let mut scope = ambient.clone();

    let mut pending = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::TagDefinition { inner, tag } => {
                let result = generate_with_context(inner, &scope, chooser)?;
                trace!(tag = %tag, gender = ?result.context.gender(), "bound tag");
                scope.register(tag.clone(), result.context);
                pending.push(Pending::Rendered(result.value));
            }
            other => pending.push(Pending::Deferred(other)),
        }
    }

    let mut value = String::new();
    for item in pending {
        match item {
            Pending::Rendered(text) => value.push_str(&text),
            Pending::Deferred(Node::TagApplication { inner, tag }) => {
                let subcontext = scope
                    .subcontext(tag.as_str())
                    .ok_or_else(|| GenerateError::UnresolvedTag(tag.clone()))?;
                value.push_str(&generate_with_context(inner, subcontext, chooser)?.value);
            }
            Pending::Deferred(node) => {
                value.push_str(&generate_with_context(node, &scope, chooser)?.value);
            }
        }
    }

    Ok(GenerateResult {
        value,
        context: Context::new(),
    })
}
