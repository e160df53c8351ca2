//! Binding context: ambient gender plus the tags bound in the current scope.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::node::Tag;
use crate::schema::gender::Gender;

/// The state a node is rendered in.
///
/// Contexts are values. Deriving a context never touches the original, and
/// the binding table is shared between derived contexts until one of them
/// registers a new tag, at which point that context gets its own copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    gender: Gender,
    tag: Option<Tag>,
    bindings: Arc<FxHashMap<Tag, Context>>,
}

impl Context {
    /// A fresh context: no gender, no tag, no bindings.
    pub fn new() -> Context {
        Context::default()
    }

    /// A context carrying only `gender`. This is what a literal hands back.
    pub fn of_gender(gender: Gender) -> Context {
        Context {
            gender,
            ..Context::default()
        }
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    pub fn with_gender(&self, gender: Gender) -> Context {
        Context {
            gender,
            tag: self.tag.clone(),
            bindings: Arc::clone(&self.bindings),
        }
    }

    pub fn with_tag(&self, tag: Tag) -> Context {
        Context {
            gender: self.gender,
            tag: Some(tag),
            bindings: Arc::clone(&self.bindings),
        }
    }

    /// Bind `subcontext` under `tag`, stamping it with that tag. A previous
    /// binding under the same tag is replaced.
    pub fn register(&mut self, tag: Tag, subcontext: Context) {
        let subcontext = subcontext.with_tag(tag.clone());
        Arc::make_mut(&mut self.bindings).insert(tag, subcontext);
    }

    pub fn subcontext(&self, tag: &str) -> Option<&Context> {
        self.bindings.get(tag)
    }

    pub fn is_bound(&self, tag: &str) -> bool {
        self.bindings.contains_key(tag)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
