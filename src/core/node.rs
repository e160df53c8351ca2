//! Grammar tree nodes and their validating constructors.

use std::borrow::Borrow;
use std::fmt;

use thiserror::Error;

use crate::schema::gender::{Gender, DEFAULT_FEMININE_SUFFIX};

/// Errors raised while building a grammar tree. These are author bugs and
/// never occur during generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("a choice needs at least one alternative")]
    EmptyChoice,
    #[error("tags must not be empty")]
    EmptyTag,
}

/// Name under which a sequence binds a subcontext. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Result<Tag, ConstructionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConstructionError::EmptyTag);
        }
        Ok(Tag(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Tag {
    type Error = ConstructionError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Tag::new(name)
    }
}

impl TryFrom<String> for Tag {
    type Error = ConstructionError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Tag::new(name)
    }
}

/// The alternatives of a [`Node::Choice`]. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Choices(Vec<Node>);

impl Choices {
    pub fn new(alternatives: Vec<Node>) -> Result<Choices, ConstructionError> {
        if alternatives.is_empty() {
            return Err(ConstructionError::EmptyChoice);
        }
        Ok(Choices(alternatives))
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.0
    }

    /// Number of alternatives, always at least one.
    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// The alternative at `index`. Choosers draw in `0..count()`; an index
    /// past the end is a chooser bug, caught in debug builds and wrapped
    /// around in release builds.
    pub fn pick(&self, index: usize) -> &Node {
        debug_assert!(
            index < self.0.len(),
            "choice index {} out of range for {} alternatives",
            index,
            self.0.len()
        );
        &self.0[index % self.0.len()]
    }
}

impl<'a> IntoIterator for &'a Choices {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One element of a grammar tree.
///
/// The tree is built once and is immutable afterwards; it can be shared
/// across threads and evaluated any number of times. The variant set is
/// closed, and `Choices` and `Tag` carry their own non-empty invariants,
/// so every value of this type is a valid grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Fixed text with an optional declared gender.
    Literal { value: String, gender: Gender },
    /// Exactly one alternative, drawn uniformly.
    Choice(Choices),
    /// Children rendered in order and concatenated, with tag binding.
    Sequence(Vec<Node>),
    /// Text that agrees with the gender of the context it is rendered in.
    Gendered { male: String, female: String },
    /// Binds the context produced by `inner` under `tag` in the enclosing
    /// sequence.
    TagDefinition { inner: Box<Node>, tag: Tag },
    /// Renders `inner` in the context bound under `tag` by the enclosing
    /// sequence.
    TagApplication { inner: Box<Node>, tag: Tag },
}

impl Node {
    pub fn literal(value: impl Into<String>) -> Node {
        Node::literal_with_gender(value, Gender::Unset)
    }

    pub fn male(value: impl Into<String>) -> Node {
        Node::literal_with_gender(value, Gender::Male)
    }

    pub fn female(value: impl Into<String>) -> Node {
        Node::literal_with_gender(value, Gender::Female)
    }

    pub fn literal_with_gender(value: impl Into<String>, gender: Gender) -> Node {
        Node::Literal {
            value: value.into(),
            gender,
        }
    }

    /// A uniform choice between `alternatives`. Fails on an empty list.
    pub fn choice<I, N>(alternatives: I) -> Result<Node, ConstructionError>
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        let alternatives = alternatives.into_iter().map(Into::into).collect();
        Ok(Node::Choice(Choices::new(alternatives)?))
    }

    /// An ordered sequence. An empty sequence renders as an empty string.
    pub fn sequence<I, N>(children: I) -> Node
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Node::Sequence(children.into_iter().map(Into::into).collect())
    }

    /// A gendered form whose feminine is `male` plus the default suffix.
    pub fn gendered(male: impl Into<String>) -> Node {
        Node::gendered_with_suffix(male, DEFAULT_FEMININE_SUFFIX)
    }

    pub fn gendered_with_suffix(male: impl Into<String>, suffix: &str) -> Node {
        let male = male.into();
        let female = Gender::feminine_form(&male, suffix);
        Node::Gendered { male, female }
    }

    /// A gendered form with both inflections spelled out.
    pub fn inflected(male: impl Into<String>, female: impl Into<String>) -> Node {
        Node::Gendered {
            male: male.into(),
            female: female.into(),
        }
    }

    /// Wrap this node so its result context is bound under `tag`.
    pub fn def_tag(self, tag: impl Into<String>) -> Result<Node, ConstructionError> {
        Ok(Node::TagDefinition {
            inner: Box::new(self),
            tag: Tag::new(tag)?,
        })
    }

    /// Wrap this node so it renders in the context bound under `tag`.
    pub fn apply_tag(self, tag: impl Into<String>) -> Result<Node, ConstructionError> {
        Ok(Node::TagApplication {
            inner: Box::new(self),
            tag: Tag::new(tag)?,
        })
    }

    /// Short variant name, used in lint reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Literal { .. } => "literal",
            Node::Choice(_) => "choice",
            Node::Sequence(_) => "sequence",
            Node::Gendered { .. } => "gendered",
            Node::TagDefinition { .. } => "tag definition",
            Node::TagApplication { .. } => "tag application",
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::literal(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_choice_is_rejected() {
        let result = Node::choice(Vec::<Node>::new());
        assert_eq!(result, Err(ConstructionError::EmptyChoice));
    }

    #[test]
    fn empty_tag_is_rejected() {
        assert_eq!(Tag::new(""), Err(ConstructionError::EmptyTag));
        assert_eq!(
            Node::literal("x").def_tag(""),
            Err(ConstructionError::EmptyTag)
        );
        assert_eq!(
            Node::literal("x").apply_tag(String::new()),
            Err(ConstructionError::EmptyTag)
        );
    }

    #[test]
    fn bare_strings_become_unset_literals() {
        let node: Node = "hello".into();
        assert_eq!(
            node,
            Node::Literal {
                value: "hello".to_string(),
                gender: Gender::Unset
            }
        );
    }

    #[test]
    fn choice_coerces_strings() {
        let node = Node::choice(["a", "b"]).unwrap();
        match node {
            Node::Choice(choices) => {
                assert_eq!(choices.count(), 2);
                assert_eq!(choices.as_slice()[1], Node::literal("b"));
            }
            other => panic!("expected a choice, got {:?}", other),
        }
    }

    #[test]
    fn gendered_defaults_female_form() {
        assert_eq!(
            Node::gendered("שבר"),
            Node::Gendered {
                male: "שבר".to_string(),
                female: "שברה".to_string()
            }
        );
        assert_eq!(
            Node::gendered_with_suffix("arrived", "-f"),
            Node::inflected("arrived", "arrived-f")
        );
    }

    #[test]
    fn tag_wrappers_keep_inner() {
        let node = Node::male("rock").def_tag("x").unwrap();
        match node {
            Node::TagDefinition { inner, tag } => {
                assert_eq!(*inner, Node::male("rock"));
                assert_eq!(tag.as_str(), "x");
            }
            other => panic!("expected a tag definition, got {:?}", other),
        }
    }

    #[test]
    fn choices_pick_in_range() {
        let choices = Choices::new(vec![Node::literal("a"), Node::literal("b")]).unwrap();
        assert_eq!(choices.pick(0), &Node::literal("a"));
        assert_eq!(choices.pick(1), &Node::literal("b"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn choices_pick_rejects_out_of_range_in_debug() {
        let choices = Choices::new(vec![Node::literal("a"), Node::literal("b")]).unwrap();
        choices.pick(3);
    }
}
