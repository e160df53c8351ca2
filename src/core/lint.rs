//! Static checks over a grammar tree.
//!
//! Tag resolution only depends on the shape of the tree, so an application
//! that can never find its definition is caught here instead of on the
//! unlucky draw that renders it. The checks assume generation starts from a
//! fresh context. A tag application's inner node sees the bindings of the
//! enclosing sequences only when its definition can hand back the ambient
//! context, as a gendered form does.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::core::node::{Node, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One finding. `location` is a path of child indices from the linted
/// node, such as `/2/0`; the empty string is the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

impl LintIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.location.is_empty() {
            "/"
        } else {
            self.location.as_str()
        };
        write!(f, "{}: {}: {}", self.severity, location, self.message)
    }
}

/// Check `node` and everything below it.
///
/// Errors:
/// - a tag application inside a sequence that no visible definition
///   binds; rendering that sequence always fails
///
/// Warnings:
/// - a tag defined in a sequence but never applied
/// - a tag defined twice in the same sequence
/// - a tag definition or application that is not a direct child of a
///   sequence, and so has no effect
pub fn lint(node: &Node) -> Vec<LintIssue> {
    let mut linter = Linter::default();
    linter.visit(node);
    linter.issues
}

struct Definition<'a> {
    index: usize,
    tag: &'a str,
    /// The bound context never carries the scope's bindings.
    opaque: bool,
}

struct Scope<'a> {
    /// Definitions in child order.
    defined: Vec<Definition<'a>>,
    used: FxHashSet<&'a str>,
    /// Only definitions before this child index are bound yet.
    limit: usize,
}

#[derive(Default)]
struct Linter<'a> {
    scopes: Vec<Scope<'a>>,
    /// Scopes below this index are not visible from the current node.
    barrier: usize,
    path: Vec<usize>,
    issues: Vec<LintIssue>,
}

impl<'a> Linter<'a> {
    fn visit(&mut self, node: &'a Node) {
        match node {
            Node::Literal { .. } | Node::Gendered { .. } => {}
            Node::Choice(choices) => {
                for (index, alternative) in choices.into_iter().enumerate() {
                    self.visit_child(index, alternative);
                }
            }
            Node::Sequence(children) => self.visit_sequence(children),
            Node::TagDefinition { inner, tag } | Node::TagApplication { inner, tag } => {
                self.report(
                    Severity::Warning,
                    format!(
                        "{} '{}' is not a direct child of a sequence and has no effect",
                        node.kind(),
                        tag
                    ),
                );
                self.visit_child(0, inner);
            }
        }
    }

    fn visit_child(&mut self, index: usize, node: &'a Node) {
        self.path.push(index);
        self.visit(node);
        self.path.pop();
    }

    fn visit_sequence(&mut self, children: &'a [Node]) {
        let mut scope = Scope {
            defined: Vec::new(),
            used: FxHashSet::default(),
            limit: usize::MAX,
        };
        for (index, child) in children.iter().enumerate() {
            if let Node::TagDefinition { tag, inner } = child {
                if scope.defined.iter().any(|defined| defined.tag == tag.as_str()) {
                    self.report_at(
                        index,
                        Severity::Warning,
                        format!("tag '{}' is defined more than once; the last one wins", tag),
                    );
                }
                scope.defined.push(Definition {
                    index,
                    tag: tag.as_str(),
                    opaque: hands_back_fresh(inner),
                });
            }
        }
        self.scopes.push(scope);

        for (index, child) in children.iter().enumerate() {
            let is_definition = matches!(child, Node::TagDefinition { .. });
            if let Some(scope) = self.scopes.last_mut() {
                scope.limit = if is_definition { index } else { usize::MAX };
            }

            self.path.push(index);
            match child {
                Node::TagDefinition { inner, .. } => self.visit_child(0, inner),
                Node::TagApplication { inner, tag } => {
                    let opaque = self.resolve(tag).unwrap_or(true);
                    let saved = self.barrier;
                    if opaque {
                        self.barrier = self.scopes.len();
                    }
                    self.visit_child(0, inner);
                    self.barrier = saved;
                }
                other => self.visit(other),
            }
            self.path.pop();
        }

        if let Some(scope) = self.scopes.pop() {
            for defined in &scope.defined {
                if !scope.used.contains(defined.tag) {
                    self.report_at(
                        defined.index,
                        Severity::Warning,
                        format!("tag '{}' is defined but never applied", defined.tag),
                    );
                }
            }
        }
    }

    /// Find the definition `tag` is bound to and mark it used. Returns
    /// whether that definition is opaque, or `None` when nothing binds it.
    fn resolve(&mut self, tag: &'a Tag) -> Option<bool> {
        let name = tag.as_str();
        let visible = &mut self.scopes[self.barrier..];
        for scope in visible.iter_mut().rev() {
            let limit = scope.limit;
            let bound = scope
                .defined
                .iter()
                .rev()
                .find(|defined| defined.tag == name && defined.index < limit)
                .map(|defined| defined.opaque);
            if bound.is_some() {
                scope.used.insert(name);
                return bound;
            }
        }
        self.report(
            Severity::Error,
            format!("tag '{}' is applied but no enclosing sequence defines it", tag),
        );
        None
    }

    fn report(&mut self, severity: Severity, message: String) {
        let location = self.location();
        self.issues.push(LintIssue {
            severity,
            location,
            message,
        });
    }

    fn report_at(&mut self, index: usize, severity: Severity, message: String) {
        self.path.push(index);
        self.report(severity, message);
        self.path.pop();
    }

    fn location(&self) -> String {
        self.path.iter().map(|index| format!("/{}", index)).collect()
    }
}

/// Whether `node` always hands back a context without the ambient
/// bindings. Literals and sequences start fresh; a gendered form passes the
/// ambient context through.
fn hands_back_fresh(node: &Node) -> bool {
    match node {
        Node::Literal { .. } | Node::Sequence(_) => true,
        Node::Gendered { .. } => false,
        Node::Choice(choices) => choices.into_iter().all(hands_back_fresh),
        Node::TagDefinition { inner, .. } => hands_back_fresh(inner),
        // The inner node renders in the applied tag's context, which may
        // itself carry bindings.
        Node::TagApplication { .. } => false,
    }
}
