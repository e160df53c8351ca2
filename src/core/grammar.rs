//! Grammar files: named rules loaded from RON and compiled into node trees.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::chooser::Chooser;
use crate::core::generate::{generate, GenerateError};
use crate::core::lint::{lint, LintIssue};
use crate::core::node::{Choices, ConstructionError, Node, Tag};
use crate::schema::gender::DEFAULT_FEMININE_SUFFIX;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid grammar in rule '{rule}': {source}")]
    Construction {
        rule: String,
        #[source]
        source: ConstructionError,
    },
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("rule '{0}' refers back to itself")]
    RecursiveRule(String),
    #[error("entry rule not found: {0}")]
    EntryNotFound(String),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// A set of named rules with a designated entry rule.
///
/// Rule references are inlined when the grammar is built, so every rule is
/// a self-contained tree.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: HashMap<String, Node>,
    entry: String,
    feminine_suffix: String,
    /// Rules rendered from a fresh context: the entry and every rule no
    /// other rule refers to. Sorted.
    roots: Vec<String>,
}

// RON file shape. Rule references only exist here; they are resolved
// into plain node trees before a `Grammar` is handed out.

#[derive(Debug, Deserialize)]
#[serde(rename = "Grammar")]
struct RonGrammar {
    #[serde(default)]
    feminine_suffix: Option<String>,
    entry: String,
    rules: HashMap<String, RonNode>,
}

#[derive(Debug, Deserialize)]
enum RonNode {
    Text(String),
    Male(String),
    Female(String),
    Choice(Vec<RonNode>),
    Seq(Vec<RonNode>),
    Gendered {
        male: String,
        #[serde(default)]
        female: Option<String>,
    },
    Def(String, Box<RonNode>),
    Use(String, Box<RonNode>),
    Ref(String),
}

struct Resolver<'a> {
    raw: &'a HashMap<String, RonNode>,
    feminine_suffix: &'a str,
    resolved: HashMap<String, Node>,
    in_progress: Vec<String>,
    referenced: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn rule(&mut self, name: &str) -> Result<Node, GrammarError> {
        if let Some(node) = self.resolved.get(name) {
            return Ok(node.clone());
        }
        if self.in_progress.iter().any(|pending| pending == name) {
            return Err(GrammarError::RecursiveRule(name.to_string()));
        }
        let rules = self.raw;
        let raw = rules
            .get(name)
            .ok_or_else(|| GrammarError::RuleNotFound(name.to_string()))?;

        self.in_progress.push(name.to_string());
        let node = self.build(raw)?;
        self.in_progress.pop();

        self.resolved.insert(name.to_string(), node.clone());
        Ok(node)
    }

    fn build(&mut self, raw: &RonNode) -> Result<Node, GrammarError> {
        let node = match raw {
            RonNode::Text(value) => Node::literal(value.as_str()),
            RonNode::Male(value) => Node::male(value.as_str()),
            RonNode::Female(value) => Node::female(value.as_str()),
            RonNode::Choice(alternatives) => {
                let alternatives = self.build_all(alternatives)?;
                Node::Choice(Choices::new(alternatives).map_err(|e| self.invalid(e))?)
            }
            RonNode::Seq(children) => Node::Sequence(self.build_all(children)?),
            RonNode::Gendered { male, female } => match female {
                Some(female) => Node::inflected(male.as_str(), female.as_str()),
                None => Node::gendered_with_suffix(male.as_str(), self.feminine_suffix),
            },
            RonNode::Def(tag, inner) => Node::TagDefinition {
                inner: Box::new(self.build(inner)?),
                tag: self.tag(tag)?,
            },
            RonNode::Use(tag, inner) => Node::TagApplication {
                inner: Box::new(self.build(inner)?),
                tag: self.tag(tag)?,
            },
            RonNode::Ref(name) => {
                self.referenced.insert(name.clone());
                self.rule(name)?
            }
        };
        Ok(node)
    }

    fn build_all(&mut self, raw: &[RonNode]) -> Result<Vec<Node>, GrammarError> {
        raw.iter().map(|node| self.build(node)).collect()
    }

    fn tag(&self, name: &str) -> Result<Tag, GrammarError> {
        Tag::new(name).map_err(|e| self.invalid(e))
    }

    fn invalid(&self, source: ConstructionError) -> GrammarError {
        GrammarError::Construction {
            rule: self.in_progress.last().cloned().unwrap_or_default(),
            source,
        }
    }
}

impl Grammar {
    /// Build a grammar from already constructed rules.
    pub fn new(
        entry: impl Into<String>,
        rules: HashMap<String, Node>,
    ) -> Result<Grammar, GrammarError> {
        let entry = entry.into();
        if !rules.contains_key(&entry) {
            return Err(GrammarError::EntryNotFound(entry));
        }
        let mut roots: Vec<String> = rules.keys().cloned().collect();
        roots.sort();
        Ok(Grammar {
            rules,
            entry,
            feminine_suffix: DEFAULT_FEMININE_SUFFIX.to_string(),
            roots,
        })
    }

    /// Load a grammar from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Grammar, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        let grammar = Self::parse_ron(&contents)?;
        debug!(
            path = %path.display(),
            rules = grammar.rules.len(),
            "loaded grammar"
        );
        Ok(grammar)
    }

    /// Parse a grammar from a RON string.
    pub fn parse_ron(input: &str) -> Result<Grammar, GrammarError> {
        let raw: RonGrammar = ron::from_str(input)?;
        let feminine_suffix = raw
            .feminine_suffix
            .unwrap_or_else(|| DEFAULT_FEMININE_SUFFIX.to_string());

        let mut resolver = Resolver {
            raw: &raw.rules,
            feminine_suffix: &feminine_suffix,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
            referenced: HashSet::new(),
        };

        let mut names: Vec<&String> = raw.rules.keys().collect();
        names.sort();
        for name in names {
            resolver.rule(name)?;
        }
        let rules = resolver.resolved;
        let referenced = resolver.referenced;

        if !rules.contains_key(&raw.entry) {
            return Err(GrammarError::EntryNotFound(raw.entry));
        }

        let mut roots: Vec<String> = rules
            .keys()
            .filter(|name| **name == raw.entry || !referenced.contains(*name))
            .cloned()
            .collect();
        roots.sort();

        Ok(Grammar {
            rules,
            entry: raw.entry,
            feminine_suffix,
            roots,
        })
    }

    pub fn rule(&self, name: &str) -> Option<&Node> {
        self.rules.get(name)
    }

    /// Rule names in sorted order.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn entry_name(&self) -> &str {
        &self.entry
    }

    pub fn entry(&self) -> &Node {
        // The entry is checked on construction.
        &self.rules[&self.entry]
    }

    pub fn feminine_suffix(&self) -> &str {
        &self.feminine_suffix
    }

    /// Generate one line from the entry rule.
    pub fn generate<C: Chooser + ?Sized>(&self, chooser: &mut C) -> Result<String, GrammarError> {
        Ok(generate(self.entry(), chooser)?)
    }

    /// Rules that are rendered on their own rather than through a
    /// reference: the entry plus every rule no other rule refers to.
    pub fn root_names(&self) -> Vec<&str> {
        self.roots.iter().map(String::as_str).collect()
    }

    /// Lint every root rule. Referenced rules are checked where they are
    /// inlined, so a fragment can apply a tag its caller defines.
    /// Locations are prefixed with the root rule's name.
    pub fn lint(&self) -> Vec<LintIssue> {
        let mut issues = Vec::new();
        for name in self.root_names() {
            for mut issue in lint(&self.rules[name]) {
                issue.location = format!("{}{}", name, issue.location);
                issues.push(issue);
            }
        }
        issues
    }
}
