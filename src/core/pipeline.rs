//! The top-level generator: a grammar plus a seeded random source.
//!
//! Wires together grammar loading, rule lookup, evaluation and retries.

use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::chooser::RandomChooser;
use crate::core::generate::{generate, GenerateError};
use crate::core::grammar::{Grammar, GrammarError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("no grammar was provided to the builder")]
    MissingGrammar,
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("generation failed after {attempts} attempt(s): {source}")]
    GenerationFailed {
        attempts: u32,
        #[source]
        source: GenerateError,
    },
}

/// Generates lines from a grammar. Built via `Generator::builder()`.
///
/// The same seed and grammar always produce the same sequence of lines.
pub struct Generator {
    grammar: Grammar,
    entry: String,
    chooser: RandomChooser<StdRng>,
    seed: u64,
    max_attempts: u32,
    generation_count: u64,
}

/// Builder for constructing a `Generator`.
pub struct GeneratorBuilder {
    grammar: Option<Grammar>,
    grammar_path: Option<PathBuf>,
    entry: Option<String>,
    seed: u64,
    max_attempts: u32,
}

impl Generator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder {
            grammar: None,
            grammar_path: None,
            entry: None,
            seed: 0,
            max_attempts: 1,
        }
    }

    /// Generate one line from the entry rule.
    pub fn generate(&mut self) -> Result<String, PipelineError> {
        let entry = self.entry.clone();
        self.generate_rule(&entry)
    }

    /// Generate one line from a named rule.
    ///
    /// An attempt that hits an unresolved tag is retried with fresh draws,
    /// up to the configured number of attempts.
    pub fn generate_rule(&mut self, name: &str) -> Result<String, PipelineError> {
        let node = self
            .grammar
            .rule(name)
            .ok_or_else(|| PipelineError::RuleNotFound(name.to_string()))?;

        let mut attempt = 1;
        loop {
            match generate(node, &mut self.chooser) {
                Ok(line) => {
                    self.generation_count += 1;
                    debug!(
                        rule = name,
                        attempt,
                        count = self.generation_count,
                        "generated line"
                    );
                    return Ok(line);
                }
                Err(error) if attempt < self.max_attempts => {
                    warn!(rule = name, attempt, %error, "generation attempt failed, retrying");
                    attempt += 1;
                }
                Err(error) => {
                    return Err(PipelineError::GenerationFailed {
                        attempts: attempt,
                        source: error,
                    })
                }
            }
        }
    }

    /// Generate `count` lines from the entry rule.
    pub fn generate_many(&mut self, count: usize) -> Result<Vec<String>, PipelineError> {
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.generate()?);
        }
        Ok(lines)
    }

    /// Restart the random source from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.chooser = RandomChooser::seeded(seed);
        self.generation_count = 0;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Lines generated since the last (re)seed.
    pub fn generation_count(&self) -> u64 {
        self.generation_count
    }
}

impl GeneratorBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide a grammar directly.
    pub fn grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = Some(grammar);
        self
    }

    /// Load the grammar from a RON file at build time. Ignored when a
    /// grammar is provided directly.
    pub fn grammar_file(mut self, path: impl AsRef<Path>) -> Self {
        self.grammar_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Generate from this rule instead of the grammar's entry.
    pub fn entry(mut self, rule: &str) -> Self {
        self.entry = Some(rule.to_string());
        self
    }

    /// Total attempts per line, at least one.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn build(self) -> Result<Generator, PipelineError> {
        let grammar = match (self.grammar, self.grammar_path) {
            (Some(grammar), _) => grammar,
            (None, Some(path)) => Grammar::load_from_ron(&path)?,
            (None, None) => return Err(PipelineError::MissingGrammar),
        };

        let entry = self
            .entry
            .unwrap_or_else(|| grammar.entry_name().to_string());
        if grammar.rule(&entry).is_none() {
            return Err(PipelineError::RuleNotFound(entry));
        }

        Ok(Generator {
            grammar,
            entry,
            chooser: RandomChooser::seeded(self.seed),
            seed: self.seed,
            max_attempts: self.max_attempts,
            generation_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build_test_grammar() -> Grammar {
        let grammar_ron = r#"Grammar(
            feminine_suffix: Some("-f"),
            entry: "arrival",
            rules: {
                "who": Choice([Male("Tom"), Female("Amy"), Male("Ben"), Female("Eve")]),
                "arrival": Seq([
                    Def("s", Ref("who")),
                    Text(" "),
                    Use("s", Gendered(male: "arrived")),
                    Text(" "),
                    Choice([Text("early"), Text("late"), Text("at last")]),
                ]),
                "flaky": Choice([
                    Seq([Use("ghost", Text("boo"))]),
                    Text("fine"),
                ]),
                "broken": Seq([Use("ghost", Text("boo"))]),
            },
        )"#;
        Grammar::parse_ron(grammar_ron).unwrap()
    }

    fn build_test_generator(seed: u64) -> Generator {
        Generator::builder()
            .seed(seed)
            .grammar(build_test_grammar())
            .build()
            .unwrap()
    }

    #[test]
    fn generate_produces_agreeing_output() {
        let mut generator = build_test_generator(42);
        for line in generator.generate_many(50).unwrap() {
            let female = line.starts_with("Amy") || line.starts_with("Eve");
            assert_eq!(line.contains("arrived-f"), female, "line: {}", line);
        }
    }

    #[test]
    fn generate_deterministic_same_seed() {
        let mut first = build_test_generator(7);
        let mut second = build_test_generator(7);
        assert_eq!(
            first.generate_many(20).unwrap(),
            second.generate_many(20).unwrap()
        );
    }

    #[test]
    fn generate_different_with_different_seed() {
        let baseline = build_test_generator(1).generate_many(10).unwrap();
        let found_different = (2..50)
            .any(|seed| build_test_generator(seed).generate_many(10).unwrap() != baseline);
        assert!(found_different, "Expected different output with different seeds");
    }

    #[test]
    fn reseed_restarts_sequence() {
        let mut generator = build_test_generator(3);
        let first = generator.generate_many(5).unwrap();
        generator.reseed(3);
        assert_eq!(generator.generation_count(), 0);
        assert_eq!(generator.generate_many(5).unwrap(), first);
        assert_eq!(generator.generation_count(), 5);
    }

    #[test]
    fn generate_rule_by_name() {
        let mut generator = build_test_generator(0);
        let who = generator.generate_rule("who").unwrap();
        assert!(["Tom", "Amy", "Ben", "Eve"].contains(&who.as_str()));
    }

    #[test]
    fn unknown_rule_is_reported() {
        let mut generator = build_test_generator(0);
        assert!(matches!(
            generator.generate_rule("nope"),
            Err(PipelineError::RuleNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn unresolved_tag_fails_without_retries() {
        let mut generator = Generator::builder()
            .grammar(build_test_grammar())
            .entry("broken")
            .build()
            .unwrap();
        assert!(matches!(
            generator.generate(),
            Err(PipelineError::GenerationFailed { attempts: 1, .. })
        ));
    }

    #[test]
    fn retries_exhaust_on_certain_failure() {
        let mut generator = Generator::builder()
            .grammar(build_test_grammar())
            .entry("broken")
            .max_attempts(4)
            .build()
            .unwrap();
        assert!(matches!(
            generator.generate(),
            Err(PipelineError::GenerationFailed { attempts: 4, .. })
        ));
    }

    #[test]
    fn retries_recover_from_unlucky_draws() {
        let mut generator = Generator::builder()
            .seed(11)
            .grammar(build_test_grammar())
            .entry("flaky")
            .max_attempts(64)
            .build()
            .unwrap();
        for line in generator.generate_many(20).unwrap() {
            assert_eq!(line, "fine");
        }
    }

    #[test]
    fn builder_requires_grammar() {
        assert!(matches!(
            Generator::builder().build(),
            Err(PipelineError::MissingGrammar)
        ));
    }

    #[test]
    fn builder_rejects_unknown_entry() {
        let result = Generator::builder()
            .grammar(build_test_grammar())
            .entry("missing")
            .build();
        assert!(matches!(result, Err(PipelineError::RuleNotFound(_))));
    }

    #[test]
    fn builder_loads_grammar_file() {
        let generator = Generator::builder()
            .seed(12345)
            .grammar_file("tests/fixtures/test_grammar.ron")
            .build()
            .unwrap();
        assert_eq!(generator.seed(), 12345);
        assert_eq!(generator.entry(), "sentence");
    }

    #[test]
    fn builder_reports_missing_file() {
        let result = Generator::builder()
            .grammar_file("tests/fixtures/does_not_exist.ron")
            .build();
        assert!(matches!(
            result,
            Err(PipelineError::Grammar(GrammarError::Io(_)))
        ));
    }
}
