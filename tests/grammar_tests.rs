//! Grammar loading, agreement and linting over the bundled grammar files.

use agreement_grammar::core::grammar::Grammar;
use agreement_grammar::core::lint::lint;
use agreement_grammar::{generate, generate_with_context, Context, Gender, RandomChooser, ScriptedChooser};
use pretty_assertions::assert_eq;
use std::path::Path;

fn excuses() -> Grammar {
    Grammar::load_from_ron(Path::new("grammar_data/excuses/grammar.ron")).unwrap()
}

fn fixture() -> Grammar {
    Grammar::load_from_ron(Path::new("tests/fixtures/test_grammar.ron")).unwrap()
}

#[test]
fn excuses_grammar_loads() {
    let grammar = excuses();
    assert_eq!(grammar.entry_name(), "form");
    assert_eq!(grammar.feminine_suffix(), "ה");

    let expected_rules = [
        "someone",
        "animal",
        "commodity",
        "dish",
        "arrangements",
        "blunt_object",
        "had_accident",
        "accident_result",
        "something_happened",
        "procedure",
        "form",
    ];
    for rule_name in &expected_rules {
        assert!(grammar.rule(rule_name).is_some(), "Missing rule: {}", rule_name);
    }
}

#[test]
fn excuses_grammar_is_lint_clean() {
    let issues = excuses().lint();
    assert!(issues.is_empty(), "lint issues: {:#?}", issues);
}

#[test]
fn fixture_grammar_is_lint_clean() {
    let grammar = fixture();
    assert!(grammar.lint().is_empty());
    assert!(lint(grammar.entry()).is_empty());
}

#[test]
fn subject_agreement_across_the_sentence() {
    let grammar = excuses();
    // form 0, grandmother, commodity "water gluten free", fell from a
    // hoverboard, "and", lost the office keys.
    let mut chooser = ScriptedChooser::new(vec![0, 1, 0, 0, 0, 0, 0, 2, 2, 0]);
    let line = grammar.generate(&mut chooser).unwrap();
    assert_eq!(
        line,
        "אני מביא מים ללא גלוטן לסבתא שלי שנפלה מגלשן רחיפה ואיבדה את המפתחות למשרד"
    );
    assert_eq!(chooser.consumed(), 10);
}

#[test]
fn object_agreement_is_resolved_forward() {
    let grammar = excuses();
    let accident = grammar.rule("had_accident").unwrap();

    // The verb comes first but agrees with the baseball bat chosen after it.
    let line = generate(accident, &mut ScriptedChooser::new(vec![1, 1])).unwrap();
    assert_eq!(line, "נפלה עליו אלת בייסבול");

    // "on him/her" follows the ambient subject instead.
    let result = generate_with_context(
        accident,
        &Context::of_gender(Gender::Female),
        &mut ScriptedChooser::new(vec![1, 7]),
    )
    .unwrap();
    assert_eq!(result.value, "נפל עליה סדן");
}

#[test]
fn fixture_forced_draws() {
    let grammar = fixture();
    let cases = vec![
        (vec![1, 1, 1], "I am driving my grandmother because she fell-f on her: a guitar"),
        (vec![0, 1, 1], "I am driving my grandfather because he fell-f on him: a guitar"),
        (vec![2, 0], "I am driving my brother because he slipped on the stairs"),
    ];
    for (draws, expected) in cases {
        let line = grammar.generate(&mut ScriptedChooser::new(draws)).unwrap();
        assert_eq!(line, expected);
    }
}

#[test]
fn fixture_agreement_holds_for_random_draws() {
    let grammar = fixture();
    let mut chooser = RandomChooser::seeded(2026);
    for _ in 0..500 {
        let line = grammar.generate(&mut chooser).unwrap();
        let female_subject = line.contains("grandmother") || line.contains("sister");
        assert_eq!(line.contains("because she"), female_subject, "line: {}", line);
        if line.contains("fell") {
            assert_eq!(line.contains("fell-f"), line.contains("a guitar"), "line: {}", line);
            assert_eq!(line.contains("on her"), female_subject, "line: {}", line);
        }
    }
}

#[test]
fn excuses_generate_for_many_seeds() {
    let grammar = excuses();
    for seed in 0..200 {
        let line = grammar.generate(&mut RandomChooser::seeded(seed)).unwrap();
        assert!(line.starts_with("אני "), "line: {}", line);
    }
}

#[test]
fn excuses_same_seed_same_lines() {
    let grammar = excuses();
    let run = |seed: u64| {
        let mut chooser = RandomChooser::seeded(seed);
        (0..25)
            .map(|_| grammar.generate(&mut chooser).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}
