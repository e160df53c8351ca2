/// Suffix appended to a masculine form when no feminine form is given.
///
/// The bundled grammars are Hebrew, where most past-tense verbs and
/// adjectives take a trailing he (ה) in the feminine.
pub const DEFAULT_FEMININE_SUFFIX: &str = "\u{05d4}";

/// Grammatical gender carried through a generation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    /// No gender declared. Inflected forms fall back to the masculine.
    Unset,
    Male,
    Female,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Unset
    }
}

impl Gender {
    /// Pick the form agreeing with this gender. `Unset` agrees with the
    /// masculine form.
    pub fn pick<'a>(&self, male: &'a str, female: &'a str) -> &'a str {
        match self {
            Self::Female => female,
            Self::Male | Self::Unset => male,
        }
    }

    /// Build the default feminine form of `male` using `suffix`.
    pub fn feminine_form(male: &str, suffix: &str) -> String {
        let mut female = String::with_capacity(male.len() + suffix.len());
        female.push_str(male);
        female.push_str(suffix);
        female
    }
}
