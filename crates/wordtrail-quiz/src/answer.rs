//! Answer evaluation.

use serde::Serialize;

/// Result of comparing a submitted answer with the expected glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every glyph matches.
    Correct,
    /// Anything else. There is no partial credit.
    Incorrect,
}

impl Verdict {
    /// Returns `true` for `Correct`.
    #[must_use]
    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}

/// Compares the glyphs a player placed with the expected glyphs.
///
/// Comparison is case-insensitive and ignores whitespace. An `_` stands for a
/// slot the player left blank and contributes nothing.
#[must_use]
pub fn evaluate<U, E>(user: &[U], expected: &[E]) -> Verdict
where
    U: AsRef<str>,
    E: AsRef<str>,
{
    if normalize(user) == normalize(expected) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

fn normalize<S: AsRef<str>>(glyphs: &[S]) -> String {
    glyphs
        .iter()
        .flat_map(|g| g.as_ref().chars())
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
