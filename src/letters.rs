use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// (identifier, is_vowel) in catalog order
const LETTER_TABLE: [(&str, bool); 25] = [
    ("a", true),
    ("ba", false),
    ("ca", false),
    ("da", false),
    ("e", true),
    ("ae", true),
    ("eu", true),
    ("ga", false),
    ("ha", false),
    ("i", true),
    ("ja", false),
    ("ka", false),
    ("la", false),
    ("ma", false),
    ("na", false),
    ("nga", false),
    ("nya", false),
    ("o", true),
    ("pa", false),
    ("ra", false),
    ("sa", false),
    ("ta", false),
    ("u", true),
    ("wa", false),
    ("ya", false),
];

static CATALOG: LazyLock<Vec<Letter>> = LazyLock::new(|| {
    LETTER_TABLE
        .iter()
        .map(|&(identifier, is_vowel)| Letter::new(identifier, is_vowel))
        .collect()
});

/// The two partitions of the alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum LetterClass {
    /// vowel letters
    Swara,
    /// consonant letters
    Ngalagena,
}

/// One letter of the script, identified by its ASCII transliteration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Letter {
    pub identifier: String,
    pub is_vowel: bool,
}

impl Letter {
    pub fn new(identifier: impl Into<String>, is_vowel: bool) -> Self {
        Self {
            identifier: identifier.into(),
            is_vowel,
        }
    }

    pub fn class(&self) -> LetterClass {
        if self.is_vowel {
            LetterClass::Swara
        } else {
            LetterClass::Ngalagena
        }
    }

    /// Text shown to the learner. Identifiers stay ASCII; only display differs.
    pub fn glyph(&self) -> &str {
        glyph_for(&self.identifier)
    }
}

/// Display form of any label, including classifier output that is not in the catalog
pub fn glyph_for(identifier: &str) -> &str {
    match identifier {
        "ae" => "é",
        other => other,
    }
}

pub fn catalog() -> &'static [Letter] {
    &CATALOG
}

pub fn vowels() -> impl Iterator<Item = &'static Letter> {
    by_class(LetterClass::Swara)
}

pub fn consonants() -> impl Iterator<Item = &'static Letter> {
    by_class(LetterClass::Ngalagena)
}

pub fn by_class(class: LetterClass) -> impl Iterator<Item = &'static Letter> {
    catalog().iter().filter(move |l| l.class() == class)
}

pub fn find(identifier: &str) -> Option<&'static Letter> {
    catalog().iter().find(|l| l.identifier == identifier)
}
