//! Collation for Arabic catalog text.
//!
//! The primary level compares base letters only: the text is decomposed
//! with NFKD (which also splits lam-alef and other presentation-form
//! ligatures), combining marks such as harakat, shadda and hamza carriers are
//! dropped, tatweel and bidi/joiner controls are ignored, and ta marbuta and
//! alef maqsura are folded onto ha and ya. Arabic base letters are encoded in
//! hijā'ī order, so code-point order of the folded text is alphabetical. The
//! NFC form of the original text breaks primary ties.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey {
    primary: String,
    tertiary: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let primary = text
            .nfkd()
            .filter(|&c| !is_combining_mark(c) && !is_ignorable(c))
            .map(fold)
            .flat_map(char::to_lowercase)
            .collect();
        Self { primary, tertiary: text.nfc().collect() }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }
}

fn is_ignorable(c: char) -> bool {
    matches!(c, '\u{0640}' | '\u{200C}' | '\u{200D}' | '\u{200E}' | '\u{200F}')
}

fn fold(c: char) -> char {
    match c {
        'ة' => 'ه',
        'ى' => 'ي',
        'ٱ' => 'ا',
        _ => c,
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}
