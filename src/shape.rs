//! Word shapes: the nested word → morpheme → gloss structure parsed from
//! delimited text.
//!
//! A [`WordShape`] is the input to
//! [`AnnotationTree::replace_word_interlinear`](crate::AnnotationTree::replace_word_interlinear)
//! and the unit the Toolbox reader builds utterances from. Shapes carry
//! text only; identifiers are assigned when a shape is merged into a tree.
//!
//! Word, morpheme, and gloss boundaries are independently configurable
//! regex patterns via [`Delimiters`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

static DEFAULT_WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \n\t\r]+").expect("default word boundary"));
static DEFAULT_MORPHEME_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-").expect("default morpheme boundary"));
static DEFAULT_GLOSS_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":").expect("default gloss boundary"));

/// Boundary patterns for splitting transcription fields.
#[derive(Debug, Clone)]
pub struct Delimiters {
    /// Word boundary within an utterance line.
    pub word: Regex,
    /// Morpheme boundary within a word.
    pub morpheme: Regex,
    /// Gloss boundary within a morpheme's gloss group.
    pub gloss: Regex,
}

impl Default for Delimiters {
    /// Whitespace words, hyphen morphemes, colon glosses.
    fn default() -> Self {
        Self {
            word: DEFAULT_WORD_BOUNDARY.clone(),
            morpheme: DEFAULT_MORPHEME_BOUNDARY.clone(),
            gloss: DEFAULT_GLOSS_BOUNDARY.clone(),
        }
    }
}

impl Delimiters {
    /// Compile custom boundary patterns.
    pub fn new(word: &str, morpheme: &str, gloss: &str) -> Result<Self> {
        Ok(Self {
            word: Regex::new(word)?,
            morpheme: Regex::new(morpheme)?,
            gloss: Regex::new(gloss)?,
        })
    }
}

/// A morpheme with its gloss texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphemeShape {
    /// Morpheme text.
    pub text: String,
    /// Gloss texts, start to end.
    pub glosses: Vec<String>,
}

/// A word with its morpheme breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordShape {
    /// Word text.
    pub text: String,
    /// Morphemes, start to end.
    pub morphemes: Vec<MorphemeShape>,
}

impl WordShape {
    /// Parse `"word morphemes glosses"` into a nested shape.
    ///
    /// The three fields are separated by single spaces: the word form, the
    /// morpheme string (split by the morpheme boundary), and the gloss
    /// string (split by the morpheme boundary into per-morpheme groups,
    /// each split by the gloss boundary). Missing fields yield empty
    /// morpheme/gloss placeholders, so every parsed word has at least one
    /// morpheme slot and every morpheme at least one gloss slot.
    ///
    /// ```
    /// use glossa::{Delimiters, WordShape};
    ///
    /// let shape = WordShape::parse("maisons maison-s house:PL", &Delimiters::default());
    /// assert_eq!(shape.text, "maisons");
    /// assert_eq!(shape.morphemes.len(), 2);
    /// assert_eq!(shape.morphemes[0].glosses, vec!["house", "PL"]);
    /// ```
    #[must_use]
    pub fn parse(text: &str, delimiters: &Delimiters) -> Self {
        let mut fields = text.split(' ');
        let word = fields.next().unwrap_or("");
        let morpheme_field = fields.next().unwrap_or("");
        let gloss_field = fields.next().unwrap_or("");

        let morphemes: Vec<&str> = delimiters.morpheme.split(morpheme_field).collect();
        let gloss_groups: Vec<&str> = delimiters.morpheme.split(gloss_field).collect();

        let morphemes = morphemes
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let group = gloss_groups.get(i).copied().unwrap_or("");
                MorphemeShape {
                    text: (*m).to_string(),
                    glosses: delimiters
                        .gloss
                        .split(group)
                        .map(ToString::to_string)
                        .collect(),
                }
            })
            .collect();

        Self {
            text: word.to_string(),
            morphemes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_interlinear() {
        let shape = WordShape::parse("maisons maison-s house:PL", &Delimiters::default());
        assert_eq!(shape.text, "maisons");
        assert_eq!(shape.morphemes.len(), 2);
        assert_eq!(shape.morphemes[0].text, "maison");
        assert_eq!(shape.morphemes[0].glosses, vec!["house".to_string(), "PL".to_string()]);
        assert_eq!(shape.morphemes[1].text, "s");
        assert_eq!(shape.morphemes[1].glosses, vec![String::new()]);
    }

    #[test]
    fn test_parse_word_only_keeps_placeholders() {
        let shape = WordShape::parse("dog", &Delimiters::default());
        assert_eq!(shape.text, "dog");
        assert_eq!(shape.morphemes.len(), 1);
        assert_eq!(shape.morphemes[0].text, "");
        assert_eq!(shape.morphemes[0].glosses, vec![String::new()]);
    }

    #[test]
    fn test_parse_aligned_glosses_per_morpheme() {
        let shape = WordShape::parse("runs run-s RUN-3SG", &Delimiters::default());
        assert_eq!(shape.morphemes[0].glosses, vec!["RUN".to_string()]);
        assert_eq!(shape.morphemes[1].glosses, vec!["3SG".to_string()]);
    }

    #[test]
    fn test_custom_delimiters() {
        let delimiters = Delimiters::new(r"\s+", r"\+", r"\.").unwrap();
        let shape = WordShape::parse("cats cat+s ANIMAL.PL", &delimiters);
        assert_eq!(shape.morphemes.len(), 2);
        assert_eq!(shape.morphemes[0].glosses, vec!["ANIMAL".to_string(), "PL".to_string()]);
    }
}
