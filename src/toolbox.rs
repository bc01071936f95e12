//! Line-oriented transcription format (Toolbox-style records).
//!
//! A record covers one utterance and is introduced by the record marker
//! line; the remaining marker lines carry the transcription (`\tx`), the
//! morpheme breakdown (`\mo`), the glosses (`\gl`), and free
//! translations (`\ft`, `\ot`):
//!
//! ```text
//! \ref r1
//! \tx  maisons vertes
//! \mo  maison-s vert-es
//! \gl  house:PL green-AGR
//! \ft  green houses
//! ```
//!
//! The reader produces the identical nested tree shape as the XML path —
//! word, morpheme, and gloss boundaries are independently configurable
//! through [`Delimiters`] — and plugs into the same [`AnnotationTree`]
//! contract. Node ids are empty: there are no underlying annotations, so
//! store write-through is a no-op for these trees.

use std::path::Path;

use crate::error::Result;
use crate::project::InterlinearStyle;
use crate::roles::TierRoleResolver;
use crate::shape::{Delimiters, WordShape};
use crate::store::AnnotationStore;
use crate::tree::{AnnotationTree, Translation, Utterance, Word};

/// Reader for record-per-utterance marker files.
#[derive(Debug, Clone)]
pub struct ToolboxReader {
    delimiters: Delimiters,
    record_marker: String,
    utterance_marker: String,
    morpheme_marker: String,
    gloss_marker: String,
    translation_markers: Vec<String>,
}

impl Default for ToolboxReader {
    /// Standard markers: `\ref`, `\tx`, `\mo`, `\gl`, `\ft`/`\ot`.
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            record_marker: "ref".to_string(),
            utterance_marker: "tx".to_string(),
            morpheme_marker: "mo".to_string(),
            gloss_marker: "gl".to_string(),
            translation_markers: vec!["ft".to_string(), "ot".to_string()],
        }
    }
}

impl ToolboxReader {
    /// Reader with the standard markers and delimiters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the boundary patterns.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Parse records into utterances.
    #[must_use]
    pub fn read_str(&self, text: &str) -> Vec<Utterance> {
        let mut utterances = Vec::new();
        let mut record: Option<Record> = None;

        for line in text.lines() {
            let Some((marker, rest)) = parse_marker_line(line) else {
                continue;
            };
            if marker == self.record_marker {
                if let Some(done) = record.take() {
                    utterances.push(self.build_utterance(done));
                }
                record = Some(Record {
                    id: rest.to_string(),
                    ..Record::default()
                });
                continue;
            }
            let current = record.get_or_insert_with(Record::default);
            if marker == self.utterance_marker {
                if !current.text.is_empty() {
                    current.text.push(' ');
                }
                current.text.push_str(rest);
            } else if marker == self.morpheme_marker {
                if !current.morphemes.is_empty() {
                    current.morphemes.push(' ');
                }
                current.morphemes.push_str(rest);
            } else if marker == self.gloss_marker {
                if !current.glosses.is_empty() {
                    current.glosses.push(' ');
                }
                current.glosses.push_str(rest);
            } else if self.translation_markers.iter().any(|m| m == marker) && !rest.is_empty() {
                current.translations.push(rest.to_string());
            }
        }
        if let Some(done) = record.take() {
            utterances.push(self.build_utterance(done));
        }
        utterances
    }

    /// Parse a file into utterances.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Vec<Utterance>> {
        Ok(self.read_str(&std::fs::read_to_string(path)?))
    }

    /// Parse records and wrap them in an [`AnnotationTree`] over an
    /// empty store.
    #[must_use]
    pub fn read_to_tree(
        &self,
        text: &str,
        resolver: TierRoleResolver,
        style: InterlinearStyle,
    ) -> AnnotationTree {
        let utterances = self.read_str(text);
        AnnotationTree::from_parts(AnnotationStore::new(), resolver, style, utterances)
    }

    fn build_utterance(&self, record: Record) -> Utterance {
        // Runs of spaces collapse to one before word splitting.
        let text = record.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let word_texts: Vec<&str> = self
            .delimiters
            .word
            .split(&text)
            .filter(|w| !w.is_empty())
            .collect();
        let morpheme_words: Vec<&str> = self
            .delimiters
            .word
            .split(&record.morphemes)
            .filter(|w| !w.is_empty())
            .collect();
        let gloss_words: Vec<&str> = self
            .delimiters
            .word
            .split(&record.glosses)
            .filter(|w| !w.is_empty())
            .collect();

        let mut words: Vec<Word> = word_texts
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let morphemes = morpheme_words.get(i).copied().unwrap_or("");
                let glosses = gloss_words.get(i).copied().unwrap_or("");
                let shape = WordShape::parse(
                    &format!("{word} {morphemes} {glosses}"),
                    &self.delimiters,
                );
                Word::from_shape(&shape)
            })
            .collect();
        if words.is_empty() {
            words.push(Word::placeholder());
        }

        Utterance {
            id: record.id,
            text,
            words,
            translations: record
                .translations
                .into_iter()
                .map(|text| Translation {
                    id: String::new(),
                    text,
                    tier: String::new(),
                })
                .collect(),
            locale: String::new(),
            participant: String::new(),
            tier: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Record {
    id: String,
    text: String,
    morphemes: String,
    glosses: String,
    translations: Vec<String>,
}

/// Split a `\marker rest` line; `None` for non-marker lines.
fn parse_marker_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end();
    let stripped = line.strip_prefix('\\')?;
    match stripped.split_once(char::is_whitespace) {
        Some((marker, rest)) => Some((marker, rest.trim_start())),
        None => Some((stripped, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
\\ref r1
\\tx maisons  vertes
\\mo maison-s vert-es
\\gl house:PL green:AGR
\\ft green houses

\\ref r2
\\tx il dort
\\ft he sleeps
";

    #[test]
    fn test_two_records() {
        let utterances = ToolboxReader::new().read_str(SAMPLE);
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].id, "r1");
        assert_eq!(utterances[0].text, "maisons vertes");
        assert_eq!(utterances[1].id, "r2");
        assert_eq!(utterances[1].words.len(), 2);
    }

    #[test]
    fn test_interlinear_alignment() {
        let utterances = ToolboxReader::new().read_str(SAMPLE);
        let first = &utterances[0].words[0];
        assert_eq!(first.text, "maisons");
        assert_eq!(first.morphemes.len(), 2);
        assert_eq!(first.morphemes[0].text, "maison");
        assert_eq!(first.morphemes[0].glosses[0].text, "house");
        assert_eq!(first.morphemes[0].glosses[1].text, "PL");
        assert_eq!(first.morphemes[1].text, "s");
    }

    #[test]
    fn test_translations_collected() {
        let utterances = ToolboxReader::new().read_str(SAMPLE);
        assert_eq!(utterances[0].translations.len(), 1);
        assert_eq!(utterances[0].translations[0].text, "green houses");
    }

    #[test]
    fn test_missing_interlinear_lines_yield_placeholders() {
        let utterances = ToolboxReader::new().read_str(SAMPLE);
        let word = &utterances[1].words[0];
        assert_eq!(word.text, "il");
        assert_eq!(word.morphemes.len(), 1);
        assert_eq!(word.morphemes[0].text, "");
    }

    #[test]
    fn test_empty_record_keeps_placeholder_word() {
        let utterances = ToolboxReader::new().read_str("\\ref r9\n");
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].words.len(), 1);
        assert_eq!(utterances[0].words[0].id, "");
    }

    #[test]
    fn test_tree_contract() {
        let tree = ToolboxReader::new().read_to_tree(
            SAMPLE,
            TierRoleResolver::default(),
            InterlinearStyle::FullGloss,
        );
        assert_eq!(tree.utterances().len(), 2);
        assert_eq!(tree.utterance_text("r1"), Some("maisons vertes"));
        // No underlying annotations: edits stay tree-local but succeed.
        assert!(tree.store().tiers().is_empty());
    }
}
