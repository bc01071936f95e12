//! Tier role resolution: mapping abstract semantic roles to the concrete
//! linguistic-type labels that identify tiers.
//!
//! Annotation tools are not consistent about type labels — one corpus
//! calls its word tier type `"words"`, another `"Wörter"`. The resolver
//! holds, per role, an ordered list of accepted labels, defaulting to the
//! conventional English and German names and overridable wholesale per
//! role. Resolution is exact string match only; there is no fuzzy
//! matching and no inheritance between roles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Abstract semantic category of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierRole {
    /// Utterance-level transcription tier.
    Utterance,
    /// Word tier.
    Word,
    /// Morpheme tier.
    Morpheme,
    /// Gloss tier.
    Gloss,
    /// Part-of-speech tag tier.
    PartOfSpeech,
    /// Free translation tier.
    Translation,
}

impl TierRole {
    /// All roles, in projection order.
    pub const ALL: [TierRole; 6] = [
        TierRole::Utterance,
        TierRole::Word,
        TierRole::Morpheme,
        TierRole::Gloss,
        TierRole::PartOfSpeech,
        TierRole::Translation,
    ];
}

/// Maps roles to the ordered set of linguistic-type labels accepted for
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRoleResolver {
    labels: HashMap<TierRole, Vec<String>>,
}

impl Default for TierRoleResolver {
    fn default() -> Self {
        let mut labels = HashMap::new();
        labels.insert(
            TierRole::Utterance,
            to_owned(&["utterance", "utterances", "Äußerung", "Äußerungen"]),
        );
        labels.insert(
            TierRole::Word,
            to_owned(&["words", "word", "Wort", "Worte", "Wörter"]),
        );
        labels.insert(
            TierRole::Morpheme,
            to_owned(&["morpheme", "morphemes", "Morphem", "Morpheme"]),
        );
        labels.insert(
            TierRole::Gloss,
            to_owned(&["glosses", "gloss", "Glossen", "Gloss", "Glosse"]),
        );
        labels.insert(
            TierRole::PartOfSpeech,
            to_owned(&["part of speech", "parts of speech", "Wortart", "Wortarten"]),
        );
        labels.insert(
            TierRole::Translation,
            to_owned(&["translation", "translations", "Übersetzung", "Übersetzungen"]),
        );
        Self { labels }
    }
}

impl TierRoleResolver {
    /// Resolver with the built-in English/German label sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for documents exported from Toolbox, where tier types are
    /// the original marker names (`tx`, `mo`, `gl`, `ft`/`ot`).
    #[must_use]
    pub fn toolbox() -> Self {
        let mut resolver = Self {
            labels: HashMap::new(),
        };
        resolver.set_labels(TierRole::Utterance, ["tx"]);
        resolver.set_labels(TierRole::Word, ["mo"]);
        resolver.set_labels(TierRole::Morpheme, ["mo"]);
        resolver.set_labels(TierRole::Gloss, ["gl"]);
        resolver.set_labels(TierRole::PartOfSpeech, Vec::<String>::new());
        resolver.set_labels(TierRole::Translation, ["ft", "ot"]);
        resolver
    }

    /// Replace the accepted labels for a role wholesale.
    pub fn set_labels<I, S>(&mut self, role: TierRole, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels
            .insert(role, labels.into_iter().map(Into::into).collect());
    }

    /// Accepted labels for a role, in priority order.
    #[must_use]
    pub fn labels(&self, role: TierRole) -> &[String] {
        self.labels.get(&role).map_or(&[], Vec::as_slice)
    }

    /// True if `label` is accepted for `role` (exact match).
    #[must_use]
    pub fn matches(&self, role: TierRole, label: &str) -> bool {
        self.labels(role).iter().any(|l| l == label)
    }
}

fn to_owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| (*l).to_string()).collect()
}
