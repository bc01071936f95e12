//! Tree projection: building a nested utterance tree from the flat store.
//!
//! The projector reconciles the store's two addressing modes — interval
//! containment for alignable tiers, chain traversal for reference tiers —
//! into one nested structure, resolving tiers through a
//! [`TierRoleResolver`]. The selected [`InterlinearStyle`] decides how
//! deep below the word level the projection reaches.
//!
//! Units with empty text are kept as placeholders (a not-yet-transcribed
//! word is still a word); downstream views that want them filtered do so
//! themselves. Morpheme and gloss text loses a single leading and
//! trailing hyphen at projection time — those are tier-internal
//! segmentation markers, not part of the linguistic value.

use serde::{Deserialize, Serialize};

use crate::roles::{TierRole, TierRoleResolver};
use crate::store::AnnotationStore;
use crate::tree::{AnnotationTree, Gloss, Morpheme, Translation, Utterance, Word};

/// Depth and shape of the projected tree below the word level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InterlinearStyle {
    /// word → morpheme → gloss.
    #[default]
    FullGloss,
    /// Word text only.
    WordsOnly,
    /// word → part-of-speech tag list.
    PartOfSpeech,
}

/// Builds an [`AnnotationTree`] from an [`AnnotationStore`].
#[derive(Debug, Clone, Default)]
pub struct TreeProjector {
    resolver: TierRoleResolver,
    style: InterlinearStyle,
}

impl TreeProjector {
    /// Create a projector with the given role resolution and style.
    #[must_use]
    pub fn new(resolver: TierRoleResolver, style: InterlinearStyle) -> Self {
        Self { resolver, style }
    }

    /// Project the store into an editable tree, consuming the store.
    ///
    /// Utterance tiers are resolved first; their annotations become the
    /// tree roots, each with translations and words gathered from child
    /// tiers. When no utterance tier resolves, every tier resolved for
    /// role [`TierRole::Word`] is projected as a root under an empty
    /// placeholder utterance instead.
    #[must_use]
    pub fn project(self, store: AnnotationStore) -> AnnotationTree {
        let utterances = self.project_utterances(&store);
        AnnotationTree::from_parts(store, self.resolver, self.style, utterances)
    }

    fn project_utterances(&self, store: &AnnotationStore) -> Vec<Utterance> {
        let utterance_tiers = store.tier_ids_for_role(&self.resolver, TierRole::Utterance, None);
        if utterance_tiers.is_empty() {
            return self.project_word_tiers_as_roots(store);
        }

        let mut utterances = Vec::new();
        for u_tier in &utterance_tiers {
            let locale = store.locale_for_tier(u_tier).to_string();
            let participant = store.participant_for_tier(u_tier).to_string();
            for u_id in store.ordered_annotation_ids(u_tier) {
                let text = store.value_of(u_tier, &u_id).unwrap_or("").to_string();

                let mut translations = Vec::new();
                for t_tier in
                    store.tier_ids_for_role(&self.resolver, TierRole::Translation, Some(u_tier.as_str()))
                {
                    for t_id in store.child_annotation_ids(&u_id, u_tier, &t_tier) {
                        let trans = store.value_of(&t_tier, &t_id).unwrap_or("");
                        if !trans.is_empty() {
                            translations.push(Translation {
                                id: t_id,
                                text: trans.to_string(),
                                tier: t_tier.clone(),
                            });
                        }
                    }
                }

                let mut words = Vec::new();
                for w_tier in
                    store.tier_ids_for_role(&self.resolver, TierRole::Word, Some(u_tier.as_str()))
                {
                    for w_id in store.child_annotation_ids(&u_id, u_tier, &w_tier) {
                        words.push(self.word_element(store, &w_id, &w_tier));
                    }
                }
                if words.is_empty() {
                    words.push(Word::placeholder());
                }

                utterances.push(Utterance {
                    id: u_id,
                    text,
                    words,
                    translations,
                    locale: locale.clone(),
                    participant: participant.clone(),
                    tier: u_tier.clone(),
                });
            }
        }
        utterances
    }

    /// Degenerate mode: no utterance tier. Every resolved word tier
    /// becomes a root under an empty placeholder utterance, so no word
    /// tier's data is dropped.
    fn project_word_tiers_as_roots(&self, store: &AnnotationStore) -> Vec<Utterance> {
        log::debug!("no utterance tier resolved; projecting word tiers as roots");
        let mut utterances = Vec::new();
        for w_tier in store.tier_ids_for_role(&self.resolver, TierRole::Word, None) {
            let mut words: Vec<Word> = store
                .ordered_annotation_ids(&w_tier)
                .iter()
                .map(|w_id| self.word_element(store, w_id, &w_tier))
                .collect();
            if words.is_empty() {
                words.push(Word::placeholder());
            }
            utterances.push(Utterance {
                id: String::new(),
                text: String::new(),
                words,
                translations: Vec::new(),
                locale: store.locale_for_tier(&w_tier).to_string(),
                participant: store.participant_for_tier(&w_tier).to_string(),
                tier: String::new(),
            });
        }
        utterances
    }

    fn word_element(&self, store: &AnnotationStore, w_id: &str, w_tier: &str) -> Word {
        let text = store.value_of(w_tier, w_id).unwrap_or("").to_string();
        let morphemes = match self.style {
            InterlinearStyle::WordsOnly => Vec::new(),
            InterlinearStyle::PartOfSpeech => {
                let mut tags = Vec::new();
                for p_tier in
                    store.tier_ids_for_role(&self.resolver, TierRole::PartOfSpeech, Some(w_tier))
                {
                    for p_id in store.child_annotation_ids(w_id, w_tier, &p_tier) {
                        tags.push(Morpheme {
                            id: p_id.clone(),
                            text: store.value_of(&p_tier, &p_id).unwrap_or("").to_string(),
                            glosses: Vec::new(),
                        });
                    }
                }
                if tags.is_empty() {
                    tags.push(Morpheme::placeholder());
                }
                tags
            }
            InterlinearStyle::FullGloss => {
                let mut morphemes = Vec::new();
                for m_tier in
                    store.tier_ids_for_role(&self.resolver, TierRole::Morpheme, Some(w_tier))
                {
                    for m_id in store.child_annotation_ids(w_id, w_tier, &m_tier) {
                        morphemes.push(self.morpheme_element(store, &m_id, &m_tier));
                    }
                }
                if morphemes.is_empty() {
                    morphemes.push(Morpheme::placeholder());
                }
                morphemes
            }
        };
        Word {
            id: w_id.to_string(),
            text,
            tier: w_tier.to_string(),
            morphemes,
        }
    }

    fn morpheme_element(&self, store: &AnnotationStore, m_id: &str, m_tier: &str) -> Morpheme {
        let text =
            strip_boundary_hyphens(store.value_of(m_tier, m_id).unwrap_or("")).to_string();
        let mut glosses = Vec::new();
        for g_tier in store.tier_ids_for_role(&self.resolver, TierRole::Gloss, Some(m_tier)) {
            for g_id in store.child_annotation_ids(m_id, m_tier, &g_tier) {
                glosses.push(Gloss {
                    id: g_id.clone(),
                    text: strip_boundary_hyphens(store.value_of(&g_tier, &g_id).unwrap_or(""))
                        .to_string(),
                });
            }
        }
        if glosses.is_empty() {
            glosses.push(Gloss::placeholder());
        }
        Morpheme {
            id: m_id.to_string(),
            text,
            glosses,
        }
    }
}

/// Strip at most one leading and one trailing hyphen.
pub(crate) fn strip_boundary_hyphens(text: &str) -> &str {
    let text = text.strip_prefix('-').unwrap_or(text);
    text.strip_suffix('-').unwrap_or(text)
}
