//! The projected, editable annotation tree.
//!
//! An [`AnnotationTree`] is the nested utterance → word → morpheme →
//! gloss view produced by [`TreeProjector`](crate::TreeProjector). It
//! exclusively owns its [`AnnotationStore`] for the duration of an edit
//! session; every mutation writes through to the store immediately, so
//! the store stays the durable, internally consistent form at all times.
//!
//! Node identifiers equal their source annotation ids. The empty string
//! marks a placeholder position with no underlying annotation (for
//! example the single empty morpheme slot of a word-only tree); store
//! writes are skipped for placeholders, which is safe because store
//! mutations treat unknown ids as misses.
//!
//! Chain repair is handled here, not in the store:
//! [`AnnotationTree::remove_word`] relinks the removed word's successor
//! to its predecessor (or clears it for a removed head), which keeps the
//! single-head invariant without any after-the-fact validation.

use serde::{Deserialize, Serialize};

use crate::project::InterlinearStyle;
use crate::roles::{TierRole, TierRoleResolver};
use crate::shape::WordShape;
use crate::store::{AnnotationId, AnnotationStore, TierId};

/// A free translation of an utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Source annotation id, empty for placeholders.
    pub id: AnnotationId,
    /// Translation text.
    pub text: String,
    /// Owning tier, empty when no tier resolved.
    pub tier: TierId,
}

/// A gloss of a morpheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gloss {
    /// Source annotation id, empty for placeholders.
    pub id: AnnotationId,
    /// Gloss text, boundary hyphens already stripped.
    pub text: String,
}

impl Gloss {
    /// The empty placeholder gloss.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }
}

/// A morpheme of a word, or a part-of-speech tag in that style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    /// Source annotation id, empty for placeholders.
    pub id: AnnotationId,
    /// Morpheme text, boundary hyphens already stripped.
    pub text: String,
    /// Glosses, start to end.
    pub glosses: Vec<Gloss>,
}

impl Morpheme {
    /// The empty placeholder morpheme, carrying one placeholder gloss so
    /// downstream consumers can rely on at least one slot per level.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            text: String::new(),
            glosses: vec![Gloss::placeholder()],
        }
    }
}

/// A word of an utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Source annotation id, empty for placeholders.
    pub id: AnnotationId,
    /// Word text.
    pub text: String,
    /// Owning tier, empty for placeholders.
    pub tier: TierId,
    /// Morphemes (or tags), start to end. Empty in words-only style.
    pub morphemes: Vec<Morpheme>,
}

impl Word {
    /// The empty placeholder word, full depth.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            text: String::new(),
            tier: String::new(),
            morphemes: vec![Morpheme::placeholder()],
        }
    }

    /// Build an id-less word from a parsed shape.
    pub(crate) fn from_shape(shape: &WordShape) -> Self {
        Self {
            id: String::new(),
            text: shape.text.clone(),
            tier: String::new(),
            morphemes: shape
                .morphemes
                .iter()
                .map(|m| Morpheme {
                    id: String::new(),
                    text: m.text.clone(),
                    glosses: m
                        .glosses
                        .iter()
                        .map(|g| Gloss {
                            id: String::new(),
                            text: g.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// An utterance: one root of the projected tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Source annotation id, empty in no-utterance-tier mode.
    pub id: AnnotationId,
    /// Utterance text.
    pub text: String,
    /// Words, start to end. Never empty; a wordless utterance holds one
    /// placeholder word.
    pub words: Vec<Word>,
    /// Free translations.
    pub translations: Vec<Translation>,
    /// Locale inherited from the utterance tier.
    pub locale: String,
    /// Participant inherited from the utterance tier.
    pub participant: String,
    /// Owning tier, empty in no-utterance-tier mode.
    pub tier: TierId,
}

/// The projected, editable tree over one annotation store.
#[derive(Debug, Clone)]
pub struct AnnotationTree {
    store: AnnotationStore,
    resolver: TierRoleResolver,
    style: InterlinearStyle,
    utterances: Vec<Utterance>,
    morpheme_join: String,
    gloss_join: String,
}

impl AnnotationTree {
    pub(crate) fn from_parts(
        store: AnnotationStore,
        resolver: TierRoleResolver,
        style: InterlinearStyle,
        utterances: Vec<Utterance>,
    ) -> Self {
        Self {
            store,
            resolver,
            style,
            utterances,
            morpheme_join: "-".to_string(),
            gloss_join: ":".to_string(),
        }
    }

    /// Override the separators used when joining morpheme and gloss
    /// strings for display.
    #[must_use]
    pub fn with_build_boundaries(
        mut self,
        morpheme_join: impl Into<String>,
        gloss_join: impl Into<String>,
    ) -> Self {
        self.morpheme_join = morpheme_join.into();
        self.gloss_join = gloss_join.into();
        self
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// The role resolution used at projection time.
    #[must_use]
    pub fn resolver(&self) -> &TierRoleResolver {
        &self.resolver
    }

    /// The projection style.
    #[must_use]
    pub fn style(&self) -> InterlinearStyle {
        self.style
    }

    /// Utterances in projection order.
    #[must_use]
    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Look up an utterance by id.
    #[must_use]
    pub fn utterance(&self, id: &str) -> Option<&Utterance> {
        self.utterances.iter().find(|u| u.id == id)
    }

    /// All utterance ids in order.
    #[must_use]
    pub fn utterance_ids(&self) -> Vec<&str> {
        self.utterances.iter().map(|u| u.id.as_str()).collect()
    }

    /// Utterance ids belonging to one tier.
    #[must_use]
    pub fn utterance_ids_in_tier(&self, tier: &str) -> Vec<&str> {
        self.utterances
            .iter()
            .filter(|u| u.tier == tier)
            .map(|u| u.id.as_str())
            .collect()
    }

    /// Text of an utterance.
    #[must_use]
    pub fn utterance_text(&self, id: &str) -> Option<&str> {
        self.utterance(id).map(|u| u.text.as_str())
    }

    /// Text of a translation.
    #[must_use]
    pub fn translation_text(&self, id: &str) -> Option<&str> {
        self.utterances
            .iter()
            .flat_map(|u| &u.translations)
            .find(|t| t.id == id)
            .map(|t| t.text.as_str())
    }

    /// Translations of an utterance.
    #[must_use]
    pub fn translations_for_utterance(&self, id: &str) -> Option<&[Translation]> {
        self.utterance(id).map(|u| u.translations.as_slice())
    }

    /// Look up a word by id.
    #[must_use]
    pub fn word(&self, id: &str) -> Option<&Word> {
        self.utterances
            .iter()
            .flat_map(|u| &u.words)
            .find(|w| w.id == id)
    }

    /// Text of a word.
    #[must_use]
    pub fn word_text(&self, id: &str) -> Option<&str> {
        self.word(id).map(|w| w.text.as_str())
    }

    /// Word ids of an utterance in order.
    #[must_use]
    pub fn word_ids_for_utterance(&self, id: &str) -> Vec<&str> {
        self.utterance(id)
            .map(|u| u.words.iter().map(|w| w.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// The word's morphemes joined with the morpheme separator.
    #[must_use]
    pub fn morpheme_string_for_word(&self, id: &str) -> String {
        self.word(id)
            .map(|w| {
                w.morphemes
                    .iter()
                    .map(|m| m.text.as_str())
                    .collect::<Vec<_>>()
                    .join(&self.morpheme_join)
            })
            .unwrap_or_default()
    }

    /// The word's glosses: gloss-joined within each morpheme,
    /// morpheme-joined across morphemes.
    #[must_use]
    pub fn gloss_string_for_word(&self, id: &str) -> String {
        self.word(id)
            .map(|w| {
                w.morphemes
                    .iter()
                    .map(|m| {
                        m.glosses
                            .iter()
                            .map(|g| g.text.as_str())
                            .collect::<Vec<_>>()
                            .join(&self.gloss_join)
                    })
                    .collect::<Vec<_>>()
                    .join(&self.morpheme_join)
            })
            .unwrap_or_default()
    }

    /// Reserve the next document-wide annotation id.
    pub fn next_annotation_id(&mut self) -> AnnotationId {
        self.store.next_annotation_id()
    }

    // =========================================================================
    // Mutation — every operation writes through to the store immediately
    // =========================================================================

    /// Rewrite an utterance's text. Returns `false` if the id is not in
    /// the tree.
    pub fn set_utterance_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        let Some(utterance) = self.utterances.iter_mut().find(|u| u.id == id) else {
            return false;
        };
        let text = text.into();
        if !utterance.id.is_empty() && !utterance.tier.is_empty() {
            self.store.set_value(&utterance.tier, id, text.clone());
        }
        utterance.text = text;
        true
    }

    /// Rewrite a translation's text. Returns `false` if the id is not in
    /// the tree.
    pub fn set_translation_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        for utterance in &mut self.utterances {
            if let Some(translation) = utterance.translations.iter_mut().find(|t| t.id == id) {
                if !translation.tier.is_empty() {
                    self.store.set_value(&translation.tier, id, text.clone());
                }
                translation.text = text;
                return true;
            }
        }
        false
    }

    /// Replace an utterance's translation set with one new translation.
    ///
    /// Mints a fresh id, removes the previous translation annotations
    /// from the store, and appends the new reference annotation under the
    /// first translation tier resolved below the utterance's tier. When
    /// no translation tier resolves the store write is deferred to
    /// serialization, which appends missing translations. Returns the
    /// new id, or `None` if the utterance is not in the tree.
    pub fn add_translation_for_utterance(
        &mut self,
        utterance_id: &str,
        text: impl Into<String>,
    ) -> Option<AnnotationId> {
        let index = self.utterances.iter().position(|u| u.id == utterance_id)?;
        let text = text.into();
        let new_id = self.store.next_annotation_id();

        let old = std::mem::take(&mut self.utterances[index].translations);
        for translation in &old {
            if !translation.id.is_empty() {
                self.store.remove_annotation(&translation.id);
                self.store.remove_chained_with_reference_parent(&translation.id);
            }
        }

        let u_tier = self.utterances[index].tier.clone();
        let t_tier = self
            .store
            .tier_ids_for_role(&self.resolver, TierRole::Translation, Some(u_tier.as_str()))
            .into_iter()
            .next();
        match &t_tier {
            Some(t_tier) => {
                self.store
                    .append_chained_annotation(t_tier, &new_id, text.clone(), utterance_id, None);
            }
            None => log::warn!(
                "no translation tier under {u_tier:?}; store write deferred to serialization"
            ),
        }
        self.utterances[index].translations = vec![Translation {
            id: new_id.clone(),
            text,
            tier: t_tier.unwrap_or_default(),
        }];
        Some(new_id)
    }

    /// Replace a word's interlinear breakdown with a freshly parsed
    /// shape.
    ///
    /// Positions that already had a unit keep their identifiers; new
    /// identifiers are minted only for genuinely new positions with
    /// non-empty text. Reusing ids preserves chain links held elsewhere
    /// in the document. The word's old morpheme and gloss chains are
    /// removed from the store and the new non-empty units appended as
    /// correctly ordered chains. Returns `false` if the word is not in
    /// the tree.
    pub fn replace_word_interlinear(&mut self, word_id: &str, shape: &WordShape) -> bool {
        let Some((u_index, w_index)) = self.locate_word(word_id) else {
            return false;
        };
        let old = self.utterances[u_index].words[w_index].clone();

        let mut morphemes = Vec::with_capacity(shape.morphemes.len());
        for (j, m_shape) in shape.morphemes.iter().enumerate() {
            let old_morpheme = old.morphemes.get(j);
            let m_id = match old_morpheme {
                Some(m) if !m.id.is_empty() => m.id.clone(),
                _ if !m_shape.text.is_empty() => self.store.next_annotation_id(),
                _ => String::new(),
            };
            let mut glosses = Vec::with_capacity(m_shape.glosses.len());
            for (k, g_text) in m_shape.glosses.iter().enumerate() {
                let old_gloss = old_morpheme.and_then(|m| m.glosses.get(k));
                let g_id = match old_gloss {
                    Some(g) if !g.id.is_empty() => g.id.clone(),
                    _ if !g_text.is_empty() => self.store.next_annotation_id(),
                    _ => String::new(),
                };
                glosses.push(Gloss {
                    id: g_id,
                    text: g_text.clone(),
                });
            }
            if glosses.is_empty() {
                glosses.push(Gloss::placeholder());
            }
            morphemes.push(Morpheme {
                id: m_id,
                text: m_shape.text.clone(),
                glosses,
            });
        }
        if morphemes.is_empty() {
            morphemes.push(Morpheme::placeholder());
        }

        let new_word = Word {
            id: old.id.clone(),
            text: shape.text.clone(),
            tier: old.tier.clone(),
            morphemes,
        };

        if !old.id.is_empty() && !old.tier.is_empty() {
            self.store.set_value(&old.tier, &old.id, new_word.text.clone());
            for morpheme in &old.morphemes {
                if !morpheme.id.is_empty() {
                    self.store.remove_chained_with_reference_parent(&morpheme.id);
                }
            }
            self.store.remove_chained_with_reference_parent(&old.id);
            self.append_word_chains(&new_word);
        }

        self.utterances[u_index].words[w_index] = new_word;
        true
    }

    /// Remove an utterance and its whole subtree, bottom-up.
    ///
    /// Every removal also deletes reference annotations pointing at the
    /// removed id, so no orphaned children survive. Returns `false` if
    /// the id is not in the tree.
    pub fn remove_utterance(&mut self, id: &str) -> bool {
        let Some(index) = self.utterances.iter().position(|u| u.id == id) else {
            return false;
        };
        let utterance = self.utterances.remove(index);
        for word in &utterance.words {
            self.remove_word_subtree(word);
            self.remove_with_refs(&word.id);
        }
        for translation in &utterance.translations {
            self.remove_with_refs(&translation.id);
        }
        self.remove_with_refs(&utterance.id);
        true
    }

    /// Remove one word, its morpheme/gloss subtree, and repair the word
    /// chain: the removed word's successor is relinked to its
    /// predecessor, or cleared when the head was removed. Returns `false`
    /// if the id is not in the tree.
    pub fn remove_word(&mut self, id: &str) -> bool {
        let Some((u_index, w_index)) = self.locate_word(id) else {
            return false;
        };
        let word = self.utterances[u_index].words[w_index].clone();
        self.remove_word_subtree(&word);
        if !word.id.is_empty() {
            self.store.remove_annotation(&word.id);
        }

        let words = &self.utterances[u_index].words;
        if w_index + 1 < words.len() {
            let next_id = words[w_index + 1].id.clone();
            if !next_id.is_empty() {
                if w_index > 0 {
                    let prev_id = words[w_index - 1].id.clone();
                    self.store.relink_previous(&next_id, Some(&prev_id));
                } else {
                    self.store.relink_previous(&next_id, None);
                }
            }
        }
        if !word.id.is_empty() {
            self.store.remove_chained_with_reference_parent(&word.id);
        }
        self.utterances[u_index].words.remove(w_index);
        true
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn locate_word(&self, id: &str) -> Option<(usize, usize)> {
        self.utterances.iter().enumerate().find_map(|(u_index, u)| {
            u.words
                .iter()
                .position(|w| w.id == id)
                .map(|w_index| (u_index, w_index))
        })
    }

    /// Remove a word's morphemes and glosses from the store, bottom-up.
    fn remove_word_subtree(&mut self, word: &Word) {
        for morpheme in &word.morphemes {
            for gloss in &morpheme.glosses {
                self.remove_with_refs(&gloss.id);
            }
            self.remove_with_refs(&morpheme.id);
        }
    }

    fn remove_with_refs(&mut self, id: &str) {
        if id.is_empty() {
            return;
        }
        self.store.remove_annotation(id);
        self.store.remove_chained_with_reference_parent(id);
    }

    fn append_word_chains(&mut self, word: &Word) {
        append_word_chains_to(&mut self.store, &self.resolver, word);
    }
}

/// Append a word's non-empty morphemes and glosses to `store` as chained
/// annotations under the first resolved morpheme/gloss tiers.
///
/// The previous-pointer tracks the last *emitted* sibling, so skipped
/// empty units never leave a dangling previous reference. Shared between
/// the tree's write-through path and the serializer's rebuild step.
pub(crate) fn append_word_chains_to(
    store: &mut AnnotationStore,
    resolver: &TierRoleResolver,
    word: &Word,
) {
    let Some(m_tier) = store
        .tier_ids_for_role(resolver, TierRole::Morpheme, Some(word.tier.as_str()))
        .into_iter()
        .next()
    else {
        return;
    };
    let g_tier = store
        .tier_ids_for_role(resolver, TierRole::Gloss, Some(m_tier.as_str()))
        .into_iter()
        .next();

    let mut previous_morpheme: Option<String> = None;
    for morpheme in &word.morphemes {
        if morpheme.id.is_empty() || morpheme.text.is_empty() {
            continue;
        }
        store.append_chained_annotation(
            &m_tier,
            &morpheme.id,
            morpheme.text.clone(),
            &word.id,
            previous_morpheme.as_deref(),
        );
        previous_morpheme = Some(morpheme.id.clone());

        if let Some(g_tier) = &g_tier {
            let mut previous_gloss: Option<String> = None;
            for gloss in &morpheme.glosses {
                if gloss.id.is_empty() || gloss.text.is_empty() {
                    continue;
                }
                store.append_chained_annotation(
                    g_tier,
                    &gloss.id,
                    gloss.text.clone(),
                    &morpheme.id,
                    previous_gloss.as_deref(),
                );
                previous_gloss = Some(gloss.id.clone());
            }
        }
    }
}
