//! The authoritative flat annotation store.
//!
//! A store holds the tiers, linguistic types, time order, and annotations
//! of one document. Annotations come in two addressing modes, decided by
//! the owning tier's linguistic type:
//!
//! - **Alignable**: anchored to a `[start, end]` time-slot interval.
//!   Ordering key is the start slot's time value.
//! - **Reference**: anchored to a parent annotation in the parent tier and
//!   ordered by previous-annotation pointers. Annotations sharing one
//!   reference parent form a singly linked chain with exactly one head
//!   (no previous pointer) and no shared successors.
//!
//! Lookups against unknown tiers or ids return empty results — absence is
//! a query outcome, not a fault. Mutations addressing a missing id return
//! `false`. Structural chain repair (relinking around a removed node) is
//! the caller's job; see [`AnnotationTree`](crate::AnnotationTree).
//!
//! The store owns the document-wide last-used annotation id counter; every
//! id minted by [`AnnotationStore::next_annotation_id`] is strictly greater
//! than any id seen at load time or issued before.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::roles::{TierRole, TierRoleResolver};
use crate::time::{numeric_suffix, TimeOrder};

/// Tier identifier.
pub type TierId = String;
/// Annotation identifier (`a{n}`).
pub type AnnotationId = String;

/// Linguistic type metadata; decides a tier's addressing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticType {
    /// Type identifier, referenced by tiers.
    pub id: String,
    /// True if annotations of this type anchor to time intervals.
    pub time_alignable: bool,
    /// ELAN constraint stereotype, if declared.
    pub constraints: Option<String>,
}

/// A named column of annotations sharing one linguistic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Tier identifier, unique within the document.
    pub id: TierId,
    /// Linguistic-type label.
    pub linguistic_type: String,
    /// Parent tier, if this tier is nested.
    pub parent: Option<TierId>,
    /// Default locale of the tier's content.
    pub default_locale: Option<String>,
    /// Participant (speaker) label.
    pub participant: Option<String>,
    /// Annotation ids in document order.
    pub(crate) annotations: Vec<AnnotationId>,
}

impl Tier {
    /// Create an empty tier.
    #[must_use]
    pub fn new(id: impl Into<String>, linguistic_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            linguistic_type: linguistic_type.into(),
            parent: None,
            default_locale: None,
            participant: None,
            annotations: Vec::new(),
        }
    }

    /// Set the parent tier.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the default locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// Set the participant label.
    #[must_use]
    pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    /// Annotation ids in document order.
    #[must_use]
    pub fn annotation_ids(&self) -> &[AnnotationId] {
        &self.annotations
    }
}

/// An interval-anchored annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignableAnnotation {
    /// Annotation identifier.
    pub id: AnnotationId,
    /// Owning tier.
    pub tier: TierId,
    /// Start time-slot id.
    pub start: String,
    /// End time-slot id.
    pub end: String,
    /// Text value.
    pub value: String,
}

/// A reference-chained annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefAnnotation {
    /// Annotation identifier.
    pub id: AnnotationId,
    /// Owning tier.
    pub tier: TierId,
    /// The annotation in the parent tier this one belongs to.
    pub parent: AnnotationId,
    /// Previous annotation in the chain; `None` marks the chain head.
    pub previous: Option<AnnotationId>,
    /// Text value.
    pub value: String,
}

/// Either variant of annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    /// Anchored to a time interval.
    Alignable(AlignableAnnotation),
    /// Anchored to a parent annotation and chain-ordered.
    Reference(RefAnnotation),
}

impl Annotation {
    /// Annotation identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Annotation::Alignable(a) => &a.id,
            Annotation::Reference(r) => &r.id,
        }
    }

    /// Owning tier.
    #[must_use]
    pub fn tier(&self) -> &str {
        match self {
            Annotation::Alignable(a) => &a.tier,
            Annotation::Reference(r) => &r.tier,
        }
    }

    /// Text value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Annotation::Alignable(a) => &a.value,
            Annotation::Reference(r) => &r.value,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self {
            Annotation::Alignable(a) => &mut a.value,
            Annotation::Reference(r) => &mut r.value,
        }
    }

    /// The reference variant, if this is one.
    #[must_use]
    pub fn as_reference(&self) -> Option<&RefAnnotation> {
        match self {
            Annotation::Reference(r) => Some(r),
            Annotation::Alignable(_) => None,
        }
    }

    /// The alignable variant, if this is one.
    #[must_use]
    pub fn as_alignable(&self) -> Option<&AlignableAnnotation> {
        match self {
            Annotation::Alignable(a) => Some(a),
            Annotation::Reference(_) => None,
        }
    }
}

/// The flat data layer for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationStore {
    time_order: TimeOrder,
    linguistic_types: Vec<LinguisticType>,
    tiers: Vec<Tier>,
    annotations: HashMap<AnnotationId, Annotation>,
    last_annotation_id: u64,
    /// Root-element attributes of the source document, preserved for
    /// re-emission.
    pub(crate) document_attributes: Vec<(String, String)>,
    /// HEADER attributes of the source document.
    pub(crate) header_attributes: Vec<(String, String)>,
    /// HEADER/PROPERTY elements other than the last-used-id property.
    pub(crate) header_properties: Vec<(String, String)>,
    /// Reverse chain index: previous-id → successor-id. Built lazily on
    /// first use and maintained across chain mutations.
    #[serde(skip)]
    successors: Option<HashMap<AnnotationId, AnnotationId>>,
}

impl AnnotationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Time order
    // =========================================================================

    /// The time-slot table.
    #[must_use]
    pub fn time_order(&self) -> &TimeOrder {
        &self.time_order
    }

    /// Mutable access to the time-slot table.
    pub fn time_order_mut(&mut self) -> &mut TimeOrder {
        &mut self.time_order
    }

    // =========================================================================
    // Tiers and linguistic types
    // =========================================================================

    /// Register a linguistic type.
    pub fn add_linguistic_type(&mut self, linguistic_type: LinguisticType) {
        self.linguistic_types.push(linguistic_type);
    }

    /// True if a linguistic type with this id is registered.
    #[must_use]
    pub fn has_linguistic_type(&self, id: &str) -> bool {
        self.linguistic_types.iter().any(|lt| lt.id == id)
    }

    /// Look up a linguistic type.
    #[must_use]
    pub fn linguistic_type(&self, id: &str) -> Option<&LinguisticType> {
        self.linguistic_types.iter().find(|lt| lt.id == id)
    }

    /// Registered linguistic types in document order.
    #[must_use]
    pub fn linguistic_types(&self) -> &[LinguisticType] {
        &self.linguistic_types
    }

    /// Add a tier. The caller is responsible for registering its
    /// linguistic type; tiers form a forest via parent references and
    /// cycles are assumed absent by construction.
    pub fn add_tier(&mut self, tier: Tier) {
        self.tiers.push(tier);
    }

    /// Look up a tier.
    #[must_use]
    pub fn tier(&self, id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    fn tier_mut(&mut self, id: &str) -> Option<&mut Tier> {
        self.tiers.iter_mut().find(|t| t.id == id)
    }

    /// Tiers in document order.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// True if the tier's annotations anchor to time intervals.
    ///
    /// Unknown tiers and unregistered types count as not alignable.
    #[must_use]
    pub fn is_tier_alignable(&self, tier_id: &str) -> bool {
        self.tier(tier_id)
            .and_then(|t| self.linguistic_type(&t.linguistic_type))
            .is_some_and(|lt| lt.time_alignable)
    }

    /// Default locale of a tier, empty if unset or unknown.
    #[must_use]
    pub fn locale_for_tier(&self, tier_id: &str) -> &str {
        self.tier(tier_id)
            .and_then(|t| t.default_locale.as_deref())
            .unwrap_or("")
    }

    /// Participant label of a tier, empty if unset or unknown.
    #[must_use]
    pub fn participant_for_tier(&self, tier_id: &str) -> &str {
        self.tier(tier_id)
            .and_then(|t| t.participant.as_deref())
            .unwrap_or("")
    }

    /// Tier ids whose linguistic type equals `label`, optionally
    /// restricted to children of `parent`.
    #[must_use]
    pub fn tier_ids_for_type(&self, label: &str, parent: Option<&str>) -> Vec<TierId> {
        self.tiers
            .iter()
            .filter(|t| t.linguistic_type == label)
            .filter(|t| parent.is_none() || t.parent.as_deref() == parent)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Tier ids matching any label the resolver associates with `role`,
    /// optionally restricted to children of `parent`.
    ///
    /// Multiple matching labels and multiple matching tiers are all
    /// returned, in label order then document order.
    #[must_use]
    pub fn tier_ids_for_role(
        &self,
        resolver: &TierRoleResolver,
        role: TierRole,
        parent: Option<&str>,
    ) -> Vec<TierId> {
        let mut ids = Vec::new();
        for label in resolver.labels(role) {
            ids.extend(self.tier_ids_for_type(label, parent));
        }
        ids
    }

    // =========================================================================
    // Annotation lookup
    // =========================================================================

    /// Look up an annotation by id.
    #[must_use]
    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    /// Owning tier of an annotation.
    #[must_use]
    pub fn tier_of(&self, id: &str) -> Option<&str> {
        self.annotations.get(id).map(Annotation::tier)
    }

    /// Text value of an annotation in a tier, `None` on any miss.
    #[must_use]
    pub fn value_of(&self, tier_id: &str, id: &str) -> Option<&str> {
        self.annotations
            .get(id)
            .filter(|a| a.tier() == tier_id)
            .map(Annotation::value)
    }

    /// All annotation ids of a tier in traversal order.
    ///
    /// Alignable tiers sort by start-slot time value, ties by id suffix.
    /// Reference tiers return every chain head (one per distinct
    /// reference parent, in document order) immediately followed by the
    /// rest of its chain. Used for root-level iteration when no
    /// containing tier is configured.
    #[must_use]
    pub fn ordered_annotation_ids(&self, tier_id: &str) -> Vec<AnnotationId> {
        let Some(tier) = self.tier(tier_id) else {
            return Vec::new();
        };
        if self.is_tier_alignable(tier_id) {
            let mut ids: Vec<AnnotationId> = tier
                .annotations
                .iter()
                .filter(|id| {
                    matches!(self.annotations.get(*id), Some(Annotation::Alignable(_)))
                })
                .cloned()
                .collect();
            ids.sort_by(|a, b| self.cmp_alignable(a, b));
            ids
        } else {
            let mut ids = Vec::new();
            for id in &tier.annotations {
                if let Some(Annotation::Reference(r)) = self.annotations.get(id) {
                    if r.previous.is_none() {
                        ids.extend(self.walk_chain(tier, r));
                    }
                }
            }
            ids
        }
    }

    /// Child annotations of `parent_ann` in `child_tier`.
    ///
    /// An alignable child tier yields the annotations whose interval is
    /// contained in the parent's, ordered by start; a reference child
    /// tier yields the full chain whose reference parent is `parent_ann`.
    #[must_use]
    pub fn child_annotation_ids(
        &self,
        parent_ann: &str,
        parent_tier: &str,
        child_tier: &str,
    ) -> Vec<AnnotationId> {
        if self.is_tier_alignable(child_tier) {
            let Some(Annotation::Alignable(parent)) = self
                .annotations
                .get(parent_ann)
                .filter(|a| a.tier() == parent_tier)
            else {
                return Vec::new();
            };
            let outer = (parent.start.as_str(), parent.end.as_str());
            let Some(tier) = self.tier(child_tier) else {
                return Vec::new();
            };
            let mut ids: Vec<AnnotationId> = tier
                .annotations
                .iter()
                .filter(|id| {
                    self.annotations.get(*id).and_then(Annotation::as_alignable).is_some_and(
                        |a| {
                            self.time_order
                                .contains_interval(outer, (a.start.as_str(), a.end.as_str()))
                        },
                    )
                })
                .cloned()
                .collect();
            ids.sort_by(|a, b| self.cmp_alignable(a, b));
            ids
        } else {
            self.chain_for(child_tier, parent_ann)
        }
    }

    /// The reference annotations in `tier_id` whose reference parent is
    /// `parent_ann`, walked chain head to tail.
    ///
    /// Every head is returned: ordered units form one chain, but
    /// chain-less annotations sharing a parent (translations) are each
    /// their own head and all belong to the result.
    #[must_use]
    pub fn chain_for(&self, tier_id: &str, parent_ann: &str) -> Vec<AnnotationId> {
        let Some(tier) = self.tier(tier_id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for id in &tier.annotations {
            if let Some(r) = self.annotations.get(id).and_then(Annotation::as_reference) {
                if r.parent == parent_ann && r.previous.is_none() {
                    out.extend(self.walk_chain(tier, r));
                }
            }
        }
        out
    }

    /// Walk one chain from its head, within one tier and reference parent.
    fn walk_chain(&self, tier: &Tier, head: &RefAnnotation) -> Vec<AnnotationId> {
        let members: Vec<&RefAnnotation> = tier
            .annotations
            .iter()
            .filter_map(|id| self.annotations.get(id).and_then(Annotation::as_reference))
            .filter(|r| r.parent == head.parent)
            .collect();
        let next: HashMap<&str, &str> = members
            .iter()
            .filter_map(|r| r.previous.as_deref().map(|p| (p, r.id.as_str())))
            .collect();

        let mut out = vec![head.id.clone()];
        let mut current = head.id.as_str();
        // Length guard: a malformed cycle must not hang the walk.
        while out.len() <= members.len() {
            match next.get(current) {
                Some(&succ) => {
                    out.push(succ.to_string());
                    current = succ;
                }
                None => break,
            }
        }
        out
    }

    fn cmp_alignable(&self, a: &str, b: &str) -> std::cmp::Ordering {
        let sa = self
            .annotations
            .get(a)
            .and_then(Annotation::as_alignable)
            .map(|x| x.start.as_str())
            .unwrap_or("");
        let sb = self
            .annotations
            .get(b)
            .and_then(Annotation::as_alignable)
            .map(|x| x.start.as_str())
            .unwrap_or("");
        self.time_order
            .cmp_slots(sa, sb)
            .then_with(|| numeric_suffix(a).cmp(&numeric_suffix(b)))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert an annotation parsed from a document, keeping the id
    /// counter in sync. Returns `false` if the tier is unknown or the id
    /// is already taken.
    pub fn push_annotation(&mut self, annotation: Annotation) -> bool {
        let id = annotation.id().to_string();
        let tier_id = annotation.tier().to_string();
        if self.annotations.contains_key(&id) {
            return false;
        }
        let Some(tier) = self.tier_mut(&tier_id) else {
            return false;
        };
        tier.annotations.push(id.clone());
        let suffix = numeric_suffix(&id);
        if suffix > self.last_annotation_id {
            self.last_annotation_id = suffix;
        }
        if let Annotation::Reference(r) = &annotation {
            if let (Some(prev), Some(index)) = (&r.previous, &mut self.successors) {
                index.insert(prev.clone(), id.clone());
            }
        }
        self.annotations.insert(id, annotation);
        true
    }

    /// Rewrite the text value of an annotation in a tier. Returns `false`
    /// if the id does not exist in that tier.
    pub fn set_value(&mut self, tier_id: &str, id: &str, value: impl Into<String>) -> bool {
        match self.annotations.get_mut(id) {
            Some(a) if a.tier() == tier_id => {
                *a.value_mut() = value.into();
                true
            }
            _ => false,
        }
    }

    /// Insert a new reference annotation at the end of `tier_id`.
    ///
    /// With `after`, the new node's previous pointer is `after`; an
    /// existing successor of `after` is NOT relinked — keeping the chain
    /// single-headed is the caller's responsibility. Returns `false` if
    /// the tier is unknown or the id is taken.
    pub fn append_chained_annotation(
        &mut self,
        tier_id: &str,
        new_id: &str,
        value: impl Into<String>,
        ref_parent: &str,
        after: Option<&str>,
    ) -> bool {
        if self.tier(tier_id).is_none() {
            return false;
        }
        self.push_annotation(Annotation::Reference(RefAnnotation {
            id: new_id.to_string(),
            tier: tier_id.to_string(),
            parent: ref_parent.to_string(),
            previous: after.map(ToString::to_string),
            value: value.into(),
        }))
    }

    /// Mint a new alignable annotation at the end of `tier_id`, with new
    /// time slots. Without explicit times the interval defaults to 500 ms
    /// starting at `id * 500` ms. Returns the new id, or `None` if the
    /// tier is unknown.
    pub fn append_alignable_annotation(
        &mut self,
        tier_id: &str,
        value: impl Into<String>,
        start_ms: Option<u64>,
        end_ms: Option<u64>,
    ) -> Option<AnnotationId> {
        const DEFAULT_LENGTH_MS: u64 = 500;
        if self.tier(tier_id).is_none() {
            return None;
        }
        let id = self.next_annotation_id();
        let start_ms = start_ms.unwrap_or(numeric_suffix(&id) * DEFAULT_LENGTH_MS);
        let end_ms = end_ms.unwrap_or(start_ms + DEFAULT_LENGTH_MS);
        let start = self.time_order.add_slot(Some(start_ms));
        let end = self.time_order.add_slot(Some(end_ms));
        self.push_annotation(Annotation::Alignable(AlignableAnnotation {
            id: id.clone(),
            tier: tier_id.to_string(),
            start,
            end,
            value: value.into(),
        }));
        Some(id)
    }

    /// Delete one annotation of either variant. Does not relink chain
    /// neighbours; a successor's previous pointer is left for the caller
    /// to repair via [`AnnotationStore::relink_previous`].
    pub fn remove_annotation(&mut self, id: &str) -> bool {
        let Some(annotation) = self.annotations.remove(id) else {
            return false;
        };
        let tier_id = annotation.tier().to_string();
        if let Some(tier) = self.tier_mut(&tier_id) {
            tier.annotations.retain(|a| a != id);
        }
        if let Some(index) = &mut self.successors {
            index.remove(id);
            if let Annotation::Reference(r) = &annotation {
                if let Some(prev) = &r.previous {
                    if index.get(prev).is_some_and(|s| s == id) {
                        index.remove(prev);
                    }
                }
            }
        }
        true
    }

    /// Delete every reference annotation whose reference parent is
    /// `parent`, across all tiers. Cascades one level; callers recurse
    /// for deeper cascades. Returns the number removed.
    pub fn remove_chained_with_reference_parent(&mut self, parent: &str) -> usize {
        let doomed: Vec<AnnotationId> = self
            .annotations
            .values()
            .filter_map(Annotation::as_reference)
            .filter(|r| r.parent == parent)
            .map(|r| r.id.clone())
            .collect();
        for id in &doomed {
            self.remove_annotation(id);
        }
        doomed.len()
    }

    /// Delete every annotation of a tier. Returns `false` if the tier is
    /// unknown.
    pub fn remove_all_annotations_from_tier(&mut self, tier_id: &str) -> bool {
        if self.tier(tier_id).is_none() {
            return false;
        }
        let doomed: Vec<AnnotationId> = self
            .tier(tier_id)
            .map(|t| t.annotations.clone())
            .unwrap_or_default();
        for id in &doomed {
            self.remove_annotation(id);
        }
        true
    }

    /// Rewrite one chain node's previous pointer; `None` clears it,
    /// marking the node a chain head. No-op (`false`) on alignable
    /// annotations and unknown ids.
    pub fn relink_previous(&mut self, id: &str, new_previous: Option<&str>) -> bool {
        let Some(Annotation::Reference(r)) = self.annotations.get_mut(id) else {
            return false;
        };
        let old_previous = r.previous.take();
        r.previous = new_previous.map(ToString::to_string);
        if let Some(index) = &mut self.successors {
            if let Some(old) = &old_previous {
                if index.get(old).is_some_and(|s| s == id) {
                    index.remove(old);
                }
            }
            if let Some(new) = new_previous {
                index.insert(new.to_string(), id.to_string());
            }
        }
        true
    }

    /// The annotation whose previous pointer names `id`, if any.
    ///
    /// Backed by the lazily built reverse chain index, so repeated
    /// relink/remove sequences stay tractable on larger documents.
    pub fn successor_of(&mut self, id: &str) -> Option<AnnotationId> {
        if self.successors.is_none() {
            let index = self
                .annotations
                .values()
                .filter_map(Annotation::as_reference)
                .filter_map(|r| r.previous.as_ref().map(|p| (p.clone(), r.id.clone())))
                .collect();
            self.successors = Some(index);
        }
        self.successors.as_ref().and_then(|index| index.get(id).cloned())
    }

    // =========================================================================
    // Identifier counter
    // =========================================================================

    /// Last annotation id issued or seen at load time.
    #[must_use]
    pub fn last_used_annotation_id(&self) -> u64 {
        self.last_annotation_id
    }

    /// Force the counter, used when a loaded header records it.
    pub fn set_last_used_annotation_id(&mut self, value: u64) {
        if value > self.last_annotation_id {
            self.last_annotation_id = value;
        }
    }

    /// Reserve and return the next annotation id, strictly greater than
    /// any previously issued or loaded.
    pub fn next_annotation_id(&mut self) -> AnnotationId {
        self.last_annotation_id += 1;
        format!("a{}", self.last_annotation_id)
    }
}
