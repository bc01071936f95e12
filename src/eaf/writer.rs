//! Serializer: [`AnnotationTree`] + mutated store → EAF XML image.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::project::InterlinearStyle;
use crate::roles::TierRole;
use crate::store::{Annotation, AnnotationStore};
use crate::tree::{append_word_chains_to, AnnotationTree};

/// Regenerates an EAF document from a tree's current state.
///
/// The serializer works on an owned clone of the tree's store: utterance,
/// word, and translation values are written in place (translations are
/// appended when missing), while every tier resolved for the morpheme or
/// gloss role is cleared and rebuilt from the tree's current lists,
/// re-establishing chains with correctly ordered previous-pointers.
/// Rebuilding rather than patching avoids accumulating stale nodes from
/// prior edits. Empty morpheme or gloss text is not re-emitted; the live
/// tree tolerates empty placeholders, output chains carry linguistic
/// content only.
#[derive(Debug)]
pub struct Serializer<'a> {
    tree: &'a AnnotationTree,
}

impl<'a> Serializer<'a> {
    /// Create a serializer over a tree.
    #[must_use]
    pub fn new(tree: &'a AnnotationTree) -> Self {
        Self { tree }
    }

    /// Produce the pretty-printed UTF-8 document.
    pub fn to_xml_string(&self) -> Result<String> {
        store_to_xml(&self.rebuild_store())
    }

    /// Produce the document and write it to a file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml)?;
        Ok(())
    }

    /// Apply the tree's state to a working copy of the store.
    fn rebuild_store(&self) -> AnnotationStore {
        let mut store = self.tree.store().clone();
        let resolver = self.tree.resolver();

        for utterance in self.tree.utterances() {
            if !utterance.id.is_empty() && !utterance.tier.is_empty() {
                store.set_value(&utterance.tier, &utterance.id, utterance.text.clone());
            }

            for translation in &utterance.translations {
                if translation.id.is_empty() || translation.text.is_empty() {
                    continue;
                }
                let tier = if translation.tier.is_empty() {
                    store
                        .tier_ids_for_role(resolver, TierRole::Translation, Some(utterance.tier.as_str()))
                        .into_iter()
                        .next()
                } else {
                    Some(translation.tier.clone())
                };
                match tier {
                    Some(tier) => {
                        if !store.set_value(&tier, &translation.id, translation.text.clone()) {
                            store.append_chained_annotation(
                                &tier,
                                &translation.id,
                                translation.text.clone(),
                                &utterance.id,
                                None,
                            );
                        }
                    }
                    None => log::warn!(
                        "translation {} has no resolvable tier; dropped from output",
                        translation.id
                    ),
                }
            }

            for word in &utterance.words {
                if !word.id.is_empty() && !word.tier.is_empty() {
                    store.set_value(&word.tier, &word.id, word.text.clone());
                }
            }
        }

        // Only a full-gloss tree carries morpheme/gloss data; rebuilding
        // from a words-only or part-of-speech tree would wipe tiers the
        // projection never read.
        if self.tree.style() == InterlinearStyle::FullGloss {
            for role in [TierRole::Morpheme, TierRole::Gloss] {
                for tier in store.tier_ids_for_role(resolver, role, None) {
                    store.remove_all_annotations_from_tier(&tier);
                }
            }
            for utterance in self.tree.utterances() {
                for word in &utterance.words {
                    if !word.id.is_empty() {
                        append_word_chains_to(&mut store, resolver, word);
                    }
                }
            }
        }

        store
    }
}

/// Emit a store as a pretty-printed EAF document.
pub(crate) fn store_to_xml(store: &AnnotationStore) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("ANNOTATION_DOCUMENT");
    for (key, value) in &store.document_attributes {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    let mut header = BytesStart::new("HEADER");
    for (key, value) in &store.header_attributes {
        header.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(header))?;
    write_property(
        &mut writer,
        "lastUsedAnnotationId",
        &store.last_used_annotation_id().to_string(),
    )?;
    for (name, value) in &store.header_properties {
        write_property(&mut writer, name, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("HEADER")))?;

    writer.write_event(Event::Start(BytesStart::new("TIME_ORDER")))?;
    for slot in store.time_order().slots() {
        let mut elem = BytesStart::new("TIME_SLOT");
        elem.push_attribute(("TIME_SLOT_ID", slot.id.as_str()));
        if let Some(value) = slot.value {
            elem.push_attribute(("TIME_VALUE", value.to_string().as_str()));
        }
        writer.write_event(Event::Empty(elem))?;
    }
    writer.write_event(Event::End(BytesEnd::new("TIME_ORDER")))?;

    for tier in store.tiers() {
        let mut elem = BytesStart::new("TIER");
        elem.push_attribute(("TIER_ID", tier.id.as_str()));
        elem.push_attribute(("LINGUISTIC_TYPE_REF", tier.linguistic_type.as_str()));
        if let Some(parent) = &tier.parent {
            elem.push_attribute(("PARENT_REF", parent.as_str()));
        }
        if let Some(locale) = &tier.default_locale {
            elem.push_attribute(("DEFAULT_LOCALE", locale.as_str()));
        }
        if let Some(participant) = &tier.participant {
            elem.push_attribute(("PARTICIPANT", participant.as_str()));
        }
        writer.write_event(Event::Start(elem))?;
        for id in tier.annotation_ids() {
            if let Some(annotation) = store.annotation(id) {
                write_annotation(&mut writer, annotation)?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new("TIER")))?;
    }

    for linguistic_type in store.linguistic_types() {
        let mut elem = BytesStart::new("LINGUISTIC_TYPE");
        elem.push_attribute(("LINGUISTIC_TYPE_ID", linguistic_type.id.as_str()));
        elem.push_attribute((
            "TIME_ALIGNABLE",
            if linguistic_type.time_alignable {
                "true"
            } else {
                "false"
            },
        ));
        if let Some(constraints) = &linguistic_type.constraints {
            elem.push_attribute(("CONSTRAINTS", constraints.as_str()));
        }
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesEnd::new("ANNOTATION_DOCUMENT")))?;

    // The writer only ever receives UTF-8.
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_property(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<()> {
    let mut elem = BytesStart::new("PROPERTY");
    elem.push_attribute(("NAME", name));
    writer.write_event(Event::Start(elem))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("PROPERTY")))?;
    Ok(())
}

fn write_annotation(writer: &mut Writer<Vec<u8>>, annotation: &Annotation) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("ANNOTATION")))?;
    let inner_name = match annotation {
        Annotation::Alignable(a) => {
            let mut elem = BytesStart::new("ALIGNABLE_ANNOTATION");
            elem.push_attribute(("ANNOTATION_ID", a.id.as_str()));
            elem.push_attribute(("TIME_SLOT_REF1", a.start.as_str()));
            elem.push_attribute(("TIME_SLOT_REF2", a.end.as_str()));
            writer.write_event(Event::Start(elem))?;
            "ALIGNABLE_ANNOTATION"
        }
        Annotation::Reference(r) => {
            let mut elem = BytesStart::new("REF_ANNOTATION");
            elem.push_attribute(("ANNOTATION_ID", r.id.as_str()));
            elem.push_attribute(("ANNOTATION_REF", r.parent.as_str()));
            if let Some(previous) = &r.previous {
                elem.push_attribute(("PREVIOUS_ANNOTATION", previous.as_str()));
            }
            writer.write_event(Event::Start(elem))?;
            "REF_ANNOTATION"
        }
    };
    writer.write_event(Event::Start(BytesStart::new("ANNOTATION_VALUE")))?;
    if !annotation.value().is_empty() {
        writer.write_event(Event::Text(BytesText::new(annotation.value())))?;
    }
    writer.write_event(Event::End(BytesEnd::new("ANNOTATION_VALUE")))?;
    writer.write_event(Event::End(BytesEnd::new(inner_name)))?;
    writer.write_event(Event::End(BytesEnd::new("ANNOTATION")))?;
    Ok(())
}
