//! EAF XML → [`AnnotationStore`].

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::store::{
    AlignableAnnotation, Annotation, AnnotationStore, LinguisticType, RefAnnotation, Tier,
};
use crate::time::TimeSlot;

/// Load an EAF document from a file.
pub fn read_path(path: impl AsRef<Path>) -> Result<AnnotationStore> {
    let xml = std::fs::read_to_string(path)?;
    read_str(&xml)
}

/// Load an EAF document from a string.
///
/// The header's `lastUsedAnnotationId` property seeds the id counter when
/// present; otherwise the counter is the maximum numeric suffix across
/// all annotation ids, which the store tracks as annotations are
/// inserted.
pub fn read_str(xml: &str) -> Result<AnnotationStore> {
    let mut reader = Reader::from_str(xml);
    let mut state = ParserState::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => state.start_element(&e, false)?,
            Event::Empty(e) => state.start_element(&e, true)?,
            Event::Text(t) => state.text(&t.unescape()?),
            Event::End(e) => state.end_element(e.name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
    }

    state.finish()
}

/// A partially parsed annotation, finalized when its element closes.
enum PendingAnnotation {
    Alignable {
        id: String,
        start: String,
        end: String,
    },
    Reference {
        id: String,
        parent: String,
        previous: Option<String>,
    },
}

#[derive(Default)]
struct ParserState {
    store: AnnotationStore,
    current_tier: Option<String>,
    pending: Option<PendingAnnotation>,
    value: String,
    in_value: bool,
    property_name: Option<String>,
    property_text: String,
    header_last_used: Option<u64>,
}

impl ParserState {
    fn start_element(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        match e.name().as_ref() {
            b"ANNOTATION_DOCUMENT" => {
                self.store.document_attributes = all_attributes(e)?;
            }
            b"HEADER" => {
                self.store.header_attributes = all_attributes(e)?;
            }
            b"PROPERTY" => {
                let name = attr(e, "NAME")?.unwrap_or_default();
                if empty {
                    self.record_property(name, String::new());
                } else {
                    self.property_name = Some(name);
                    self.property_text.clear();
                }
            }
            b"TIME_SLOT" => {
                let id = required_attr(e, "TIME_SLOT_ID", "TIME_SLOT")?;
                let value = match attr(e, "TIME_VALUE")? {
                    Some(v) => Some(v.parse::<u64>().map_err(|_| {
                        Error::malformed(format!("TIME_SLOT {id} has non-numeric TIME_VALUE {v}"))
                    })?),
                    None => None,
                };
                self.store.time_order_mut().push_slot(TimeSlot::new(id, value));
            }
            b"LINGUISTIC_TYPE" => {
                let id = required_attr(e, "LINGUISTIC_TYPE_ID", "LINGUISTIC_TYPE")?;
                self.store.add_linguistic_type(LinguisticType {
                    id,
                    time_alignable: attr(e, "TIME_ALIGNABLE")?.as_deref() == Some("true"),
                    constraints: attr(e, "CONSTRAINTS")?,
                });
            }
            b"TIER" => {
                let id = required_attr(e, "TIER_ID", "TIER")?;
                let linguistic_type =
                    attr(e, "LINGUISTIC_TYPE_REF")?.ok_or_else(|| {
                        Error::malformed(format!("TIER {id} missing LINGUISTIC_TYPE_REF"))
                    })?;
                let mut tier = Tier::new(&id, linguistic_type);
                tier.parent = attr(e, "PARENT_REF")?;
                tier.default_locale = attr(e, "DEFAULT_LOCALE")?;
                tier.participant = attr(e, "PARTICIPANT")?;
                self.store.add_tier(tier);
                if !empty {
                    self.current_tier = Some(id);
                }
            }
            b"ALIGNABLE_ANNOTATION" => {
                let id = required_attr(e, "ANNOTATION_ID", "ALIGNABLE_ANNOTATION")?;
                let start = required_attr(e, "TIME_SLOT_REF1", "ALIGNABLE_ANNOTATION")?;
                let end = required_attr(e, "TIME_SLOT_REF2", "ALIGNABLE_ANNOTATION")?;
                self.pending = Some(PendingAnnotation::Alignable { id, start, end });
                self.value.clear();
                if empty {
                    self.finish_annotation()?;
                }
            }
            b"REF_ANNOTATION" => {
                let id = required_attr(e, "ANNOTATION_ID", "REF_ANNOTATION")?;
                let parent = required_attr(e, "ANNOTATION_REF", "REF_ANNOTATION")?;
                self.pending = Some(PendingAnnotation::Reference {
                    id,
                    parent,
                    previous: attr(e, "PREVIOUS_ANNOTATION")?,
                });
                self.value.clear();
                if empty {
                    self.finish_annotation()?;
                }
            }
            b"ANNOTATION_VALUE" => {
                if !empty {
                    self.in_value = true;
                }
            }
            // ANNOTATION is a bare wrapper; MEDIA_DESCRIPTOR, LOCALE,
            // CONSTRAINT and the rest are outside the data model.
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.in_value {
            self.value.push_str(text);
        } else if self.property_name.is_some() {
            self.property_text.push_str(text);
        }
    }

    fn end_element(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"ANNOTATION_VALUE" => self.in_value = false,
            b"ALIGNABLE_ANNOTATION" | b"REF_ANNOTATION" => self.finish_annotation()?,
            b"TIER" => self.current_tier = None,
            b"PROPERTY" => {
                if let Some(name) = self.property_name.take() {
                    let text = std::mem::take(&mut self.property_text);
                    self.record_property(name, text);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn record_property(&mut self, name: String, text: String) {
        if name == "lastUsedAnnotationId" {
            self.header_last_used = text.trim().parse().ok();
        } else {
            self.store.header_properties.push((name, text));
        }
    }

    fn finish_annotation(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let tier = self
            .current_tier
            .clone()
            .ok_or_else(|| Error::malformed("annotation outside of a TIER"))?;
        let value = std::mem::take(&mut self.value);
        let annotation = match pending {
            PendingAnnotation::Alignable { id, start, end } => {
                Annotation::Alignable(AlignableAnnotation {
                    id,
                    tier,
                    start,
                    end,
                    value,
                })
            }
            PendingAnnotation::Reference {
                id,
                parent,
                previous,
            } => Annotation::Reference(RefAnnotation {
                id,
                tier,
                parent,
                previous,
                value,
            }),
        };
        self.store.push_annotation(annotation);
        Ok(())
    }

    fn finish(mut self) -> Result<AnnotationStore> {
        match self.header_last_used {
            Some(value) => self.store.set_last_used_annotation_id(value),
            None => log::debug!(
                "header lastUsedAnnotationId missing; using max id suffix {}",
                self.store.last_used_annotation_id()
            ),
        }
        Ok(self.store)
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == name.as_bytes() {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attr(e: &BytesStart<'_>, name: &str, context: &str) -> Result<String> {
    attr(e, name)?.ok_or_else(|| Error::malformed(format!("{context} missing {name}")))
}

fn all_attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attribute in e.attributes() {
        let attribute = attribute?;
        out.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            attribute.unescape_value()?.into_owned(),
        ));
    }
    Ok(out)
}
