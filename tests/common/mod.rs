//! Shared fixtures for integration tests.

#![allow(dead_code)]

use glossa::{AnnotationStore, AnnotationTree, InterlinearStyle, TierRoleResolver, TreeProjector};

/// One fully glossed utterance: "the dog runs", words chained a2→a3→a4,
/// "runs" broken into morphemes "run" / "-s" with glosses RUN / 3SG, and
/// one free translation.
pub const GLOSSED_EAF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT AUTHOR="" DATE="2011-03-01T14:00:00+01:00" FORMAT="2.7" VERSION="2.7">
    <HEADER MEDIA_FILE="" TIME_UNITS="milliseconds">
        <PROPERTY NAME="lastUsedAnnotationId">9</PROPERTY>
    </HEADER>
    <TIME_ORDER>
        <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>
        <TIME_SLOT TIME_SLOT_ID="ts2" TIME_VALUE="1500"/>
    </TIME_ORDER>
    <TIER TIER_ID="ut" LINGUISTIC_TYPE_REF="utterance" DEFAULT_LOCALE="en" PARTICIPANT="SP1">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a1" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE>the dog runs</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="wd" LINGUISTIC_TYPE_REF="words" PARENT_REF="ut">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a2" ANNOTATION_REF="a1">
                <ANNOTATION_VALUE>the</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a3" ANNOTATION_REF="a1" PREVIOUS_ANNOTATION="a2">
                <ANNOTATION_VALUE>dog</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a4" ANNOTATION_REF="a1" PREVIOUS_ANNOTATION="a3">
                <ANNOTATION_VALUE>runs</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="mo" LINGUISTIC_TYPE_REF="morphemes" PARENT_REF="wd">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a5" ANNOTATION_REF="a4">
                <ANNOTATION_VALUE>run</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a6" ANNOTATION_REF="a4" PREVIOUS_ANNOTATION="a5">
                <ANNOTATION_VALUE>-s</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="gl" LINGUISTIC_TYPE_REF="glosses" PARENT_REF="mo">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a7" ANNOTATION_REF="a5">
                <ANNOTATION_VALUE>RUN</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a8" ANNOTATION_REF="a6">
                <ANNOTATION_VALUE>3SG</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="tr" LINGUISTIC_TYPE_REF="translation" PARENT_REF="ut">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a9" ANNOTATION_REF="a1">
                <ANNOTATION_VALUE>The dog is running.</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <LINGUISTIC_TYPE LINGUISTIC_TYPE_ID="utterance" TIME_ALIGNABLE="true"/>
    <LINGUISTIC_TYPE LINGUISTIC_TYPE_ID="words" TIME_ALIGNABLE="false" CONSTRAINTS="Symbolic_Subdivision"/>
    <LINGUISTIC_TYPE LINGUISTIC_TYPE_ID="morphemes" TIME_ALIGNABLE="false" CONSTRAINTS="Symbolic_Subdivision"/>
    <LINGUISTIC_TYPE LINGUISTIC_TYPE_ID="glosses" TIME_ALIGNABLE="false" CONSTRAINTS="Symbolic_Association"/>
    <LINGUISTIC_TYPE LINGUISTIC_TYPE_ID="translation" TIME_ALIGNABLE="false" CONSTRAINTS="Symbolic_Association"/>
</ANNOTATION_DOCUMENT>
"#;

/// Two top-level alignable word tiers and no utterance tier.
pub const NO_UTTERANCE_EAF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT AUTHOR="" FORMAT="2.7" VERSION="2.7">
    <HEADER/>
    <TIME_ORDER>
        <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>
        <TIME_SLOT TIME_SLOT_ID="ts2" TIME_VALUE="400"/>
        <TIME_SLOT TIME_SLOT_ID="ts3" TIME_VALUE="800"/>
    </TIME_ORDER>
    <TIER TIER_ID="w1" LINGUISTIC_TYPE_REF="words" DEFAULT_LOCALE="de" PARTICIPANT="A">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a2" TIME_SLOT_REF1="ts2" TIME_SLOT_REF2="ts3">
                <ANNOTATION_VALUE>Welt</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a1" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE>hallo</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="w2" LINGUISTIC_TYPE_REF="words" PARTICIPANT="B">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a3" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts3">
                <ANNOTATION_VALUE>ciao</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <LINGUISTIC_TYPE LINGUISTIC_TYPE_ID="words" TIME_ALIGNABLE="true"/>
</ANNOTATION_DOCUMENT>
"#;

pub fn glossed_store() -> AnnotationStore {
    glossa::eaf::read_str(GLOSSED_EAF).expect("fixture parses")
}

pub fn glossed_tree(style: InterlinearStyle) -> AnnotationTree {
    TreeProjector::new(TierRoleResolver::default(), style).project(glossed_store())
}

/// Check every reference tier's chains: heads exist, no shared
/// successors, and every member is reachable from a head.
pub fn assert_chains_consistent(store: &AnnotationStore) {
    use std::collections::{HashMap, HashSet};

    for tier in store.tiers() {
        if store.is_tier_alignable(&tier.id) {
            continue;
        }
        let mut groups: HashMap<&str, Vec<&glossa::RefAnnotation>> = HashMap::new();
        for id in tier.annotation_ids() {
            let reference = store
                .annotation(id)
                .and_then(glossa::Annotation::as_reference)
                .expect("reference tier holds reference annotations");
            groups.entry(reference.parent.as_str()).or_default().push(reference);
        }
        for (parent, members) in groups {
            let heads: Vec<_> = members.iter().filter(|r| r.previous.is_none()).collect();
            assert!(
                !heads.is_empty(),
                "tier {} parent {parent}: chain has no head",
                tier.id
            );
            let mut seen_previous = HashSet::new();
            for member in &members {
                if let Some(previous) = &member.previous {
                    assert!(
                        seen_previous.insert(previous.as_str()),
                        "tier {} parent {parent}: {previous} has two successors",
                        tier.id
                    );
                }
            }
            let walked = store.chain_for(&tier.id, parent);
            assert_eq!(
                walked.len(),
                members.len(),
                "tier {} parent {parent}: chain walk does not cover all members",
                tier.id
            );
        }
    }
}
