//! The closed registry of composite metadata kinds and their section tables.

use serde::{Deserialize, Serialize};

use crate::policy::SectionPolicy;

/// One row of a kind's section table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionSpec {
    pub name: &'static str,
    pub policy: SectionPolicy,
    /// Manifest type of a single entry of this section, when entries are
    /// individually deployable (e.g. `labels` -> `CustomLabel`).
    pub child_type: Option<&'static str>,
}

const fn keyed(name: &'static str, field: &'static str) -> SectionSpec {
    SectionSpec {
        name,
        policy: SectionPolicy::Field(field),
        child_type: None,
    }
}

const fn child(name: &'static str, child_type: &'static str) -> SectionSpec {
    SectionSpec {
        name,
        policy: SectionPolicy::Field("fullName"),
        child_type: Some(child_type),
    }
}

const fn hierarchical(name: &'static str, field: &'static str) -> SectionSpec {
    SectionSpec {
        name,
        policy: SectionPolicy::Hierarchical(field),
        child_type: None,
    }
}

const fn singleton(name: &'static str) -> SectionSpec {
    SectionSpec {
        name,
        policy: SectionPolicy::Constant,
        child_type: None,
    }
}

const fn composite(name: &'static str, primary: &'static str, secondary: &'static str) -> SectionSpec {
    SectionSpec {
        name,
        policy: SectionPolicy::Composite { primary, secondary },
        child_type: None,
    }
}

const CUSTOM_LABELS: &[SectionSpec] = &[child("labels", "CustomLabel")];

const PROFILE: &[SectionSpec] = &[
    keyed("applicationVisibilities", "application"),
    keyed("categoryGroupVisibilities", "dataCategoryGroup"),
    keyed("classAccesses", "apexClass"),
    singleton("custom"),
    keyed("customMetadataTypeAccesses", "name"),
    keyed("customPermissions", "name"),
    keyed("customSettingAccesses", "name"),
    singleton("description"),
    keyed("externalDataSourceAccesses", "externalDataSource"),
    hierarchical("fieldPermissions", "field"),
    keyed("flowAccesses", "flow"),
    singleton("fullName"),
    composite("layoutAssignments", "layout", "recordType"),
    singleton("loginHours"),
    SectionSpec {
        name: "loginIpRanges",
        policy: SectionPolicy::Range {
            start: "startAddress",
            end: "endAddress",
        },
        child_type: None,
    },
    keyed("objectPermissions", "object"),
    keyed("pageAccesses", "apexPage"),
    hierarchical("recordTypeVisibilities", "recordType"),
    keyed("tabVisibilities", "tab"),
    singleton("userLicense"),
    keyed("userPermissions", "name"),
];

const PERMISSION_SET: &[SectionSpec] = &[
    keyed("applicationVisibilities", "application"),
    keyed("classAccesses", "apexClass"),
    keyed("customMetadataTypeAccesses", "name"),
    keyed("customPermissions", "name"),
    keyed("customSettingAccesses", "name"),
    singleton("description"),
    keyed("externalDataSourceAccesses", "externalDataSource"),
    hierarchical("fieldPermissions", "field"),
    keyed("flowAccesses", "flow"),
    singleton("hasActivationRequired"),
    singleton("label"),
    singleton("license"),
    keyed("objectPermissions", "object"),
    keyed("pageAccesses", "apexPage"),
    hierarchical("recordTypeVisibilities", "recordType"),
    keyed("tabSettings", "tab"),
    singleton("userLicense"),
    keyed("userPermissions", "name"),
];

const CUSTOM_OBJECT: &[SectionSpec] = &[
    composite("actionOverrides", "actionName", "formFactor"),
    singleton("allowInChatterGroups"),
    child("businessProcesses", "BusinessProcess"),
    singleton("compactLayoutAssignment"),
    child("compactLayouts", "CompactLayout"),
    singleton("deploymentStatus"),
    singleton("description"),
    singleton("enableActivities"),
    singleton("enableBulkApi"),
    singleton("enableFeeds"),
    singleton("enableHistory"),
    singleton("enableReports"),
    singleton("enableSearch"),
    singleton("enableSharing"),
    singleton("enableStreamingApi"),
    singleton("externalSharingModel"),
    child("fieldSets", "FieldSet"),
    child("fields", "CustomField"),
    child("indexes", "Index"),
    singleton("label"),
    child("listViews", "ListView"),
    singleton("nameField"),
    singleton("pluralLabel"),
    child("recordTypes", "RecordType"),
    singleton("searchLayouts"),
    singleton("sharingModel"),
    child("sharingReasons", "SharingReason"),
    child("validationRules", "ValidationRule"),
    singleton("visibility"),
    child("webLinks", "WebLink"),
];

const WORKFLOW: &[SectionSpec] = &[
    child("alerts", "WorkflowAlert"),
    child("fieldUpdates", "WorkflowFieldUpdate"),
    child("flowActions", "WorkflowFlowAction"),
    child("knowledgePublishes", "WorkflowKnowledgePublish"),
    child("outboundMessages", "WorkflowOutboundMessage"),
    child("rules", "WorkflowRule"),
    child("send", "WorkflowSend"),
    child("tasks", "WorkflowTask"),
];

const SHARING_RULES: &[SectionSpec] = &[
    child("sharingCriteriaRules", "SharingCriteriaRule"),
    child("sharingGuestRules", "SharingGuestRule"),
    child("sharingOwnerRules", "SharingOwnerRule"),
    child("sharingTerritoryRules", "SharingTerritoryRule"),
];

const ASSIGNMENT_RULES: &[SectionSpec] = &[child("assignmentRule", "AssignmentRule")];
const AUTO_RESPONSE_RULES: &[SectionSpec] = &[child("autoResponseRule", "AutoResponseRule")];
const ESCALATION_RULES: &[SectionSpec] = &[child("escalationRule", "EscalationRule")];
const MATCHING_RULES: &[SectionSpec] = &[child("matchingRules", "MatchingRule")];

/// A composite metadata kind, identified by its document root tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataKind {
    CustomLabels,
    Profile,
    PermissionSet,
    CustomObject,
    Workflow,
    SharingRules,
    AssignmentRules,
    AutoResponseRules,
    EscalationRules,
    MatchingRules,
    /// Any other root tag: every section falls back to the body policy.
    Generic,
}

impl MetadataKind {
    /// All kinds with a dedicated section table.
    pub const KNOWN: &'static [MetadataKind] = &[
        MetadataKind::CustomLabels,
        MetadataKind::Profile,
        MetadataKind::PermissionSet,
        MetadataKind::CustomObject,
        MetadataKind::Workflow,
        MetadataKind::SharingRules,
        MetadataKind::AssignmentRules,
        MetadataKind::AutoResponseRules,
        MetadataKind::EscalationRules,
        MetadataKind::MatchingRules,
    ];

    /// Resolve a kind from a document root tag.
    pub fn from_root_tag(tag: &str) -> Self {
        Self::KNOWN
            .iter()
            .copied()
            .find(|kind| kind.root_tag() == Some(tag))
            .unwrap_or(MetadataKind::Generic)
    }

    /// The root tag of this kind, `None` for [`MetadataKind::Generic`].
    pub fn root_tag(&self) -> Option<&'static str> {
        match self {
            MetadataKind::CustomLabels => Some("CustomLabels"),
            MetadataKind::Profile => Some("Profile"),
            MetadataKind::PermissionSet => Some("PermissionSet"),
            MetadataKind::CustomObject => Some("CustomObject"),
            MetadataKind::Workflow => Some("Workflow"),
            MetadataKind::SharingRules => Some("SharingRules"),
            MetadataKind::AssignmentRules => Some("AssignmentRules"),
            MetadataKind::AutoResponseRules => Some("AutoResponseRules"),
            MetadataKind::EscalationRules => Some("EscalationRules"),
            MetadataKind::MatchingRules => Some("MatchingRules"),
            MetadataKind::Generic => None,
        }
    }

    /// The section table of this kind.
    pub fn sections(&self) -> &'static [SectionSpec] {
        match self {
            MetadataKind::CustomLabels => CUSTOM_LABELS,
            MetadataKind::Profile => PROFILE,
            MetadataKind::PermissionSet => PERMISSION_SET,
            MetadataKind::CustomObject => CUSTOM_OBJECT,
            MetadataKind::Workflow => WORKFLOW,
            MetadataKind::SharingRules => SHARING_RULES,
            MetadataKind::AssignmentRules => ASSIGNMENT_RULES,
            MetadataKind::AutoResponseRules => AUTO_RESPONSE_RULES,
            MetadataKind::EscalationRules => ESCALATION_RULES,
            MetadataKind::MatchingRules => MATCHING_RULES,
            MetadataKind::Generic => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn root_tags_round_trip() {
        for kind in MetadataKind::KNOWN {
            let tag = kind.root_tag().unwrap();
            assert_eq!(MetadataKind::from_root_tag(tag), *kind);
        }
        assert_eq!(MetadataKind::from_root_tag("ApexClass"), MetadataKind::Generic);
    }

    #[test]
    fn section_tables_have_unique_names() {
        for kind in MetadataKind::KNOWN {
            let names: HashSet<&str> = kind.sections().iter().map(|s| s.name).collect();
            assert_eq!(names.len(), kind.sections().len(), "duplicate section in {kind:?}");
        }
    }

    #[test]
    fn section_tables_are_alphabetical() {
        for kind in MetadataKind::KNOWN {
            let names: Vec<&str> = kind.sections().iter().map(|s| s.name).collect();
            let mut sorted = names.clone();
            sorted.sort_unstable();
            assert_eq!(names, sorted, "{kind:?} table out of order");
        }
    }

    #[test]
    fn generic_has_no_section_table() {
        assert!(MetadataKind::Generic.sections().is_empty());
        assert!(MetadataKind::Generic.root_tag().is_none());
    }
}
