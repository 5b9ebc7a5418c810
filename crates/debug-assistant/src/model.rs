use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A single troubleshooting case (e.g. "Micro:bit not detected over USB").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Stable identifier, unique across the whole corpus, e.g. "mb_001"
    pub id: String,
    /// Platform the case belongs to
    pub platform: Platform,
    /// Short case title
    pub title: String,
    /// Observed symptoms, in reporting order
    pub symptoms: Vec<String>,
    /// Likely causes, in order of likelihood
    pub causes: Vec<String>,
    /// Solution steps, each "ACTION HEADING: detail"
    pub solutions: Vec<String>,
    /// Optional pointers to further reading; a case without resources is kept
    pub resources: Option<Vec<String>>,
}

/// The kind of a platform-scoped guideline group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidelineKind {
    InitialSetup,
    AssemblyGuidelines,
    GeneralGuidelines,
}

impl GuidelineKind {
    /// Title fragment used in rendered document headers, e.g. "Initial Setup".
    pub fn title(&self) -> &'static str {
        match self {
            GuidelineKind::InitialSetup => "Initial Setup",
            GuidelineKind::AssemblyGuidelines => "Assembly Guidelines",
            GuidelineKind::GeneralGuidelines => "General Guidelines",
        }
    }

    /// Suffix for the fixed document id, e.g. "initial_setup" in "mb_initial_setup".
    pub fn id_suffix(&self) -> &'static str {
        match self {
            GuidelineKind::InitialSetup => "initial_setup",
            GuidelineKind::AssemblyGuidelines => "assembly_guidelines",
            GuidelineKind::GeneralGuidelines => "general_guidelines",
        }
    }
}

/// An ordered guideline list scoped to one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineGroup {
    pub kind: GuidelineKind,
    pub entries: Vec<String>,
}

/// All corpus content for one hardware platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSection {
    pub platform: Platform,
    /// Guideline groups present in the knowledge base, in fixed kind order
    pub guideline_groups: Vec<GuidelineGroup>,
    pub cases: Vec<CaseRecord>,
}

impl PlatformSection {
    /// Look up a guideline group by kind.
    pub fn group(&self, kind: GuidelineKind) -> Option<&GuidelineGroup> {
        self.guideline_groups.iter().find(|g| g.kind == kind)
    }
}

/// Escalation process steps, split by whether the issue was resolved live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketProcess {
    pub resolved_during_session: Option<Vec<String>>,
    pub not_resolved_during_session: Option<Vec<String>>,
}

/// One support-team contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub specialization: String,
    pub email: String,
}

/// Support-team directory, grouped by working timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTeam {
    pub us_timezone: Option<Vec<TeamMember>>,
    pub uk_timezone: Option<Vec<TeamMember>>,
}

/// The full typed knowledge base, parsed eagerly at load time. Immutable once
/// loaded; replaced wholesale when the index is rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub general_guidelines: Vec<String>,
    /// Platform sections in fixed order: microbit, moonrover, arduino, pico
    pub sections: Vec<PlatformSection>,
    pub ticket_process: Option<TicketProcess>,
    pub support_team: Option<SupportTeam>,
}

impl Corpus {
    /// Look up the section for a platform, if the knowledge base has one.
    pub fn section(&self, platform: Platform) -> Option<&PlatformSection> {
        self.sections.iter().find(|s| s.platform == platform)
    }
}

/// One retrievable unit: rendered text plus a stable id and platform tag.
/// Created at index-build time; the only way to change the document set is
/// rebuilding the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub platform: Platform,
    pub text: String,
}

/// A similarity-search hit. Rank is implicit in result order; `score` is the
/// inverted distance reported by the vector store (higher = more similar).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub platform: String,
    pub text: String,
    pub score: f32,
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}
