/// Knowledge-base loader for the debug-assistant.
///
/// The knowledge base is a single JSON file: a required `general_guidelines`
/// list, optional per-platform sections (guideline lists plus a `cases` list),
/// and optional `ticket_process` / `support_team` sections. It is parsed
/// eagerly into the typed model, validated, and rendered into the flat
/// document list the vector index is built from.
///
/// Rendering is a format contract: the exact header lines, joins, and the
/// optional `Resources:` line are what the prompt context downstream is made
/// of, so they must stay stable across rebuilds.
use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::model::{
    CaseRecord, Corpus, Document, GuidelineGroup, GuidelineKind, PlatformSection, SupportTeam,
    TeamMember, TicketProcess,
};
use crate::platform::Platform;

pub const GENERAL_GUIDELINES_ID: &str = "general_guidelines";
pub const TICKET_PROCESS_ID: &str = "ticket_process";
pub const SUPPORT_TEAM_ID: &str = "support_team";

// --- Raw JSON shape ---

#[derive(Deserialize)]
struct RawKnowledgeBase {
    general_guidelines: Vec<String>,
    microbit: Option<RawPlatformSection>,
    moonrover: Option<RawPlatformSection>,
    arduino: Option<RawPlatformSection>,
    raspberry_pi_pico: Option<RawPlatformSection>,
    ticket_process: Option<RawTicketProcess>,
    support_team: Option<RawSupportTeam>,
}

#[derive(Deserialize)]
struct RawPlatformSection {
    initial_setup: Option<Vec<String>>,
    assembly_guidelines: Option<Vec<String>>,
    general_guidelines: Option<Vec<String>>,
    cases: Vec<RawCase>,
}

#[derive(Deserialize)]
struct RawCase {
    id: String,
    title: String,
    symptoms: Vec<String>,
    causes: Vec<String>,
    solutions: Vec<String>,
    resources: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawTicketProcess {
    case_1_resolved_during_session: Option<Vec<String>>,
    case_2_not_resolved_during_session: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawSupportTeam {
    us_timezone: Option<Vec<RawTeamMember>>,
    uk_timezone: Option<Vec<RawTeamMember>>,
}

#[derive(Deserialize)]
struct RawTeamMember {
    name: String,
    specialization: String,
    email: String,
}

// --- Loading ---

/// Read and parse the knowledge-base file. Fatal at startup: a knowledge base
/// that cannot be loaded means the process cannot serve queries.
pub fn load_corpus(path: &Path) -> Result<Corpus, AppError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_corpus(&json)
}

/// Parse knowledge-base JSON into the typed, validated corpus.
pub fn parse_corpus(json: &str) -> Result<Corpus, AppError> {
    let raw: RawKnowledgeBase = serde_json::from_str(json).map_err(|e| AppError::CorpusFormat {
        section: "root".to_string(),
        message: e.to_string(),
    })?;

    let mut sections = Vec::new();
    let platform_sections = [
        (Platform::Microbit, raw.microbit),
        (Platform::Moonrover, raw.moonrover),
        (Platform::Arduino, raw.arduino),
        (Platform::RaspberryPiPico, raw.raspberry_pi_pico),
    ];
    for (platform, raw_section) in platform_sections {
        if let Some(raw_section) = raw_section {
            sections.push(convert_section(platform, raw_section));
        }
    }

    let corpus = Corpus {
        general_guidelines: raw.general_guidelines,
        sections,
        ticket_process: raw.ticket_process.map(|tp| TicketProcess {
            resolved_during_session: tp.case_1_resolved_during_session,
            not_resolved_during_session: tp.case_2_not_resolved_during_session,
        }),
        support_team: raw.support_team.map(|team| SupportTeam {
            us_timezone: team.us_timezone.map(convert_members),
            uk_timezone: team.uk_timezone.map(convert_members),
        }),
    };

    validate(&corpus)?;
    Ok(corpus)
}

fn convert_section(platform: Platform, raw: RawPlatformSection) -> PlatformSection {
    let mut guideline_groups = Vec::new();
    let kinds = [
        (GuidelineKind::InitialSetup, raw.initial_setup),
        (GuidelineKind::AssemblyGuidelines, raw.assembly_guidelines),
        (GuidelineKind::GeneralGuidelines, raw.general_guidelines),
    ];
    for (kind, entries) in kinds {
        if let Some(entries) = entries {
            guideline_groups.push(GuidelineGroup { kind, entries });
        }
    }

    let cases = raw
        .cases
        .into_iter()
        .map(|c| CaseRecord {
            id: c.id,
            platform,
            title: c.title,
            symptoms: c.symptoms,
            causes: c.causes,
            solutions: c.solutions,
            resources: c.resources,
        })
        .collect();

    PlatformSection {
        platform,
        guideline_groups,
        cases,
    }
}

fn convert_members(raw: Vec<RawTeamMember>) -> Vec<TeamMember> {
    raw.into_iter()
        .map(|m| TeamMember {
            name: m.name,
            specialization: m.specialization,
            email: m.email,
        })
        .collect()
}

/// Check the invariant the index relies on: every document this corpus will
/// produce has a non-empty id, unique across the whole build (case ids must
/// not collide with each other or with the fixed guideline/auxiliary ids).
fn validate(corpus: &Corpus) -> Result<(), AppError> {
    // Seed with every fixed id this corpus will produce, so case ids are
    // checked against all of them regardless of section order.
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(GENERAL_GUIDELINES_ID.to_string());
    for section in &corpus.sections {
        for group in &section.guideline_groups {
            seen.insert(group_doc_id(section.platform, group.kind));
        }
    }
    if corpus.ticket_process.is_some() {
        seen.insert(TICKET_PROCESS_ID.to_string());
    }
    if corpus.support_team.is_some() {
        seen.insert(SUPPORT_TEAM_ID.to_string());
    }

    for section in &corpus.sections {
        let label = section.platform.label();
        for case in &section.cases {
            if case.id.trim().is_empty() {
                return Err(AppError::CorpusFormat {
                    section: label.to_string(),
                    message: format!("case \"{}\" has an empty id", case.title),
                });
            }
            if !seen.insert(case.id.clone()) {
                return Err(AppError::CorpusFormat {
                    section: label.to_string(),
                    message: format!("duplicate document id: {}", case.id),
                });
            }
        }
    }

    Ok(())
}

// --- Document rendering ---

/// Render the corpus into the flat ordered document list the index is built
/// from: general guidelines first, then each platform section (guideline
/// groups, then cases), then the ticket process and support team.
pub fn render_documents(corpus: &Corpus) -> Vec<Document> {
    let mut docs = Vec::new();

    docs.push(render_general_guidelines(&corpus.general_guidelines));

    for section in &corpus.sections {
        for group in &section.guideline_groups {
            docs.push(render_guideline_group(section.platform, group));
        }
        for case in &section.cases {
            docs.push(render_case(case));
        }
    }

    if let Some(ticket_process) = &corpus.ticket_process {
        docs.push(render_ticket_process(ticket_process));
    }
    if let Some(support_team) = &corpus.support_team {
        docs.push(render_support_team(support_team));
    }

    docs
}

fn render_general_guidelines(guidelines: &[String]) -> Document {
    Document {
        id: GENERAL_GUIDELINES_ID.to_string(),
        platform: Platform::General,
        text: format!("General Debugging Guidelines:\n{}", guidelines.join("\n")),
    }
}

fn render_guideline_group(platform: Platform, group: &GuidelineGroup) -> Document {
    Document {
        id: group_doc_id(platform, group.kind),
        platform,
        text: format!(
            "{} {}:\n{}",
            platform.guideline_header_title(),
            group.kind.title(),
            group.entries.join("\n")
        ),
    }
}

fn group_doc_id(platform: Platform, kind: GuidelineKind) -> String {
    format!("{}_{}", platform.doc_id_prefix(), kind.id_suffix())
}

fn render_case(case: &CaseRecord) -> Document {
    let mut text = format!(
        "Platform: {}\nTitle: {}\nSymptoms: {}\nCauses: {}\nSolutions: {}",
        case.platform.case_display_name(),
        case.title,
        case.symptoms.join(", "),
        case.causes.join(", "),
        case.solutions.join(", ")
    );
    if let Some(resources) = &case.resources {
        if !resources.is_empty() {
            text.push_str(&format!("\nResources: {}", resources.join(", ")));
        }
    }

    Document {
        id: case.id.clone(),
        platform: case.platform,
        text,
    }
}

fn render_ticket_process(ticket_process: &TicketProcess) -> Document {
    let mut text = String::from("Ticket Process:\n");
    if let Some(steps) = &ticket_process.resolved_during_session {
        text.push_str(&format!(
            "\nCase 1 - Resolved During Session:\n{}",
            steps.join("\n")
        ));
    }
    if let Some(steps) = &ticket_process.not_resolved_during_session {
        text.push_str(&format!(
            "\n\nCase 2 - Not Resolved During Session:\n{}",
            steps.join("\n")
        ));
    }

    Document {
        id: TICKET_PROCESS_ID.to_string(),
        platform: Platform::General,
        text,
    }
}

fn render_support_team(team: &SupportTeam) -> Document {
    let mut text = String::from("Support Team Contacts:\n");
    if let Some(members) = &team.us_timezone {
        text.push_str("\nUS Time Zone Team:\n");
        for member in members {
            text.push_str(&format!(
                "- {} ({}): {}\n",
                member.name, member.specialization, member.email
            ));
        }
    }
    if let Some(members) = &team.uk_timezone {
        text.push_str("\nUK Time Zone Team:\n");
        for member in members {
            text.push_str(&format!(
                "- {} ({}): {}\n",
                member.name, member.specialization, member.email
            ));
        }
    }

    Document {
        id: SUPPORT_TEAM_ID.to_string(),
        platform: Platform::General,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arduino_case(resources: Option<Vec<String>>) -> CaseRecord {
        CaseRecord {
            id: "ard_001".to_string(),
            platform: Platform::Arduino,
            title: "No power".to_string(),
            symptoms: vec!["no LED".to_string()],
            causes: vec!["dead battery".to_string()],
            solutions: vec!["REPLACE BATTERY: swap cells".to_string()],
            resources,
        }
    }

    #[test]
    fn test_render_case_with_resources() {
        let case = arduino_case(Some(vec!["wiki/power".to_string()]));
        let doc = render_case(&case);
        assert_eq!(doc.id, "ard_001");
        assert_eq!(doc.platform, Platform::Arduino);
        assert_eq!(
            doc.text,
            "Platform: Arduino Uno\nTitle: No power\nSymptoms: no LED\nCauses: dead battery\nSolutions: REPLACE BATTERY: swap cells\nResources: wiki/power"
        );
    }

    #[test]
    fn test_render_case_without_resources() {
        let doc = render_case(&arduino_case(None));
        assert!(!doc.text.contains("Resources:"));

        // An empty list also omits the line
        let doc = render_case(&arduino_case(Some(vec![])));
        assert!(!doc.text.contains("Resources:"));
    }

    #[test]
    fn test_render_case_joins_multiple_entries_with_commas() {
        let mut case = arduino_case(None);
        case.symptoms = vec!["no LED".to_string(), "no serial output".to_string()];
        let doc = render_case(&case);
        assert!(doc.text.contains("Symptoms: no LED, no serial output"));
    }

    #[test]
    fn test_render_general_guidelines() {
        let doc = render_general_guidelines(&[
            "Check cables first".to_string(),
            "Note the error message".to_string(),
        ]);
        assert_eq!(doc.id, "general_guidelines");
        assert_eq!(doc.platform, Platform::General);
        assert_eq!(
            doc.text,
            "General Debugging Guidelines:\nCheck cables first\nNote the error message"
        );
    }

    #[test]
    fn test_render_guideline_group_headers_and_ids() {
        let group = |kind| GuidelineGroup {
            kind,
            entries: vec!["step one".to_string()],
        };

        let doc = render_guideline_group(Platform::Microbit, &group(GuidelineKind::InitialSetup));
        assert_eq!(doc.id, "mb_initial_setup");
        assert_eq!(doc.text, "Micro:bit Initial Setup:\nstep one");

        let doc =
            render_guideline_group(Platform::Moonrover, &group(GuidelineKind::AssemblyGuidelines));
        assert_eq!(doc.id, "mr_assembly_guidelines");
        assert_eq!(doc.text, "Moonrover Assembly Guidelines:\nstep one");

        let doc =
            render_guideline_group(Platform::Arduino, &group(GuidelineKind::GeneralGuidelines));
        assert_eq!(doc.id, "ard_general_guidelines");
        assert_eq!(doc.text, "Arduino General Guidelines:\nstep one");

        let doc = render_guideline_group(
            Platform::RaspberryPiPico,
            &group(GuidelineKind::GeneralGuidelines),
        );
        assert_eq!(doc.id, "pico_general_guidelines");
        assert_eq!(doc.text, "Raspberry Pi Pico General Guidelines:\nstep one");
    }

    #[test]
    fn test_render_ticket_process() {
        let ticket_process = TicketProcess {
            resolved_during_session: Some(vec!["Close the ticket".to_string()]),
            not_resolved_during_session: Some(vec!["Escalate to the team".to_string()]),
        };
        let doc = render_ticket_process(&ticket_process);
        assert_eq!(doc.id, "ticket_process");
        assert_eq!(
            doc.text,
            "Ticket Process:\n\nCase 1 - Resolved During Session:\nClose the ticket\n\nCase 2 - Not Resolved During Session:\nEscalate to the team"
        );
    }

    #[test]
    fn test_render_support_team() {
        let team = SupportTeam {
            us_timezone: Some(vec![TeamMember {
                name: "Dana".to_string(),
                specialization: "Arduino".to_string(),
                email: "dana@example.org".to_string(),
            }]),
            uk_timezone: None,
        };
        let doc = render_support_team(&team);
        assert_eq!(doc.id, "support_team");
        assert_eq!(
            doc.text,
            "Support Team Contacts:\n\nUS Time Zone Team:\n- Dana (Arduino): dana@example.org\n"
        );
    }

    #[test]
    fn test_parse_minimal_corpus() {
        let corpus = parse_corpus(r#"{"general_guidelines": ["Check cables first"]}"#).unwrap();
        assert_eq!(corpus.general_guidelines.len(), 1);
        assert!(corpus.sections.is_empty());
        assert!(corpus.ticket_process.is_none());

        let docs = render_documents(&corpus);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "general_guidelines");
    }

    #[test]
    fn test_parse_full_corpus_orders_documents() {
        let json = r#"{
            "general_guidelines": ["Check cables first"],
            "raspberry_pi_pico": {
                "general_guidelines": ["Hold BOOTSEL while plugging in"],
                "cases": [{
                    "id": "pico_001",
                    "title": "Drive not appearing",
                    "symptoms": ["no RPI-RP2 drive"],
                    "causes": ["BOOTSEL not held"],
                    "solutions": ["HOLD BOOTSEL: keep it pressed while connecting USB"]
                }]
            },
            "microbit": {
                "initial_setup": ["Use a data USB cable"],
                "cases": [{
                    "id": "mb_001",
                    "title": "Not detected",
                    "symptoms": ["no MICROBIT drive"],
                    "causes": ["charge-only cable"],
                    "solutions": ["SWAP CABLE: use a known data cable"],
                    "resources": ["microbit.org/get-started"]
                }]
            },
            "ticket_process": {
                "case_1_resolved_during_session": ["Mark resolved"]
            },
            "support_team": {
                "uk_timezone": [{"name": "Priya", "specialization": "micro:bit", "email": "priya@example.org"}]
            }
        }"#;

        let corpus = parse_corpus(json).unwrap();
        // Sections stay in fixed platform order regardless of JSON key order
        assert_eq!(corpus.sections.len(), 2);
        assert_eq!(corpus.sections[0].platform, Platform::Microbit);
        assert_eq!(corpus.sections[1].platform, Platform::RaspberryPiPico);

        let docs = render_documents(&corpus);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "general_guidelines",
                "mb_initial_setup",
                "mb_001",
                "pico_general_guidelines",
                "pico_001",
                "ticket_process",
                "support_team",
            ]
        );

        // Every document carries a non-empty id
        assert!(docs.iter().all(|d| !d.id.is_empty()));
    }

    #[test]
    fn test_parse_rejects_missing_required_case_field() {
        // "causes" missing
        let json = r#"{
            "general_guidelines": [],
            "arduino": {
                "cases": [{
                    "id": "ard_001",
                    "title": "No power",
                    "symptoms": ["no LED"],
                    "solutions": ["REPLACE BATTERY: swap cells"]
                }]
            }
        }"#;
        let err = parse_corpus(json).unwrap_err();
        assert!(matches!(err, AppError::CorpusFormat { .. }), "got: {err}");
    }

    #[test]
    fn test_parse_rejects_duplicate_case_ids() {
        let json = r#"{
            "general_guidelines": [],
            "arduino": {
                "cases": [
                    {"id": "ard_001", "title": "A", "symptoms": [], "causes": [], "solutions": []},
                    {"id": "ard_001", "title": "B", "symptoms": [], "causes": [], "solutions": []}
                ]
            }
        }"#;
        let err = parse_corpus(json).unwrap_err();
        match err {
            AppError::CorpusFormat { section, message } => {
                assert_eq!(section, "arduino");
                assert!(message.contains("ard_001"));
            }
            other => panic!("expected CorpusFormat, got: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_case_id_shadowing_fixed_id() {
        let json = r#"{
            "general_guidelines": [],
            "microbit": {
                "initial_setup": ["Use a data USB cable"],
                "cases": [
                    {"id": "mb_initial_setup", "title": "A", "symptoms": [], "causes": [], "solutions": []}
                ]
            }
        }"#;
        let err = parse_corpus(json).unwrap_err();
        assert!(matches!(err, AppError::CorpusFormat { .. }), "got: {err}");
    }

    #[test]
    fn test_parse_rejects_empty_case_id() {
        let json = r#"{
            "general_guidelines": [],
            "arduino": {
                "cases": [{"id": "  ", "title": "A", "symptoms": [], "causes": [], "solutions": []}]
            }
        }"#;
        let err = parse_corpus(json).unwrap_err();
        match err {
            AppError::CorpusFormat { section, .. } => assert_eq!(section, "arduino"),
            other => panic!("expected CorpusFormat, got: {other}"),
        }
    }

    /// Integration test: parse the shipped knowledge base and verify structure.
    #[test]
    fn test_load_shipped_knowledge_base() {
        let path = std::path::Path::new("../../data/debug_cases.json");
        if !path.exists() {
            eprintln!(
                "skipping test_load_shipped_knowledge_base: {} not found",
                path.display()
            );
            return;
        }

        let corpus = load_corpus(path).expect("shipped knowledge base should parse");
        assert!(!corpus.general_guidelines.is_empty());
        assert_eq!(corpus.sections.len(), 4);

        let docs = render_documents(&corpus);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert!(ids.contains(&"general_guidelines"));
        assert!(ids.contains(&"mb_initial_setup"));
        assert!(ids.contains(&"mr_assembly_guidelines"));
        assert!(ids.contains(&"ard_general_guidelines"));
        assert!(ids.contains(&"pico_general_guidelines"));
        assert!(ids.contains(&"ticket_process"));
        assert!(ids.contains(&"support_team"));

        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len(), "document ids must be unique");

        eprintln!("rendered {} documents from the shipped knowledge base", docs.len());
    }
}
