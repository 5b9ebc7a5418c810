/// Guideline composition for answers and session greetings.
///
/// Every answer is prefixed with the general guidelines plus at most one
/// platform-specific block. Which guideline group a platform contributes is
/// fixed: micro:bit shows its initial setup, the moonrover its assembly
/// guidelines, arduino and pico their general guidelines.
use crate::model::{Corpus, GuidelineKind};
use crate::platform::Platform;

/// The guideline group a platform contributes to answers, with the header it
/// is rendered under.
fn platform_block(platform: Platform) -> Option<(GuidelineKind, &'static str)> {
    match platform {
        Platform::General => None,
        Platform::Microbit => Some((GuidelineKind::InitialSetup, "Micro:bit Initial Setup")),
        Platform::Moonrover => Some((
            GuidelineKind::AssemblyGuidelines,
            "Moonrover Assembly Guidelines",
        )),
        Platform::Arduino => Some((GuidelineKind::GeneralGuidelines, "Arduino Guidelines")),
        Platform::RaspberryPiPico => Some((
            GuidelineKind::GeneralGuidelines,
            "Raspberry Pi Pico Guidelines",
        )),
    }
}

/// Render the guideline text prepended to an answer: the general guidelines
/// block, then the platform's block when the corpus has one. Returns an empty
/// string when nothing applies. Pure; reads only the loaded corpus.
pub fn compose(corpus: &Corpus, platform: Platform) -> String {
    let mut text = String::new();

    if !corpus.general_guidelines.is_empty() {
        text.push_str("## 📋 General Guidelines:\n\n");
        for guideline in &corpus.general_guidelines {
            text.push_str(&format!("- {guideline}\n"));
        }
        text.push('\n');
    }

    if let Some((kind, header)) = platform_block(platform) {
        let entries = corpus
            .section(platform)
            .and_then(|section| section.group(kind))
            .map(|group| group.entries.as_slice())
            .unwrap_or(&[]);
        if !entries.is_empty() {
            text.push_str(&format!("## 🔧 {header}:\n\n"));
            for entry in entries {
                text.push_str(&format!("- {entry}\n"));
            }
            text.push('\n');
        }
    }

    text
}

/// The greeting shown once per new session, before any question is asked.
pub fn initial_guidelines(corpus: &Corpus) -> String {
    let mut text = String::from("## 📋 **General Debugging Guidelines**\n\n");
    text.push_str("*Please read these guidelines before asking questions:*\n\n");

    for (i, guideline) in corpus.general_guidelines.iter().enumerate() {
        text.push_str(&format!("{}. {guideline}\n\n", i + 1));
    }

    text.push_str("---\n\n**Now, please describe your hardware issue below! 👇**");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuidelineGroup, PlatformSection};

    fn corpus_with(platform: Platform, kind: GuidelineKind, entries: Vec<&str>) -> Corpus {
        Corpus {
            general_guidelines: vec!["Check cables first".to_string()],
            sections: vec![PlatformSection {
                platform,
                guideline_groups: vec![GuidelineGroup {
                    kind,
                    entries: entries.into_iter().map(String::from).collect(),
                }],
                cases: vec![],
            }],
            ticket_process: None,
            support_team: None,
        }
    }

    #[test]
    fn test_compose_general_only() {
        let corpus = corpus_with(
            Platform::Microbit,
            GuidelineKind::InitialSetup,
            vec!["Use a data USB cable"],
        );
        let text = compose(&corpus, Platform::General);
        assert_eq!(text, "## 📋 General Guidelines:\n\n- Check cables first\n\n");
    }

    #[test]
    fn test_compose_appends_platform_block() {
        let corpus = corpus_with(
            Platform::Microbit,
            GuidelineKind::InitialSetup,
            vec!["Use a data USB cable"],
        );
        let text = compose(&corpus, Platform::Microbit);
        assert_eq!(
            text,
            "## 📋 General Guidelines:\n\n- Check cables first\n\n## 🔧 Micro:bit Initial Setup:\n\n- Use a data USB cable\n\n"
        );
    }

    #[test]
    fn test_compose_platform_headers() {
        let corpus = corpus_with(
            Platform::Moonrover,
            GuidelineKind::AssemblyGuidelines,
            vec!["Tighten the wheel screws"],
        );
        assert!(compose(&corpus, Platform::Moonrover)
            .contains("## 🔧 Moonrover Assembly Guidelines:\n\n"));

        let corpus = corpus_with(
            Platform::Arduino,
            GuidelineKind::GeneralGuidelines,
            vec!["Select the right board"],
        );
        assert!(compose(&corpus, Platform::Arduino).contains("## 🔧 Arduino Guidelines:\n\n"));

        let corpus = corpus_with(
            Platform::RaspberryPiPico,
            GuidelineKind::GeneralGuidelines,
            vec!["Hold BOOTSEL while plugging in"],
        );
        assert!(compose(&corpus, Platform::RaspberryPiPico)
            .contains("## 🔧 Raspberry Pi Pico Guidelines:\n\n"));
    }

    #[test]
    fn test_compose_skips_platform_block_for_wrong_kind() {
        // Micro:bit contributes initial_setup; a general_guidelines group
        // under it is not rendered into answers.
        let corpus = corpus_with(
            Platform::Microbit,
            GuidelineKind::GeneralGuidelines,
            vec!["Keep firmware updated"],
        );
        let text = compose(&corpus, Platform::Microbit);
        assert!(!text.contains("🔧"));
    }

    #[test]
    fn test_compose_empty_when_nothing_applies() {
        let corpus = Corpus {
            general_guidelines: vec![],
            sections: vec![],
            ticket_process: None,
            support_team: None,
        };
        assert_eq!(compose(&corpus, Platform::Arduino), "");
    }

    #[test]
    fn test_initial_guidelines_numbering_and_framing() {
        let corpus = Corpus {
            general_guidelines: vec![
                "Check cables first".to_string(),
                "Note the error message".to_string(),
            ],
            sections: vec![],
            ticket_process: None,
            support_team: None,
        };
        let text = initial_guidelines(&corpus);
        assert!(text.starts_with("## 📋 **General Debugging Guidelines**\n\n"));
        assert!(text.contains("*Please read these guidelines before asking questions:*\n\n"));
        assert!(text.contains("1. Check cables first\n\n"));
        assert!(text.contains("2. Note the error message\n\n"));
        assert!(text.ends_with("---\n\n**Now, please describe your hardware issue below! 👇**"));
    }
}
