use serde::{Deserialize, Serialize};

/// Hardware platform label. Every corpus document and every classified query
/// carries exactly one of these; `General` is the fallback, never inferred away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    General,
    Microbit,
    Moonrover,
    Arduino,
    RaspberryPiPico,
}

/// Classifier keyword sets, checked in priority order: a query matching both
/// a moonrover and an arduino keyword classifies as moonrover.
const MOONROVER_KEYWORDS: &[&str] = &[
    "moonrover",
    "moon rover",
    "wheel",
    "ultrasonic",
    "battery charging",
    "neopixel",
];
const ARDUINO_KEYWORDS: &[&str] = &["arduino", "uno", "servo", "bootloader", "avr"];
const PICO_KEYWORDS: &[&str] = &["pico", "raspberry pi pico", "rp2040", "bootsel"];
const MICROBIT_KEYWORDS: &[&str] = &["microbit", "micro:bit", "micro bit", "makecode", "webusb"];

impl Platform {
    /// All platforms that can own a corpus section (everything except `General`).
    pub const SECTIONED: [Platform; 4] = [
        Platform::Microbit,
        Platform::Moonrover,
        Platform::Arduino,
        Platform::RaspberryPiPico,
    ];

    /// Snake-case label, matching the serde representation and the corpus keys.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::General => "general",
            Platform::Microbit => "microbit",
            Platform::Moonrover => "moonrover",
            Platform::Arduino => "arduino",
            Platform::RaspberryPiPico => "raspberry_pi_pico",
        }
    }

    /// Parse a snake-case label back into a platform.
    pub fn from_label(label: &str) -> Option<Platform> {
        match label {
            "general" => Some(Platform::General),
            "microbit" => Some(Platform::Microbit),
            "moonrover" => Some(Platform::Moonrover),
            "arduino" => Some(Platform::Arduino),
            "raspberry_pi_pico" => Some(Platform::RaspberryPiPico),
            _ => None,
        }
    }

    /// Title-cased name shown in the "Detected Platform" answer banner
    /// (label with underscores as spaces, each word capitalized).
    pub fn banner_name(&self) -> &'static str {
        match self {
            Platform::General => "General",
            Platform::Microbit => "Microbit",
            Platform::Moonrover => "Moonrover",
            Platform::Arduino => "Arduino",
            Platform::RaspberryPiPico => "Raspberry Pi Pico",
        }
    }

    /// Product name used in the `Platform:` line of rendered case documents.
    pub fn case_display_name(&self) -> &'static str {
        match self {
            Platform::General => "General",
            Platform::Microbit => "Micro:bit",
            Platform::Moonrover => "Moonrover Kit",
            Platform::Arduino => "Arduino Uno",
            Platform::RaspberryPiPico => "Raspberry Pi Pico",
        }
    }

    /// Title used in rendered guideline-group document headers
    /// (e.g. "Micro:bit Initial Setup:", "Arduino General Guidelines:").
    pub fn guideline_header_title(&self) -> &'static str {
        match self {
            Platform::General => "General",
            Platform::Microbit => "Micro:bit",
            Platform::Moonrover => "Moonrover",
            Platform::Arduino => "Arduino",
            Platform::RaspberryPiPico => "Raspberry Pi Pico",
        }
    }

    /// Short prefix for fixed guideline-group document ids
    /// (e.g. "mb_initial_setup", "pico_general_guidelines").
    pub fn doc_id_prefix(&self) -> &'static str {
        match self {
            Platform::General => "general",
            Platform::Microbit => "mb",
            Platform::Moonrover => "mr",
            Platform::Arduino => "ard",
            Platform::RaspberryPiPico => "pico",
        }
    }
}

/// Detect which hardware platform a free-text query concerns.
///
/// Case-insensitive substring matching against fixed keyword sets, evaluated
/// in priority order (moonrover, arduino, pico, microbit); first match wins,
/// no match falls back to `General`. Pure and total.
pub fn classify(query: &str) -> Platform {
    let query_lower = query.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|kw| query_lower.contains(kw));

    if contains_any(MOONROVER_KEYWORDS) {
        Platform::Moonrover
    } else if contains_any(ARDUINO_KEYWORDS) {
        Platform::Arduino
    } else if contains_any(PICO_KEYWORDS) {
        Platform::RaspberryPiPico
    } else if contains_any(MICROBIT_KEYWORDS) {
        Platform::Microbit
    } else {
        Platform::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_platform() {
        assert_eq!(classify("my moonrover wheel is stuck"), Platform::Moonrover);
        assert_eq!(classify("arduino upload fails"), Platform::Arduino);
        assert_eq!(classify("BOOTSEL button does nothing"), Platform::RaspberryPiPico);
        assert_eq!(classify("makecode won't flash"), Platform::Microbit);
        assert_eq!(classify("hello"), Platform::General);
        assert_eq!(classify(""), Platform::General);
    }

    #[test]
    fn test_classify_priority_order() {
        // moonrover keywords outrank arduino keywords
        assert_eq!(classify("arduino moonrover wheel"), Platform::Moonrover);
        // arduino outranks pico
        assert_eq!(classify("uno or pico?"), Platform::Arduino);
        // pico outranks microbit
        assert_eq!(classify("rp2040 vs micro:bit"), Platform::RaspberryPiPico);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("MY ULTRASONIC SENSOR"), Platform::Moonrover);
        assert_eq!(classify("WebUSB pairing"), Platform::Microbit);
    }

    #[test]
    fn test_label_round_trip() {
        for platform in [
            Platform::General,
            Platform::Microbit,
            Platform::Moonrover,
            Platform::Arduino,
            Platform::RaspberryPiPico,
        ] {
            assert_eq!(Platform::from_label(platform.label()), Some(platform));
        }
        assert_eq!(Platform::from_label("gameboy"), None);
    }

    #[test]
    fn test_serde_labels_match() {
        let json = serde_json::to_string(&Platform::RaspberryPiPico).unwrap();
        assert_eq!(json, "\"raspberry_pi_pico\"");
        let parsed: Platform = serde_json::from_str("\"microbit\"").unwrap();
        assert_eq!(parsed, Platform::Microbit);
    }
}
