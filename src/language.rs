//! Language identification for incoming messages
//!
//! The dialogue engine asks a [`LanguageDetector`] once per session, on the
//! first non-numeric message. The default implementation uses `whatlang`.

use crate::i18n::Language;
use whatlang::{Detector, Lang};

/// Identifies the language of a user message
///
/// Returns `None` when the language is unknown or not one the assistant
/// answers in; callers fall back to their default language.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`
    fn detect(&self, text: &str) -> Option<Language>;
}

/// Lowest whatlang confidence accepted for an unreliable guess
const MIN_CONFIDENCE: f64 = 0.5;

/// Detector backed by the `whatlang` trigram classifier
///
/// Candidates are restricted to the languages the assistant answers in.
/// A leading salutation (`Bonjour`, `Привет`) decides on its own; otherwise
/// weak statistical guesses are discarded so the caller keeps its default.
#[derive(Debug, Clone)]
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    /// Create a new detector
    pub fn new() -> Self {
        let allowlist = Language::ALL.into_iter().map(to_whatlang).collect();
        Self {
            detector: Detector::with_allowlist(allowlist),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn to_whatlang(language: Language) -> Lang {
    match language {
        Language::English => Lang::Eng,
        Language::Hebrew => Lang::Heb,
        Language::French => Lang::Fra,
        Language::Spanish => Lang::Spa,
        Language::Italian => Lang::Ita,
        Language::Arabic => Lang::Ara,
        Language::Russian => Lang::Rus,
    }
}

fn from_whatlang(lang: Lang) -> Option<Language> {
    Language::ALL
        .into_iter()
        .find(|language| to_whatlang(*language) == lang)
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<Language> {
        if let Some(language) = Language::from_greeting(text) {
            tracing::debug!("Detected language {} from greeting", language);
            return Some(language);
        }

        let info = self.detector.detect(text)?;
        if info.confidence() < MIN_CONFIDENCE {
            tracing::debug!(
                "Ignoring unreliable guess {} (confidence {:.2})",
                info.lang().code(),
                info.confidence()
            );
            return None;
        }

        let Some(language) = from_whatlang(info.lang()) else {
            tracing::debug!("Detected unsupported language: {}", info.lang().code());
            return None;
        };
        tracing::debug!(
            "Detected language {} (confidence {:.2})",
            language,
            info.confidence()
        );
        Some(language)
    }
}

/// Whether `text` consists only of ASCII digits (ignoring surrounding space)
///
/// Stop numbers and menu choices are numeric; detection is skipped for them.
pub fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_hebrew_script() {
        let detector = WhatlangDetector::new();
        assert_eq!(
            detector.detect("שלום, מתי מגיע האוטובוס הבא לתחנה שלי?"),
            Some(Language::Hebrew)
        );
    }

    #[test]
    fn test_detects_russian_script() {
        let detector = WhatlangDetector::new();
        assert_eq!(
            detector.detect("Когда придёт следующий автобус на мою остановку?"),
            Some(Language::Russian)
        );
    }

    #[test]
    fn test_detects_arabic_script() {
        let detector = WhatlangDetector::new();
        assert_eq!(
            detector.detect("متى تصل الحافلة القادمة إلى محطتي؟"),
            Some(Language::Arabic)
        );
    }

    #[test]
    fn test_short_greetings_in_each_language() {
        let detector = WhatlangDetector::new();
        let cases = [
            ("Hello!", Language::English),
            ("hi", Language::English),
            ("שלום", Language::Hebrew),
            ("Bonjour", Language::French),
            ("Hola", Language::Spanish),
            ("Ciao", Language::Italian),
            ("مرحبا", Language::Arabic),
            ("Привет", Language::Russian),
        ];
        for (text, expected) in cases {
            assert_eq!(detector.detect(text), Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_detects_latin_sentences() {
        let detector = WhatlangDetector::new();
        assert_eq!(
            detector.detect(
                "Je voudrais savoir quand arrive le prochain bus à mon arrêt, s'il vous plaît."
            ),
            Some(Language::French)
        );
        assert_eq!(
            detector.detect("Quiero saber cuándo llega el próximo autobús a mi parada, por favor."),
            Some(Language::Spanish)
        );
        assert_eq!(
            detector.detect(
                "Vorrei sapere quando arriva il prossimo autobus alla mia fermata, per favore."
            ),
            Some(Language::Italian)
        );
    }

    #[test]
    fn test_whatlang_mapping_covers_every_language() {
        for language in Language::ALL {
            assert_eq!(from_whatlang(to_whatlang(language)), Some(language));
        }
        assert_eq!(from_whatlang(Lang::Deu), None);
    }

    #[test]
    fn test_detects_english_sentence() {
        let detector = WhatlangDetector::new();
        assert_eq!(
            detector.detect("When is the next bus coming to my stop? I am waiting at the station."),
            Some(Language::English)
        );
    }

    #[test]
    fn test_empty_text_is_none() {
        let detector = WhatlangDetector::new();
        assert_eq!(detector.detect(""), None);
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("123"));
        assert!(is_numeric(" 42 "));
        assert!(!is_numeric(""));
        assert!(!is_numeric("12a"));
        assert!(!is_numeric("-3"));
    }
}
