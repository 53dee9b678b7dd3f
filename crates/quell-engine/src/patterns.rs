//! Domain phrase detection.
//!
//! Flags recurring email-thread phrases shared between the two sides of a
//! pair. A corroborating signal only: the confidence weights cap it well
//! below the duplicate threshold.

/// Detector over a configurable phrase list.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    phrases: Vec<String>,
}

impl PatternDetector {
    /// Build a detector from a phrase list. Phrases are matched
    /// case-insensitively, so they are folded once here.
    pub fn new(phrases: &[String]) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Phrases present (substring match) in **both** inputs.
    ///
    /// Inputs are expected to be normalized text — subject plus description
    /// prefix — which is already lower-cased.
    pub fn shared<'a>(&'a self, a: &str, b: &str) -> Vec<&'a str> {
        self.phrases
            .iter()
            .filter(|p| a.contains(p.as_str()) && b.contains(p.as_str()))
            .map(|p| p.as_str())
            .collect()
    }
}
