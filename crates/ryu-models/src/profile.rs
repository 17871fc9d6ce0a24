//! Candidate profile models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of points each completed profile section is worth.
const SECTION_POINTS: u8 = 20;

/// Candidate profile substructure stored on the user document.
///
/// Experience, education, and project entries are free-form objects; the
/// frontend owns their shape and the backend only counts them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CandidateProfile {
    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub experience: Vec<serde_json::Value>,

    #[serde(default)]
    pub education: Vec<serde_json::Value>,

    #[serde(default)]
    pub certifications: Vec<String>,

    #[serde(default)]
    pub projects: Vec<serde_json::Value>,

    #[serde(default)]
    pub bio: Option<String>,

    /// Public path of the uploaded profile picture, e.g. `/uploads/<id>_profile.png`.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl CandidateProfile {
    /// Profile completion score out of 100.
    ///
    /// 20 points each, awarded independently, for: non-empty bio,
    /// non-empty skills, non-empty experience, non-empty education, and a
    /// present profile picture. Certifications and projects do not count.
    /// Recomputed on every read; never stored.
    pub fn completion_score(&self) -> u8 {
        let mut score = 0;
        if self.bio.as_deref().is_some_and(|b| !b.is_empty()) {
            score += SECTION_POINTS;
        }
        if !self.skills.is_empty() {
            score += SECTION_POINTS;
        }
        if !self.experience.is_empty() {
            score += SECTION_POINTS;
        }
        if !self.education.is_empty() {
            score += SECTION_POINTS;
        }
        if self.profile_picture.is_some() {
            score += SECTION_POINTS;
        }
        score
    }
}
