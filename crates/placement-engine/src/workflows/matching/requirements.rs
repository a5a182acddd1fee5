use std::collections::BTreeMap;

use regex::Regex;

use super::domain::{Grade, OfferingId, PerformanceTier, RequirementDraft, RequirementSet, Subject};
use super::vocabulary::{normalize_keyword, Vocabulary};

const TIER_KEYWORDS: [(&str, PerformanceTier); 4] = [
    ("distinction", PerformanceTier::Distinction),
    ("merit", PerformanceTier::Merit),
    ("credit", PerformanceTier::Credit),
    ("pass", PerformanceTier::Pass),
];

/// Normalizes an offering's requirement fields into a [`RequirementSet`].
///
/// Runs once when the offering is created so scoring never has to parse free text.
#[derive(Debug, Clone)]
pub struct RequirementModel {
    vocabulary: Vocabulary,
    subject_thresholds: Vec<(Subject, Regex)>,
    tier_words: Vec<(Regex, PerformanceTier)>,
}

impl RequirementModel {
    pub fn new(vocabulary: Vocabulary) -> Result<Self, regex::Error> {
        let mut subject_thresholds = Vec::new();
        for subject in Subject::ALL {
            for alias in vocabulary.subject_aliases(subject) {
                let pattern = format!(
                    r"(?i:\b{}[a-z]*)\s*[:\-]?\s*([A-D])[+*]?(?:[^A-Za-z0-9]|$)",
                    regex::escape(alias)
                );
                subject_thresholds.push((subject, Regex::new(&pattern)?));
            }
        }

        let mut tier_words = Vec::new();
        for (word, tier) in TIER_KEYWORDS {
            tier_words.push((Regex::new(&format!(r"(?i)\b{word}\b"))?, tier));
        }

        Ok(Self {
            vocabulary,
            subject_thresholds,
            tier_words,
        })
    }

    pub fn normalize(&self, offering_id: OfferingId, draft: &RequirementDraft) -> RequirementSet {
        let mut subjects: BTreeMap<Subject, Option<Grade>> = self
            .vocabulary
            .subjects_in(&draft.text)
            .into_iter()
            .map(|subject| (subject, None))
            .collect();

        for (subject, pattern) in &self.subject_thresholds {
            if let Some(grade) = pattern
                .captures(&draft.text)
                .and_then(|captures| captures.get(1))
                .and_then(|token| Grade::from_token(token.as_str()))
            {
                let entry = subjects.entry(*subject).or_insert(None);
                if entry.map(|current| grade.rank() > current.rank()).unwrap_or(true) {
                    *entry = Some(grade);
                }
            }
        }

        for (subject, grade) in &draft.subject_minimums {
            subjects.insert(*subject, Some(*grade));
        }

        let mut skills = self.vocabulary.skills_in(&draft.text);
        skills.extend(
            draft
                .skills
                .iter()
                .map(|skill| normalize_keyword(skill))
                .filter(|skill| !skill.is_empty()),
        );

        let performance_tier = draft
            .performance_tier
            .or_else(|| self.tier_from_text(&draft.text))
            .or_else(|| {
                subjects
                    .values()
                    .flatten()
                    .max_by_key(|grade| grade.rank())
                    .map(|grade| PerformanceTier::for_minimum_grade(*grade))
            });

        RequirementSet {
            offering_id,
            subjects,
            min_education: draft.min_education,
            min_experience: draft.min_experience,
            skills,
            performance_tier,
            display_text: draft.text.clone(),
        }
    }

    fn tier_from_text(&self, text: &str) -> Option<PerformanceTier> {
        self.tier_words
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map(|(_, tier)| *tier)
    }
}
