use std::collections::BTreeSet;

use super::domain::Subject;

const MATHEMATICS_ALIASES: &[&str] = &["mathematics", "math"];
const ENGLISH_ALIASES: &[&str] = &["english", "language"];
const SCIENCE_ALIASES: &[&str] = &[
    "physical science",
    "science",
    "physics",
    "chemistry",
    "biology",
];

const SKILL_KEYWORDS: &[&str] = &[
    "javascript",
    "python",
    "java",
    "react",
    "angular",
    "vue",
    "node",
    "sql",
    "mongodb",
    "aws",
    "docker",
    "kubernetes",
    "git",
    "agile",
    "scrum",
    "communication",
    "leadership",
    "problem solving",
    "teamwork",
];

/// Shared keyword vocabulary.
///
/// The transcript extractor and the requirement model must read from the same vocabulary,
/// otherwise a subject or skill recognized on one side can never match the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    skills: BTreeSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            skills: SKILL_KEYWORDS.iter().map(|skill| skill.to_string()).collect(),
        }
    }
}

impl Vocabulary {
    /// Extend the default skill keywords with additional lowercase terms.
    pub fn with_skills<I, S>(additional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for skill in additional {
            let normalized = normalize_keyword(skill.as_ref());
            if !normalized.is_empty() {
                vocabulary.skills.insert(normalized);
            }
        }
        vocabulary
    }

    pub fn subject_aliases(&self, subject: Subject) -> &'static [&'static str] {
        match subject {
            Subject::Mathematics => MATHEMATICS_ALIASES,
            Subject::English => ENGLISH_ALIASES,
            Subject::Science => SCIENCE_ALIASES,
        }
    }

    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(String::as_str)
    }

    /// Subjects whose aliases appear anywhere in `text`.
    pub fn subjects_in(&self, text: &str) -> Vec<Subject> {
        let lowered = text.to_lowercase();
        Subject::ALL
            .into_iter()
            .filter(|subject| {
                self.subject_aliases(*subject)
                    .iter()
                    .any(|alias| lowered.contains(alias))
            })
            .collect()
    }

    /// Skill keywords contained in `text`, case-insensitively.
    pub fn skills_in(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        self.skills
            .iter()
            .filter(|skill| lowered.contains(skill.as_str()))
            .cloned()
            .collect()
    }
}

pub(crate) fn normalize_keyword(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_subjects_through_aliases() {
        let vocabulary = Vocabulary::default();
        let subjects = vocabulary.subjects_in("Pure Math and Biology required");
        assert_eq!(subjects, vec![Subject::Mathematics, Subject::Science]);
    }

    #[test]
    fn extended_vocabulary_normalizes_terms() {
        let vocabulary = Vocabulary::with_skills(["  Data   Analysis ", ""]);
        assert!(vocabulary.skills().any(|skill| skill == "data analysis"));
        assert!(vocabulary.skills().any(|skill| skill == "python"));
    }
}
