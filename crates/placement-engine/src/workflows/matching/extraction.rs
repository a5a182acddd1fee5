use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use super::domain::{
    AcademicRecord, CandidateProfile, EducationLevel, ExperienceLevel, ExtractionGap,
    ExtractionMode, Grade, Subject,
};
use super::vocabulary::Vocabulary;

/// Lines searched for a grade, counting the subject's anchor line.
const GRADE_WINDOW: usize = 5;

const AVERAGE_MARKERS: [&str; 3] = ["%", "marks", "average"];

/// Turns raw transcript text and profile fields into an [`AcademicRecord`].
#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    vocabulary: Vocabulary,
    mode: ExtractionMode,
    annotated_grade: Regex,
    standalone_grade: Regex,
    average_marks: Regex,
}

impl AttributeExtractor {
    pub fn new(vocabulary: Vocabulary, mode: ExtractionMode) -> Result<Self, regex::Error> {
        Ok(Self {
            vocabulary,
            mode,
            annotated_grade: Regex::new(r"\b([A-D])[+*]?\s*\([^)]*\)")?,
            standalone_grade: Regex::new(r"(?:^|[^A-Za-z0-9])([A-D])[+*]?(?:[^A-Za-z0-9+*]|$)")?,
            average_marks: Regex::new(r"(?i)average\s+marks\s*:?\s*([0-9]+(?:\.[0-9]+)?)\s*%")?,
        })
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn extract(&self, profile: &CandidateProfile) -> AcademicRecord {
        let mut gaps = Vec::new();
        let lines: Vec<&str> = profile
            .transcript
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut subject_grades = BTreeMap::new();
        for subject in Subject::ALL {
            match self.subject_grade(&lines, subject) {
                Some(grade) => {
                    subject_grades.insert(subject, grade);
                }
                None => {
                    gaps.push(ExtractionGap::SubjectGrade(subject));
                    if self.mode == ExtractionMode::Lenient {
                        subject_grades.insert(subject, Grade::A);
                    }
                }
            }
        }

        let overall_grade = match self.overall_grade(&profile.transcript) {
            Some(grade) => Some(grade),
            None => {
                gaps.push(ExtractionGap::OverallGrade);
                match self.mode {
                    ExtractionMode::Lenient => Some(Grade::A),
                    ExtractionMode::Strict => None,
                }
            }
        };

        let education_level = match profile.education_level.as_deref() {
            Some(raw) => {
                let parsed = EducationLevel::parse(raw);
                if parsed.is_none() {
                    gaps.push(ExtractionGap::EducationLevel(Some(raw.to_string())));
                }
                parsed
            }
            None => {
                gaps.push(ExtractionGap::EducationLevel(None));
                None
            }
        };

        let experience_level = match profile
            .experience_level
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
        {
            Some(raw) => {
                let parsed = ExperienceLevel::parse(raw);
                if parsed.is_none() {
                    gaps.push(ExtractionGap::ExperienceLevel(Some(raw.to_string())));
                }
                parsed
            }
            None => {
                gaps.push(ExtractionGap::ExperienceLevel(None));
                None
            }
        };

        let has_work_experience = experience_level.is_some()
            || profile
                .work_experience
                .as_deref()
                .map(|text| !text.trim().is_empty())
                .unwrap_or(false);

        let certificates = profile
            .certificates
            .iter()
            .map(|certificate| certificate.trim())
            .filter(|certificate| !certificate.is_empty())
            .map(str::to_string)
            .collect();

        for gap in &gaps {
            warn!(
                candidate = %profile.candidate_id,
                mode = ?self.mode,
                "extraction gap: {}",
                gap.describe()
            );
        }

        let record = AcademicRecord {
            candidate_id: profile.candidate_id.clone(),
            record_version: profile.record_version,
            mode: self.mode,
            subject_grades,
            overall_grade,
            education_level,
            experience_level,
            skills: self.vocabulary.skills_in(&profile.skills),
            certificates,
            has_work_experience,
            gaps,
        };

        debug!(
            candidate = %record.candidate_id,
            subjects = record.subject_grades.len(),
            skills = record.skills.len(),
            "extracted academic record"
        );

        record
    }

    fn subject_grade(&self, lines: &[&str], subject: Subject) -> Option<Grade> {
        let aliases = self.vocabulary.subject_aliases(subject);
        let anchor = lines.iter().position(|line| {
            let lowered = line.to_lowercase();
            aliases.iter().any(|alias| lowered.contains(alias))
        })?;

        let end = (anchor + GRADE_WINDOW).min(lines.len());
        lines[anchor..end]
            .iter()
            .find_map(|line| self.grade_on_line(line))
    }

    fn grade_on_line(&self, line: &str) -> Option<Grade> {
        if let Some(captures) = self.annotated_grade.captures(line) {
            return captures.get(1).and_then(|token| Grade::from_token(token.as_str()));
        }

        let lowered = line.to_lowercase();
        if AVERAGE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return None;
        }

        self.standalone_grade
            .captures(line)
            .and_then(|captures| captures.get(1))
            .and_then(|token| Grade::from_token(token.as_str()))
    }

    fn overall_grade(&self, transcript: &str) -> Option<Grade> {
        let captures = self.average_marks.captures(transcript)?;
        let percent: f32 = captures.get(1)?.as_str().parse().ok()?;
        Some(Grade::from_average(percent))
    }
}
