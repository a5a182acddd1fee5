use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for courses and job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OfferingId(pub String);

/// Identifier wrapper for institutions and employers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstitutionId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OfferingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Letter grade on the ordinal A–F scale. `A` is the highest grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Rank where a larger number is a better grade.
    pub const fn rank(self) -> u8 {
        match self {
            Grade::A => 5,
            Grade::B => 4,
            Grade::C => 3,
            Grade::D => 2,
            Grade::F => 1,
        }
    }

    pub fn meets(self, minimum: Grade) -> bool {
        self.rank() >= minimum.rank()
    }

    /// Parse a transcript grade token such as `A`, `B+` or `A*`. Modifiers are dropped.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().trim_end_matches(['+', '*']) {
            "A" | "a" => Some(Grade::A),
            "B" | "b" => Some(Grade::B),
            "C" | "c" => Some(Grade::C),
            "D" | "d" => Some(Grade::D),
            "F" | "f" => Some(Grade::F),
            _ => None,
        }
    }

    /// Map an average-marks percentage onto the letter scale.
    pub fn from_average(percent: f32) -> Self {
        if percent >= 90.0 {
            Grade::A
        } else if percent >= 80.0 {
            Grade::B
        } else if percent >= 70.0 {
            Grade::C
        } else if percent >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Diploma,
    Bachelors,
    Masters,
    Phd,
}

impl EducationLevel {
    pub const fn rank(self) -> u8 {
        match self {
            EducationLevel::HighSchool => 1,
            EducationLevel::Diploma => 2,
            EducationLevel::Bachelors => 3,
            EducationLevel::Masters => 4,
            EducationLevel::Phd => 5,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "high-school" | "highschool" | "secondary" => Some(Self::HighSchool),
            "diploma" | "certificate" => Some(Self::Diploma),
            "bachelors" | "bachelor" | "degree" => Some(Self::Bachelors),
            "masters" | "master" => Some(Self::Masters),
            "phd" | "doctorate" => Some(Self::Phd),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high-school",
            EducationLevel::Diploma => "diploma",
            EducationLevel::Bachelors => "bachelors",
            EducationLevel::Masters => "masters",
            EducationLevel::Phd => "phd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceLevel {
    Internship,
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub const fn rank(self) -> u8 {
        match self {
            ExperienceLevel::Internship => 1,
            ExperienceLevel::Entry => 2,
            ExperienceLevel::Mid => 3,
            ExperienceLevel::Senior => 4,
            ExperienceLevel::Executive => 5,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "internship" | "intern" => Some(Self::Internship),
            "entry" | "entry-level" | "junior" => Some(Self::Entry),
            "mid" | "mid-level" | "intermediate" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            "executive" | "lead" => Some(Self::Executive),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "internship",
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }
}

/// Subjects understood by both the transcript extractor and the requirement model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    English,
    Science,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Mathematics, Subject::English, Subject::Science];

    pub const fn label(self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::English => "English",
            Subject::Science => "Science",
        }
    }
}

/// Expected overall academic standing inferred from an offering's requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Distinction,
    Merit,
    Credit,
    Pass,
}

impl PerformanceTier {
    pub fn for_minimum_grade(grade: Grade) -> Self {
        match grade {
            Grade::A => PerformanceTier::Distinction,
            Grade::B => PerformanceTier::Merit,
            Grade::C => PerformanceTier::Credit,
            Grade::D | Grade::F => PerformanceTier::Pass,
        }
    }
}

/// How the extractor treats values it cannot find in the submitted material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Assume the most favorable grade when a value is missing.
    #[default]
    Lenient,
    /// Leave missing values absent and flag the record for manual review.
    Strict,
}

impl ExtractionMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lenient" | "permissive" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Field the extractor could not read from the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionGap {
    SubjectGrade(Subject),
    OverallGrade,
    EducationLevel(Option<String>),
    ExperienceLevel(Option<String>),
}

impl ExtractionGap {
    pub fn describe(&self) -> String {
        match self {
            ExtractionGap::SubjectGrade(subject) => {
                format!("no grade found for {}", subject.label())
            }
            ExtractionGap::OverallGrade => "no average marks found".to_string(),
            ExtractionGap::EducationLevel(Some(raw)) => {
                format!("unrecognized education level '{raw}'")
            }
            ExtractionGap::EducationLevel(None) => "education level not provided".to_string(),
            ExtractionGap::ExperienceLevel(Some(raw)) => {
                format!("unrecognized experience level '{raw}'")
            }
            ExtractionGap::ExperienceLevel(None) => "experience level not provided".to_string(),
        }
    }
}

/// Raw candidate profile as stored by the platform, before extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: CandidateId,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    /// Comma-delimited skills as typed by the candidate.
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub certificates: Vec<String>,
    #[serde(default)]
    pub work_experience: Option<String>,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub record_version: u64,
}

/// Structured attributes derived from a candidate profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub candidate_id: CandidateId,
    pub record_version: u64,
    pub mode: ExtractionMode,
    pub subject_grades: BTreeMap<Subject, Grade>,
    pub overall_grade: Option<Grade>,
    pub education_level: Option<EducationLevel>,
    pub experience_level: Option<ExperienceLevel>,
    pub skills: BTreeSet<String>,
    pub certificates: Vec<String>,
    pub has_work_experience: bool,
    pub gaps: Vec<ExtractionGap>,
}

impl AcademicRecord {
    pub fn needs_review(&self) -> bool {
        self.mode == ExtractionMode::Strict && !self.gaps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingKind {
    Course,
    Job,
}

impl OfferingKind {
    pub const fn label(self) -> &'static str {
        match self {
            OfferingKind::Course => "course",
            OfferingKind::Job => "job",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingStatus {
    #[default]
    Open,
    Closed,
}

/// Requirement fields captured when an offering is created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequirementDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub min_education: Option<EducationLevel>,
    #[serde(default)]
    pub min_experience: Option<ExperienceLevel>,
    #[serde(default)]
    pub subject_minimums: BTreeMap<Subject, Grade>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub performance_tier: Option<PerformanceTier>,
}

/// Normalized eligibility criteria for an offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub offering_id: OfferingId,
    /// Referenced subjects; `None` means the subject is required without a stated minimum.
    pub subjects: BTreeMap<Subject, Option<Grade>>,
    pub min_education: Option<EducationLevel>,
    pub min_experience: Option<ExperienceLevel>,
    pub skills: BTreeSet<String>,
    pub performance_tier: Option<PerformanceTier>,
    pub display_text: String,
}

/// A course admission cycle or job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub offering_id: OfferingId,
    pub institution_id: InstitutionId,
    pub kind: OfferingKind,
    pub title: String,
    pub requirements: RequirementSet,
    pub capacity: u32,
    pub status: OfferingStatus,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever the requirement set changes.
    pub revision: u64,
}

impl Offering {
    pub fn is_open(&self) -> bool {
        self.status == OfferingStatus::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub institution_id: InstitutionId,
    pub name: String,
}
