// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The label returned in place of a grade when nobody voted.
pub const NO_VOTES: &str = "No votes";

/// Distance, in grade steps, between a Low or High sub-grade and the
/// canonical score of its grade code.
pub const SUB_GRADE_MODIFIER: f64 = 0.33;

/// The position of a vote inside a grade: "Low 6b", "Mid 6b" or "High 6b".
///
/// On the site, the sub-grade is encoded as a suffix of the grade code:
/// `easy` for Low, nothing for Mid and `hard` for High.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum SubGrade {
    Low,
    Mid,
    High,
}

impl SubGrade {
    /// The suffix appended to the grade code in a raw poll key.
    pub fn suffix(&self) -> &'static str {
        match self {
            SubGrade::Low => "easy",
            SubGrade::Mid => "",
            SubGrade::High => "hard",
        }
    }

    /// The rank of this sub-grade inside a grade, as used by the sort key.
    pub fn modifier_rank(&self) -> &'static str {
        match self {
            SubGrade::Low => "0",
            SubGrade::Mid => "1",
            SubGrade::High => "2",
        }
    }

    /// The word used in front of the grade in a poll label.
    pub fn label_token(&self) -> &'static str {
        match self {
            SubGrade::Low => "Low",
            SubGrade::Mid => "Mid",
            SubGrade::High => "High",
        }
    }

    pub fn from_label_token(token: &str) -> Option<SubGrade> {
        match token {
            "Low" => Some(SubGrade::Low),
            "Mid" => Some(SubGrade::Mid),
            "High" => Some(SubGrade::High),
            _ => None,
        }
    }

    /// Low and High both sit a third of a grade away from the code's score.
    /// The direction is not taken into account.
    pub fn score_modifier(&self) -> f64 {
        match self {
            SubGrade::Mid => 0.0,
            SubGrade::Low | SubGrade::High => SUB_GRADE_MODIFIER,
        }
    }
}

impl Display for SubGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label_token())
    }
}

/// One bar of a grade poll.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct PollBucket {
    /// The bare grade code, without the sub-grade suffix (e.g. `36`).
    pub code: String,
    pub sub_grade: SubGrade,
    /// The text displayed next to the bar (e.g. `Mid 6b`).
    pub label: String,
}

impl PollBucket {
    /// Parses a raw poll key of the form `<code>[hard|easy],<label>`,
    /// for example `37hard,High 6b+`.
    ///
    /// The key is split on its first comma: the label is everything after it,
    /// commas included. Labels of the site never contain a comma.
    pub fn parse_key(key: &str) -> Result<PollBucket, PollError> {
        let (code_full, label) = key.split_once(',').ok_or_else(|| {
            PollError::invalid_input(format!("poll key {:?} has no label part", key))
        })?;
        let (code, sub_grade) = if let Some(code) = code_full.strip_suffix("hard") {
            (code, SubGrade::High)
        } else if let Some(code) = code_full.strip_suffix("easy") {
            (code, SubGrade::Low)
        } else {
            (code_full, SubGrade::Mid)
        };
        if code.is_empty() {
            return Err(PollError::invalid_input(format!(
                "poll key {:?} has no grade code",
                key
            )));
        }
        Ok(PollBucket {
            code: code.to_string(),
            sub_grade,
            label: label.to_string(),
        })
    }

    /// The raw key, as found on the site.
    pub fn key(&self) -> String {
        format!("{}{},{}", self.code, self.sub_grade.suffix(), self.label)
    }
}

/// The votes of a grade poll, in the order of the site: hardest bar first.
///
/// Use [`crate::PollBuilder`] to construct one from raw data. Every key is
/// unique.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VotePoll {
    pub(crate) buckets: Vec<(PollBucket, u64)>,
}

impl VotePoll {
    pub fn buckets(&self) -> &[(PollBucket, u64)] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_votes(&self) -> u64 {
        self.buckets.iter().map(|(_, votes)| *votes).sum()
    }
}

// ******** Output data structures *********

/// The outcome of a grade poll.
#[derive(PartialEq, Debug, Clone)]
pub struct ConsensusResult {
    /// Label of the winning bar, or [`NO_VOTES`].
    pub grade_text: String,
    /// Bare code of the winning bar, or [`NO_VOTES`].
    pub grade_code: String,
    /// `0.33` when the winning bar is a Low or High bar, `0.0` otherwise.
    pub score_modifier: f64,
}

impl ConsensusResult {
    pub fn no_votes() -> ConsensusResult {
        ConsensusResult {
            grade_text: NO_VOTES.to_string(),
            grade_code: NO_VOTES.to_string(),
            score_modifier: 0.0,
        }
    }

    pub fn is_no_votes(&self) -> bool {
        self.grade_code == NO_VOTES
    }
}

/// Errors raised when a caller breaks the input contract.
///
/// Polls without votes and labels that are not grades are not errors: they
/// produce sentinel values instead.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PollError {
    InvalidInput { message: String },
}

impl PollError {
    pub(crate) fn invalid_input(message: String) -> PollError {
        PollError::InvalidInput { message }
    }
}

impl Error for PollError {}

impl Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::InvalidInput { message } => write!(f, "Invalid grade poll input: {}", message),
        }
    }
}

// ********* Grade tables **********

/// The guidebook information for one grade code.
#[derive(PartialEq, Debug, Clone)]
pub struct GradeInfo {
    /// Display name, e.g. `6b`.
    pub name: String,
    /// Position on the grading scale. Differences between scores are
    /// differences in grade steps.
    pub score: f64,
}

/// All the grades of one grading scale, indexed by grade code.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct GradeTable {
    grades: HashMap<String, GradeInfo>,
}

impl GradeTable {
    pub fn new() -> GradeTable {
        GradeTable::default()
    }

    pub fn insert(&mut self, code: &str, info: GradeInfo) {
        self.grades.insert(code.to_string(), info);
    }

    pub fn get(&self, code: &str) -> Option<&GradeInfo> {
        self.grades.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.grades.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }
}

impl FromIterator<(String, GradeInfo)> for GradeTable {
    fn from_iter<I: IntoIterator<Item = (String, GradeInfo)>>(iter: I) -> Self {
        GradeTable {
            grades: iter.into_iter().collect(),
        }
    }
}
