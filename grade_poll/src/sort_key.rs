use crate::config::*;

/// The grade under which every label that is not a poll grade is collated.
/// It comes after every grade of the scale.
pub const SENTINEL_GRADE: &str = "9d";
pub const SENTINEL_MODIFIER_RANK: &str = "0";

/// Sort key of a poll grade label such as `Mid 6b`.
///
/// Keys compare by grade text first, then by sub-grade rank, so sorting by
/// key gives Low 6b < Mid 6b < High 6b < Low 6b+. The grade texts compare as
/// plain strings: this matches climbing order for the labels of one grading
/// scale, not for arbitrary numbers.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct GradeSortKey {
    pub grade: String,
    pub modifier_rank: String,
}

impl GradeSortKey {
    pub fn sentinel() -> GradeSortKey {
        GradeSortKey {
            grade: SENTINEL_GRADE.to_string(),
            modifier_rank: SENTINEL_MODIFIER_RANK.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.grade == SENTINEL_GRADE && self.modifier_rank == SENTINEL_MODIFIER_RANK
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (self.grade.as_str(), self.modifier_rank.as_str())
    }
}

/// Computes the sort key of a poll grade label.
///
/// Labels that are not of the form `<modifier> <grade>`, or whose grade does
/// not start with a digit ("No votes", "project", "?"), all get the sentinel
/// key. A two-word label with a grade but an unknown modifier is an error.
pub fn grade_sort_key(label: &str) -> Result<GradeSortKey, PollError> {
    let tokens: Vec<&str> = label.split_whitespace().collect();
    let (modifier, grade) = match tokens.as_slice() {
        [modifier, grade] => (*modifier, *grade),
        _ => return Ok(GradeSortKey::sentinel()),
    };
    if !grade.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(GradeSortKey::sentinel());
    }
    let sub_grade = SubGrade::from_label_token(modifier).ok_or_else(|| {
        PollError::invalid_input(format!(
            "unknown grade modifier {:?} in label {:?}",
            modifier, label
        ))
    })?;
    Ok(GradeSortKey {
        grade: grade.to_string(),
        modifier_rank: sub_grade.modifier_rank().to_string(),
    })
}

/// Returns the labels in grade order. Labels with equal keys keep their
/// relative order.
pub fn sorted_poll_labels<S: AsRef<str> + Clone>(labels: &[S]) -> Result<Vec<S>, PollError> {
    let mut keyed: Vec<(GradeSortKey, S)> = Vec::with_capacity(labels.len());
    for label in labels {
        keyed.push((grade_sort_key(label.as_ref())?, label.clone()));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, label)| label).collect())
}
