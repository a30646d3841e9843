use log::{debug, warn};

use crate::config::*;

/// Label stored in place of the poll grade when the poll is unusable.
pub const BAD_POLL_DATA: &str = "Bad poll data";

/// Poll difference stored when no comparison can be made.
pub const NO_COMPARISON: f64 = -0.01;

/// The comparison between the guidebook grade of a route and its grade poll.
#[derive(PartialEq, Debug, Clone)]
pub struct PollComparison {
    pub poll_grade_text: String,
    /// Guidebook score minus poll score, in grade steps. Positive when the
    /// guidebook is harder than the poll, i.e. the route is soft.
    pub poll_diff: f64,
}

impl PollComparison {
    pub fn bad_poll_data() -> PollComparison {
        PollComparison {
            poll_grade_text: BAD_POLL_DATA.to_string(),
            poll_diff: NO_COMPARISON,
        }
    }
}

/// Compares the outcome of a poll with the guidebook grade of the route.
///
/// Arguments:
/// * `consensus` the resolved poll, or `None` if the poll could not be read
/// * `guidebook_code` the grade code given by the guidebook
/// * `grades` the grade table of the route's grading scale
pub fn compare_poll(
    consensus: Option<&ConsensusResult>,
    guidebook_code: &str,
    grades: &GradeTable,
) -> PollComparison {
    let consensus = match consensus {
        Some(c) if !c.is_no_votes() => c,
        _ => return PollComparison::bad_poll_data(),
    };
    let unmatched = PollComparison {
        poll_grade_text: consensus.grade_text.clone(),
        poll_diff: NO_COMPARISON,
    };
    let poll_grade = match grades.get(&consensus.grade_code) {
        Some(g) => g,
        None => {
            debug!(
                "compare_poll: poll grade code {:?} is not in the grade table",
                consensus.grade_code
            );
            return unmatched;
        }
    };
    let guidebook_grade = match grades.get(guidebook_code) {
        Some(g) => g,
        None => {
            warn!(
                "compare_poll: guidebook grade code {:?} is not in its own grade table",
                guidebook_code
            );
            return unmatched;
        }
    };
    PollComparison {
        poll_grade_text: consensus.grade_text.clone(),
        poll_diff: guidebook_grade.score - (poll_grade.score + consensus.score_modifier),
    }
}
