/*!
Consensus grades for climbing grade polls.

Visitors of a climbing guidebook site vote on the difficulty of a route by
picking a bar in a poll: Low, Mid or High of the guidebook grade or of one of
its neighbours. This crate turns the votes of a poll into a consensus grade
([`resolve_poll`]), compares it with the guidebook grade ([`compare_poll`]) and
provides a sort order for the poll grade labels ([`grade_sort_key`]).

```
use grade_poll::*;

let poll = resolve_raw_poll(&[
    ("36hard,High 6b", 1),
    ("36,Mid 6b", 3),
    ("36easy,Low 6b", 1),
    ("35hard,High 6a+", 0),
])?;
assert_eq!(poll.grade_text, "Mid 6b");

// Votes leaning to the easy side: mean position 13 / 5 = 2.6.
let poll = resolve_raw_poll(&[
    ("36hard,High 6b", 0),
    ("36,Mid 6b", 3),
    ("36easy,Low 6b", 1),
    ("35hard,High 6a+", 1),
])?;
assert_eq!(poll.grade_text, "Low 6b");
# Ok::<(), PollError>(())
```

All the functions are pure and may be called from any thread.
*/
mod builder;
mod compare;
mod config;
pub mod manual;
mod sort_key;

use log::debug;
use std::cmp::Ordering;

pub use crate::builder::PollBuilder;
pub use crate::compare::*;
pub use crate::config::*;
pub use crate::sort_key::*;

/// Computes the consensus grade of a poll.
///
/// The consensus is the bar at the vote-weighted mean position, positions
/// counting from 1 for the hardest bar. The mean is rounded half to even.
/// A poll without any vote gives [`ConsensusResult::no_votes`].
pub fn resolve_poll(poll: &VotePoll) -> ConsensusResult {
    let buckets = poll.buckets();
    if buckets.is_empty() {
        debug!("resolve_poll: empty poll");
        return ConsensusResult::no_votes();
    }

    let mut weighted_sum: u128 = 0;
    let mut total_votes: u128 = 0;
    for (idx, (_, votes)) in buckets.iter().enumerate() {
        let position = (idx + 1) as u128;
        weighted_sum += position * (*votes as u128);
        total_votes += *votes as u128;
    }
    if total_votes == 0 {
        debug!("resolve_poll: {} bars, no votes", buckets.len());
        return ConsensusResult::no_votes();
    }

    let mean_position = div_round_half_even(weighted_sum, total_votes);
    // Back to a 0-based index.
    let index = (mean_position.saturating_sub(1) as usize).min(buckets.len() - 1);
    debug!(
        "resolve_poll: weighted_sum: {} total_votes: {} index: {}",
        weighted_sum, total_votes, index
    );

    let (bucket, _) = &buckets[index];
    ConsensusResult {
        grade_text: bucket.label.clone(),
        grade_code: bucket.code.clone(),
        score_modifier: bucket.sub_grade.score_modifier(),
    }
}

/// Resolves a poll given in the raw encoding of the site: a list of
/// `(key, votes)` pairs from the hardest bar to the easiest.
///
/// Fails if a count is negative, or if a key is malformed or repeated.
pub fn resolve_raw_poll(raw_poll: &[(&str, i64)]) -> Result<ConsensusResult, PollError> {
    let mut builder = PollBuilder::new();
    for (key, votes) in raw_poll {
        builder.add_vote(key, *votes)?;
    }
    Ok(resolve_poll(&builder.build()))
}

// Integer division rounded to the nearest integer, ties to the even one.
fn div_round_half_even(num: u128, den: u128) -> u128 {
    let quotient = num / den;
    let remainder = num % den;
    match (2 * remainder).cmp(&den) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}
