pub use crate::config::*;

use log::debug;

/// A builder for grade polls.
///
/// The builder is the boundary between the raw poll data of the site and the
/// structured [`VotePoll`]. The bars must be added from the hardest to the
/// easiest, which is the order in which the site lists them.
///
/// ```
/// use grade_poll::PollBuilder;
/// # use grade_poll::PollError;
///
/// let mut builder = PollBuilder::new();
/// builder.add_vote("36hard,High 6b", 0)?;
/// builder.add_vote("36,Mid 6b", 4)?;
/// builder.add_vote("36easy,Low 6b", 1)?;
///
/// let poll = builder.build();
/// assert_eq!(poll.total_votes(), 5);
/// # Ok::<(), PollError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PollBuilder {
    pub(crate) _buckets: Vec<(PollBucket, u64)>,
}

impl PollBuilder {
    pub fn new() -> PollBuilder {
        PollBuilder {
            _buckets: Vec::new(),
        }
    }

    /// Adds a bar given its raw key (`37hard,High 6b+`) and its number of votes.
    ///
    /// Negative vote counts and malformed keys are rejected.
    pub fn add_vote(&mut self, key: &str, votes: i64) -> Result<(), PollError> {
        if votes < 0 {
            return Err(PollError::invalid_input(format!(
                "negative vote count {} for poll key {:?}",
                votes, key
            )));
        }
        let bucket = PollBucket::parse_key(key)?;
        self.add_bucket(bucket, votes as u64)
    }

    /// Adds a bar with a vote count given as text, as found in the page markup.
    pub fn add_vote_str(&mut self, key: &str, votes: &str) -> Result<(), PollError> {
        let count = votes.trim().parse::<i64>().map_err(|_| {
            PollError::invalid_input(format!(
                "vote count {:?} for poll key {:?} is not an integer",
                votes, key
            ))
        })?;
        self.add_vote(key, count)
    }

    pub fn add_bucket(&mut self, bucket: PollBucket, votes: u64) -> Result<(), PollError> {
        if self._buckets.iter().any(|(b, _)| *b == bucket) {
            return Err(PollError::invalid_input(format!(
                "duplicate poll key {:?}",
                bucket.key()
            )));
        }
        self._buckets.push((bucket, votes));
        Ok(())
    }

    pub fn build(self) -> VotePoll {
        VotePoll {
            buckets: self._buckets,
        }
    }

    /// Assembles a poll from the two columns of the poll widget.
    ///
    /// `values` holds, for every bar, the grade code with its sub-grade suffix
    /// and the vote count. `names` holds the grade names displayed next to the
    /// bars; blank names are ignored. The two columns are paired in order.
    ///
    /// Returns `None` if the columns do not line up, in which case the poll
    /// cannot be trusted.
    pub fn from_site_columns(
        values: &[(String, String)],
        names: &[String],
    ) -> Result<Option<VotePoll>, PollError> {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if values.len() != names.len() {
            debug!(
                "from_site_columns: {} poll bars but {} grade names",
                values.len(),
                names.len()
            );
            return Ok(None);
        }
        let mut builder = PollBuilder::new();
        for ((code, votes), name) in values.iter().zip(names) {
            builder.add_vote_str(&format!("{},{}", code, name), votes)?;
        }
        Ok(Some(builder.build()))
    }
}
