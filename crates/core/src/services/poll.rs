//! Poll voting service.
//!
//! One single-question poll per article. The vote ledger is authoritative
//! and the per-option count projection is maintained transactionally beside
//! it; this service owns the state machine between the two:
//!
//! - no vote + cast        -> ledger insert, option count +1
//! - vote(x) + cast(x)     -> no-op
//! - vote(x) + cast(y)     -> conflict (changes go through `change_vote`)
//! - vote(x) + change(y)   -> ledger update, count(x) -1 (floor 0), count(y) +1
//! - vote(x) + change(x)   -> no-op

use std::collections::{HashMap, HashSet};

use newsdesk_common::{AppError, AppResult, IdGenerator};
use newsdesk_db::{
    entities::{poll_option_count, poll_vote},
    repositories::{NewVote, PollCountRepository, PollVoteRepository, VoteMove},
};
use sea_orm::prelude::DateTimeWithTimeZone;

/// Upper bound on option indices. The CMS owns the real option schema; this
/// is a sanity cap on the caller-supplied index.
const MAX_POLL_OPTIONS: i32 = 16;

/// Maximum accepted option label length.
const MAX_OPTION_TEXT_LEN: usize = 200;

/// Input for casting a first vote.
#[derive(Debug, Clone)]
pub struct CastVoteInput {
    pub article_uid: String,
    pub option_index: i32,
    pub option_text: String,
    /// Poll question, captured on the projection row the first time an
    /// option is voted.
    pub poll_question: Option<String>,
    pub locale: Option<String>,
}

/// One option's share of the poll results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptionResult {
    pub option_index: i32,
    pub option_text: String,
    pub vote_count: i64,
    pub percentage: i32,
}

/// Aggregated results for one poll.
#[derive(Debug, Clone, Default)]
pub struct PollResults {
    pub options: Vec<PollOptionResult>,
    pub total_votes: i64,
}

/// A user's current vote on a poll.
#[derive(Debug, Clone)]
pub struct UserVote {
    pub option_index: i32,
    pub option_text: String,
    pub voted_at: DateTimeWithTimeZone,
}

/// Results and viewer votes for a batch of polls.
#[derive(Debug, Default)]
pub struct BatchPollResults {
    pub results: HashMap<String, PollResults>,
    pub user_votes: HashMap<String, UserVote>,
}

impl From<poll_vote::Model> for UserVote {
    fn from(vote: poll_vote::Model) -> Self {
        Self {
            option_index: vote.option_index,
            option_text: vote.option_text,
            // A changed vote reports the change time
            voted_at: vote.updated_at.unwrap_or(vote.created_at),
        }
    }
}

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    vote_repo: PollVoteRepository,
    count_repo: PollCountRepository,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(vote_repo: PollVoteRepository, count_repo: PollCountRepository) -> Self {
        Self {
            vote_repo,
            count_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a first vote on a poll.
    ///
    /// Re-casting the option the user already holds is a no-op; casting a
    /// different option is a conflict (the change operation exists for
    /// that). Either way the current results are returned.
    pub async fn cast_vote(&self, user_id: &str, input: CastVoteInput) -> AppResult<PollResults> {
        Self::validate_option(input.option_index, &input.option_text)?;

        match self
            .vote_repo
            .find_by_user_and_article(user_id, &input.article_uid)
            .await?
        {
            Some(existing) if existing.option_index == input.option_index => {
                tracing::debug!(
                    user_id,
                    article_uid = %input.article_uid,
                    "Same-option re-cast, nothing to do"
                );
            }
            Some(_) => {
                return Err(AppError::Conflict(
                    "Vote already cast on this poll; use the change-vote operation".to_string(),
                ));
            }
            None => {
                let vote_id = self.id_gen.generate();
                let count_row_id = self.id_gen.generate();
                self.vote_repo
                    .record_vote(NewVote {
                        vote_id: &vote_id,
                        count_row_id: &count_row_id,
                        user_id,
                        article_uid: &input.article_uid,
                        option_index: input.option_index,
                        option_text: &input.option_text,
                        poll_question: input.poll_question.as_deref(),
                        locale: input.locale.as_deref(),
                    })
                    .await?;
            }
        }

        self.get_results(&input.article_uid).await
    }

    /// Change an existing vote to a new option.
    pub async fn change_vote(
        &self,
        user_id: &str,
        article_uid: &str,
        option_index: i32,
        option_text: &str,
    ) -> AppResult<(UserVote, PollResults)> {
        Self::validate_option(option_index, option_text)?;

        let existing = self
            .vote_repo
            .find_by_user_and_article(user_id, article_uid)
            .await?
            .ok_or_else(|| AppError::VoteNotFound(article_uid.to_string()))?;

        if existing.option_index == option_index {
            let results = self.get_results(article_uid).await?;
            return Ok((existing.into(), results));
        }

        let old_option = existing.option_index;
        let count_row_id = self.id_gen.generate();
        let updated = self
            .vote_repo
            .move_vote(
                existing,
                VoteMove {
                    count_row_id: &count_row_id,
                    article_uid,
                    old_option,
                    new_option: option_index,
                    new_option_text: option_text,
                },
            )
            .await?;

        let results = self.get_results(article_uid).await?;
        Ok((updated.into(), results))
    }

    /// Get a poll's results. A poll nobody has voted on yields empty results.
    pub async fn get_results(&self, article_uid: &str) -> AppResult<PollResults> {
        let rows = self.count_repo.find_by_article(article_uid).await?;
        Ok(Self::build_results(rows))
    }

    /// Get a poll's results, treating an unknown poll as an error.
    ///
    /// Used by the single-poll read endpoint: a poll with no projection rows
    /// has never been voted and 404s; clients fall back to the CMS schema
    /// with zero counts.
    pub async fn get_results_required(&self, article_uid: &str) -> AppResult<PollResults> {
        let results = self.get_results(article_uid).await?;
        if results.options.is_empty() {
            return Err(AppError::PollNotFound(article_uid.to_string()));
        }
        Ok(results)
    }

    /// Find the viewer's current vote on a poll.
    pub async fn find_user_vote(
        &self,
        user_id: &str,
        article_uid: &str,
    ) -> AppResult<Option<UserVote>> {
        Ok(self
            .vote_repo
            .find_by_user_and_article(user_id, article_uid)
            .await?
            .map(UserVote::from))
    }

    /// Get results for many polls at once, plus the viewer's votes when
    /// authenticated. Unknown polls are omitted from the result map.
    pub async fn get_results_batch(
        &self,
        article_uids: &[String],
        viewer: Option<&str>,
    ) -> AppResult<BatchPollResults> {
        let unique: Vec<String> = article_uids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let rows = self.count_repo.find_by_articles(&unique).await?;

        let mut grouped: HashMap<String, Vec<poll_option_count::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.article_uid.clone()).or_default().push(row);
        }

        let results = grouped
            .into_iter()
            .map(|(uid, rows)| (uid, Self::build_results(rows)))
            .collect();

        let user_votes = if let Some(user_id) = viewer {
            self.vote_repo
                .find_by_user_and_articles(user_id, &unique)
                .await?
                .into_iter()
                .map(|vote| (vote.article_uid.clone(), UserVote::from(vote)))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(BatchPollResults {
            results,
            user_votes,
        })
    }

    /// Assemble results from projection rows.
    ///
    /// `percentage = round(100 * vote_count / total_votes)`, defined as 0 for
    /// every option when the total is zero.
    fn build_results(mut rows: Vec<poll_option_count::Model>) -> PollResults {
        rows.sort_by_key(|r| r.option_index);
        let total_votes: i64 = rows.iter().map(|r| i64::from(r.vote_count)).sum();

        let options = rows
            .into_iter()
            .map(|row| {
                let vote_count = i64::from(row.vote_count);
                let percentage = if total_votes == 0 {
                    0
                } else {
                    (100.0 * vote_count as f64 / total_votes as f64).round() as i32
                };
                PollOptionResult {
                    option_index: row.option_index,
                    option_text: row.option_text,
                    vote_count,
                    percentage,
                }
            })
            .collect();

        PollResults {
            options,
            total_votes,
        }
    }

    fn validate_option(option_index: i32, option_text: &str) -> AppResult<()> {
        if !(0..MAX_POLL_OPTIONS).contains(&option_index) {
            return Err(AppError::BadRequest("Invalid option index".to_string()));
        }
        if option_text.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Option text cannot be empty".to_string(),
            ));
        }
        if option_text.len() > MAX_OPTION_TEXT_LEN {
            return Err(AppError::BadRequest(format!(
                "Option text is too long (max {MAX_OPTION_TEXT_LEN} chars)"
            )));
        }
        Ok(())
    }
}
