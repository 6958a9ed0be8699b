//! Customer feedback collected after a sanction

use crate::audit::CsvAppendLog;
use crate::error::LoanAssistantError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

pub const FEEDBACK_HEADER: &[&str] = &["rating", "feedback"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub rating: u8,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackSummary {
    /// Mean rating rounded to two decimals, `None` when nothing was submitted.
    pub average_rating: Option<f64>,
    pub total_responses: usize,
}

#[derive(Debug, Deserialize)]
struct RawFeedbackRow {
    rating: String,
}

pub struct FeedbackLog {
    log: CsvAppendLog,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: CsvAppendLog::new(path, FEEDBACK_HEADER),
        }
    }

    pub async fn submit(&self, rating: u8, feedback: &str) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(LoanAssistantError::InvalidInput(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }

        info!(rating, "Recording customer feedback");

        self.log
            .append(FeedbackEntry {
                rating,
                feedback: feedback.trim().to_string(),
            })
            .await
    }

    /// Rows whose rating is not a whole number are ignored.
    pub async fn summary(&self) -> Result<FeedbackSummary> {
        let rows: Vec<RawFeedbackRow> = self.log.read_all().await?;

        let ratings: Vec<i64> = rows
            .iter()
            .filter_map(|row| row.rating.trim().parse::<i64>().ok())
            .collect();

        if ratings.is_empty() {
            return Ok(FeedbackSummary {
                average_rating: None,
                total_responses: 0,
            });
        }

        let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;

        Ok(FeedbackSummary {
            average_rating: Some((mean * 100.0).round() / 100.0),
            total_responses: ratings.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_summary_averages_ratings() {
        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback.csv"));

        log.submit(5, "Quick and clear").await.unwrap();
        log.submit(4, "").await.unwrap();
        log.submit(4, "Good, but asked for PAN twice").await.unwrap();

        let summary = log.summary().await.unwrap();
        assert_eq!(summary.total_responses, 3);
        assert_eq!(summary.average_rating, Some(4.33));
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_rejected() {
        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback.csv"));
        tokio_test::assert_err!(log.submit(0, "meh").await);
        tokio_test::assert_err!(log.submit(6, "wow").await);
    }

    #[tokio::test]
    async fn test_summary_skips_unparseable_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        std::fs::write(&path, "rating,feedback\n5,great\nfive,typo\n3,ok\n").unwrap();

        let summary = FeedbackLog::new(&path).summary().await.unwrap();
        assert_eq!(summary.total_responses, 2);
        assert_eq!(summary.average_rating, Some(4.0));
    }

    #[tokio::test]
    async fn test_empty_log_has_no_average() {
        let dir = tempdir().unwrap();
        let summary = FeedbackLog::new(dir.path().join("feedback.csv"))
            .summary()
            .await
            .unwrap();
        assert_eq!(summary.average_rating, None);
        assert_eq!(summary.total_responses, 0);
    }
}
