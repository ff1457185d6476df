/// Batch match orchestration
///
/// Rows are matched in groups of `batch_size`. Lookups inside a group run
/// concurrently, groups run one after another with `batch_delay` between them
/// to stay under the catalog's rate limits. Results keep input row order.
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{CsvColumn, MovieMatch, ParsedTable, RowFields},
    services::{
        confidence::{match_status, rank_candidates},
        extract::extract_table,
        providers::CatalogProvider,
    },
};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);
pub const MAX_ALTERNATIVES: usize = 5;

const NO_TITLE_NOTE: &str = "No title found in row";

#[derive(Clone)]
pub struct MatchingService {
    provider: Arc<dyn CatalogProvider>,
    batch_size: usize,
    batch_delay: Duration,
}

impl MatchingService {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn from_config(provider: Arc<dyn CatalogProvider>, config: &Config) -> Self {
        Self::new(provider).with_batching(
            config.match_batch_size,
            Duration::from_millis(config.match_batch_delay_ms),
        )
    }

    /// Overrides group size (at least 1) and the pause between groups
    pub fn with_batching(mut self, batch_size: usize, batch_delay: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_delay = batch_delay;
        self
    }

    pub fn provider(&self) -> &Arc<dyn CatalogProvider> {
        &self.provider
    }

    /// Searches the catalog and picks the most confident candidate
    ///
    /// Lookup failures become an unmatched record carrying an error note.
    /// Only a missing catalog configuration is returned as an error, since no
    /// other row could succeed either.
    pub async fn find_best_match(&self, title: &str, year: Option<i32>) -> AppResult<MovieMatch> {
        if title.trim().is_empty() {
            return Ok(MovieMatch::failed(title, year, NO_TITLE_NOTE));
        }

        let movies = match self.provider.search_movies(title, year).await {
            Ok(movies) => movies,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    year = ?year,
                    provider = self.provider.name(),
                    error = %e,
                    "Catalog search failed"
                );
                return Ok(MovieMatch::failed(
                    title,
                    year,
                    format!("Error searching for movie: {}", e),
                ));
            }
        };

        let mut ranked = rank_candidates(movies, title, year).into_iter();
        let Some(best) = ranked.next() else {
            tracing::debug!(title = %title, year = ?year, "No catalog results");
            return Ok(MovieMatch::unmatched(title, year));
        };

        let alternatives = ranked
            .take(MAX_ALTERNATIVES)
            .map(|candidate| candidate.movie)
            .collect();

        Ok(MovieMatch {
            selected_candidate: Some(best.movie),
            confidence: best.confidence,
            status: match_status(best.confidence, true),
            alternative_candidates: alternatives,
            ..MovieMatch::unmatched(title, year)
        })
    }

    /// Extracts fields from every row of `table` and matches them
    pub async fn match_table(&self, table: &ParsedTable) -> AppResult<Vec<MovieMatch>> {
        let fields = extract_table(table);
        self.match_rows(&table.rows, &fields, &table.columns).await
    }

    /// Matches pre-extracted rows, one record per row in input order
    pub async fn match_rows(
        &self,
        rows: &[Vec<String>],
        fields: &[RowFields],
        columns: &[CsvColumn],
    ) -> AppResult<Vec<MovieMatch>> {
        if rows.len() != fields.len() {
            return Err(AppError::InvalidInput(format!(
                "{} rows but {} extracted field sets",
                rows.len(),
                fields.len()
            )));
        }

        let groups = rows.len().div_ceil(self.batch_size);
        tracing::info!(
            rows = rows.len(),
            groups,
            batch_size = self.batch_size,
            provider = self.provider.name(),
            "Starting batch match"
        );

        let mut results = Vec::with_capacity(rows.len());

        for (group, (row_chunk, field_chunk)) in rows
            .chunks(self.batch_size)
            .zip(fields.chunks(self.batch_size))
            .enumerate()
        {
            let lookups = row_chunk.iter().zip(field_chunk).map(|(row, fields)| async move {
                let record = self.find_best_match(&fields.title, fields.year).await?;
                Ok::<_, AppError>(record.with_source(row.clone(), columns.to_vec(), fields))
            });

            for outcome in join_all(lookups).await {
                results.push(outcome?);
            }

            tracing::debug!(group = group + 1, groups, "Match group finished");

            if group + 1 < groups && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        Ok(results)
    }
}
