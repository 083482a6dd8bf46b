//! Weighted full-text search over pages and news.
//!
//! Each searchable table has an FTS5 companion (`pages_fts`, `news_fts`) kept in
//! step by triggers installed with the table. Columns carry the weights title
//! 1.0, excerpt 0.4, content 0.2; bm25 scores are negative with the best match
//! lowest, so hits are returned in ascending score order.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use serde::Serialize;
use tracing::{debug, info};

use super::{StorageError, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Pages,
    News,
}

impl SearchScope {
    pub fn fts_table(self) -> &'static str {
        match self {
            SearchScope::Pages => "pages_fts",
            SearchScope::News => "news_fts",
        }
    }

    fn source(self) -> (&'static str, &'static str) {
        match self {
            SearchScope::Pages => ("pages", "page_id"),
            SearchScope::News => ("news", "news_id"),
        }
    }
}

impl std::str::FromStr for SearchScope {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pages" => Ok(SearchScope::Pages),
            "news" => Ok(SearchScope::News),
            other => Err(StorageError::InvalidInput(format!(
                "unknown search scope: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, QueryableByName)]
pub struct SearchHit {
    #[diesel(sql_type = Text)]
    pub doc_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub title: Option<String>,
    /// bm25 score; lower is better.
    #[diesel(sql_type = Double, column_name = score)]
    pub rank: f64,
}

/// Turn free text into an FTS5 query that matches documents containing every
/// word. Each word becomes a quoted string, so operators and column filters in
/// user input are searched for literally. Words without a letter or digit can
/// never match and are dropped. `None` when there is nothing to search.
pub fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

impl Store {
    pub async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, StorageError> {
        let Some(expr) = match_expression(query) else {
            return Ok(Vec::new());
        };
        let limit = limit.clamp(1, 200);
        let table = scope.fts_table();
        debug!(table, query = %expr, limit, "search");
        self.interact(move |conn| {
            let sql = format!(
                "SELECT doc_id, title, bm25({table}, 0.0, 1.0, 0.4, 0.2) AS score \
                 FROM {table} WHERE {table} MATCH ? \
                 ORDER BY score ASC, doc_id ASC LIMIT ?"
            );
            Ok(diesel::sql_query(sql)
                .bind::<Text, _>(expr)
                .bind::<BigInt, _>(limit)
                .load::<SearchHit>(conn)?)
        })
        .await
    }

    /// Discard and repopulate the index for `scope` from its base table.
    pub async fn rebuild_search_index(&self, scope: SearchScope) -> Result<usize, StorageError> {
        let table = scope.fts_table();
        let (source, key) = scope.source();
        let rows = self
            .interact(move |conn| {
                conn.immediate_transaction(|conn| -> Result<usize, StorageError> {
                    diesel::sql_query(format!("DELETE FROM {table}")).execute(conn)?;
                    let inserted = diesel::sql_query(format!(
                        "INSERT INTO {table} (doc_id, title, excerpt, content_html) \
                         SELECT {key}, coalesce(title, ''), coalesce(excerpt, ''), \
                                coalesce(content_html, '') \
                         FROM {source}"
                    ))
                    .execute(conn)?;
                    Ok(inserted)
                })
            })
            .await?;
        info!(table, rows, "search index rebuilt");
        Ok(rows)
    }
}
