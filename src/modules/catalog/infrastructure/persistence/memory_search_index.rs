use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

use crate::modules::catalog::domain::{Series, SeriesSearchRepository};
use crate::shared::errors::AppResult;

#[derive(Default)]
struct IndexState {
    /// token -> document keys
    postings: HashMap<String, BTreeSet<String>>,
    /// document key -> tokens, used to unindex
    documents: HashMap<String, Vec<String>>,
}

/// Token index over series titles and genres
#[derive(Default)]
pub struct InMemorySeriesSearch {
    state: RwLock<IndexState>,
}

impl InMemorySeriesSearch {
    pub fn new() -> Self {
        Self::default()
    }

    fn document_key(provider: &str, slug: &str) -> String {
        format!("{}/{}", provider, slug)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

fn remove_document(state: &mut IndexState, key: &str) {
    if let Some(tokens) = state.documents.remove(key) {
        for token in tokens {
            if let Some(keys) = state.postings.get_mut(&token) {
                keys.remove(key);
                if keys.is_empty() {
                    state.postings.remove(&token);
                }
            }
        }
    }
}

#[async_trait]
impl SeriesSearchRepository for InMemorySeriesSearch {
    async fn index(&self, series: &Series) -> AppResult<()> {
        let key = Self::document_key(&series.provider, &series.slug);
        let mut text = series.title.clone();
        for genre in &series.genres {
            text.push(' ');
            text.push_str(genre);
        }
        let tokens = tokenize(&text);

        let mut state = self.state.write().await;
        remove_document(&mut state, &key);
        for token in &tokens {
            state
                .postings
                .entry(token.clone())
                .or_default()
                .insert(key.clone());
        }
        state.documents.insert(key, tokens);
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<String>> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut matches: Option<BTreeSet<String>> = None;
        for term in &terms {
            let keys = state.postings.get(term).cloned().unwrap_or_default();
            matches = Some(match matches {
                None => keys,
                Some(acc) => acc.intersection(&keys).cloned().collect(),
            });
        }

        Ok(matches
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn delete(&self, provider: &str, slug: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        remove_document(&mut state, &Self::document_key(provider, slug));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::domain::SeriesInit;

    fn series(slug: &str, title: &str) -> Series {
        Series::from_init(&SeriesInit {
            provider: "asura".to_string(),
            slug: slug.to_string(),
            title: title.to_string(),
            source_path: format!("/manga/{}/", slug),
        })
    }

    #[tokio::test]
    async fn test_search_matches_all_terms() {
        let index = InMemorySeriesSearch::new();
        index.index(&series("solo-max-level", "Solo Max-Level Newbie")).await.unwrap();
        index.index(&series("solo-leveling", "Solo Leveling")).await.unwrap();

        let hits = index.search("solo newbie", 10).await.unwrap();
        assert_eq!(hits, vec!["asura/solo-max-level".to_string()]);
        assert_eq!(index.search("SOLO", 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reindex_and_delete() {
        let index = InMemorySeriesSearch::new();
        index.index(&series("reincarnator", "Reincarnator")).await.unwrap();
        index.index(&series("reincarnator", "The Reincarnator")).await.unwrap();
        assert_eq!(index.search("the", 10).await.unwrap().len(), 1);

        index.delete("asura", "reincarnator").await.unwrap();
        assert!(index.search("reincarnator", 10).await.unwrap().is_empty());
    }
}
