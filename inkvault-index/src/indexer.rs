//! Search and backlink discovery over a workspace the server cannot read.
//!
//! Every query fetches the full candidate set, decrypts it through the
//! session (one key unwrap per document per session) and matches against
//! the plaintext locally.

use crate::config::{IndexerConfig, SearchField, SearchOptions};
use crate::error::{IndexError, IndexResult};
use crate::fuzzy::fuzzy_match;
use crate::session::{OpenedDocument, SkippedDocument, WorkspaceSession};
use crate::source::DocumentSource;
use inkvault_crypto::{DocumentMetadata, EncryptedDocument};
use inkvault_types::{DocumentId, WorkspaceId};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Characters of context kept before the first highlighted character of a
/// text snippet.
const SNIPPET_LEAD: usize = 40;
const SNIPPET_MAX: usize = 160;

/// Matched characters within one field of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub field: SearchField,
    /// The matched value. For [`SearchField::Text`] this is a snippet of the
    /// body around the match, with newlines flattened to spaces.
    pub value: String,
    /// Character indices into `value`.
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub document_id: DocumentId,
    pub title: String,
    pub score: f64,
    pub highlights: Vec<Highlight>,
}

/// Ranked results plus every document the scan had to skip.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    /// Matches before the result limit was applied.
    pub total_matches: usize,
    pub skipped: Vec<SkippedDocument>,
}

/// A document linking to the queried one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backlink {
    pub document_id: DocumentId,
    pub title: String,
    /// Text of each block containing the reference.
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BacklinkOutcome {
    pub backlinks: Vec<Backlink>,
    pub skipped: Vec<SkippedDocument>,
}

/// Client-side indexer over one document source.
pub struct ClientIndexer<S: ?Sized> {
    source: Arc<S>,
    session: Arc<WorkspaceSession>,
    config: IndexerConfig,
}

impl<S: DocumentSource + ?Sized> ClientIndexer<S> {
    pub fn new(source: Arc<S>, session: Arc<WorkspaceSession>) -> Self {
        Self::with_config(source, session, IndexerConfig::default())
    }

    pub fn with_config(
        source: Arc<S>,
        session: Arc<WorkspaceSession>,
        config: IndexerConfig,
    ) -> Self {
        Self {
            source,
            session,
            config,
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<WorkspaceSession> {
        &self.session
    }

    async fn fetch<F>(&self, fetch: F) -> IndexResult<Vec<EncryptedDocument>>
    where
        F: Future<Output = IndexResult<Vec<EncryptedDocument>>>,
    {
        tokio::time::timeout(self.config.fetch_timeout(), fetch)
            .await
            .map_err(|_| IndexError::Timeout(self.config.fetch_timeout_ms))?
    }

    /// Fuzzy search over title, body text, tags and folder.
    ///
    /// Documents that fail to decrypt are skipped and listed in the outcome.
    /// Bodies are only decrypted when the text field is searched.
    pub async fn search(
        &self,
        workspace: &WorkspaceId,
        query: &str,
        options: &SearchOptions,
    ) -> IndexResult<SearchOutcome> {
        if query.trim().is_empty() {
            return Ok(SearchOutcome::default());
        }

        let documents = self.fetch(self.source.fetch_workspace(workspace)).await?;
        let candidates = documents.len();
        let fields = options.active_fields();

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        if options.needs_body() {
            let (opened, failed) = self.session.open_all(documents).await?;
            skipped = failed;
            for OpenedDocument { document, body } in opened {
                let text = body.plain_text();
                results.extend(self.score(&document, Some(&text), query, &fields));
            }
        } else {
            for document in &documents {
                results.extend(self.score(document, None, query, &fields));
            }
        }

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        let total_matches = results.len();
        results.truncate(options.limit.unwrap_or(self.config.max_results));

        debug!(
            workspace = %workspace,
            candidates,
            matches = total_matches,
            skipped = skipped.len(),
            "Search complete"
        );
        Ok(SearchOutcome {
            results,
            total_matches,
            skipped,
        })
    }

    fn score(
        &self,
        document: &EncryptedDocument,
        text: Option<&str>,
        query: &str,
        fields: &[SearchField],
    ) -> Option<SearchResult> {
        let metadata = &document.metadata;
        let mut score = 0.0;
        let mut highlights = Vec::new();

        for &field in fields {
            let Some((field_score, highlight)) = match_field(field, metadata, text, query) else {
                continue;
            };
            score += f64::from(field_score) * self.config.weight(field);
            highlights.push(highlight);
        }

        if score <= 0.0 {
            return None;
        }
        Some(SearchResult {
            document_id: document.id.clone(),
            title: metadata.title.clone(),
            score,
            highlights,
        })
    }

    /// Documents whose body references `title` as `[[title]]` or
    /// `[[title|...]]`, excluding `document_id` itself.
    pub async fn backlinks(
        &self,
        workspace: &WorkspaceId,
        document_id: &DocumentId,
        title: &str,
    ) -> IndexResult<BacklinkOutcome> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(BacklinkOutcome::default());
        }

        let candidates = self
            .fetch(self.source.fetch_backlink_candidates(workspace, title))
            .await?
            .into_iter()
            .filter(|d| &d.id != document_id)
            .collect::<Vec<_>>();
        let scanned = candidates.len();

        let (opened, skipped) = self.session.open_all(candidates).await?;
        let mut backlinks: Vec<Backlink> = opened
            .into_iter()
            .filter_map(|OpenedDocument { document, body }| {
                let contexts = body.references_to(title);
                (!contexts.is_empty()).then(|| Backlink {
                    document_id: document.id,
                    title: document.metadata.title,
                    contexts,
                })
            })
            .collect();
        backlinks.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.document_id.cmp(&b.document_id))
        });

        debug!(
            workspace = %workspace,
            scanned,
            found = backlinks.len(),
            skipped = skipped.len(),
            "Backlink scan complete"
        );
        Ok(BacklinkOutcome { backlinks, skipped })
    }
}

fn match_field(
    field: SearchField,
    metadata: &DocumentMetadata,
    text: Option<&str>,
    query: &str,
) -> Option<(u32, Highlight)> {
    let (value, found) = match field {
        SearchField::Title => (metadata.title.clone(), fuzzy_match(query, &metadata.title)?),
        SearchField::Folder => {
            let folder = metadata.folder.as_deref()?;
            (folder.to_string(), fuzzy_match(query, folder)?)
        }
        SearchField::Tags => metadata
            .tags
            .iter()
            .filter_map(|tag| fuzzy_match(query, tag).map(|m| (tag.clone(), m)))
            .max_by_key(|(_, m)| m.score)?,
        SearchField::Text => {
            let text = text?;
            let found = fuzzy_match(query, text)?;
            let (snippet, positions) = snippet(text, &found.positions);
            return Some((
                found.score,
                Highlight {
                    field,
                    value: snippet,
                    positions,
                },
            ));
        }
    };
    Some((
        found.score,
        Highlight {
            field,
            value,
            positions: found.positions,
        },
    ))
}

/// Cuts a window of `text` around the first matched position and rebases
/// positions onto it.
fn snippet(text: &str, positions: &[usize]) -> (String, Vec<usize>) {
    let chars: Vec<char> = text.chars().collect();
    let first = positions.first().copied().unwrap_or(0);
    let start = first.saturating_sub(SNIPPET_LEAD);
    let end = (start + SNIPPET_MAX).min(chars.len());

    let value = chars[start..end]
        .iter()
        .map(|&c| if c == '\n' { ' ' } else { c })
        .collect();
    let positions = positions
        .iter()
        .filter(|&&p| p >= start && p < end)
        .map(|&p| p - start)
        .collect();
    (value, positions)
}
