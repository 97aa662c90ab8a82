//! `[[Title]]` and `[[Title|Display]]` reference extraction.

use crate::block::{Block, DocumentBody};
use std::collections::HashSet;

/// A wiki reference and the text of the block it appears in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// Referenced title, trimmed, case preserved.
    pub target: String,
    /// Plain text of the enclosing block.
    pub context: String,
}

/// Extracts wiki-link targets from a piece of text, in order of appearance.
///
/// `[[Target|Display]]` yields `Target`. Empty targets, unterminated
/// brackets and links spanning lines are ignored.
pub fn parse_wiki_links(text: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("[[") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("]]") else {
            break;
        };
        let inner = &after[..end];

        // A nested opener means this one was not a link; retry from there.
        if let Some(nested) = inner.rfind("[[") {
            rest = &after[nested..];
            continue;
        }

        if !inner.contains('\n') {
            let target = inner.split('|').next().unwrap_or_default().trim();
            if !target.is_empty() {
                targets.push(target.to_string());
            }
        }
        rest = &after[end + 2..];
    }
    targets
}

impl DocumentBody {
    /// Every wiki reference in document order, with its block context.
    pub fn link_occurrences(&self) -> Vec<LinkOccurrence> {
        self.walk()
            .filter(|block| block.carries_links())
            .flat_map(block_occurrences)
            .collect()
    }

    /// Distinct link targets, first occurrence first.
    pub fn links(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.link_occurrences()
            .into_iter()
            .map(|occ| occ.target)
            .filter(|target| seen.insert(target.clone()))
            .collect()
    }

    /// Context snippets of the blocks referencing `title`, compared trimmed
    /// and case-insensitively. Each block appears at most once.
    pub fn references_to(&self, title: &str) -> Vec<String> {
        let wanted = title.trim().to_lowercase();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut contexts: Vec<String> = Vec::new();
        for occ in self.link_occurrences() {
            if occ.target.to_lowercase() == wanted && contexts.last() != Some(&occ.context) {
                contexts.push(occ.context);
            }
        }
        contexts
    }
}

fn block_occurrences(block: &Block) -> Vec<LinkOccurrence> {
    let text = block.own_text();
    parse_wiki_links(&text)
        .into_iter()
        .map(|target| LinkOccurrence {
            target,
            context: text.clone(),
        })
        .collect()
}
