//! Plain text to block tree.
//!
//! A light line syntax: `#` headings, `-`/`*` bullets (nested by two-space
//! indent), `1.` numbered items, `- [ ]`/`- [x]` checklist items, `>`
//! quotes, fenced code, `---` dividers. Everything else is a paragraph.

use inkvault_model::{Block, BlockKind, DocumentBody, Inline};

/// Parses `input` as a JSON block tree if it is one, otherwise as text.
pub fn parse_body(input: &str) -> DocumentBody {
    if input.trim_start().starts_with('[') {
        if let Ok(body) = DocumentBody::from_json(input.as_bytes()) {
            return body;
        }
    }
    parse_text(input)
}

pub fn parse_text(input: &str) -> DocumentBody {
    // (indent, block) for every open list item, outermost first.
    let mut open: Vec<(usize, Block)> = Vec::new();
    let mut blocks: Vec<Block> = Vec::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        let indent = line.len() - line.trim_start_matches(' ').len();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let block = if let Some(fence) = trimmed.strip_prefix("```") {
            let mut code = Vec::new();
            for inner in lines.by_ref() {
                if inner.trim() == "```" {
                    break;
                }
                code.push(inner);
            }
            let language = fence.trim();
            Block::new(BlockKind::Code {
                language: (!language.is_empty()).then(|| language.to_string()),
                content: code.join("\n"),
            })
        } else if trimmed == "---" {
            Block::new(BlockKind::Divider)
        } else if let Some(heading) = heading(trimmed) {
            heading
        } else if let Some(rest) = trimmed.strip_prefix("> ") {
            Block::new(BlockKind::Quote {
                content: vec![Inline::text(rest)],
            })
        } else if let Some(item) = list_item(trimmed) {
            close_deeper(&mut open, &mut blocks, indent);
            open.push((indent, item));
            continue;
        } else {
            Block::paragraph(trimmed)
        };

        close_deeper(&mut open, &mut blocks, 0);
        blocks.push(block);
    }

    close_deeper(&mut open, &mut blocks, 0);
    DocumentBody::new(blocks)
}

fn heading(line: &str) -> Option<Block> {
    let level = line.chars().take_while(|&c| c == '#').count();
    let rest = &line[level..];
    if level == 0 || level > 6 || !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    Some(Block::heading(level as u8, rest.trim()))
}

fn list_item(line: &str) -> Option<Block> {
    for marker in ["- ", "* "] {
        if let Some(rest) = line.strip_prefix(marker) {
            for (checkbox, checked) in [("[ ] ", false), ("[x] ", true), ("[X] ", true)] {
                if let Some(text) = rest.strip_prefix(checkbox) {
                    return Some(Block::new(BlockKind::CheckListItem {
                        checked,
                        content: vec![Inline::text(text)],
                    }));
                }
            }
            return Some(Block::bullet(rest));
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return Some(Block::new(BlockKind::NumberedListItem {
                content: vec![Inline::text(rest)],
            }));
        }
    }
    None
}

/// Closes open list items indented at or beyond `indent`, attaching each to
/// its parent item or to the top level.
fn close_deeper(open: &mut Vec<(usize, Block)>, blocks: &mut Vec<Block>, indent: usize) {
    while open.last().is_some_and(|(depth, _)| *depth >= indent) {
        let Some((_, item)) = open.pop() else {
            break;
        };
        match open.last_mut() {
            Some((_, parent)) => parent.children.push(item),
            None => blocks.push(item),
        }
    }
}
