//! Block segmentation
//!
//! Splits a document into the block-level structures RecipeMD cares about:
//! headings, thematic breaks, list items, fenced code and paragraphs. Each
//! block remembers the source lines it came from so regions of the document
//! can be reproduced verbatim.
//!
//! This is deliberately not a CommonMark implementation. Notably a `---` line
//! directly under a paragraph is a thematic break, never a setext heading.

/// What a block is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading { level: u8, text: String },
    Rule,
    ListItem { text: String },
    Paragraph { text: String },
    Code,
}

/// A block and the half-open range of source lines it spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub start_line: usize,
    pub end_line: usize,
}

/// Splits `text` into blocks
pub fn segment(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_blank(line) {
            i += 1;
            continue;
        }

        if let Some(fence) = fence_marker(line) {
            let mut end = i + 1;
            while end < lines.len() && !closes_fence(lines[end], fence) {
                end += 1;
            }
            let end = (end + 1).min(lines.len());
            blocks.push(Block {
                kind: BlockKind::Code,
                start_line: i,
                end_line: end,
            });
            i = end;
            continue;
        }

        if is_rule(line) {
            blocks.push(Block {
                kind: BlockKind::Rule,
                start_line: i,
                end_line: i + 1,
            });
            i += 1;
            continue;
        }

        if let Some((level, text)) = atx_heading(line) {
            blocks.push(Block {
                kind: BlockKind::Heading { level, text },
                start_line: i,
                end_line: i + 1,
            });
            i += 1;
            continue;
        }

        if let Some(text) = list_item(line) {
            let mut content = text.to_string();
            let mut end = i + 1;
            while end < lines.len() && is_item_continuation(lines[end]) {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(lines[end].trim());
                end += 1;
            }
            blocks.push(Block {
                kind: BlockKind::ListItem { text: content },
                start_line: i,
                end_line: end,
            });
            i = end;
            continue;
        }

        let mut end = i + 1;
        let mut setext = false;
        while end < lines.len() {
            let next = lines[end];
            if is_setext_underline(next) {
                setext = true;
                break;
            }
            if starts_new_block(next) {
                break;
            }
            end += 1;
        }

        let text = lines[i..end]
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");

        if setext {
            blocks.push(Block {
                kind: BlockKind::Heading { level: 1, text },
                start_line: i,
                end_line: end + 1,
            });
            i = end + 1;
        } else {
            blocks.push(Block {
                kind: BlockKind::Paragraph { text },
                start_line: i,
                end_line: end,
            });
            i = end;
        }
    }

    blocks
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn starts_new_block(line: &str) -> bool {
    is_blank(line)
        || is_rule(line)
        || atx_heading(line).is_some()
        || list_item(line).is_some()
        || fence_marker(line).is_some()
}

/// `---`, `***`, `___` (three or more, spaces allowed between)
pub fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(marker, '-' | '*' | '_') {
        return false;
    }

    let mut count = 0;
    for c in trimmed.chars() {
        if c == marker {
            count += 1;
        } else if c != ' ' && c != '\t' {
            return false;
        }
    }
    count >= 3
}

/// `# Title` through `###### Title`, with optional closing hashes
fn atx_heading(line: &str) -> Option<(u8, String)> {
    let trimmed = line.trim_start();
    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    let text = rest.trim();
    let without_closing = text.trim_end_matches('#');
    let text = if without_closing.is_empty() || without_closing.ends_with([' ', '\t']) {
        without_closing.trim_end()
    } else {
        text
    };

    Some((level as u8, text.to_string()))
}

/// `- item`, `* item`, `+ item`, `1. item`, `1) item`
fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let mut chars = trimmed.char_indices();
    let (_, first) = chars.next()?;

    let marker_len = if matches!(first, '-' | '*' | '+') {
        1
    } else {
        let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || digits > 9 {
            return None;
        }
        match trimmed.as_bytes().get(digits) {
            Some(b'.') | Some(b')') => digits + 1,
            _ => return None,
        }
    };

    let rest = &trimmed[marker_len..];
    if rest.is_empty() {
        return Some("");
    }
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim())
}

fn is_item_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !is_blank(line) && !starts_new_block(line)
}

fn is_setext_underline(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '=')
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn closes_fence(line: &str, fence: &str) -> bool {
    line.trim().starts_with(fence)
}
