//! The `.stowconfig` rule language parser.
//!
//! Grammar (line-oriented, UTF-8):
//!
//! ```text
//! // full-line comment
//! pattern                     ignore entry (leading section)
//! !!pattern                   un-ignore entry
//! [ignore]                    optional explicit header for the leading section
//! [redirect]                  switches to the redirect section (at most once)
//! source ::: destination      redirect entry (quotes on either side stripped)
//! [if-pkg:::s1 s2]            conditional block header
//! [if-not-pkg:::…]            …
//! [if-profile:::…]            …
//! [if-not-profile:::…]        …
//! [end]                       closes the open conditional block
//! ```
//!
//! Comments are full-line only: a `//` that trails content on a data line is
//! part of the data. Parsing collects irregularities as diagnostics instead
//! of failing, so the caller decides fatality (`--enforce-integrity`).

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::error::{ParseError, ParseErrorKind};

use super::rules::{
    BlockKind, BodyEntry, ConditionalBlock, IgnoreEntry, RedirectEntry, RuleEntry, RuleSet, Section,
};

/// File name the engine looks for at every directory level.
pub const CONFIG_FILE_NAME: &str = ".stowconfig";

const COMMENT_PREFIX: &str = "//";
const UNIGNORE_PREFIX: &str = "!!";
const REDIRECT_DELIMITER: &str = ":::";
const IGNORE_HEADER: &str = "[ignore]";
const REDIRECT_HEADER: &str = "[redirect]";
const END_HEADER: &str = "[end]";

/// Result of parsing one config file: the rule set plus any diagnostics.
///
/// Diagnostics are recoverable by default — each offending entry has been
/// dropped from `rules`. Under `--enforce-integrity` the caller treats the
/// first diagnostic as fatal.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// The order-preserving rule program.
    pub rules: RuleSet,
    /// Irregularities encountered, in source order.
    pub diagnostics: Vec<ParseError>,
}

/// A conditional block currently being collected.
struct OpenBlock {
    kind: BlockKind,
    subjects: Vec<String>,
    body: Vec<BodyEntry>,
    section: Section,
    origin_line: u32,
    /// Set when the header was invalid; body lines are consumed but dropped.
    discard: bool,
}

/// Parse a `.stowconfig` file from disk.
///
/// # Errors
///
/// Returns an error only if the file cannot be read; grammar problems are
/// reported as diagnostics on the returned [`Parsed`].
pub fn parse_file(path: &Path) -> Result<Parsed> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_str(&content))
}

/// Parse config content from a string.
#[must_use]
pub fn parse_str(content: &str) -> Parsed {
    let mut parsed = Parsed::default();
    let mut section = Section::Ignore;
    let mut redirect_seen = false;
    let mut block: Option<OpenBlock> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = saturating_line(idx);
        let line = raw.trim();

        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let header = classify_header(line);

        // Inside a block, only [end] and body lines are legal. Any other
        // header means the block was never closed: report it, drop the
        // block, and let the header be handled normally below.
        if block.is_some() {
            match header {
                Header::End => {
                    if let Some(open) = block.take()
                        && !open.discard
                    {
                        parsed.rules.entries.push(RuleEntry::Block(ConditionalBlock {
                            kind: open.kind,
                            subjects: open.subjects,
                            body: open.body,
                            section: open.section,
                            origin_line: open.origin_line,
                        }));
                    }
                    continue;
                }
                Header::None => {
                    if let Some(open) = block.as_mut()
                        && !open.discard
                    {
                        push_body_entry(open, line, line_no, &mut parsed.diagnostics);
                    }
                    continue;
                }
                _ => {
                    if let Some(open) = block.take() {
                        parsed.diagnostics.push(ParseError {
                            line: line_no,
                            kind: ParseErrorKind::UnclosedBlock {
                                opened_at: open.origin_line,
                            },
                        });
                    }
                    // fall through: the header itself is processed below
                }
            }
        }

        match header {
            Header::Redirect => {
                if redirect_seen {
                    parsed.diagnostics.push(ParseError {
                        line: line_no,
                        kind: ParseErrorKind::DuplicateRedirectHeader,
                    });
                } else {
                    redirect_seen = true;
                    section = Section::Redirect;
                }
            }
            Header::Ignore => {
                if section == Section::Redirect {
                    parsed.diagnostics.push(ParseError {
                        line: line_no,
                        kind: ParseErrorKind::IgnoreHeaderAfterRedirect,
                    });
                }
                // Otherwise an explicit no-op: the leading section is
                // already the ignore section.
            }
            Header::End => {
                parsed.diagnostics.push(ParseError {
                    line: line_no,
                    kind: ParseErrorKind::StrayEnd,
                });
            }
            Header::Block(kind, subjects) => {
                let discard = subjects.is_empty();
                if discard {
                    parsed.diagnostics.push(ParseError {
                        line: line_no,
                        kind: ParseErrorKind::EmptyBlockSubjects,
                    });
                }
                block = Some(OpenBlock {
                    kind,
                    subjects,
                    body: Vec::new(),
                    section,
                    origin_line: line_no,
                    discard,
                });
            }
            Header::None => match section {
                Section::Ignore => {
                    parsed
                        .rules
                        .entries
                        .push(RuleEntry::Ignore(parse_ignore_line(line, line_no)));
                }
                Section::Redirect => match parse_redirect_line(line, line_no) {
                    Some(entry) => parsed.rules.entries.push(RuleEntry::Redirect(entry)),
                    None => parsed.diagnostics.push(ParseError {
                        line: line_no,
                        kind: ParseErrorKind::MalformedRedirect {
                            entry: line.to_string(),
                        },
                    }),
                },
            },
        }
    }

    if let Some(open) = block {
        parsed.diagnostics.push(ParseError {
            line: saturating_line(content.lines().count()),
            kind: ParseErrorKind::UnclosedBlock {
                opened_at: open.origin_line,
            },
        });
    }

    parsed
}

/// The header kind of a trimmed line, if any.
enum Header {
    Ignore,
    Redirect,
    End,
    Block(BlockKind, Vec<String>),
    None,
}

fn classify_header(line: &str) -> Header {
    match line {
        IGNORE_HEADER => return Header::Ignore,
        REDIRECT_HEADER => return Header::Redirect,
        END_HEADER => return Header::End,
        _ => {}
    }

    let block_prefixes = [
        ("[if-pkg:::", BlockKind::PkgPresent),
        ("[if-not-pkg:::", BlockKind::PkgAbsent),
        ("[if-profile:::", BlockKind::ProfileIs),
        ("[if-not-profile:::", BlockKind::ProfileIsNot),
    ];
    for (prefix, kind) in block_prefixes {
        if let Some(rest) = line.strip_prefix(prefix)
            && let Some(subjects) = rest.strip_suffix(']')
        {
            let subjects = subjects
                .split_whitespace()
                .map(|s| strip_quotes(s).to_string())
                .collect();
            return Header::Block(kind, subjects);
        }
    }

    Header::None
}

fn push_body_entry(open: &mut OpenBlock, line: &str, line_no: u32, diags: &mut Vec<ParseError>) {
    match open.section {
        Section::Ignore => open
            .body
            .push(BodyEntry::Ignore(parse_ignore_line(line, line_no))),
        Section::Redirect => match parse_redirect_line(line, line_no) {
            Some(entry) => open.body.push(BodyEntry::Redirect(entry)),
            None => diags.push(ParseError {
                line: line_no,
                kind: ParseErrorKind::MalformedRedirect {
                    entry: line.to_string(),
                },
            }),
        },
    }
}

fn parse_ignore_line(line: &str, line_no: u32) -> IgnoreEntry {
    let (pattern, negate) = line
        .strip_prefix(UNIGNORE_PREFIX)
        .map_or((line, false), |rest| (rest, true));
    IgnoreEntry {
        pattern: strip_quotes(pattern.trim()).to_string(),
        negate,
        origin_line: line_no,
    }
}

/// Parse `source ::: destination`; `None` if the line fails the shape.
fn parse_redirect_line(line: &str, line_no: u32) -> Option<RedirectEntry> {
    let (lhs, rhs) = line.split_once(REDIRECT_DELIMITER)?;
    if rhs.contains(REDIRECT_DELIMITER) {
        return None;
    }
    let source = strip_quotes(lhs.trim());
    let dest = strip_quotes(rhs.trim());
    if source.is_empty() || dest.is_empty() {
        return None;
    }
    Some(RedirectEntry {
        source_pattern: source.to_string(),
        dest_pattern: dest.to_string(),
        origin_line: line_no,
    })
}

/// Strip one pair of matching surrounding quotes, if present.
fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2
            && let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}

/// Convert a 0-based line index to a 1-based `u32` without overflow.
fn saturating_line(idx: usize) -> u32 {
    u32::try_from(idx.saturating_add(1)).unwrap_or(u32::MAX)
}
