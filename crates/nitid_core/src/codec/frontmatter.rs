//! Frontmatter rendering and parsing.
//!
//! Rendering is hand-written so the header layout stays byte-stable. Parsing
//! accepts any YAML mapping for the header; unknown keys are ignored.

use crate::model::note::{
    normalize_tags, validate_all, Note, NoteKind, NoteStatus, NoteValidationError,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Line that opens and closes the header block.
pub const DELIMITER: &str = "---";

/// Parse failure for one note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Text does not start with a `---` line.
    MissingHeader,
    /// No closing `---` line after the header.
    MissingFooter,
    /// Header block cannot be decoded into the note field set.
    MalformedHeader(String),
    /// `created_at`/`updated_at` missing or not RFC 3339.
    InvalidTimestamp { field: &'static str, value: String },
    /// Decoded note fails write validation.
    InvalidNote(NoteValidationError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "missing frontmatter header: expected leading `---` line"),
            Self::MissingFooter => write!(f, "missing frontmatter footer: expected closing `---` line"),
            Self::MalformedHeader(details) => write!(f, "malformed frontmatter: {details}"),
            Self::InvalidTimestamp { field, value } if value.trim().is_empty() => {
                write!(f, "{field} is required")
            }
            Self::InvalidTimestamp { field, value } => {
                write!(f, "{field} must be RFC3339, got {value:?}")
            }
            Self::InvalidNote(err) => write!(f, "invalid note: {err}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for ParseError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

/// Formats a timestamp the way note headers store it.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a header timestamp; any RFC 3339 offset is normalized to UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp {
            field,
            value: trimmed.to_string(),
        })
}

/// Renders a note to its on-disk text.
///
/// Status is normalized and tags sorted/deduplicated before writing. The body
/// is trimmed and always followed by one newline.
pub fn render_note(note: &Note) -> String {
    let note = note.clone().normalized();
    let status = note.effective_status();

    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    push_scalar(&mut out, "id", &note.id);
    push_scalar(&mut out, "title", &note.title);
    push_scalar(&mut out, "created_at", &format_timestamp(&note.created_at));
    push_scalar(&mut out, "updated_at", &format_timestamp(&note.updated_at));
    push_scalar(&mut out, "domain", &note.domain);
    push_list(&mut out, "tags", &note.tags);
    push_scalar(&mut out, "status", status.as_str());
    push_scalar(&mut out, "kind", note.kind.as_str());
    push_list(&mut out, "links", &note.links);
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(note.body.trim());
    out.push('\n');
    out
}

/// Parses note text into a validated note.
///
/// # Errors
/// - [`ParseError::MissingHeader`] / [`ParseError::MissingFooter`] for a
///   missing delimiter line.
/// - [`ParseError::MalformedHeader`] when the header cannot be decoded.
/// - [`ParseError::InvalidTimestamp`] for absent or non-RFC 3339 timestamps.
/// - [`ParseError::InvalidNote`] with the first validation failure.
pub fn parse_note(text: &str) -> Result<Note, ParseError> {
    let normalized = text.replace("\r\n", "\n");
    let (header, body) = split_document(&normalized)?;
    let header = decode_header(header)?;

    let id = header.id.unwrap_or_default();
    let title = header.title.unwrap_or_default();
    let created_raw = header.created_at.unwrap_or_default();
    let updated_raw = header.updated_at.unwrap_or_default();
    let domain = header.domain.unwrap_or_default();
    let tags = header.tags.unwrap_or_default();
    let status_raw = header.status.unwrap_or_default();
    let kind_raw = header.kind.unwrap_or_default();
    let links = header.links.unwrap_or_default();

    let created_at = parse_timestamp("created_at", &created_raw)?;
    let updated_at = parse_timestamp("updated_at", &updated_raw)?;

    let kind = kind_raw.parse::<NoteKind>();
    let status = status_raw.parse::<NoteStatus>().ok();

    let mut note = Note {
        id: id.trim().to_string(),
        title: title.trim().to_string(),
        created_at,
        updated_at,
        domain: domain.trim().to_string(),
        tags: normalize_tags(&tags),
        status,
        kind: kind.clone().unwrap_or_default(),
        links,
        body: body.trim().to_string(),
    };

    let mut problems = validate_all(&note);
    if let Err(kind_err) = kind {
        let at = problems
            .iter()
            .position(|problem| {
                matches!(
                    problem,
                    NoteValidationError::InvalidDomain(_) | NoteValidationError::InvalidTag(_)
                )
            })
            .unwrap_or(problems.len());
        problems.insert(at, kind_err);
    }
    if let Some(first) = problems.into_iter().next() {
        return Err(ParseError::InvalidNote(first));
    }

    note.status = Some(note.effective_status());
    Ok(note)
}

fn push_scalar(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": \"");
    out.push_str(&escape(value));
    out.push_str("\"\n");
}

fn push_list(out: &mut String, key: &str, items: &[String]) {
    out.push_str(key);
    out.push_str(": ");
    if items.is_empty() {
        out.push_str("[]");
    } else {
        let quoted: Vec<String> = items
            .iter()
            .map(|item| format!("\"{}\"", escape(item)))
            .collect();
        out.push('[');
        out.push_str(&quoted.join(", "));
        out.push(']');
    }
    out.push('\n');
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Splits normalized text into (header, body) around the delimiter lines.
fn split_document(text: &str) -> Result<(&str, &str), ParseError> {
    let rest = text
        .strip_prefix("---\n")
        .ok_or(ParseError::MissingHeader)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(ParseError::MissingFooter)
}

/// Header fields as stored on disk. Missing keys and YAML nulls decode to
/// `None`; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct NoteFrontmatter {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    links: Option<Vec<String>>,
}

fn decode_header(header: &str) -> Result<NoteFrontmatter, ParseError> {
    if header.trim().is_empty() {
        return Ok(NoteFrontmatter::default());
    }
    serde_yaml::from_str(header).map_err(|err| ParseError::MalformedHeader(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = "---\n\
id: \"01JN8PX5WP8J67JAY2P2CVJH6D\"\n\
title: \"Say \\\"hi\\\" to C:\\\\temp\"\n\
created_at: \"2026-02-25T10:00:00Z\"\n\
updated_at: \"2026-02-25T11:30:00Z\"\n\
domain: \"engineering\"\n\
tags: [\"go\", \"cli\"]\n\
status: \"active\"\n\
kind: \"note\"\n\
links: []\n\
---\n\
\n\
hello world\n";

    #[test]
    fn parses_canonical_file() {
        let note = parse_note(SAMPLE).unwrap();
        assert_eq!(note.id, "01JN8PX5WP8J67JAY2P2CVJH6D");
        assert_eq!(note.title, "Say \"hi\" to C:\\temp");
        assert_eq!(
            note.created_at,
            Utc.with_ymd_and_hms(2026, 2, 25, 10, 0, 0).unwrap()
        );
        assert_eq!(note.tags, vec!["cli", "go"]);
        assert_eq!(note.status, Some(NoteStatus::Active));
        assert_eq!(note.body, "hello world");
    }

    #[test]
    fn render_of_parsed_canonical_file_is_stable() {
        let note = parse_note(SAMPLE).unwrap();
        let rendered = render_note(&note);
        assert!(rendered.contains("tags: [\"cli\", \"go\"]\n"));
        assert!(rendered.contains("title: \"Say \\\"hi\\\" to C:\\\\temp\"\n"));
        assert!(rendered.ends_with("---\n\nhello world\n"));
        assert_eq!(render_note(&parse_note(&rendered).unwrap()), rendered);
    }

    #[test]
    fn accepts_crlf_bare_values_and_block_lists() {
        let text = "---\r\nid: 01JN8PX5WP8J67JAY2P2CVJH6D\r\ntitle: Plain title # note\r\n\
created_at: 2026-02-25T10:00:00+02:00\r\nupdated_at: '2026-02-25T10:00:00Z'\r\n\
tags:\r\n  - Rust\r\n  - cli\r\nkind: adr\r\nextra: ignored\r\n---\r\nbody\r\n";
        let note = parse_note(text).unwrap();
        assert_eq!(note.title, "Plain title");
        assert_eq!(
            note.created_at,
            Utc.with_ymd_and_hms(2026, 2, 25, 8, 0, 0).unwrap()
        );
        assert_eq!(note.tags, vec!["cli", "rust"]);
        assert_eq!(note.kind, NoteKind::Adr);
        assert_eq!(note.status, Some(NoteStatus::Inbox));
        assert!(note.links.is_empty());
    }

    #[test]
    fn invalid_status_is_derived_instead_of_rejected() {
        let text = SAMPLE.replace("status: \"active\"", "status: \"someday\"");
        let note = parse_note(&text).unwrap();
        assert_eq!(note.status, Some(NoteStatus::Active));
    }

    #[test]
    fn structural_failures_are_distinguished() {
        assert_eq!(parse_note("no header"), Err(ParseError::MissingHeader));
        assert_eq!(
            parse_note("---\nid: \"x\"\n"),
            Err(ParseError::MissingFooter)
        );
        assert!(matches!(
            parse_note("---\nid \"x\"\n---\n"),
            Err(ParseError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_note("---\ntitle: \"open\n---\n"),
            Err(ParseError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_note("---\ntitle: a\ntitle: b\n---\n"),
            Err(ParseError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_note("---\ntags: \"go\"\n---\n"),
            Err(ParseError::MalformedHeader(_))
        ));
    }

    #[test]
    fn timestamps_are_required_and_rfc3339() {
        let missing = SAMPLE.replace("created_at: \"2026-02-25T10:00:00Z\"\n", "");
        assert_eq!(
            parse_note(&missing),
            Err(ParseError::InvalidTimestamp {
                field: "created_at",
                value: String::new(),
            })
        );

        let bad = SAMPLE.replace("2026-02-25T11:30:00Z", "yesterday");
        assert!(matches!(
            parse_note(&bad),
            Err(ParseError::InvalidTimestamp {
                field: "updated_at",
                ..
            })
        ));
    }

    #[test]
    fn invalid_content_surfaces_as_invalid_note() {
        let bad_kind = SAMPLE.replace("kind: \"note\"", "kind: \"journal\"");
        assert_eq!(
            parse_note(&bad_kind),
            Err(ParseError::InvalidNote(NoteValidationError::InvalidKind(
                "journal".to_string()
            )))
        );

        let bad_domain = SAMPLE.replace("\"engineering\"", "\"Engineering Team\"");
        assert!(matches!(
            parse_note(&bad_domain),
            Err(ParseError::InvalidNote(NoteValidationError::InvalidDomain(_)))
        ));

        let empty_title = SAMPLE.replace("title: \"Say \\\"hi\\\" to C:\\\\temp\"", "title: \"  \"");
        assert_eq!(
            parse_note(&empty_title),
            Err(ParseError::InvalidNote(NoteValidationError::EmptyTitle))
        );
    }

    #[test]
    fn body_may_contain_delimiter_lines() {
        let text = SAMPLE.replace("hello world\n", "intro\n\n---\n\noutro\n");
        let note = parse_note(&text).unwrap();
        assert_eq!(note.body, "intro\n\n---\n\noutro");
    }

    #[test]
    fn accepts_yaml_flow_lists_and_quoting_styles() {
        let text = SAMPLE.replace(
            "tags: [\"go\", \"cli\"]",
            "tags: [\"a-b\", 'it', bare , \"q\"]",
        );
        assert_eq!(parse_note(&text).unwrap().tags, vec!["a-b", "bare", "it", "q"]);

        let multiline = SAMPLE.replace(
            "tags: [\"go\", \"cli\"]",
            "tags: [\n  \"go\",\n  \"cli\"\n]",
        );
        assert_eq!(parse_note(&multiline).unwrap().tags, vec!["cli", "go"]);
    }

    #[test]
    fn ignores_nested_unknown_keys() {
        let text = SAMPLE.replace("links: []\n", "links: []\nextra:\n  nested: 1\n");
        assert_eq!(parse_note(&text).unwrap().id, "01JN8PX5WP8J67JAY2P2CVJH6D");
    }

    #[test]
    fn decodes_unicode_escapes_in_quoted_scalars() {
        let text = SAMPLE.replace(
            "title: \"Say \\\"hi\\\" to C:\\\\temp\"",
            "title: \"Caf\\u00e9 notes\"",
        );
        assert_eq!(parse_note(&text).unwrap().title, "Caf\u{e9} notes");
    }

    #[test]
    fn null_values_read_as_empty() {
        let text = SAMPLE
            .replace("domain: \"engineering\"", "domain: ~")
            .replace("links: []", "links:");
        let note = parse_note(&text).unwrap();
        assert_eq!(note.domain, "");
        assert!(note.links.is_empty());
        assert_eq!(note.status, Some(NoteStatus::Active));
    }

    #[test]
    fn timestamp_format_uses_whole_seconds_and_z() {
        let value = Utc.with_ymd_and_hms(2026, 2, 25, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(&value), "2026-02-25T10:00:00Z");
        assert_eq!(parse_timestamp("created_at", "2026-02-25T10:00:00Z").unwrap(), value);
    }
}
