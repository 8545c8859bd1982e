//! Gettext `.po` catalogs kept as their original lines.
//!
//! Parsing records where each entry's `msgstr` lives in the file. Rendering
//! re-emits every other line untouched (header fields, translator comments,
//! flags, obsolete `#~` entries), so only the translations that were set change.

use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

fn syntax(index: usize, message: impl Into<String>) -> PoError {
    PoError::Syntax {
        line: index + 1,
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoEntry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// Singular translation; always empty for plural entries.
    pub msgstr: String,
    msgstr_lines: Range<usize>,
    replacement: Option<Vec<String>>,
}

impl PoEntry {
    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// The `msgid ""` entry carrying the catalog metadata.
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct PoDocument {
    lines: Vec<String>,
    entries: Vec<PoEntry>,
    newline: &'static str,
    trailing_newline: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    MsgstrPlural,
}

#[derive(Default)]
struct Pending {
    first_line: usize,
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    msgstr_lines: Option<Range<usize>>,
    plural_forms: bool,
}

impl Pending {
    fn started(&self) -> bool {
        self.msgctxt.is_some() || self.msgid.is_some() || self.msgstr.is_some() || self.plural_forms
    }

    fn has_translation(&self) -> bool {
        self.msgstr.is_some() || self.plural_forms
    }

    fn finish(&mut self, entries: &mut Vec<PoEntry>) -> Result<(), PoError> {
        let pending = std::mem::take(self);
        if !pending.started() {
            return Ok(());
        }

        let msgid = pending
            .msgid
            .ok_or_else(|| syntax(pending.first_line, "entry without msgid"))?;

        if pending.msgid_plural.is_some() != pending.plural_forms {
            return Err(syntax(
                pending.first_line,
                "msgid_plural and msgstr[n] must appear together",
            ));
        }

        if pending.msgstr.is_none() && !pending.plural_forms {
            return Err(syntax(pending.first_line, "msgid without msgstr"));
        }

        entries.push(PoEntry {
            msgctxt: pending.msgctxt,
            msgid,
            msgid_plural: pending.msgid_plural,
            msgstr: pending.msgstr.unwrap_or_default(),
            msgstr_lines: pending.msgstr_lines.unwrap_or(0..0),
            replacement: None,
        });
        Ok(())
    }
}

impl PoDocument {
    pub fn parse(content: &str) -> Result<Self, PoError> {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let mut entries = Vec::new();
        let mut pending = Pending::default();
        let mut field: Option<Field> = None;

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim();

            // blank line ends the entry
            if line.is_empty() {
                pending.finish(&mut entries)?;
                field = None;
                continue;
            }

            // comments (including obsolete #~ entries) are kept verbatim
            if line.starts_with('#') {
                if pending.has_translation() {
                    pending.finish(&mut entries)?;
                }
                field = None;
                continue;
            }

            if let Some(rest) = line.strip_prefix("msgctxt ") {
                if pending.started() {
                    pending.finish(&mut entries)?;
                }
                pending.first_line = idx;
                pending.msgctxt = Some(unquote(rest, idx)?);
                field = Some(Field::Msgctxt);
            } else if let Some(rest) = line.strip_prefix("msgid_plural ") {
                pending.msgid_plural = Some(unquote(rest, idx)?);
                field = Some(Field::MsgidPlural);
            } else if let Some(rest) = line.strip_prefix("msgid ") {
                if pending.msgid.is_some() || pending.has_translation() {
                    pending.finish(&mut entries)?;
                }
                if !pending.started() {
                    pending.first_line = idx;
                }
                pending.msgid = Some(unquote(rest, idx)?);
                field = Some(Field::Msgid);
            } else if let Some(rest) = line.strip_prefix("msgstr[") {
                let (_, quoted) = rest
                    .split_once(']')
                    .ok_or_else(|| syntax(idx, "unterminated msgstr index"))?;
                unquote(quoted, idx)?;
                if !pending.started() {
                    pending.first_line = idx;
                }
                pending.plural_forms = true;
                field = Some(Field::MsgstrPlural);
            } else if let Some(rest) = line.strip_prefix("msgstr ") {
                if !pending.started() {
                    pending.first_line = idx;
                }
                pending.msgstr = Some(unquote(rest, idx)?);
                pending.msgstr_lines = Some(idx..idx + 1);
                field = Some(Field::Msgstr);
            } else if line.starts_with('"') {
                let text = unquote(line, idx)?;
                let target = match field {
                    Some(Field::Msgctxt) => pending.msgctxt.as_mut(),
                    Some(Field::Msgid) => pending.msgid.as_mut(),
                    Some(Field::MsgidPlural) => pending.msgid_plural.as_mut(),
                    Some(Field::Msgstr) => {
                        if let Some(range) = pending.msgstr_lines.as_mut() {
                            range.end = idx + 1;
                        }
                        pending.msgstr.as_mut()
                    }
                    Some(Field::MsgstrPlural) => continue,
                    None => return Err(syntax(idx, "string continuation outside an entry")),
                };
                if let Some(value) = target {
                    value.push_str(&text);
                }
            } else {
                return Err(syntax(idx, format!("unrecognized line: {line}")));
            }
        }

        pending.finish(&mut entries)?;

        Ok(PoDocument {
            lines,
            entries,
            newline: if content.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: content.ends_with('\n'),
        })
    }

    pub fn entries(&self) -> &[PoEntry] {
        &self.entries
    }

    /// Replaces the singular translation of entry `index`.
    ///
    /// Returns false for plural entries and out-of-range indices.
    pub fn set_msgstr(&mut self, index: usize, text: &str) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if !entry.is_plural() && !entry.msgstr_lines.is_empty() => {
                entry.msgstr = text.to_string();
                entry.replacement = Some(format_msgstr(text));
                true
            }
            _ => false,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.entries.iter().any(|e| e.replacement.is_some())
    }

    pub fn render(&self) -> String {
        let mut edits = self
            .entries
            .iter()
            .filter_map(|e| e.replacement.as_ref().map(|r| (e.msgstr_lines.clone(), r)))
            .peekable();

        let mut out: Vec<&str> = Vec::with_capacity(self.lines.len());
        let mut i = 0;
        while i < self.lines.len() {
            if let Some((range, replacement)) = edits.next_if(|(range, _)| range.start == i) {
                out.extend(replacement.iter().map(String::as_str));
                i = range.end;
                continue;
            }
            out.push(&self.lines[i]);
            i += 1;
        }

        let mut text = out.join(self.newline);
        if self.trailing_newline {
            text.push_str(self.newline);
        }
        text
    }
}

/// Gettext layout: one line, or `msgstr ""` followed by one line per `\n`.
fn format_msgstr(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = text.split_inclusive('\n').collect();
    if pieces.len() <= 1 {
        return vec![format!("msgstr \"{}\"", escape(text))];
    }

    let mut lines = Vec::with_capacity(pieces.len() + 1);
    lines.push("msgstr \"\"".to_string());
    lines.extend(pieces.iter().map(|p| format!("\"{}\"", escape(p))));
    lines
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Strips the surrounding quotes and resolves escapes in a single pass, so
/// `\\n` stays a backslash followed by `n`.
fn unquote(s: &str, index: usize) -> Result<String, PoError> {
    let s = s.trim();
    let inner = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| syntax(index, format!("expected a quoted string, found {s}")))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    Ok(result)
}
