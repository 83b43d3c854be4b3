//! Block-level stylesheet reader.
//!
//! Splits source text into the node kinds the inliner cares about without
//! fully parsing CSS: `@import` statements, at-rules with a block
//! (conditional groups, recursed into), and everything else as verbatim
//! slices. Comments and strings are tracked so braces and semicolons
//! inside them never terminate a statement.

use super::{Document, NodeId, NodeKind, SourceInfo};
use crate::error::Error;
use std::path::Path;

/// Parse stylesheet text into a [`Document`].
///
/// `from` is the path of the originating file; it is recorded on every
/// node for base-directory lookup and source mapping.
pub fn parse(source: &str, from: Option<&Path>) -> Result<Document, Error> {
    let mut doc = Document::new();
    let mut scanner = Scanner::new(source, from);
    let root = doc.root();
    parse_block(&mut scanner, &mut doc, root, false)?;
    Ok(doc)
}

/// How an at-rule prelude ended.
enum Terminator {
    /// `;` — statement at-rule.
    Semi,
    /// `{` — at-rule with a block.
    Brace,
    /// End of input or of the enclosing block.
    End,
}

/// Parse statements into `parent` until end of input (top level) or the
/// matching closing brace (nested). For nested blocks, returns the footer
/// slice: trailing trivia plus the closing brace.
fn parse_block(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    nested: bool,
) -> Result<String, Error> {
    loop {
        let lead_start = scanner.pos;
        scanner.skip_trivia()?;
        let lead = scanner.slice(lead_start).to_string();

        match scanner.peek() {
            None => {
                if nested {
                    return Err(scanner.error("unexpected end of input inside block"));
                }
                doc.set_tail(lead);
                return Ok(String::new());
            }
            Some('}') => {
                if !nested {
                    return Err(scanner.error("unmatched '}'"));
                }
                scanner.bump();
                return Ok(format!("{lead}}}"));
            }
            Some('@') => parse_at_rule(scanner, doc, parent, lead)?,
            Some(_) => parse_verbatim(scanner, doc, parent, nested, lead)?,
        }
    }
}

fn parse_at_rule(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    lead: String,
) -> Result<(), Error> {
    let source = scanner.source_here();
    let start = scanner.pos;
    scanner.bump(); // '@'

    let name_start = scanner.pos;
    while let Some(c) = scanner.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            scanner.bump();
        } else {
            break;
        }
    }
    let is_import = scanner.slice(name_start).eq_ignore_ascii_case("import");

    let params_start = scanner.pos;
    let mut parens: u32 = 0;
    let terminator = loop {
        match scanner.peek() {
            Some('"' | '\'') => scanner.skip_string()?,
            Some('/') if scanner.peek_second() == Some('*') => scanner.skip_comment()?,
            Some('(') => {
                parens += 1;
                scanner.bump();
            }
            Some(')') => {
                parens = parens.saturating_sub(1);
                scanner.bump();
            }
            Some(';') if parens == 0 => break Terminator::Semi,
            Some('{') if parens == 0 => break Terminator::Brace,
            Some('}') if parens == 0 => break Terminator::End,
            Some(_) => {
                scanner.bump();
            }
            None => break Terminator::End,
        }
    };
    let params = scanner.slice(params_start).trim().to_string();

    match terminator {
        Terminator::Semi | Terminator::End => {
            if matches!(terminator, Terminator::Semi) {
                scanner.bump();
            }
            let raw = scanner.slice(start).to_string();
            let kind = if is_import {
                NodeKind::Import { params, raw }
            } else {
                NodeKind::Verbatim { raw }
            };
            doc.push(parent, kind, lead, source);
        }
        Terminator::Brace => {
            scanner.bump();
            let header = scanner.slice(start).to_string();
            let group = doc.push(
                parent,
                NodeKind::Group {
                    params,
                    header,
                    footer: String::new(),
                },
                lead,
                source,
            );
            let end = parse_block(scanner, doc, group, true)?;
            if let NodeKind::Group { footer, .. } = doc.kind_mut(group) {
                *footer = end;
            }
        }
    }
    Ok(())
}

/// Scan a style rule or any other non-at-rule statement as one verbatim
/// slice: through the end of its block, or a top-level `;`, or end of
/// input.
fn parse_verbatim(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    nested: bool,
    lead: String,
) -> Result<(), Error> {
    let source = scanner.source_here();
    let start = scanner.pos;
    let mut depth: u32 = 0;

    loop {
        match scanner.peek() {
            Some('"' | '\'') => scanner.skip_string()?,
            Some('/') if scanner.peek_second() == Some('*') => scanner.skip_comment()?,
            Some('{') => {
                depth += 1;
                scanner.bump();
            }
            Some('}') => {
                if depth == 0 {
                    if !nested {
                        return Err(scanner.error("unmatched '}'"));
                    }
                    // Declaration-like content ends at the enclosing block.
                    break;
                }
                depth -= 1;
                scanner.bump();
                if depth == 0 {
                    break;
                }
            }
            Some(';') if depth == 0 => {
                scanner.bump();
                break;
            }
            Some(_) => {
                scanner.bump();
            }
            None => {
                if depth > 0 {
                    return Err(scanner.error("unclosed block"));
                }
                break;
            }
        }
    }

    let raw = scanner.slice(start).to_string();
    doc.push(parent, NodeKind::Verbatim { raw }, lead, source);
    Ok(())
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    file: Option<&'a Path>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, file: Option<&'a Path>) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 0,
            file,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn slice(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }

    fn source_here(&self) -> SourceInfo {
        SourceInfo {
            file: self.file.map(Path::to_path_buf),
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            file: self
                .file
                .map_or_else(|| "<input>".to_string(), |f| f.display().to_string()),
            line: self.line,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('*') => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), Error> {
        let opened = self.line;
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                Some('*') if self.peek_second() == Some('/') => {
                    self.bump();
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
                None => {
                    return Err(Error::Parse {
                        file: self
                            .file
                            .map_or_else(|| "<input>".to_string(), |f| f.display().to_string()),
                        line: opened,
                        message: "unterminated comment".into(),
                    })
                }
            }
        }
    }

    fn skip_string(&mut self) -> Result<(), Error> {
        let opened = self.line;
        let Some(quote) = self.bump() else {
            return Ok(());
        };
        loop {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
                None => {
                    return Err(Error::Parse {
                        file: self
                            .file
                            .map_or_else(|| "<input>".to_string(), |f| f.display().to_string()),
                        line: opened,
                        message: "unterminated string".into(),
                    })
                }
            }
        }
    }
}
