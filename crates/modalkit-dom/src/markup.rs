#![forbid(unsafe_code)]

//! Markup micro-parser for dialog templates.
//!
//! Supports the subset templates actually need: nested elements,
//! double-quoted attributes, bare (boolean) attributes, text with the five
//! standard entities, self-closing tags, and the void tags `input`, `br`,
//! `hr`, and `img`. Anything else is a [`MarkupError`], surfaced to the
//! caller of the dialog-opening operation at mount time.
//!
//! # Invariants
//!
//! 1. `parse_fragment` never panics on any input. Element nesting is
//!    capped at [`MAX_DEPTH`]; deeper input is a [`MarkupError::TooDeep`],
//!    not a blown stack.
//! 2. Whitespace-only text between tags is dropped; all other text is kept
//!    verbatim after entity decoding.
//! 3. `escape_text(s)` parsed back as text yields `s` (round trip).

use std::fmt;

/// Parsed markup tree, not yet bound to a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

/// Failure while parsing a template string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupError {
    /// Input ended inside a tag or before a close tag.
    UnexpectedEof,
    /// A character that cannot start or continue the current token.
    InvalidToken { at: usize },
    /// Close tag did not match the innermost open element.
    MismatchedClose {
        expected: Option<String>,
        found: String,
    },
    /// Elements nested deeper than [`MAX_DEPTH`].
    TooDeep,
    /// The template must consist of exactly one root element.
    ExpectedSingleRoot,
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "markup ended unexpectedly"),
            Self::InvalidToken { at } => write!(f, "invalid markup at offset {at}"),
            Self::MismatchedClose { expected, found } => match expected {
                Some(tag) => write!(f, "expected </{tag}>, found </{found}>"),
                None => write!(f, "close tag </{found}> without open tag"),
            },
            Self::TooDeep => write!(f, "markup nested deeper than {MAX_DEPTH} levels"),
            Self::ExpectedSingleRoot => write!(f, "template must have exactly one root element"),
        }
    }
}

impl std::error::Error for MarkupError {}

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img"];

/// Maximum element nesting. Parsing recurses per level, so the cap keeps
/// hostile input from exhausting the stack. Real templates are a handful
/// of levels deep.
pub const MAX_DEPTH: usize = 64;

/// Escape text for safe embedding in markup.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let decoded = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&#39;", '\''),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));
        match decoded {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                // Unknown entity: keep the ampersand literally, like lenient hosts do.
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse a fragment: zero or more sibling nodes.
pub fn parse_fragment(input: &str) -> Result<Vec<MarkupNode>, MarkupError> {
    let mut parser = Parser::new(input);
    let nodes = parser.parse_siblings(None)?;
    if !parser.at_end() {
        // Only reachable via a stray close tag at top level.
        let found = parser.read_close_tag()?;
        return Err(MarkupError::MismatchedClose {
            expected: None,
            found,
        });
    }
    Ok(nodes)
}

/// Parse a template that must consist of exactly one root element.
pub fn parse_element(input: &str) -> Result<MarkupNode, MarkupError> {
    let mut nodes = parse_fragment(input)?;
    match (nodes.len(), nodes.first()) {
        (1, Some(MarkupNode::Element { .. })) => Ok(nodes.remove(0)),
        _ => Err(MarkupError::ExpectedSingleRoot),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), MarkupError> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(_) => Err(MarkupError::InvalidToken { at: self.pos - 1 }),
            None => Err(MarkupError::UnexpectedEof),
        }
    }

    /// Parse siblings until EOF or a close tag. `enclosing` is the open
    /// element we are inside of, if any; its close tag ends the run.
    fn parse_siblings(&mut self, enclosing: Option<&str>) -> Result<Vec<MarkupNode>, MarkupError> {
        let mut nodes = Vec::new();
        loop {
            if self.at_end() {
                return match enclosing {
                    Some(_) => Err(MarkupError::UnexpectedEof),
                    None => Ok(nodes),
                };
            }
            if self.peek() == Some('<') && self.peek_at(1) == Some('/') {
                // Leave the close tag for the caller (or top level) to handle.
                return Ok(nodes);
            }
            if self.peek() == Some('<') {
                nodes.push(self.parse_tag()?);
            } else {
                let text = self.read_text();
                if !text.trim().is_empty() {
                    nodes.push(MarkupNode::Text(decode_entities(&text)));
                }
            }
        }
    }

    fn read_text(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '<') {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_tag(&mut self) -> Result<MarkupNode, MarkupError> {
        self.expect('<')?;
        let tag = self.read_name()?;
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') | Some('/') => break,
                Some(c) if is_name_char(c) => attrs.push(self.parse_attr()?),
                Some(_) => return Err(MarkupError::InvalidToken { at: self.pos }),
                None => return Err(MarkupError::UnexpectedEof),
            }
        }
        if self.peek() == Some('/') {
            self.bump();
            self.expect('>')?;
            return Ok(MarkupNode::Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        }
        self.expect('>')?;
        if VOID_TAGS.contains(&tag.as_str()) {
            return Ok(MarkupNode::Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        }
        if self.depth >= MAX_DEPTH {
            return Err(MarkupError::TooDeep);
        }
        self.depth += 1;
        let children = self.parse_siblings(Some(&tag))?;
        self.depth -= 1;
        let found = self.read_close_tag()?;
        if found != tag {
            return Err(MarkupError::MismatchedClose {
                expected: Some(tag),
                found,
            });
        }
        Ok(MarkupNode::Element {
            tag,
            attrs,
            children,
        })
    }

    fn read_close_tag(&mut self) -> Result<String, MarkupError> {
        self.expect('<')?;
        self.expect('/')?;
        let name = self.read_name()?;
        self.skip_whitespace();
        self.expect('>')?;
        Ok(name)
    }

    fn read_name(&mut self) -> Result<String, MarkupError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(_) => Err(MarkupError::InvalidToken { at: self.pos }),
                None => Err(MarkupError::UnexpectedEof),
            };
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attr(&mut self) -> Result<(String, String), MarkupError> {
        let name = self.read_name()?;
        if self.peek() != Some('=') {
            // Bare attribute, e.g. `disabled`.
            return Ok((name, String::new()));
        }
        self.bump();
        self.expect('"')?;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '"') {
            self.pos += 1;
        }
        if self.at_end() {
            return Err(MarkupError::UnexpectedEof);
        }
        let value: String = self.chars[start..self.pos].iter().collect();
        self.bump(); // closing quote
        Ok((name, decode_entities(&value)))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
