//! Tokenizer for the loose `#auth-param` list found in `WWW-Authenticate` and
//! `Proxy-Authenticate` challenges.
//!
//! The scanner never copies: names and values come back as byte [`Span`]s into the
//! challenge text. Quoted values end at the next `"`, backslash escapes are not
//! interpreted.

use crate::{Error, Result};

/// Half-open byte range `begin..end` into the scanned text.
/// An empty span denotes a parameter without a value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    fn empty_at(pos: usize) -> Self {
        Span {
            begin: pos,
            end: pos,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Resolve the span against the text it was produced from
    pub fn as_str<'a>(&self, src: &'a str) -> &'a str {
        &src[self.begin..self.end]
    }
}

/// One `name[=value]` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: Span,
    pub value: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SkipWs,
    ReadName,
    SkipWsBeforeEq,
    SkipWsAfterEq,
    ReadQuotedValue,
    ReadUnquotedValue,
    SkipWsAfterQuote,
}

/// C-locale `isspace`, which includes the vertical tab
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

/// Cursor over a parameter list.
///
/// [`next_param()`](#method.next_param) distinguishes the end of input (`Ok(None)`)
/// from malformed input (`Err`). The `Iterator` impl yields resolved `(name, value)`
/// string pairs and stops after the first error.
#[derive(Debug, Clone)]
pub struct ParamParser<'a> {
    src: &'a str,
    pos: usize,
    separator: u8,
    failed: bool,
}

impl<'a> ParamParser<'a> {
    /// Parser for a comma separated list
    pub fn new(src: &'a str) -> Self {
        Self::with_separator(src, b',')
    }

    pub fn with_separator(src: &'a str, separator: u8) -> Self {
        ParamParser {
            src,
            pos: 0,
            separator,
            failed: false,
        }
    }

    /// Byte offset of the cursor in the source text
    pub fn position(&self) -> usize {
        self.pos
    }

    fn fail(&mut self, pos: usize, reason: &'static str) -> Error {
        self.failed = true;
        self.pos = pos;
        Error::InvalidHeaderSyntax { pos, reason }
    }

    /// Extract the next parameter and advance past it (and past its separator).
    pub fn next_param(&mut self) -> Result<Option<Param>> {
        let src = self.src;
        let bytes = src.as_bytes();
        let sep = self.separator;
        let mut p = self.pos;
        let mut state = State::SkipWs;
        let mut name = Span::empty_at(p);
        let mut value = Span::empty_at(p);

        loop {
            let c = bytes.get(p).copied();

            match state {
                State::SkipWs => match c {
                    Some(c) if is_space(c) => p += 1,
                    None => {
                        self.pos = p;
                        return Ok(None);
                    }
                    Some(_) => {
                        name.begin = p;
                        state = State::ReadName;
                    }
                },
                State::ReadName => match c {
                    Some(c) if !is_space(c) && c != b'=' && c != sep => p += 1,
                    _ => {
                        name.end = p;
                        if name.is_empty() {
                            return Err(self.fail(p, "empty parameter name"));
                        }
                        state = State::SkipWsBeforeEq;
                    }
                },
                State::SkipWsBeforeEq => match c {
                    Some(c) if is_space(c) => p += 1,
                    None => {
                        value = Span::empty_at(p);
                        break;
                    }
                    Some(c) if c == sep => {
                        value = Span::empty_at(p);
                        p += 1;
                        break;
                    }
                    Some(b'=') => {
                        p += 1;
                        state = State::SkipWsAfterEq;
                    }
                    Some(_) => return Err(self.fail(p, "expected '=' after parameter name")),
                },
                State::SkipWsAfterEq => match c {
                    Some(c) if is_space(c) => p += 1,
                    Some(b'"') => {
                        p += 1;
                        value.begin = p;
                        state = State::ReadQuotedValue;
                    }
                    _ => {
                        value.begin = p;
                        state = State::ReadUnquotedValue;
                    }
                },
                State::ReadQuotedValue => match c {
                    Some(b'"') => {
                        value.end = p;
                        p += 1;
                        state = State::SkipWsAfterQuote;
                    }
                    Some(_) => p += 1,
                    None => return Err(self.fail(value.begin - 1, "unterminated quoted value")),
                },
                State::SkipWsAfterQuote => match c {
                    Some(c) if is_space(c) => p += 1,
                    None => break,
                    Some(c) if c == sep => {
                        p += 1;
                        break;
                    }
                    Some(_) => return Err(self.fail(p, "garbage after closing quote")),
                },
                State::ReadUnquotedValue => match c {
                    None => {
                        value.end = trim_end(bytes, value.begin, p);
                        break;
                    }
                    Some(c) if c == sep => {
                        value.end = trim_end(bytes, value.begin, p);
                        p += 1;
                        break;
                    }
                    Some(b'"') => return Err(self.fail(p, "stray quote in unquoted value")),
                    Some(_) => p += 1,
                },
            }
        }

        self.pos = p;
        Ok(Some(Param { name, value }))
    }
}

fn trim_end(bytes: &[u8], begin: usize, mut end: usize) -> usize {
    while end > begin && is_space(bytes[end - 1]) {
        end -= 1;
    }
    end
}

impl<'a> Iterator for ParamParser<'a> {
    type Item = Result<(&'a str, &'a str)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.next_param() {
            Ok(Some(param)) => Some(Ok((
                param.name.as_str(self.src),
                param.value.as_str(self.src),
            ))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
