// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translating a character stream to a token stream. Scalars
//! (strings, characters, numbers, symbols, keywords) are fully parsed
//! here, so the tokens carry finished values; the only tokens that
//! denote nesting are `Token::Open` and `Token::Close`. See
//! [read](../read/index.html) if interested in trees rather than
//! tokens.

use crate::chars::{is_digit, is_hexdigit, is_symbol_constituent,
                   is_symbol_start, is_whitespace, separates_tokens,
                   separates_tokens_or_eof};
use crate::number::{float_from_text, integer_from_digits, symbolic_double,
                    Number};
use crate::pos::Pos;
use crate::settings::ScanSettings;
use crate::source::CharSource;
use crate::symbol::{Keyword, Symbol, SymbolError, Tag};
use crate::value::Value;
use kstring::KString;
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error ({0}) after")]
    IO(std::io::Error),
    #[error("unexpected EOF in string starting")]
    UnterminatedString,
    #[error("unexpected EOF in character literal")]
    UnterminatedChar,
    #[error("whitespace after '\\' in character literal")]
    WhitespaceInChar,
    #[error("unknown character name '{0}'")]
    UnknownCharName(String),
    #[error("invalid escaped character '{0}'")]
    InvalidEscapedChar(char),
    #[error("\\u escapes are disabled")]
    UnicodeEscapeDisabled,
    #[error("not a hex digit: '{0}'")]
    NonHexDigit(char),
    #[error("invalid code point {0:#x}")]
    InvalidCodePoint(u32),
    #[error("invalid symbol '{0}': {1}")]
    InvalidSymbol(String, SymbolError),
    #[error("invalid keyword ':{0}': {1}")]
    InvalidKeyword(String, SymbolError),
    #[error("invalid tag '#{0}': {1}")]
    InvalidTag(String, SymbolError),
    #[error("invalid character '{1}' in symbol '{0}'")]
    InvalidSymbolChar(String, char),
    #[error("not a number: '{0}'")]
    NotANumber(String),
    #[error("missing digits in exponent of '{0}'")]
    MissingExponentDigits(String),
    #[error("invalid '#' token")]
    InvalidHashToken,
    #[error("unknown symbolic value '##{0}'")]
    UnknownSymbolicValue(String),
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct ScanErrorWithPos {
    pub err: ScanError,
    pub pos: Pos
}

impl ScanError {
    pub fn at(self, p: Pos) -> ScanErrorWithPos {
        ScanErrorWithPos {
            err: self,
            pos: p
        }
    }
}

impl ScanErrorWithPos {
    pub fn is_io(&self) -> bool {
        matches!(self.err, ScanError::IO(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parenkind {
    Round,
    Square,
    Curly
}

impl Parenkind {
    pub fn opening(self) -> char {
        match self {
            Parenkind::Round => '(',
            Parenkind::Square => '[',
            Parenkind::Curly => '{'
        }
    }
    pub fn closing(self) -> char {
        match self {
            Parenkind::Round => ')',
            Parenkind::Square => ']',
            Parenkind::Curly => '}'
        }
    }
}

/// The four collection kinds. Sets and maps share their closing
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collkind {
    List,
    Vector,
    Set,
    Map
}

impl Collkind {
    pub fn opening(self) -> &'static str {
        match self {
            Collkind::List => "(",
            Collkind::Vector => "[",
            Collkind::Set => "#{",
            Collkind::Map => "{",
        }
    }
    pub fn parenkind(self) -> Parenkind {
        match self {
            Collkind::List => Parenkind::Round,
            Collkind::Vector => Parenkind::Square,
            Collkind::Set | Collkind::Map => Parenkind::Curly,
        }
    }
    pub fn closing(self) -> char {
        self.parenkind().closing()
    }
}

#[derive(Debug)]
pub enum Token {
    Open(Collkind),
    Close(Parenkind),
    Nil,
    /// `#_`
    Discard,
    Tag(Tag),
    /// Any scalar, symbol or keyword.
    Atom(Value),
    EndOfInput,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Token::Open(k) => f.write_str(k.opening()),
            Token::Close(k) => f.write_char(k.closing()),
            Token::Nil => f.write_str("nil"),
            Token::Discard => f.write_str("#_"),
            Token::Tag(t) => write!(f, "{}", t),
            Token::Atom(v) => write!(f, "{}", v),
            Token::EndOfInput => f.write_str("#<eof>"),
        }
    }
}

#[derive(Debug)]
pub struct TokenWithPos(pub Token, pub Pos);

pub fn maybe_open_close(c: char) -> Option<Token> {
    match c {
        '(' => Some(Token::Open(Collkind::List)),
        '[' => Some(Token::Open(Collkind::Vector)),
        '{' => Some(Token::Open(Collkind::Map)),
        ')' => Some(Token::Close(Parenkind::Round)),
        ']' => Some(Token::Close(Parenkind::Square)),
        '}' => Some(Token::Close(Parenkind::Curly)),
        _ => None
    }
}

pub fn char2name(c: char) -> Option<&'static str> {
    match c {
        '\n' => Some("newline"),
        ' ' => Some("space"),
        '\t' => Some("tab"),
        '\x08' => Some("backspace"),
        '\x0C' => Some("formfeed"),
        '\r' => Some("return"),
        _ => None
    }
}

pub fn name2char(s: &str) -> Option<char> {
    match s {
        "newline" => Some('\n'),
        "space" => Some(' '),
        "tab" => Some('\t'),
        "backspace" => Some('\x08'),
        "formfeed" => Some('\x0C'),
        "return" => Some('\r'),
        _ => None
    }
}

fn parse_hexstr(s: &str) -> Option<u32> {
    if s.len() != 4 || ! s.chars().all(is_hexdigit) {
        return None
    }
    u32::from_str_radix(s, 16).ok()
}

/// Owns the character source and the cursor state; one scanner must
/// not be shared between parses running concurrently.
pub struct Scanner<'c, S> {
    src: S,
    settings: &'c ScanSettings,
}

impl<'c, S: CharSource> Scanner<'c, S> {
    pub fn new(src: S, settings: &'c ScanSettings) -> Self {
        Scanner { src, settings }
    }

    pub fn into_source(self) -> S {
        self.src
    }

    fn read(&mut self) -> Result<Option<char>, ScanErrorWithPos> {
        self.src.read().map_err(|e| ScanError::IO(e).at(self.src.pos()))
    }

    fn unread_some(&mut self, c: Option<char>) {
        if let Some(c) = c {
            self.src.unread(c)
        }
    }

    /// Skip whitespace and line comments, return the first
    /// significant character.
    fn skip_whitespace_and_comments(&mut self)
                                    -> Result<Option<char>, ScanErrorWithPos> {
        loop {
            match self.read()? {
                None => return Ok(None),
                Some(c) if is_whitespace(c) => {}
                Some(';') => {
                    loop {
                        match self.read()? {
                            None => return Ok(None),
                            Some('\n') => break,
                            Some(_) => {}
                        }
                    }
                }
                Some(c) => return Ok(Some(c))
            }
        }
    }

    pub fn next_token(&mut self) -> Result<TokenWithPos, ScanErrorWithPos> {
        let c = match self.skip_whitespace_and_comments()? {
            None => return Ok(TokenWithPos(Token::EndOfInput, self.src.pos())),
            Some(c) => c
        };
        let pos = self.src.pos();
        let token =
            if let Some(t) = maybe_open_close(c) {
                t
            } else {
                match c {
                    '"' => Token::Atom(Value::String(self.read_string(pos)?)),
                    '\\' => Token::Atom(Value::Char(self.read_char_literal(pos)?)),
                    ':' => Token::Atom(Value::Keyword(self.read_keyword(pos)?)),
                    '#' => self.read_hash(pos)?,
                    '+' | '-' => {
                        let c1 = self.read()?;
                        self.unread_some(c1);
                        match c1 {
                            Some(d) if is_digit(d) => self.read_number(c, pos)?,
                            _ => self.read_symbol(c, pos)?
                        }
                    }
                    _ if is_digit(c) => self.read_number(c, pos)?,
                    _ if is_symbol_start(c) => self.read_symbol(c, pos)?,
                    _ => return Err(ScanError::UnexpectedChar(c).at(pos))
                }
            };
        log::trace!("token {:?} {}", token, pos);
        Ok(TokenWithPos(token, pos))
    }

    /// Read the rest of a symbol-like run starting with `c0`.
    fn read_symbol_text(&mut self, c0: char, pos: Pos)
                        -> Result<String, ScanErrorWithPos> {
        let mut out = String::new();
        out.push(c0);
        loop {
            match self.read()? {
                None => return Ok(out),
                Some(c) if is_symbol_constituent(c) => out.push(c),
                Some(c) if separates_tokens(c) => {
                    self.src.unread(c);
                    return Ok(out)
                }
                Some(c) => {
                    return Err(ScanError::InvalidSymbolChar(out, c).at(pos))
                }
            }
        }
    }

    fn read_symbol(&mut self, c0: char, pos: Pos)
                   -> Result<Token, ScanErrorWithPos> {
        let s = self.read_symbol_text(c0, pos)?;
        Ok(match s.as_str() {
            "nil" => Token::Nil,
            "true" => Token::Atom(Value::Bool(true)),
            "false" => Token::Atom(Value::Bool(false)),
            _ => match Symbol::parse(&s) {
                Ok(sym) => Token::Atom(Value::Symbol(sym)),
                Err(e) => return Err(ScanError::InvalidSymbol(s, e).at(pos))
            }
        })
    }

    fn read_keyword(&mut self, pos: Pos) -> Result<Keyword, ScanErrorWithPos> {
        match self.read()? {
            Some(c) if is_symbol_start(c) => {
                let s = self.read_symbol_text(c, pos)?;
                Keyword::parse(&s)
                    .map_err(|e| ScanError::InvalidKeyword(s, e).at(pos))
            }
            Some(c) => {
                Err(ScanError::InvalidKeyword(
                    c.to_string(), SymbolError::InvalidStart(c)).at(pos))
            }
            None => {
                Err(ScanError::InvalidKeyword(String::new(), SymbolError::Empty)
                    .at(pos))
            }
        }
    }

    // #{ #_ ##Inf #tag
    fn read_hash(&mut self, pos: Pos) -> Result<Token, ScanErrorWithPos> {
        match self.read()? {
            Some('{') => Ok(Token::Open(Collkind::Set)),
            Some('_') => Ok(Token::Discard),
            Some('#') => {
                let name = match self.read()? {
                    Some(c) if is_symbol_start(c) => self.read_symbol_text(c, pos)?,
                    Some(c) => return Err(ScanError::UnexpectedChar(c).at(pos)),
                    None => return Err(ScanError::InvalidHashToken.at(pos)),
                };
                match symbolic_double(&name) {
                    Some(d) => Ok(Token::Atom(
                        self.settings.numbers.apply(Number::Double(d)))),
                    None => Err(ScanError::UnknownSymbolicValue(name).at(pos))
                }
            }
            Some(c) if is_symbol_start(c) => {
                let s = self.read_symbol_text(c, pos)?;
                match Tag::parse(&s) {
                    Ok(tag) => Ok(Token::Tag(tag)),
                    Err(e) => Err(ScanError::InvalidTag(s, e).at(pos))
                }
            }
            _ => Err(ScanError::InvalidHashToken.at(pos))
        }
    }

    fn read_hex4(&mut self, startpos: Pos) -> Result<u32, ScanErrorWithPos> {
        let mut n = 0;
        for _ in 0..4 {
            match self.read()? {
                None => return Err(ScanError::UnterminatedString.at(startpos)),
                Some(c) => match c.to_digit(16) {
                    Some(d) => n = n * 16 + d,
                    None => return Err(ScanError::NonHexDigit(c).at(self.src.pos()))
                }
            }
        }
        Ok(n)
    }

    /// After `\u` in a string; combines UTF-16 surrogate pairs.
    fn read_unicode_escape(&mut self, startpos: Pos)
                           -> Result<char, ScanErrorWithPos> {
        let pos = self.src.pos();
        let code = self.read_hex4(startpos)?;
        if (0xD800..0xDC00).contains(&code) {
            let backslash = self.read()?;
            let u = self.read()?;
            if backslash == Some('\\') && u == Some('u') {
                let low = self.read_hex4(startpos)?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| ScanError::InvalidCodePoint(combined).at(pos))
                }
            }
            return Err(ScanError::InvalidCodePoint(code).at(pos))
        }
        char::from_u32(code).ok_or_else(|| ScanError::InvalidCodePoint(code).at(pos))
    }

    fn read_string(&mut self, startpos: Pos) -> Result<KString, ScanErrorWithPos> {
        let mut out = String::new();
        loop {
            let c = match self.read()? {
                None => return Err(ScanError::UnterminatedString.at(startpos)),
                Some(c) => c
            };
            match c {
                '"' => return Ok(KString::from_string(out)),
                '\\' => {
                    let e = match self.read()? {
                        None => return Err(ScanError::UnterminatedString.at(startpos)),
                        Some(e) => e
                    };
                    let replacement = match e {
                        'b' => '\x08',
                        't' => '\t',
                        'n' => '\n',
                        'f' => '\x0C',
                        'r' => '\r',
                        '"' => '"',
                        '\'' => '\'',
                        '\\' => '\\',
                        'u' => {
                            if ! self.settings.unicode_escapes {
                                return Err(ScanError::UnicodeEscapeDisabled
                                           .at(self.src.pos()))
                            }
                            self.read_unicode_escape(startpos)?
                        }
                        _ => return Err(ScanError::InvalidEscapedChar(e)
                                        .at(self.src.pos()))
                    };
                    out.push(replacement);
                }
                _ => out.push(c)
            }
        }
    }

    fn read_char_literal(&mut self, pos: Pos) -> Result<char, ScanErrorWithPos> {
        let c0 = match self.read()? {
            None => return Err(ScanError::UnterminatedChar.at(pos)),
            Some(c) if is_whitespace(c) => {
                return Err(ScanError::WhitespaceInChar.at(pos))
            }
            Some(c) => c
        };
        if separates_tokens(c0) {
            // \( \" \\ etc.
            return Ok(c0)
        }
        let mut tmp = String::new();
        tmp.push(c0);
        loop {
            match self.read()? {
                None => break,
                Some(c) if separates_tokens(c) => {
                    self.src.unread(c);
                    break
                }
                Some(c) => tmp.push(c)
            }
        }
        if tmp.chars().count() == 1 {
            return Ok(c0)
        }
        if let Some(c) = name2char(&tmp) {
            return Ok(c)
        }
        if c0 == 'u' {
            if let Some(code) = parse_hexstr(&tmp[1..]) {
                if ! self.settings.unicode_escapes {
                    return Err(ScanError::UnicodeEscapeDisabled.at(pos))
                }
                return char::from_u32(code)
                    .ok_or_else(|| ScanError::InvalidCodePoint(code).at(pos))
            }
        }
        Err(ScanError::UnknownCharName(tmp).at(pos))
    }

    /// Accumulate digits into `out`, return the first non-digit.
    fn read_digits(&mut self, out: &mut String)
                   -> Result<Option<char>, ScanErrorWithPos> {
        loop {
            match self.read()? {
                Some(c) if is_digit(c) => out.push(c),
                other => return Ok(other)
            }
        }
    }

    /// `c` has been checked to lead to a separator (or the end);
    /// otherwise the literal is not a number.
    fn expect_separator(&mut self, c: Option<char>, text: &str, pos: Pos)
                        -> Result<(), ScanErrorWithPos> {
        if separates_tokens_or_eof(c) {
            self.unread_some(c);
            Ok(())
        } else {
            let mut s = text.to_string();
            s.extend(c);
            Err(ScanError::NotANumber(s).at(pos))
        }
    }

    /// `c0` is a digit or a sign which is followed by a digit.
    fn read_number(&mut self, c0: char, pos: Pos) -> Result<Token, ScanErrorWithPos> {
        let mut text = String::new();
        if c0 != '+' {
            text.push(c0);
        }
        let mut c = self.read_digits(&mut text)?;
        let number =
            if matches!(c, Some('.') | Some('e') | Some('E') | Some('M')) {
                if c == Some('.') {
                    text.push('.');
                    let before = text.len();
                    c = self.read_digits(&mut text)?;
                    if text.len() == before {
                        text.push('0');
                    }
                }
                if matches!(c, Some('e') | Some('E')) {
                    text.push('e');
                    c = self.read()?;
                    if let Some(sign @ ('+' | '-')) = c {
                        text.push(sign);
                        c = self.read()?;
                    }
                    let before = text.len();
                    self.unread_some(c);
                    c = self.read_digits(&mut text)?;
                    if text.len() == before {
                        return Err(ScanError::MissingExponentDigits(text).at(pos))
                    }
                }
                let decimal = c == Some('M');
                if decimal {
                    c = self.read()?;
                }
                self.expect_separator(c, &text, pos)?;
                float_from_text(&text, decimal)
            } else {
                let big = c == Some('N');
                if big {
                    c = self.read()?;
                }
                self.expect_separator(c, &text, pos)?;
                integer_from_digits(&text, big)
            };
        match number {
            Some(n) => Ok(Token::Atom(self.settings.numbers.apply(n))),
            None => Err(ScanError::NotANumber(text).at(pos))
        }
    }
}
