// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Character classes of the edn grammar.

/// Commas count as whitespace in edn.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ','
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_hexdigit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Characters that may start a symbol (and thus a keyword or tag
/// after their prefix character).
pub fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic()
        || matches!(c, '*' | '+' | '-' | '!' | '_' | '?' | '/' | '.'
                    | '$' | '%' | '&' | '>' | '<' | '=')
}

/// Characters allowed after the first character of a symbol.
pub fn is_symbol_constituent(c: char) -> bool {
    is_symbol_start(c) || c.is_alphanumeric() || c == '#' || c == ':'
}

/// Characters that end a symbol, number or character literal without
/// being part of it.
pub fn separates_tokens(c: char) -> bool {
    is_whitespace(c)
        || matches!(c, '"' | '(' | ')' | '[' | ']' | '{' | '}' | '\\' | ';')
}

/// Same as `separates_tokens`, with end of input counting as a
/// separator.
pub fn separates_tokens_or_eof(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => separates_tokens(c)
    }
}
