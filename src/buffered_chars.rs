// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Get characters and their positions from anything implementing
//! `Read`, or from a string.

use crate::pos::Pos;
use std::io::{self, Read};
use utf8::{BufReadDecoder, BufReadDecoderError};
use genawaiter::rc::Gen;

/// Decodes UTF-8 from `fh` lazily. Invalid byte sequences are
/// reported as `io::ErrorKind::InvalidData`, after which the iterator
/// ends.
pub fn buffered_chars<R>(
    fh: R
) -> impl Iterator<Item=io::Result<(char, Pos)>>
    where R: Read
{
    Gen::new(|co| async move {
        let mut inp = BufReadDecoder::new(io::BufReader::new(fh));
        let mut pos = Pos::default();
        loop {
            if let Some(r) = inp.next_strict() {
                match r {
                    Ok(x) => {
                        for c in x.chars() {
                            co.yield_(Ok((c, pos))).await;
                            pos = pos.after(c);
                        }
                    },
                    Err(BufReadDecoderError::Io(e)) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                    Err(BufReadDecoderError::InvalidByteSequence(bytes)) => {
                        let e = io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("invalid UTF-8 byte sequence {:?} {}",
                                    bytes, pos));
                        co.yield_(Err(e)).await;
                        return;
                    }
                }
            } else {
                return;
            }
        }
    }).into_iter()
}

pub fn str_chars(
    s: &str
) -> impl Iterator<Item=io::Result<(char, Pos)>> + '_
{
    s.chars().scan(Pos::default(), |pos, c| {
        let here = *pos;
        *pos = here.after(c);
        Some(Ok((c, here)))
    })
}
