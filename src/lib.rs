// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A reader and printer for edn, the extensible data notation.
//!
//! * Direct access to the tokenizer, `anyedn::scan`, as well as
//!   `anyedn::read` to build in-memory value trees.
//!
//! * Good error reporting: every error carries the line and column
//!   where it was detected, plus the file when reading files.
//!
//! * Extensible reading: tagged elements (`#my/tag value`) are handed
//!   to handlers registered per tag in a `ParserConfig`, the builtin
//!   `#uuid` and `#inst` included; unknown tags are kept as
//!   `TaggedValue`s. Numbers and collections are constructed via
//!   replaceable hooks and builders.
//!
//! * Extensible printing: `anyedn::print` picks the handler for each
//!   node by the node's type and its ancestors, ordered by C3
//!   linearization (`anyedn::dispatch`), so user types can get a
//!   printer of their own or inherit one.
//!
//! * Streaming: values are read one at a time from any `io::Read`,
//!   decoding UTF-8 lazily.
//!
//! ```
//! let vals = anyedn::read::read_str("{:a [1 2.5 \"x\"], :b #{foo/bar}}").unwrap();
//! // only atoms are separated by spaces
//! assert_eq!(vals[0].to_edn().unwrap(), "{:a[1 2.5 \"x\"]:b #{foo/bar}}");
//! ```

pub mod buffered_chars; // although this is a hack
pub mod builder;
pub mod chars;
pub mod context;
pub mod dispatch;
pub mod number;
pub mod pos;
pub mod print;
pub mod read;
pub mod scan;
pub mod settings;
pub mod source;
pub mod symbol;
pub mod tags;
pub mod value;
