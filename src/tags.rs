// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tag transforms, and the two built into edn: `#uuid` and `#inst`.

use crate::symbol::Tag;
use crate::value::Value;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct TagError(pub String);

impl TagError {
    pub fn new(msg: impl Into<String>) -> Self {
        TagError(msg.into())
    }
}

pub type TagHandler = Arc<dyn Fn(&Tag, Value) -> Result<Value, TagError> + Send + Sync>;

pub fn uuid_tag() -> Tag {
    Tag::new("", "uuid")
}

pub fn inst_tag() -> Tag {
    Tag::new("", "inst")
}

fn expect_string<'v>(tag: &Tag, v: &'v Value) -> Result<&'v str, TagError> {
    match v {
        Value::String(s) => Ok(s.as_str()),
        _ => Err(TagError::new(format!("{} expects a string, got {}", tag, v)))
    }
}

pub fn read_uuid(tag: &Tag, v: Value) -> Result<Value, TagError> {
    let s = expect_string(tag, &v)?;
    Uuid::parse_str(s)
        .map(Value::Uuid)
        .map_err(|e| TagError::new(format!("invalid {} {:?}: {}", tag, s, e)))
}

/// RFC 3339, also accepting the truncated forms `YYYY`, `YYYY-MM`
/// and `YYYY-MM-DD` (completed to midnight UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, TagError> {
    let completed: Cow<str> = match s.len() {
        4 => format!("{}-01-01T00:00:00Z", s).into(),
        7 => format!("{}-01T00:00:00Z", s).into(),
        10 => format!("{}T00:00:00Z", s).into(),
        _ => s.into()
    };
    DateTime::parse_from_rfc3339(&completed)
        .map_err(|e| TagError::new(format!("invalid instant {:?}: {}", s, e)))
}

pub fn format_instant(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

pub fn read_inst(tag: &Tag, v: Value) -> Result<Value, TagError> {
    let s = expect_string(tag, &v)?;
    parse_instant(s).map(Value::Inst)
}
