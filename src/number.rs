// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The numeric tower: fixed and arbitrary precision integers, doubles
//! and arbitrary precision decimals, and the hooks through which each
//! of them becomes a [Value](../value/enum.Value.html).

use crate::value::Value;
use bigdecimal::BigDecimal;
use num::BigInt;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(i64),
    BigInteger(BigInt),
    Double(f64),
    Decimal(BigDecimal),
}

/// `text` is an optional '-' followed by decimal digits. Integers not
/// fitting into i64 are promoted to `BigInteger` even without
/// `force_big` (the `N` suffix).
pub fn integer_from_digits(text: &str, force_big: bool) -> Option<Number> {
    if ! force_big {
        if let Ok(i) = i64::from_str(text) {
            return Some(Number::Integer(i))
        }
    }
    BigInt::from_str(text).ok().map(Number::BigInteger)
}

/// `text` is the literal without the `M` suffix, which is given as
/// `decimal` instead.
pub fn float_from_text(text: &str, decimal: bool) -> Option<Number> {
    if decimal {
        BigDecimal::from_str(text).ok().map(Number::Decimal)
    } else {
        f64::from_str(text).ok().map(Number::Double)
    }
}

/// The names following `##`.
pub fn symbolic_double(name: &str) -> Option<f64> {
    match name {
        "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None
    }
}

pub fn format_double(d: f64) -> String {
    if d.is_nan() {
        "##NaN".into()
    } else if d.is_infinite() {
        if d > 0.0 { "##Inf".into() } else { "##-Inf".into() }
    } else {
        // Debug always carries a '.' or an exponent, so the text
        // reads back as a double
        format!("{:?}", d)
    }
}

pub type NumberHook<T> = Arc<dyn Fn(T) -> Value + Send + Sync>;

/// Turn read numbers into values. Each defaults to wrapping the
/// number in its own `Value` variant.
#[derive(Clone)]
pub struct NumberHooks {
    pub integer: NumberHook<i64>,
    pub big_integer: NumberHook<BigInt>,
    pub double: NumberHook<f64>,
    pub decimal: NumberHook<BigDecimal>,
}

impl Default for NumberHooks {
    fn default() -> Self {
        NumberHooks {
            integer: Arc::new(Value::Integer),
            big_integer: Arc::new(Value::BigInteger),
            double: Arc::new(Value::Double),
            decimal: Arc::new(Value::Decimal),
        }
    }
}

impl Debug for NumberHooks {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_struct("NumberHooks").finish_non_exhaustive()
    }
}

impl NumberHooks {
    pub fn apply(&self, n: Number) -> Value {
        match n {
            Number::Integer(i) => (self.integer)(i),
            Number::BigInteger(n) => (self.big_integer)(n),
            Number::Double(d) => (self.double)(d),
            Number::Decimal(d) => (self.decimal)(d),
        }
    }
}
