// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Writing values as edn text.

//! Each node is printed by the handler that the printer's
//! [Dispatch](../dispatch/struct.Dispatch.html) table resolves for
//! the node's type (see `Value::type_name`); collection handlers
//! recurse via `Emitter::print`. User types are added by declaring
//! them in the type graph and binding a handler to them or to one of
//! their ancestors.

use crate::chars::is_whitespace;
use crate::dispatch::{Dispatch, DispatchError, TypeGraph, TypeGraphBuilder};
use crate::number::format_double;
use crate::scan::char2name;
use crate::tags::format_instant;
use crate::value::{types, TypeName, Value};
use once_cell::sync::Lazy;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrintError {
    #[error("no print handler for type {0}")]
    NoHandler(TypeName),
    #[error("print handler for {handler} got a {got} value")]
    UnexpectedValue { handler: &'static str, got: String },
    #[error("{0}")]
    Dispatch(DispatchError),
    #[error("formatting error")]
    Fmt(#[from] std::fmt::Error),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

pub type PrintFn =
    Arc<dyn Fn(&Value, &mut Emitter<'_>) -> Result<(), PrintError> + Send + Sync>;

/// The output side handed to print handlers. Tracks whether the last
/// thing written was an atom, so that the next atom is separated from
/// it by exactly one space, while delimiters are written as they are.
pub struct Emitter<'a> {
    out: &'a mut dyn FmtWrite,
    printer: &'a Printer,
    soft_space: bool,
}

impl<'a> Emitter<'a> {
    fn new(out: &'a mut dyn FmtWrite, printer: &'a Printer) -> Self {
        Emitter { out, printer, soft_space: false }
    }

    /// Write something that would fuse with a preceding atom, e.g. a
    /// number, symbol, string or tag.
    pub fn atom(&mut self, s: &str) -> Result<(), PrintError> {
        if self.soft_space {
            self.out.write_char(' ')?;
        }
        self.out.write_str(s)?;
        self.soft_space = true;
        Ok(())
    }

    /// Write an opening delimiter. `#{` needs separating from a
    /// preceding atom, the plain brackets don't.
    pub fn open(&mut self, s: &str) -> Result<(), PrintError> {
        if self.soft_space && s.starts_with('#') {
            self.out.write_char(' ')?;
        }
        self.out.write_str(s)?;
        self.soft_space = false;
        Ok(())
    }

    pub fn close(&mut self, s: &str) -> Result<(), PrintError> {
        self.out.write_str(s)?;
        self.soft_space = false;
        Ok(())
    }

    /// Print a child node through the dispatch table.
    pub fn print(&mut self, v: &Value) -> Result<(), PrintError> {
        let handler = self.printer.handler_for(v)?;
        handler(v, self)
    }
}

fn unexpected(handler: &'static str, got: &Value) -> PrintError {
    PrintError::UnexpectedValue {
        handler,
        got: got.type_name().map_or_else(|| "nil".into(), |t| t.to_string()),
    }
}

fn print_nil(_v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    em.atom("nil")
}

fn print_bool(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Bool(b) => em.atom(if *b { "true" } else { "false" }),
        _ => Err(unexpected(types::BOOLEAN, v))
    }
}

pub fn char_literal(c: char) -> String {
    let mut s = String::from("\\");
    if let Some(name) = char2name(c) {
        s.push_str(name);
    } else if c.is_control() || is_whitespace(c) {
        s.push_str(&format!("u{:04x}", c as u32));
    } else {
        s.push(c);
    }
    s
}

fn print_char(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Char(c) => em.atom(&char_literal(*c)),
        _ => Err(unexpected(types::CHARACTER, v))
    }
}

pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            _ => out.push(c)
        }
    }
    out.push('"');
    out
}

// Bound to CharSequence; strings reach it via their ancestors.
fn print_string(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::String(s) => em.atom(&string_literal(s)),
        _ => Err(unexpected(types::CHAR_SEQUENCE, v))
    }
}

fn print_symbol(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Symbol(s) => em.atom(&s.to_string()),
        _ => Err(unexpected(types::SYMBOL, v))
    }
}

fn print_keyword(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Keyword(k) => em.atom(&k.to_string()),
        _ => Err(unexpected(types::KEYWORD, v))
    }
}

fn print_long(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Integer(i) => em.atom(&i.to_string()),
        _ => Err(unexpected(types::LONG, v))
    }
}

fn print_big_integer(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::BigInteger(n) => em.atom(&format!("{}N", n)),
        _ => Err(unexpected(types::BIG_INTEGER, v))
    }
}

fn print_double(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Double(d) => em.atom(&format_double(*d)),
        _ => Err(unexpected(types::DOUBLE, v))
    }
}

fn print_big_decimal(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Decimal(d) => em.atom(&format!("{}M", d)),
        _ => Err(unexpected(types::BIG_DECIMAL, v))
    }
}

fn print_seq<'v>(
    em: &mut Emitter<'_>,
    opening: &str,
    items: impl Iterator<Item = &'v Value>,
    closing: &str,
) -> Result<(), PrintError> {
    em.open(opening)?;
    for item in items {
        em.print(item)?;
    }
    em.close(closing)
}

fn print_list(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::List(items) => print_seq(em, "(", items.iter(), ")"),
        _ => Err(unexpected(types::LIST, v))
    }
}

fn print_vector(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Vector(items) => print_seq(em, "[", items.iter(), "]"),
        _ => Err(unexpected(types::VECTOR, v))
    }
}

fn print_set(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Set(items) => print_seq(em, "#{", items.iter(), "}"),
        _ => Err(unexpected(types::SET, v))
    }
}

fn print_map(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Map(m) => {
            print_seq(em, "{", m.iter().flat_map(|(k, v)| [k, v]), "}")
        }
        _ => Err(unexpected(types::MAP, v))
    }
}

fn print_tagged(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Tagged(t) => {
            em.atom(&t.tag.to_string())?;
            em.print(&t.value)
        }
        _ => Err(unexpected(types::TAGGED_VALUE, v))
    }
}

fn print_uuid(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Uuid(u) => {
            em.atom("#uuid")?;
            em.atom(&string_literal(&u.hyphenated().to_string()))
        }
        _ => Err(unexpected(types::UUID, v))
    }
}

fn print_instant(v: &Value, em: &mut Emitter<'_>) -> Result<(), PrintError> {
    match v {
        Value::Inst(t) => {
            em.atom("#inst")?;
            em.atom(&string_literal(&format_instant(t)))
        }
        _ => Err(unexpected(types::INSTANT, v))
    }
}

/// The builtin node types and the interfaces they implement, rooted
/// in `Object`.
pub fn builtin_type_graph() -> TypeGraphBuilder<TypeName> {
    use types::*;
    let t = TypeName::from_static;
    let mut g = TypeGraph::builder(t(OBJECT));
    let decls: [(&'static str, &[&'static str]); 22] = [
        (BOOLEAN, &[]),
        (CHARACTER, &[]),
        (CHAR_SEQUENCE, &[]),
        (STRING, &[CHAR_SEQUENCE]),
        (NAMED, &[]),
        (SYMBOL, &[NAMED]),
        (KEYWORD, &[NAMED]),
        (NUMBER, &[]),
        (LONG, &[NUMBER]),
        (BIG_INTEGER, &[NUMBER]),
        (DOUBLE, &[NUMBER]),
        (BIG_DECIMAL, &[NUMBER]),
        (COLLECTION, &[]),
        (SEQUENTIAL, &[]),
        (RANDOM_ACCESS, &[]),
        (LIST, &[COLLECTION, SEQUENTIAL]),
        (VECTOR, &[COLLECTION, SEQUENTIAL, RANDOM_ACCESS]),
        (SET, &[COLLECTION]),
        (MAP, &[]),
        (TAGGED_VALUE, &[]),
        (UUID, &[]),
        (INSTANT, &[]),
    ];
    for (ty, parents) in decls {
        g.declare_mut(t(ty), parents.iter().copied().map(t).collect());
    }
    g
}

pub struct Printer {
    dispatch: Dispatch<TypeName, PrintFn>,
}

/// Starts out with the builtin types and handlers; consumed by
/// `build`.
pub struct PrinterBuilder {
    graph: TypeGraphBuilder<TypeName>,
    bindings: Vec<(TypeName, PrintFn)>,
    nil: PrintFn,
}

impl PrinterBuilder {
    pub fn new() -> Self {
        let builtin: [(&'static str, PrintFn); 16] = [
            (types::BOOLEAN, Arc::new(print_bool)),
            (types::CHARACTER, Arc::new(print_char)),
            (types::CHAR_SEQUENCE, Arc::new(print_string)),
            (types::SYMBOL, Arc::new(print_symbol)),
            (types::KEYWORD, Arc::new(print_keyword)),
            (types::LONG, Arc::new(print_long)),
            (types::BIG_INTEGER, Arc::new(print_big_integer)),
            (types::DOUBLE, Arc::new(print_double)),
            (types::BIG_DECIMAL, Arc::new(print_big_decimal)),
            (types::LIST, Arc::new(print_list)),
            (types::VECTOR, Arc::new(print_vector)),
            (types::SET, Arc::new(print_set)),
            (types::MAP, Arc::new(print_map)),
            (types::TAGGED_VALUE, Arc::new(print_tagged)),
            (types::UUID, Arc::new(print_uuid)),
            (types::INSTANT, Arc::new(print_instant)),
        ];
        let bindings = builtin.into_iter()
            .map(|(ty, h)| (TypeName::from_static(ty), h))
            .collect();
        PrinterBuilder {
            graph: builtin_type_graph(),
            bindings,
            nil: Arc::new(print_nil),
        }
    }

    /// Add (or redeclare) a type with its direct supertypes, in order
    /// of precedence.
    pub fn declare_type(mut self, ty: &str, parents: &[&str]) -> Self {
        self.graph.declare_mut(TypeName::new(ty),
                               parents.iter().map(|p| TypeName::new(p)).collect());
        self
    }

    /// Later bindings for the same type replace earlier ones.
    pub fn bind(
        mut self,
        ty: &str,
        handler: impl Fn(&Value, &mut Emitter<'_>) -> Result<(), PrintError> + Send + Sync + 'static
    ) -> Self {
        self.bindings.push((TypeName::new(ty), Arc::new(handler)));
        self
    }

    pub fn nil_handler(
        mut self,
        handler: impl Fn(&Value, &mut Emitter<'_>) -> Result<(), PrintError> + Send + Sync + 'static
    ) -> Self {
        self.nil = Arc::new(handler);
        self
    }

    pub fn build(self) -> Printer {
        let mut builder = Dispatch::builder(self.graph.build(), self.nil);
        for (ty, handler) in self.bindings {
            builder = builder.bind(ty, handler);
        }
        Printer { dispatch: builder.build() }
    }
}

impl Default for PrinterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn builder() -> PrinterBuilder {
        PrinterBuilder::new()
    }

    pub fn dispatch(&self) -> &Dispatch<TypeName, PrintFn> {
        &self.dispatch
    }

    pub fn handler_for(&self, v: &Value) -> Result<PrintFn, PrintError> {
        let ty = v.type_name();
        match self.dispatch.lookup(ty.as_ref()).map_err(PrintError::Dispatch)? {
            Some(h) => Ok(h),
            None => {
                // lookup only answers None for a type, never for nil
                Err(PrintError::NoHandler(ty.unwrap_or_else(
                    || TypeName::from_static("nil"))))
            }
        }
    }

    pub fn print(&self, v: &Value, out: &mut dyn FmtWrite) -> Result<(), PrintError> {
        Emitter::new(out, self).print(v)
    }

    pub fn to_string(&self, v: &Value) -> Result<String, PrintError> {
        let mut s = String::new();
        self.print(v, &mut s)?;
        Ok(s)
    }
}

static DEFAULT_PRINTER: Lazy<Printer> = Lazy::new(|| Printer::builder().build());

pub fn default_printer() -> &'static Printer {
    &DEFAULT_PRINTER
}

pub fn print(printer: &Printer, v: &Value, out: &mut dyn FmtWrite)
             -> Result<(), PrintError> {
    printer.print(v, out)
}

impl Value {
    /// This value as edn text, via the default printer.
    pub fn to_edn(&self) -> Result<String, PrintError> {
        default_printer().to_string(self)
    }
}

/// Write each value followed by a newline, with an empty line between
/// values.
pub fn write_all_with<'t>(
    printer: &Printer,
    out: impl Write,
    vals: impl IntoIterator<Item = &'t Value>
) -> Result<(), PrintError> {
    let mut out = out; // for `File`
    let mut seen_item = false;
    for v in vals.into_iter() {
        let s = printer.to_string(v)?;
        write!(out, "{}{}\n", if seen_item {"\n"} else {""}, s)?;
        seen_item = true;
    }
    out.flush()?;
    Ok(())
}

pub fn write_all<'t>(
    out: impl Write,
    vals: impl IntoIterator<Item = &'t Value>
) -> Result<(), PrintError> {
    write_all_with(default_printer(), out, vals)
}

pub fn write_file<'t>(path: &Path, vals: impl IntoIterator<Item = &'t Value>)
                      -> Result<(), PrintError> {
    write_all(File::create(path)?, vals)
}
