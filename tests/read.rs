use anyhow::Result;
use anyedn::builder::{BuildError, CollectionBuilder};
use anyedn::pos::Pos;
use anyedn::read::{read_all, read_file, read_first, read_named_with, read_str,
                   read_str_with, Parser,
                   ReadError, ReadErrorWithPos};
use anyedn::scan::{Collkind, Parenkind, ScanError};
use anyedn::settings::{default_parser_config, ParserConfig, DEFAULT_MAX_DEPTH};
use anyedn::source::str_source;
use anyedn::symbol::Tag;
use anyedn::tags::{parse_instant, TagError};
use anyedn::value::{TaggedValue, Value};
use std::io::{self, Read};
use std::sync::Arc;

fn read1(s: &str) -> Value {
    let mut vs = read_str(s).unwrap();
    assert_eq!(vs.len(), 1, "{:?}", s);
    vs.pop().unwrap()
}

fn read_err(s: &str) -> ReadErrorWithPos {
    read_str(s).unwrap_err()
}

fn ints(is: &[i64]) -> Vec<Value> {
    is.iter().map(|i| Value::Integer(*i)).collect()
}

#[test]
fn collections() {
    assert_eq!(read1("(1 2 3)"), Value::List(ints(&[1, 2, 3])));
    assert_eq!(read1("[1 2 3]"), Value::Vector(ints(&[1, 2, 3])));
    assert_eq!(read1("[]"), Value::Vector(vec![]));
    assert_eq!(read1("#{}"), read1("#{ }"));
    assert_eq!(read1("{}"), read1("{,,}"));
    assert_eq!(read1("#{1 2 3}"), read1("#{3 1 2}"));
    assert_eq!(read1("{:a 1 :b 2}"), read1("{:b 2, :a 1}"));
    match read1("{:a [1 (2)] :b #{nil}}") {
        Value::Map(m) => {
            assert_eq!(m.len(), 2);
            assert_eq!(m[&Value::keyword("a")],
                       Value::Vector(vec![Value::Integer(1), Value::List(ints(&[2]))]));
            assert!(matches!(&m[&Value::keyword("b")],
                             Value::Set(s) if s.contains(&Value::Nil)));
        }
        other => panic!("{:?}", other)
    }
}

#[test]
fn lists_are_not_vectors() {
    let l = read1("(1 2)");
    let v = read1("[1 2]");
    assert_ne!(l, v);
    assert_eq!(l.as_sequence(), v.as_sequence());
    assert!(v.is_random_access());
    assert!(! l.is_random_access());
    assert_eq!(v.nth(1), Some(&Value::Integer(2)));
    assert_eq!(v.nth(2), None);
    assert_eq!(l.nth(1), None);
}

#[test]
fn duplicates_and_odd_maps() {
    let e = read_err("#{1 2 1}");
    assert!(matches!(e.err, ReadError::Build(BuildError::DuplicateElement(Value::Integer(1)))));
    assert_eq!(e.pos, Pos { line: 0, col: 6 });
    assert!(matches!(read_err("{1 1, 1 2}").err,
                     ReadError::Build(BuildError::DuplicateKey(Value::Integer(1)))));
    assert!(matches!(read_err("{:a 1 :a 2}").err,
                     ReadError::Build(BuildError::DuplicateKey(_))));
    let e = read_err("[{:a 1 :b}]");
    assert!(matches!(e.err, ReadError::Build(BuildError::OddMapArity(3))));
    assert_eq!(e.pos, Pos { line: 0, col: 1 });
    // equal values, not just equal text
    assert!(matches!(read_err("#{[1 2] [1, 2]}").err,
                     ReadError::Build(BuildError::DuplicateElement(_))));
    // decimals compare by numeric value, whatever their scale
    assert_eq!(read1("1.0M"), read1("1.00M"));
    assert!(matches!(read_err("#{1.0M 1.00M}").err,
                     ReadError::Build(BuildError::DuplicateElement(Value::Decimal(_)))));
    assert!(matches!(read_err("{1.0M 1 1.00M 2}").err,
                     ReadError::Build(BuildError::DuplicateKey(Value::Decimal(_)))));
    // ...but stay distinct from the other number kinds
    assert!(read_str("#{1 1.0 1.0M 1N}").is_ok());
    // nil is a valid key
    assert_eq!(read1("{nil 1}").to_string(), "{nil 1}");
}

#[test]
fn delimiter_errors() {
    let e = read_err("(1 2]");
    match e.err {
        ReadError::ParenMismatch(Collkind::List, opening, Parenkind::Square) => {
            assert_eq!(opening, Pos { line: 0, col: 0 });
        }
        ref other => panic!("{:?}", other)
    }
    assert_eq!(e.pos, Pos { line: 0, col: 4 });
    assert!(matches!(read_err("#{1)").err,
                     ReadError::ParenMismatch(Collkind::Set, _, Parenkind::Round)));
    assert!(matches!(read_err(")").err,
                     ReadError::UnexpectedClosingParen(Parenkind::Round)));
    assert!(matches!(read_err("1 }").err,
                     ReadError::UnexpectedClosingParen(Parenkind::Curly)));
    let e = read_err("\n [1 (2");
    assert!(matches!(e.err,
                     ReadError::PrematureEofExpectingClosingParen(Collkind::List)));
    assert_eq!(e.pos, Pos { line: 1, col: 4 });
    assert_eq!(e.to_string(),
               "premature EOF while expecting closing character ')' for '(' @2.4");
}

#[test]
fn end_of_input_is_repeatable() -> Result<()> {
    let config = default_parser_config();
    let mut p = Parser::new(str_source(" 1 ; done\n"), config);
    assert_eq!(p.parse_next()?, Some(Value::Integer(1)));
    assert_eq!(p.parse_next()?, None);
    assert_eq!(p.parse_next()?, None);
    assert_eq!(read_str("")?, vec![]);
    assert_eq!(read_str(" ,; nothing")?, vec![]);
    assert_eq!(read_str("; c\n1")?, ints(&[1]));
    assert_eq!(read_str(", , ,1")?, ints(&[1]));
    Ok(())
}

#[test]
fn read_first_leaves_the_rest() -> Result<()> {
    assert_eq!(read_first("1 )")?, Some(Value::Integer(1)));
    assert_eq!(read_first("")?, None);
    Ok(())
}

#[test]
fn discard() -> Result<()> {
    assert_eq!(read_str("#_1 2")?, ints(&[2]));
    assert_eq!(read_str("#_ #_ 1 2 3")?, ints(&[3]));
    assert_eq!(read1("[1 #_ 2 3]"), Value::Vector(ints(&[1, 3])));
    assert_eq!(read1("[1 #_ [2 (3 #{4})] 5]"), Value::Vector(ints(&[1, 5])));
    assert_eq!(read1("{:a #_ :b 1}"), read1("{:a 1}"));
    // discarded at the end of the input
    assert_eq!(read_str("1 #_ 2")?, ints(&[1]));
    assert_eq!(read_first("#_ 1")?, None);
    // no transform runs on discarded tagged values
    assert_eq!(read1("[#_ #uuid \"not-a-uuid\" 1]"), Value::Vector(ints(&[1])));
    // ...but the discarded text still has to be well-formed
    assert!(matches!(read_err("[#_ (1 2] 3]").err, ReadError::ParenMismatch(..)));
    assert!(matches!(read_err("#_ \"abc").err,
                     ReadError::Scan(ScanError::UnterminatedString)));
    assert!(matches!(read_err("[1 #_]").err, ReadError::MissingDiscardOperand));
    assert!(matches!(read_err("#_").err, ReadError::MissingDiscardOperand));
    Ok(())
}

#[test]
fn builtin_tags() -> Result<()> {
    match read1("#uuid \"f81d4fae-7dec-11d0-a765-00a0c91e6bf6\"") {
        Value::Uuid(u) => assert_eq!(u.to_string(), "f81d4fae-7dec-11d0-a765-00a0c91e6bf6"),
        other => panic!("{:?}", other)
    }
    assert_eq!(read1("#inst \"1985-04-12T23:20:50.52Z\""),
               Value::Inst(parse_instant("1985-04-12T23:20:50.520Z")?));
    assert_eq!(read1("#inst \"2023\""),
               Value::Inst(parse_instant("2023-01-01T00:00:00+00:00")?));
    assert_eq!(read1("#inst \"2023-02\""), read1("#inst \"2023-02-01T00:00:00Z\""));
    assert_eq!(read1("#inst \"2023-02-03\""), read1("#inst \"2023-02-03T00:00:00Z\""));

    let e = read_err("[#uuid \"nope\"]");
    match e.err {
        ReadError::Tag { tag, .. } => assert_eq!(tag.to_string(), "#uuid"),
        ref other => panic!("{:?}", other)
    }
    assert_eq!(e.pos, Pos { line: 0, col: 1 });
    assert!(matches!(read_err("#inst 2023").err, ReadError::Tag { .. }));
    assert!(matches!(read_err("#inst \"yesterday\"").err, ReadError::Tag { .. }));
    Ok(())
}

#[test]
fn unknown_tags_become_tagged_values() {
    let v = read1("#myapp/Person {:name \"Fred\"}");
    match &v {
        Value::Tagged(t) => {
            assert_eq!(t.tag, Tag::new("myapp", "Person"));
            assert_eq!(t.value, read1("{:name \"Fred\"}"));
        }
        other => panic!("{:?}", other)
    }
    assert_eq!(v, Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new("myapp", "Person"),
        value: read1("{:name \"Fred\"}"),
    })));
    assert!(matches!(read_err("[#foo]").err, ReadError::MissingTagOperand(_)));
    assert!(matches!(read_err("#foo").err, ReadError::MissingTagOperand(_)));
    // a discarded operand leaves the tag without one
    assert!(matches!(read_err("[#foo #_ 1]").err, ReadError::MissingTagOperand(_)));
}

#[test]
fn tag_handlers() -> Result<()> {
    let config = ParserConfig::builder()
        .tag_handler(Tag::new("my", "inc"), |tag, v| match v {
            Value::Integer(i) => Ok(Value::Integer(i + 1)),
            other => Err(TagError::new(format!("{} wants an integer, got {}", tag, other)))
        })
        .without_tag_handler(&Tag::new("", "uuid"))
        .build();
    assert_eq!(read_str_with("[#my/inc 1 #my/inc #my/inc 1]", &config)?,
               vec![Value::Vector(ints(&[2, 3]))]);
    let e = read_str_with("#my/inc :x", &config).unwrap_err();
    assert_eq!(e.to_string(), "#my/inc: #my/inc wants an integer, got :x @1.0");
    // no longer transformed
    assert!(matches!(&read_str_with("#uuid \"nope\"", &config)?[..],
                     [Value::Tagged(_)]));
    Ok(())
}

#[test]
fn number_hooks() -> Result<()> {
    let config = ParserConfig::builder()
        .integer_hook(|i| Value::Double(i as f64))
        .double_hook(|d| Value::string(&format!("{}", d)))
        .build();
    assert_eq!(read_str_with("[1 2.5]", &config)?,
               vec![Value::Vector(vec![Value::Double(1.0), Value::string("2.5")])]);
    Ok(())
}

/// Collects vector elements in sorted order.
#[derive(Default)]
struct SortedVector(Vec<i64>);

impl CollectionBuilder for SortedVector {
    fn add(&mut self, v: Value) -> Result<(), BuildError> {
        match v {
            Value::Integer(i) => {
                self.0.push(i);
                Ok(())
            }
            other => Err(BuildError::Other(format!("not an integer: {}", other)))
        }
    }
    fn build(mut self: Box<Self>) -> Result<Value, BuildError> {
        self.0.sort();
        Ok(Value::Vector(ints(&self.0)))
    }
}

#[test]
fn collection_builders() -> Result<()> {
    let config = ParserConfig::builder()
        .collection_factory(Collkind::Vector,
                            Arc::new(|| Box::new(SortedVector::default())
                                     as Box<dyn CollectionBuilder>))
        .build();
    assert_eq!(read_str_with("([3 1 2])", &config)?,
               vec![Value::List(vec![Value::Vector(ints(&[1, 2, 3]))])]);
    let e = read_str_with("[1 :a]", &config).unwrap_err();
    assert!(matches!(e.err, ReadError::Build(BuildError::Other(_))));
    assert_eq!(e.pos, Pos { line: 0, col: 3 });
    Ok(())
}

#[test]
fn nesting_limit() {
    let config = ParserConfig::builder().max_depth(3).build();
    assert!(read_str_with("[[[1]]]", &config).is_ok());
    let e = read_str_with("[[[[1]]]]", &config).unwrap_err();
    assert!(matches!(e.err, ReadError::NestingTooDeep));
    assert_eq!(e.pos, Pos { line: 0, col: 3 });
    assert!(matches!(read_str_with("[[#_[1]]]", &config).unwrap_err().err,
                     ReadError::NestingTooDeep));

    let deep = format!("{}{}", "(".repeat(1000), ")".repeat(1000));
    assert!(matches!(read_err(&deep).err, ReadError::NestingTooDeep));
}

fn nested_vectors(n: usize) -> String {
    format!("{}1{}", "[".repeat(n), "]".repeat(n))
}

#[test]
fn nesting_up_to_the_default_limit() -> Result<()> {
    for n in [100, 300, 400, DEFAULT_MAX_DEPTH as usize - 1, DEFAULT_MAX_DEPTH as usize] {
        let mut v = read1(&nested_vectors(n));
        let mut depth = 0;
        loop {
            match v {
                Value::Vector(mut vs) => {
                    assert_eq!(vs.len(), 1);
                    v = vs.pop().unwrap();
                    depth += 1;
                }
                other => {
                    assert_eq!((depth, other), (n, Value::Integer(1)));
                    break
                }
            }
        }
    }
    let e = read_err(&nested_vectors(DEFAULT_MAX_DEPTH as usize + 1));
    assert!(matches!(e.err, ReadError::NestingTooDeep));
    assert_eq!(e.pos, Pos { line: 0, col: DEFAULT_MAX_DEPTH });

    // discarded content builds nothing, so depth is only bounded by
    // the setting
    let config = ParserConfig::builder().max_depth(200_001).build();
    let deep = format!("#_ {} 2", nested_vectors(200_000));
    assert_eq!(read_str_with(&deep, &config)?, ints(&[2]));
    Ok(())
}

/// Hands out its data, then fails.
struct FailingReader {
    data: &'static [u8],
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn io_errors() {
    let e = read_all(FailingReader { data: b"[1 2" }).unwrap_err();
    assert!(e.is_io());
    assert!(matches!(e.err, ReadError::Scan(ScanError::IO(_))));

    let e = read_all(&b"[\"\xff\"]"[..]).unwrap_err();
    assert!(e.is_io());

    assert!(! read_err("[1").is_io());
}

#[test]
fn reading_files() -> Result<()> {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("anyedn-read-test-{}.edn", std::process::id()));
    std::fs::write(&path, "{:a 1}\n[1 2)\n")?;
    let e = read_file(&path).unwrap_err();
    std::fs::remove_file(&path)?;
    assert!(! e.is_io());
    let msg = e.to_string();
    assert!(msg.starts_with("'[' @2.0 expects ']', got ')' in "), "{}", msg);
    assert!(msg.ends_with("@2.4"), "{}", msg);

    let e = read_file(&dir.join("anyedn-no-such-file.edn")).unwrap_err();
    assert!(e.is_io());
    assert!(e.to_string().contains("anyedn-no-such-file.edn\": "), "{}", e);
    Ok(())
}

#[test]
fn reading_named_streams() {
    let e = read_named_with(&b"[1\n 2 @]"[..], "stdin", default_parser_config())
        .unwrap_err();
    assert_eq!(e.to_string(), "unexpected character '@' from (stdin)@2.3");
    let e = read_named_with(FailingReader { data: b"" }, "pipe", default_parser_config())
        .unwrap_err();
    assert!(e.is_io());
}

#[test]
fn config_is_shared_between_threads() {
    let handles: Vec<_> = (0..4).map(|i| {
        std::thread::spawn(move || {
            read_str_with(&format!("[{} #inst \"2020\"]", i), default_parser_config())
                .map(|vs| vs.len())
                .unwrap_or(0)
        })
    }).collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 1);
    }
}
