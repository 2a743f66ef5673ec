use anyhow::Result;
use anyedn::pos::Pos;
use anyedn::scan::{Collkind, Parenkind, ScanError, Scanner, Token, TokenWithPos};
use anyedn::settings::{ParserConfig, ScanSettings};
use anyedn::source::str_source;
use anyedn::symbol::{Keyword, Symbol, SymbolError, Tag};
use anyedn::value::Value;
use num::BigInt;
use std::str::FromStr;

fn tokens_with(s: &str, settings: &ScanSettings) -> Result<Vec<TokenWithPos>, ScanError> {
    let mut scanner = Scanner::new(str_source(s), settings);
    let mut out = Vec::new();
    loop {
        let t = scanner.next_token().map_err(|e| e.err)?;
        if let Token::EndOfInput = t.0 {
            return Ok(out)
        }
        out.push(t);
    }
}

fn tokens(s: &str) -> Result<Vec<Token>, ScanError> {
    Ok(tokens_with(s, &ScanSettings::default())?
       .into_iter().map(|TokenWithPos(t, _)| t).collect())
}

fn atoms(s: &str) -> Result<Vec<Value>> {
    tokens(s)?.into_iter().map(|t| match t {
        Token::Atom(v) => Ok(v),
        other => anyhow::bail!("not an atom: {:?}", other)
    }).collect()
}

fn atom(s: &str) -> Value {
    let mut vs = atoms(s).unwrap();
    assert_eq!(vs.len(), 1, "{:?}", s);
    vs.pop().unwrap()
}

fn scan_err(s: &str) -> ScanError {
    tokens(s).unwrap_err()
}

#[test]
fn symbols() {
    assert_eq!(atom("foo"), Value::symbol("foo"));
    assert_eq!(atom("foo/bar"), Value::Symbol(Symbol::new("foo", "bar")));
    assert_eq!(atom("/"), Value::Symbol(Symbol::new("", "/")));
    assert_eq!(atom("foo//"), Value::Symbol(Symbol::new("foo", "/")));
    assert_eq!(atom("-"), Value::symbol("-"));
    assert_eq!(atom("+"), Value::symbol("+"));
    assert_eq!(atom("-foo"), Value::symbol("-foo"));
    assert_eq!(atom(".bar"), Value::symbol(".bar"));
    assert_eq!(atom("a#b:c"), Value::symbol("a#b:c"));
    assert_eq!(atom("<=>"), Value::symbol("<=>"));
    assert_eq!(atom("true"), Value::Bool(true));
    assert_eq!(atom("false"), Value::Bool(false));
    assert_eq!(atom("truex"), Value::symbol("truex"));
    assert!(matches!(tokens("nil").unwrap()[..], [Token::Nil]));

    assert!(matches!(scan_err("/foo"),
                     ScanError::InvalidSymbol(_, SymbolError::MisplacedSlash)));
    assert!(matches!(scan_err("foo/"),
                     ScanError::InvalidSymbol(_, SymbolError::MisplacedSlash)));
    assert!(matches!(scan_err("a/b/c"),
                     ScanError::InvalidSymbol(_, SymbolError::MisplacedSlash)));
    for bad in ["foo//x", "//foo", "//"] {
        assert!(matches!(scan_err(bad),
                         ScanError::InvalidSymbol(_, SymbolError::MisplacedSlash)), "{}", bad);
    }
    assert!(matches!(scan_err(".5x"),
                     ScanError::InvalidSymbol(_, SymbolError::LooksLikeNumber)));
}

#[test]
fn keywords_and_tags() {
    assert_eq!(atom(":foo"), Value::keyword("foo"));
    assert_eq!(atom(":a/b"), Value::Keyword(Keyword::new("a", "b")));
    assert!(matches!(scan_err(":/"), ScanError::InvalidKeyword(_, _)));
    assert!(matches!(scan_err(": foo"), ScanError::InvalidKeyword(_, _)));
    match &tokens("#my/tag 1").unwrap()[..] {
        [Token::Tag(t), Token::Atom(Value::Integer(1))] => {
            assert_eq!(*t, Tag::new("my", "tag"));
        }
        other => panic!("{:?}", other)
    }
}

#[test]
fn numbers() {
    assert_eq!(atom("0"), Value::Integer(0));
    assert_eq!(atom("-17"), Value::Integer(-17));
    assert_eq!(atom("+17"), Value::Integer(17));
    assert_eq!(atom("7N"), Value::BigInteger(BigInt::from(7)));
    assert_eq!(atom("123456789012345678901234567890"),
               Value::BigInteger(BigInt::from_str("123456789012345678901234567890").unwrap()));
    assert_eq!(atom("-9223372036854775808"), Value::Integer(i64::MIN));
    assert_eq!(atom("9223372036854775807"), Value::Integer(i64::MAX));
    assert_eq!(atom("9223372036854775808"),
               Value::BigInteger(BigInt::from(i64::MAX) + 1));
    assert_eq!(atom("1.5"), Value::Double(1.5));
    assert_eq!(atom("1."), Value::Double(1.0));
    assert_eq!(atom("-2.5e3"), Value::Double(-2500.0));
    assert_eq!(atom("1E-2"), Value::Double(0.01));
    assert_eq!(atom("3e+2"), Value::Double(300.0));
    assert_eq!(atom("1.25M"),
               Value::Decimal(bigdecimal::BigDecimal::from_str("1.25").unwrap()));
    assert_eq!(atom("2M"),
               Value::Decimal(bigdecimal::BigDecimal::from_str("2").unwrap()));

    assert!(matches!(scan_err("1e"), ScanError::MissingExponentDigits(_)));
    assert!(matches!(scan_err("12abc"), ScanError::NotANumber(_)));
    assert!(matches!(scan_err("1.5N"), ScanError::NotANumber(_)));
}

#[test]
fn symbolic_doubles() {
    assert_eq!(atom("##Inf"), Value::Double(f64::INFINITY));
    assert_eq!(atom("##-Inf"), Value::Double(f64::NEG_INFINITY));
    match atom("##NaN") {
        Value::Double(d) => assert!(d.is_nan()),
        other => panic!("{:?}", other)
    }
    assert!(matches!(scan_err("##Foo"), ScanError::UnknownSymbolicValue(_)));
}

#[test]
fn characters() {
    assert_eq!(atoms(r"\a \Z \( \newline \space \tab \return \backspace \formfeed")
               .unwrap(),
               ['a', 'Z', '(', '\n', ' ', '\t', '\r', '\x08', '\x0C']
               .iter().map(|c| Value::Char(*c)).collect::<Vec<_>>());
    assert_eq!(atom(r"\é"), Value::Char('é'));
    assert_eq!(atom(r"\u"), Value::Char('u'));
    assert!(matches!(tokens(r"[\x]").unwrap()[..],
                     [Token::Open(Collkind::Vector),
                      Token::Atom(Value::Char('x')),
                      Token::Close(Parenkind::Square)]));
    assert_eq!(atom(r"\u00e9"), Value::Char('é'));
    assert!(matches!(scan_err(r"\foo"), ScanError::UnknownCharName(_)));
    assert!(matches!(scan_err(r"\ "), ScanError::WhitespaceInChar));
    assert!(matches!(scan_err("\\"), ScanError::UnterminatedChar));
}

#[test]
fn strings() {
    assert_eq!(atom(r#""a\tb\nc\"d\\e""#), Value::string("a\tb\nc\"d\\e"));
    assert_eq!(atom(r#""\u0041\u00e9""#), Value::string("Aé"));
    assert_eq!(atom(r#""\ud83d\ude00""#), Value::string("\u{1F600}"));
    assert_eq!(atom("\"multi\nline\""), Value::string("multi\nline"));
    assert!(matches!(scan_err(r#""abc"#), ScanError::UnterminatedString));
    assert!(matches!(scan_err(r#""a\qb""#), ScanError::InvalidEscapedChar('q')));
    assert!(matches!(scan_err(r#""\u00g1""#), ScanError::NonHexDigit('g')));
    assert!(matches!(scan_err(r#""\ud83d""#), ScanError::InvalidCodePoint(_)));
}

#[test]
fn unicode_escapes_can_be_disabled() {
    let config = ParserConfig::builder().unicode_escapes(false).build();
    let settings = config.scan_settings();
    assert!(matches!(tokens_with(r#""\u0041""#, settings),
                     Err(ScanError::UnicodeEscapeDisabled)));
    assert!(matches!(tokens_with(r"\u0041", settings),
                     Err(ScanError::UnicodeEscapeDisabled)));
    // not an escape, so still just an unknown name
    assert!(matches!(tokens_with(r"\uvwx", settings),
                     Err(ScanError::UnknownCharName(_))));
    assert!(tokens_with(r#""plain\n""#, settings).is_ok());
}

#[test]
fn delimiters_comments_and_commas() -> Result<()> {
    let ts = tokens("(a,b) ; comment (ignored\n[#{} {}] #_x")?;
    let shape: Vec<String> = ts.iter().map(|t| t.to_string()).collect();
    assert_eq!(shape, ["(", "a", "b", ")", "[", "#{", "}", "{", "}", "]", "#_", "x"]);
    assert!(matches!(ts[4], Token::Open(Collkind::Vector)));
    assert!(matches!(ts[5], Token::Open(Collkind::Set)));
    assert!(matches!(ts[6], Token::Close(Parenkind::Curly)));
    assert!(matches!(ts[7], Token::Open(Collkind::Map)));
    Ok(())
}

#[test]
fn comment_ends_a_token() -> Result<()> {
    assert_eq!(atoms("foo;bar\n12;x\n")?, [Value::symbol("foo"), Value::Integer(12)]);
    Ok(())
}

#[test]
fn positions() -> Result<()> {
    let ts = tokens_with("a\n  (b \"c\")", &ScanSettings::default())?;
    let pos: Vec<Pos> = ts.iter().map(|TokenWithPos(_, p)| *p).collect();
    assert_eq!(pos, [Pos { line: 0, col: 0 },
                     Pos { line: 1, col: 2 },
                     Pos { line: 1, col: 3 },
                     Pos { line: 1, col: 5 },
                     Pos { line: 1, col: 8 }]);
    assert_eq!(pos[1].to_string(), "@2.2");
    Ok(())
}

#[test]
fn unexpected_characters() {
    assert!(matches!(scan_err("@foo"), ScanError::UnexpectedChar('@')));
    assert!(matches!(scan_err("#"), ScanError::InvalidHashToken));
    assert!(matches!(scan_err("#1"), ScanError::InvalidHashToken));
}
