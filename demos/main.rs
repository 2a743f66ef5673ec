// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyedn::pos::Pos;
use anyedn::print::write_all;
use anyedn::read::{read_file_with, read_named_with};
use anyedn::scan::{Collkind, Scanner, Token, TokenWithPos};
use anyedn::settings::ParserConfig;
use anyedn::source::reader_source;
use clap::Parser as ClapParser;
use std::io::{stdin, stdout, BufWriter};
use std::path::PathBuf;
use anyhow::{Result, bail};


fn indentstr(i: usize) -> Option<&'static str> {
    "                                                                  ".get(0..i)
}

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Build up a tree of all content (default: stream tokens)
    #[clap(short, long, value_parser)]
    ast: bool,
    /// Print the parsed data
    #[clap(long, value_parser)]
    print: bool,
    /// Show the token position (only with --print and no --ast)
    #[clap(long, value_parser)]
    pos: bool,
    /// Reject \uXXXX escapes
    #[clap(long, value_parser)]
    no_unicode_escapes: bool,
    /// Path to the input file, `-` for stdin (only with --ast)
    #[clap(value_parser, required(true))]
    input_path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = ParserConfig::builder()
        .unicode_escapes(! args.no_unicode_escapes)
        .build();

    if args.ast {

        // Read the whole file as a list of values, then optionally
        // print those.

        let v =
            if args.input_path.as_os_str() == "-" {
                read_named_with(stdin().lock(), "stdin", &config)?
            } else {
                read_file_with(&args.input_path, &config)?
            };
        if args.print {
            write_all(BufWriter::new(stdout()), &v)?;
        }

    } else {

        // Go through the token stream of the file contents, check the
        // nesting and optionally print the tokens.

        let fh = std::fs::File::open(&args.input_path)?;
        let mut scanner = Scanner::new(reader_source(fh), config.scan_settings());
        let mut count_toplevel = 0;
        let mut count_enter = 0;
        let mut parenstack: Vec<(Collkind, Pos)> = Vec::new();
        loop {
            let TokenWithPos(token, pos) = scanner.next_token()
                .map_err(|e| anyhow::anyhow!("{:?}: {}", args.input_path, e))?;
            let indentlevel;
            match token {
                Token::EndOfInput => {
                    if let Some((kind, opening_pos)) = parenstack.pop() {
                        bail!("premature EOF in {:?}, expecting '{}' for '{}' {}",
                              args.input_path, kind.closing(), kind.opening(),
                              opening_pos)
                    }
                    break
                }
                Token::Open(kind) => {
                    count_enter += 1;
                    if parenstack.is_empty() {
                        count_toplevel += 1;
                    }
                    indentlevel = parenstack.len();
                    parenstack.push((kind, pos));
                }
                Token::Close(pk) => {
                    if let Some((expected_kind, opening_pos)) = parenstack.pop() {
                        if pk != expected_kind.parenkind() {
                            bail!("expected closing character '{}' (opening {}), \
                                   got '{}' at {:?}{}",
                                  expected_kind.closing(),
                                  opening_pos,
                                  pk.closing(),
                                  args.input_path,
                                  pos)
                        }
                        indentlevel = parenstack.len();
                    } else {
                        bail!("unexpected closing character '{}' at {:?}{}",
                              pk.closing(), args.input_path, pos)
                    }
                }
                _ => {
                    if parenstack.is_empty() {
                        count_toplevel += 1;
                    }
                    indentlevel = parenstack.len();
                }
            }
            if args.print {
                if let Some(indent) = indentstr(indentlevel) {
                    if args.pos {
                        println!("{indent}{pos} {token}");
                    } else {
                        println!("{indent}{token}");
                    }
                } else {
                    bail!("collections nested too deeply at {:?}{}",
                          args.input_path, pos)
                }
            }
        }
        println!(";; count_toplevel = {count_toplevel}, count_enter = {count_enter}");

    }
    Ok(())
}
