// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Line lexer for the protobuf-text netlist dialect.
//!
//! Each physical line is split into statements:
//! - `node {` / `attr {` / `value {` -> [`Statement::Open`]
//! - `}` -> [`Statement::Close`]
//! - `name: "x"` / `f: 1.5` -> [`Statement::Field`]
//!
//! Blank lines and lines starting with `#` produce nothing.

use std::collections::VecDeque;
use std::iter::Enumerate;
use std::str::Lines;

use nom::{
    branch::alt,
    bytes::complete::{escaped, take_while1},
    character::complete::{char, none_of, one_of, space0},
    combinator::{eof, map, value},
    multi::many0,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::error::{PlcError, PlcResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Open(String),
    Close,
    Field { key: String, value: String },
}

/// A statement with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub line: usize,
    pub statement: Statement,
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ':' | '{' | '}' | '"')
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char).parse(input)
}

/// Quoted string; escapes are kept verbatim so names compare equal
/// wherever they are written.
fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(
            char('"'),
            escaped(none_of("\\\""), '\\', one_of("\"\\'nrt[]/")),
            char('"'),
        ),
        value("", (char('"'), char('"'))),
    ))
    .parse(input)
}

fn field(input: &str) -> IResult<&str, Statement> {
    map(
        (word, space0, char(':'), space0, alt((quoted, word))),
        |(key, _, _, _, value): (&str, &str, char, &str, &str)| Statement::Field {
            key: key.to_string(),
            value: value.to_string(),
        },
    )
    .parse(input)
}

fn open(input: &str) -> IResult<&str, Statement> {
    map(terminated(word, (space0, char('{'))), |name: &str| {
        Statement::Open(name.to_string())
    })
    .parse(input)
}

fn close(input: &str) -> IResult<&str, Statement> {
    value(Statement::Close, char('}')).parse(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    preceded(space0, alt((field, open, close))).parse(input)
}

/// Split one line into statements.
pub fn lex_line(line: &str) -> Result<Vec<Statement>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Vec::new());
    }

    match terminated(many0(statement), (space0, eof)).parse(line) {
        Ok((_, statements)) => Ok(statements),
        Err(_) => Err(format!("unrecognized text `{trimmed}`")),
    }
}

/// Lazy statement stream over a whole netlist.
pub struct Lexer<'a> {
    lines: Enumerate<Lines<'a>>,
    pending: VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().enumerate(),
            pending: VecDeque::new(),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = PlcResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() {
            let (index, line) = self.lines.next()?;
            match lex_line(line) {
                Ok(statements) => self
                    .pending
                    .extend(statements.into_iter().map(|statement| Token {
                        line: index + 1,
                        statement,
                    })),
                Err(message) => {
                    return Some(Err(PlcError::MalformedRecord {
                        line: index + 1,
                        message,
                    }))
                }
            }
        }
        self.pending.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key: &str, value: &str) -> Statement {
        Statement::Field {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_lex_structural_lines() {
        assert_eq!(
            lex_line("node {"),
            Ok(vec![Statement::Open("node".to_string())])
        );
        assert_eq!(lex_line("  }"), Ok(vec![Statement::Close]));
        assert_eq!(
            lex_line("  name: \"Grp_2/Poutput_single_0\""),
            Ok(vec![field("name", "Grp_2/Poutput_single_0")])
        );
        assert_eq!(lex_line("      f: -12.5"), Ok(vec![field("f", "-12.5")]));
    }

    #[test]
    fn test_lex_skips_blank_and_comment() {
        assert_eq!(lex_line(""), Ok(vec![]));
        assert_eq!(lex_line("   "), Ok(vec![]));
        assert_eq!(lex_line("  # node {"), Ok(vec![]));
    }

    #[test]
    fn test_lex_compact_line() {
        let statements = lex_line("attr { key: \"x\" value { f: 3 } }").unwrap();
        assert_eq!(
            statements,
            vec![
                Statement::Open("attr".to_string()),
                field("key", "x"),
                Statement::Open("value".to_string()),
                field("f", "3"),
                Statement::Close,
                Statement::Close,
            ]
        );
    }

    #[test]
    fn test_lex_escaped_name() {
        assert_eq!(
            lex_line(r#"name: "mem\[0\]/A""#),
            Ok(vec![field("name", r"mem\[0\]/A")])
        );
        assert_eq!(lex_line(r#"placeholder: """#), Ok(vec![field("placeholder", "")]));
    }

    #[test]
    fn test_lex_rejects_garbage() {
        assert!(lex_line("name \"unterminated").is_err());
        assert!(lex_line("name: \"a\" \"b\"").is_err());
    }

    #[test]
    fn test_lexer_line_numbers() {
        let content = "node {\n\n  name: \"a\"\n}\n";
        let tokens: Vec<Token> = Lexer::new(content).map(|t| t.unwrap()).collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens[2].line, 4);
    }
}
