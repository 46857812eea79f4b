//! Template tokenizer using nom.
//!
//! Splits a query template into literal SQL text and named placeholders.
//!
//! ```text
//! UPDATE t SET x = :x WHERE note = ':x' AND id::int = :id
//!                  ─┬                ─┬─     ─┬       ─┬─
//!                   │                 │       │        └── Placeholder("id")
//!                   │                 │       └── cast, stays literal
//!                   │                 └── inside a string literal, stays literal
//!                   └── Placeholder("x")
//! ```
//!
//! Postgres escape strings (`E'...'`) are recognized as well, so `\'` inside
//! them does not end the literal. Dollar-quoted bodies (`$$...$$`) and
//! comments are not: a `:name` inside them is still a placeholder.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while, take_while1},
    character::complete::{anychar, char, one_of, satisfy},
    combinator::{map, recognize},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};

/// One piece of a tokenized template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// SQL text passed through unchanged.
    Literal(&'a str),
    /// A `:name` token; holds the name without the colon.
    Placeholder(&'a str),
}

/// Tokenize a complete template.
///
/// Every input is accepted: anything that is not a placeholder is literal text.
pub fn segments(input: &str) -> Vec<Segment<'_>> {
    match many0(parse_segment)(input) {
        Ok((_, segments)) => merge_literals(input, segments),
        // many0 only fails if a branch accepts without consuming, which none do.
        Err(_) => vec![Segment::Literal(input)],
    }
}

/// Names of all placeholders in order of appearance (duplicates kept).
pub fn placeholder_names(input: &str) -> Vec<&str> {
    segments(input)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

fn parse_segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(escape_quoted, Segment::Literal),
        map(single_quoted, Segment::Literal),
        map(double_quoted, Segment::Literal),
        // Postgres cast: value::type
        map(tag("::"), Segment::Literal),
        map(parse_placeholder, Segment::Placeholder),
        map(take_while1(|c: char| !matches!(c, '\'' | '"' | ':' | 'e' | 'E')), Segment::Literal),
        // Lone ':', an unterminated quote, or an `e` that starts no escape string
        map(recognize(anychar), Segment::Literal),
    ))(input)
}

/// Parse `:name`, returning `name`.
fn parse_placeholder(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), parse_identifier)(input)
}

/// Parse an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Parse a string literal `'...'` with `''` escapes.
fn single_quoted(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('\''),
        many0(alt((is_not("'"), tag("''")))),
        char('\''),
    )))(input)
}

/// Parse an escape string `E'...'`, where a backslash escapes the next character.
fn escape_quoted(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        one_of("eE"),
        char('\''),
        many0(alt((
            is_not("\\'"),
            recognize(pair(char('\\'), anychar)),
            tag("''"),
        ))),
        char('\''),
    )))(input)
}

/// Parse a quoted identifier `"..."` with `""` escapes.
fn double_quoted(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('"'),
        many0(alt((is_not("\""), tag("\"\"")))),
        char('"'),
    )))(input)
}

/// Join runs of adjacent literals back into single slices of `input`.
fn merge_literals<'a>(input: &'a str, segments: Vec<Segment<'a>>) -> Vec<Segment<'a>> {
    let mut merged: Vec<Segment<'a>> = Vec::with_capacity(segments.len());
    let base = input.as_ptr() as usize;

    for segment in segments {
        let previous = match merged.last() {
            Some(Segment::Literal(prev)) => Some(*prev),
            _ => None,
        };
        match (previous, segment) {
            (Some(prev), Segment::Literal(next)) => {
                let start = prev.as_ptr() as usize - base;
                let end = next.as_ptr() as usize - base + next.len();
                merged.pop();
                merged.push(Segment::Literal(&input[start..end]));
            }
            (_, segment) => merged.push(segment),
        }
    }

    merged
}
