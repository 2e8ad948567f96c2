//! Nom-based line parser.
//!
//! The grammar is deliberately loose. It only pulls out the pieces the
//! client needs: an optional origin, the command, an optional single-word
//! target and a free-form remainder.
//!
//! ```text
//! [:origin ]<command>[ [<target> ][:]<remainder>]
//! ```

use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::char,
    combinator::{opt, rest},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{preceded, terminated},
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// `:origin ` with the trailing space consumed.
fn parse_origin(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing origin",
        terminated(preceded(char(':'), take_till1(|c| c == ' ')), char(' ')),
    )(input)
}

/// The command token: a protocol verb or a numeric.
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing command",
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    )(input)
}

/// A target word. Only counts as a target when a space follows it.
fn parse_target(input: &str) -> ParseResult<&str, &str> {
    terminated(take_while1(|c| c != ' ' && c != ':'), char(' '))(input)
}

/// Split one line (without terminator) into its raw pieces.
pub fn parse_line(input: &str) -> ParseResult<&str, RawLine<'_>> {
    let (input, origin) = opt(parse_origin)(input)?;
    let (input, command) = parse_command(input)?;

    if input.is_empty() {
        return Ok((
            input,
            RawLine {
                origin,
                command,
                target: None,
                remainder: None,
            },
        ));
    }

    let (input, _) = context("parsing separator", char(' '))(input)?;
    let (input, target) = opt(parse_target)(input)?;
    let (input, _) = opt(char(':'))(input)?;
    let (input, remainder) = rest(input)?;

    Ok((
        input,
        RawLine {
            origin,
            command,
            target,
            remainder: Some(remainder),
        },
    ))
}

/// The pieces of a line before any disambiguation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub origin: Option<&'a str>,
    pub command: &'a str,
    pub target: Option<&'a str>,
    pub remainder: Option<&'a str>,
}

impl<'a> RawLine<'a> {
    /// Parse `input`, returning the byte position where matching failed.
    pub fn parse(input: &'a str) -> Result<Self, usize> {
        match parse_line(input) {
            Ok((_, line)) => Ok(line),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let position = e
                    .errors
                    .iter()
                    .find(|(_, kind)| !matches!(kind, VerboseErrorKind::Context(_)))
                    .or_else(|| e.errors.first())
                    .map(|(rest, _)| input.len() - rest.len())
                    .unwrap_or(0);
                Err(position)
            }
            Err(nom::Err::Incomplete(_)) => Err(input.len()),
        }
    }
}
