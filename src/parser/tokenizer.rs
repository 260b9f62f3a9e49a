// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Tokenizer for JSONPath queries
//!
//! Built from `nom` combinators over a `nom_locate` span so every token
//! carries its byte range together with line and column. Blank space is
//! skipped here; whether it was allowed is decided by the parser, which can
//! see the gap between adjacent token spans.

use super::error::{ParseResult, SyntaxError};
use super::span::helpers::spanned;
use super::span::{Span, Spanned};
use nom::{
    IResult, Input, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{map, opt, recognize},
    multi::many0,
    sequence::preceded,
};
use std::str::CharIndices;

/// JSONPath token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// Root identifier ($)
    Dollar,
    /// Current node identifier (@)
    At,
    /// Child shorthand (.)
    Dot,
    /// Descendant shorthand (..)
    DotDot,
    /// Wildcard (*)
    Star,
    /// Filter selector marker (?)
    Question,
    /// Comma separator (,)
    Comma,
    /// Slice separator (:)
    Colon,
    /// Left square bracket [
    LeftBracket,
    /// Right square bracket ]
    RightBracket,
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Equality operator (==)
    EqualEqual,
    /// Inequality operator (!=)
    NotEqual,
    /// Less than operator (<)
    LessThan,
    /// Less than or equal operator (<=)
    LessThanOrEqual,
    /// Greater than operator (>)
    GreaterThan,
    /// Greater than or equal operator (>=)
    GreaterThanOrEqual,
    /// Logical AND operator (&&)
    AndAnd,
    /// Logical OR operator (||)
    OrOr,
    /// Logical NOT operator (!)
    Bang,
    /// Number as written, validated by the parser for the position it is in
    Number(&'input str),
    /// Quoted string with escapes already decoded
    String(String),
    /// Member name shorthand, function name or keyword literal
    Name(&'input str),
    /// End of input
    Eof,
}

impl<'input> Token<'input> {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(text) => format!("number {text}"),
            Token::String(value) => format!("string '{value}'"),
            Token::Name(name) => format!("name '{name}'"),
            Token::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Dollar => "$",
            Token::At => "@",
            Token::Dot => ".",
            Token::DotDot => "..",
            Token::Star => "*",
            Token::Question => "?",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::EqualEqual => "==",
            Token::NotEqual => "!=",
            Token::LessThan => "<",
            Token::LessThanOrEqual => "<=",
            Token::GreaterThan => ">",
            Token::GreaterThanOrEqual => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Bang => "!",
            Token::Number(_) | Token::String(_) | Token::Name(_) | Token::Eof => "",
        }
    }
}

/// Tokenize a JSONPath query
///
/// The returned list always ends with a [`Token::Eof`] positioned at the end
/// of the input.
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned<Token<'_>>>> {
    let span = Span::new(input);
    let (rest, mut tokens) = many0(preceded(multispace0, token))
        .parse(span)
        .map_err(into_syntax_error)?;
    let (rest, _) = multispace0::<_, SyntaxError>(rest).map_err(into_syntax_error)?;
    if let Some(c) = rest.fragment().chars().next() {
        return Err(SyntaxError::at(
            &rest,
            format!("unexpected character '{}'", c.escape_default()),
        ));
    }
    tokens.push(spanned(&rest, &rest, Token::Eof));
    log::trace!("tokenized {} tokens from {:?}", tokens.len(), input);
    Ok(tokens)
}

fn into_syntax_error(error: nom::Err<SyntaxError>) -> SyntaxError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => SyntaxError::new(1, 0, "unexpected end of input", None),
    }
}

fn token<'a>(input: Span<'a>) -> IResult<Span<'a>, Spanned<Token<'a>>, SyntaxError> {
    alt((
        token_number,
        token_string,
        token_name,
        token_multi_char_op,
        token_single_char,
    ))
    .parse(input)
}

fn token_number<'a>(input: Span<'a>) -> IResult<Span<'a>, Spanned<Token<'a>>, SyntaxError> {
    let start = input;
    let (input, text) = recognize((
        opt(char('-')),
        digit1,
        opt((char('.'), digit1)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)?;

    Ok((input, spanned(&start, &input, Token::Number(*text.fragment()))))
}

fn token_string<'a>(input: Span<'a>) -> IResult<Span<'a>, Spanned<Token<'a>>, SyntaxError> {
    let start = input;
    let (input, quote) = one_of("'\"").parse(input)?;

    let mut value = String::new();
    let mut chars = input.fragment().char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            c if c == quote => {
                let (rest, _) = input.take_split(offset + c.len_utf8());
                return Ok((rest, spanned(&start, &rest, Token::String(value))));
            }
            '\\' => match unescape(&mut chars, quote) {
                Some(decoded) => value.push(decoded),
                None => return Err(failure_at(input, offset, "invalid escape sequence")),
            },
            c if u32::from(c) < 0x20 => {
                return Err(failure_at(
                    input,
                    offset,
                    "control characters must be escaped in string literals",
                ));
            }
            c => value.push(c),
        }
    }

    Err(nom::Err::Failure(SyntaxError::at(
        &start,
        "unterminated string literal",
    )))
}

fn failure_at(input: Span<'_>, offset: usize, message: &str) -> nom::Err<SyntaxError> {
    let (at, _) = input.take_split(offset);
    nom::Err::Failure(SyntaxError::at(&at, message))
}

/// Decode the escape sequence following a backslash
fn unescape(chars: &mut CharIndices<'_>, quote: char) -> Option<char> {
    let (_, c) = chars.next()?;
    let decoded = match c {
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '/' => '/',
        '\\' => '\\',
        c if c == quote => c,
        'u' => {
            let high = hex4(chars)?;
            match high {
                0xD800..=0xDBFF => {
                    let (_, backslash) = chars.next()?;
                    let (_, u) = chars.next()?;
                    if backslash != '\\' || u != 'u' {
                        return None;
                    }
                    let low = hex4(chars)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return None;
                    }
                    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))?
                }
                0xDC00..=0xDFFF => return None,
                _ => char::from_u32(high)?,
            }
        }
        _ => return None,
    };
    Some(decoded)
}

fn hex4(chars: &mut CharIndices<'_>) -> Option<u32> {
    let mut value = 0;
    for _ in 0..4 {
        let (_, c) = chars.next()?;
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

fn is_name_first(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_first(c) || c.is_ascii_digit()
}

fn token_name<'a>(input: Span<'a>) -> IResult<Span<'a>, Spanned<Token<'a>>, SyntaxError> {
    let start = input;
    let (input, name) =
        recognize((satisfy(is_name_first), take_while(is_name_char))).parse(input)?;

    Ok((input, spanned(&start, &input, Token::Name(*name.fragment()))))
}

fn token_multi_char_op<'a>(input: Span<'a>) -> IResult<Span<'a>, Spanned<Token<'a>>, SyntaxError> {
    let start = input;

    let (input, token) = alt((
        map(tag(".."), |_| Token::DotDot),
        map(tag("=="), |_| Token::EqualEqual),
        map(tag("!="), |_| Token::NotEqual),
        map(tag("<="), |_| Token::LessThanOrEqual),
        map(tag(">="), |_| Token::GreaterThanOrEqual),
        map(tag("&&"), |_| Token::AndAnd),
        map(tag("||"), |_| Token::OrOr),
    ))
    .parse(input)?;

    Ok((input, spanned(&start, &input, token)))
}

fn token_single_char<'a>(input: Span<'a>) -> IResult<Span<'a>, Spanned<Token<'a>>, SyntaxError> {
    let start = input;

    let (input, token) = alt((
        map(char('$'), |_| Token::Dollar),
        map(char('@'), |_| Token::At),
        map(char('.'), |_| Token::Dot),
        map(char('*'), |_| Token::Star),
        map(char('?'), |_| Token::Question),
        map(char(','), |_| Token::Comma),
        map(char(':'), |_| Token::Colon),
        map(char('['), |_| Token::LeftBracket),
        map(char(']'), |_| Token::RightBracket),
        map(char('('), |_| Token::LeftParen),
        map(char(')'), |_| Token::RightParen),
        map(char('<'), |_| Token::LessThan),
        map(char('>'), |_| Token::GreaterThan),
        map(char('!'), |_| Token::Bang),
    ))
    .parse(input)?;

    Ok((input, spanned(&start, &input, token)))
}
