//! Search string lexer using nom.
//!
//! Whitespace only separates tokens. `(` and `)` always stand alone. Inside a
//! bare word the first operator splits it into key, operator and value; the
//! value that follows is taken literally up to whitespace or a parenthesis.

use super::ast::{Connector, Operator, Token};
use crate::core::{Result, SearchError};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::char,
    combinator::{not, recognize, value},
    multi::many1,
    sequence::{delimited, terminated},
    IResult,
};

/// Split a search string into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input;
    let mut depth = 0usize;
    let mut pending_op: Option<Operator> = None;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let offset = input.len() - rest.len();

        if let Some(op) = pending_op.take() {
            let (remaining, token) = value_token(rest, op, offset)?;
            if token == Token::LParen {
                depth += 1;
            }
            tokens.push(token);
            rest = remaining;
            continue;
        }

        if let Some(remaining) = rest.strip_prefix('(') {
            depth += 1;
            tokens.push(Token::LParen);
            rest = remaining;
        } else if let Some(remaining) = rest.strip_prefix(')') {
            if depth == 0 {
                return Err(SearchError::syntax(format!("unmatched ')' at position {}", offset)));
            }
            depth -= 1;
            tokens.push(Token::RParen);
            rest = remaining;
        } else if rest.starts_with('"') {
            let (remaining, text) = quoted(rest, offset)?;
            tokens.push(Token::Phrase(text.to_string()));
            rest = remaining;
        } else if let Ok((remaining, op)) = operator(rest) {
            tokens.push(Token::Operator(op));
            pending_op = Some(op);
            rest = remaining;
        } else if let Ok((remaining, word)) = bare_word(rest) {
            // A word followed by an operator is always a key
            let is_key = operator(remaining.trim_start()).is_ok();
            let token = match keyword(word) {
                Some(connector) if !is_key => Token::Keyword(connector),
                _ => Token::Word(word.to_string()),
            };
            tokens.push(token);
            rest = remaining;
        } else {
            return Err(SearchError::syntax(format!(
                "unexpected character at position {}",
                offset
            )));
        }
    }

    if let Some(op) = pending_op {
        return Err(SearchError::syntax(format!("operator '{}' has no value", op)));
    }
    if depth > 0 {
        return Err(SearchError::syntax(format!("{} unmatched '('", depth)));
    }

    Ok(tokens)
}

/// Lex the value following an operator
fn value_token(input: &str, op: Operator, offset: usize) -> Result<(&str, Token)> {
    if let Some(remaining) = input.strip_prefix('(') {
        return Ok((remaining, Token::LParen));
    }
    if input.starts_with('"') {
        let (remaining, text) = quoted(input, offset)?;
        return Ok((remaining, Token::Phrase(text.to_string())));
    }
    match value_word(input) {
        Ok((remaining, word)) => Ok((remaining, Token::Word(word.to_string()))),
        Err(_) => Err(SearchError::syntax(format!(
            "operator '{}' has no value at position {}",
            op, offset
        ))),
    }
}

fn quoted(input: &str, offset: usize) -> Result<(&str, &str)> {
    phrase(input).map_err(|_| {
        SearchError::syntax(format!("unterminated quote at position {}", offset))
    })
}

/// Parse a double-quoted phrase
fn phrase(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)
}

/// Parse operators
fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Gte, tag(">=")),
        value(Operator::Lte, tag("<=")),
        value(Operator::NotEq, tag("!=")),
        value(Operator::Eq, tag("=")),
        value(Operator::Eq, tag(":")),
        value(Operator::Gt, tag(">")),
        value(Operator::Lt, tag("<")),
    ))(input)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | '=' | ':' | '<' | '>' | '!')
}

/// Parse a bare word, stopping before any operator
fn bare_word(input: &str) -> IResult<&str, &str> {
    recognize(many1(alt((
        take_while1(is_word_char),
        terminated(tag("!"), not(char('='))),
    ))))(input)
}

/// Parse a value: everything up to whitespace, a parenthesis or a quote
fn value_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !matches!(c, '(' | ')' | '"'))(input)
}

fn keyword(word: &str) -> Option<Connector> {
    if word.eq_ignore_ascii_case("and") {
        Some(Connector::And)
    } else if word.eq_ignore_ascii_case("or") {
        Some(Connector::Or)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_key_value_split() {
        let tokens = tokenize("span_name:gorm.Query").unwrap();
        assert_eq!(
            tokens,
            vec![word("span_name"), Token::Operator(Operator::Eq), word("gorm.Query")]
        );
    }

    #[test]
    fn test_spaced_operator() {
        let tokens = tokenize("span_name !=  KafkaWorkersOnStrike").unwrap();
        assert_eq!(
            tokens,
            vec![word("span_name"), Token::Operator(Operator::NotEq), word("KafkaWorkersOnStrike")]
        );
    }

    #[test]
    fn test_all_operators() {
        for (text, op) in [
            ("d=1", Operator::Eq),
            ("d:1", Operator::Eq),
            ("d!=1", Operator::NotEq),
            ("d>1", Operator::Gt),
            ("d>=1", Operator::Gte),
            ("d<1", Operator::Lt),
            ("d<=1", Operator::Lte),
        ] {
            let tokens = tokenize(text).unwrap();
            assert_eq!(tokens, vec![word("d"), Token::Operator(op), word("1")], "{}", text);
        }
    }

    #[test]
    fn test_value_keeps_operator_characters() {
        let tokens = tokenize("http.url=http://example.com/a?b=c").unwrap();
        assert_eq!(
            tokens,
            vec![word("http.url"), Token::Operator(Operator::Eq), word("http://example.com/a?b=c")]
        );
    }

    #[test]
    fn test_quoted_phrase() {
        let tokens = tokenize("span_name=\"Chris  Schmitz\" \"body query\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("span_name"),
                Token::Operator(Operator::Eq),
                Token::Phrase("Chris  Schmitz".to_string()),
                Token::Phrase("body query".to_string()),
            ]
        );
    }

    #[test]
    fn test_parens_without_spaces() {
        let tokens = tokenize("source=(backend OR frontend)(a)").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("source"),
                Token::Operator(Operator::Eq),
                Token::LParen,
                word("backend"),
                Token::Keyword(Connector::Or),
                word("frontend"),
                Token::RParen,
                Token::LParen,
                word("a"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let tokens = tokenize("a and b Or c ORACLE").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("a"),
                Token::Keyword(Connector::And),
                word("b"),
                Token::Keyword(Connector::Or),
                word("c"),
                word("ORACLE"),
            ]
        );
    }

    #[test]
    fn test_keyword_used_as_key() {
        let expected = vec![word("or"), Token::Operator(Operator::Eq), word("1")];
        assert_eq!(tokenize("or=1").unwrap(), expected);
        assert_eq!(tokenize("or = 1").unwrap(), expected);
        assert_eq!(
            tokenize("AND  !=x").unwrap(),
            vec![word("AND"), Token::Operator(Operator::NotEq), word("x")]
        );
    }

    #[test]
    fn test_bang_inside_word() {
        let tokens = tokenize("wow! hi!there").unwrap();
        assert_eq!(tokens, vec![word("wow!"), word("hi!there")]);
    }

    #[test]
    fn test_whitespace_only() {
        assert!(tokenize("   \t\n ").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize("span_name=\"oops").unwrap_err();
        assert!(matches!(err, SearchError::Syntax(_)));
        assert!(err.to_string().contains("unterminated quote"));
    }

    #[test]
    fn test_unmatched_parens() {
        assert!(tokenize("(a b").unwrap_err().to_string().contains("unmatched '('"));
        assert!(tokenize("a b)").unwrap_err().to_string().contains("unmatched ')'"));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(tokenize("duration>"), Err(SearchError::Syntax(_))));
        assert!(matches!(tokenize("(duration> )"), Err(SearchError::Syntax(_))));
    }
}
