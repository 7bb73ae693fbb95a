//! Tokenizer for pbrt-style scene files.

use super::error::{ParseError, ParseResult};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word, e.g. `Shape` or `WorldBegin`
    Identifier(String),
    /// Contents of a double-quoted string
    Str(String),
    /// Any numeric literal; integers are exact up to 2^53
    Number(f64),
    /// `[`
    ListStart,
    /// `]`
    ListEnd,
}

/// A token and the (1-based) line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

/// Split scene source into tokens. `#` starts a comment that runs to the end
/// of the line.
pub fn tokenize(source: &str) -> ParseResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut line = 1;

    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '[' => {
                tokens.push(Spanned { token: Token::ListStart, line });
                chars.next();
            }
            ']' => {
                tokens.push(Spanned { token: Token::ListEnd, line });
                chars.next();
            }
            '"' => {
                chars.next();
                let start_line = line;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\n')) | None => {
                            return Err(ParseError::UnterminatedString(start_line))
                        }
                        Some((_, c)) => text.push(c),
                    }
                }
                tokens.push(Spanned { token: Token::Str(text), line: start_line });
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &source[start..end];
                let value = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                    line,
                })?;
                tokens.push(Spanned { token: Token::Number(value), line });
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Spanned {
                    token: Token::Identifier(source[start..end].to_string()),
                    line,
                });
            }
            other => return Err(ParseError::UnexpectedChar { ch: other, line }),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_directive_with_params() {
        let tokens = kinds("Integrator \"path\"\n    \"integer maxdepth\" [ 5 ]\n");
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("Integrator".into()),
                Token::Str("path".into()),
                Token::Str("integer maxdepth".into()),
                Token::ListStart,
                Token::Number(5.0),
                Token::ListEnd,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("[-1 2.5 .5 1e-3 +4]");
        assert_eq!(
            tokens,
            vec![
                Token::ListStart,
                Token::Number(-1.0),
                Token::Number(2.5),
                Token::Number(0.5),
                Token::Number(1e-3),
                Token::Number(4.0),
                Token::ListEnd,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let spanned = tokenize("# header\nWorldBegin # trailing\n\nAttributeBegin").unwrap();
        assert_eq!(spanned.len(), 2);
        assert_eq!(spanned[0].line, 2);
        assert_eq!(spanned[1].line, 4);
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            tokenize("Shape \"trianglemesh\n"),
            Err(ParseError::UnterminatedString(1))
        ));
    }

    #[test]
    fn test_bad_number() {
        assert!(matches!(
            tokenize("[ 1.2.3 ]"),
            Err(ParseError::InvalidNumber { line: 1, .. })
        ));
    }

    #[test]
    fn test_unexpected_char() {
        assert!(matches!(
            tokenize("WorldBegin {"),
            Err(ParseError::UnexpectedChar { ch: '{', line: 1 })
        ));
    }
}
