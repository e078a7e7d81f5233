use skiff_core::{SkiffError, Span, Spur};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    Dot,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Symbol(String),
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '\'')
}

/// Turn source text into tokens, tracking 1-based line/column positions.
pub fn tokenize(source: Spur, input: &str) -> Result<Vec<SpannedToken>, SkiffError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut line: u32 = 1;
    let mut col: u32 = 1;

    while i < chars.len() {
        let ch = chars[i];
        let span = Span::point(source, line, col);

        match ch {
            ' ' | '\t' | '\r' => {
                col += 1;
                i += 1;
            }
            '\n' => {
                line += 1;
                col = 1;
                i += 1;
            }

            ';' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }

            '(' => {
                tokens.push(SpannedToken {
                    token: Token::LParen,
                    span,
                });
                col += 1;
                i += 1;
            }
            ')' => {
                tokens.push(SpannedToken {
                    token: Token::RParen,
                    span,
                });
                col += 1;
                i += 1;
            }
            '\'' => {
                tokens.push(SpannedToken {
                    token: Token::Quote,
                    span,
                });
                col += 1;
                i += 1;
            }

            '"' => {
                let mut s = String::new();
                i += 1;
                col += 1;
                loop {
                    if i >= chars.len() {
                        return Err(SkiffError::Reader {
                            message: "unterminated string".to_string(),
                            span,
                        });
                    }
                    match chars[i] {
                        '"' => {
                            i += 1;
                            col += 1;
                            break;
                        }
                        '\\' => {
                            if i + 1 >= chars.len() {
                                return Err(SkiffError::Reader {
                                    message: "unterminated string escape".to_string(),
                                    span: Span::point(source, line, col),
                                });
                            }
                            match chars[i + 1] {
                                'n' => s.push('\n'),
                                't' => s.push('\t'),
                                'r' => s.push('\r'),
                                '0' => s.push('\0'),
                                '\\' => s.push('\\'),
                                '"' => s.push('"'),
                                other => {
                                    return Err(SkiffError::Reader {
                                        message: format!("unknown string escape \\{other}"),
                                        span: Span::point(source, line, col),
                                    });
                                }
                            }
                            i += 2;
                            col += 2;
                        }
                        '\n' => {
                            s.push('\n');
                            i += 1;
                            line += 1;
                            col = 1;
                        }
                        c => {
                            s.push(c);
                            i += 1;
                            col += 1;
                        }
                    }
                }
                tokens.push(SpannedToken {
                    token: Token::Str(s),
                    span: span.to(&Span::point(source, line, col.saturating_sub(1))),
                });
            }

            '#' => {
                if i + 1 >= chars.len() {
                    return Err(SkiffError::Reader {
                        message: "unexpected end of input after #".to_string(),
                        span,
                    });
                }
                match chars[i + 1] {
                    't' => {
                        tokens.push(SpannedToken {
                            token: Token::Bool(true),
                            span,
                        });
                        i += 2;
                        col += 2;
                    }
                    'f' => {
                        tokens.push(SpannedToken {
                            token: Token::Bool(false),
                            span,
                        });
                        i += 2;
                        col += 2;
                    }
                    '\\' => {
                        // #\x or a named character like #\space
                        if i + 2 >= chars.len() {
                            return Err(SkiffError::Reader {
                                message: "unterminated character literal".to_string(),
                                span,
                            });
                        }
                        let mut name = String::new();
                        name.push(chars[i + 2]);
                        let mut j = i + 3;
                        if chars[i + 2].is_alphabetic() {
                            while j < chars.len() && chars[j].is_alphanumeric() {
                                name.push(chars[j]);
                                j += 1;
                            }
                        }
                        let c = match name.as_str() {
                            "space" => ' ',
                            "newline" => '\n',
                            "tab" => '\t',
                            "return" => '\r',
                            "nul" => '\0',
                            s if s.chars().count() == 1 => s.chars().next().unwrap_or(' '),
                            other => {
                                return Err(SkiffError::Reader {
                                    message: format!("unknown character literal #\\{other}"),
                                    span,
                                });
                            }
                        };
                        tokens.push(SpannedToken {
                            token: Token::Char(c),
                            span,
                        });
                        col += (j - i) as u32;
                        i = j;
                    }
                    other => {
                        return Err(SkiffError::Reader {
                            message: format!("unknown # syntax: #{other}"),
                            span,
                        });
                    }
                }
            }

            _ => {
                // Atom: number, dot, or symbol.
                let start = i;
                while i < chars.len() && !is_delimiter(chars[i]) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let len = (i - start) as u32;
                let token_span = span.to(&Span::point(source, line, col + len - 1));
                col += len;

                let token = if text == "." {
                    Token::Dot
                } else if let Some(token) = lex_number(&text) {
                    token
                } else {
                    Token::Symbol(text)
                };
                tokens.push(SpannedToken {
                    token,
                    span: token_span,
                });
            }
        }
    }

    Ok(tokens)
}

/// Numbers start with a digit, or a sign followed by a digit; everything
/// else (including bare `+`/`-`) lexes as a symbol.
fn lex_number(text: &str) -> Option<Token> {
    let mut rest = text;
    if let Some(stripped) = text.strip_prefix(['+', '-']) {
        rest = stripped;
    }
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if rest.contains('.') {
        text.parse::<f64>().ok().map(Token::Float)
    } else {
        text.parse::<i64>().ok().map(Token::Int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_core::intern;

    fn lex(input: &str) -> Vec<Token> {
        tokenize(intern("test"), input)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn basic_tokens() {
        assert_eq!(
            lex("(+ 1 2)"),
            vec![
                Token::LParen,
                Token::Symbol("+".into()),
                Token::Int(1),
                Token::Int(2),
                Token::RParen
            ]
        );
    }

    #[test]
    fn numbers_and_signs() {
        assert_eq!(lex("-42"), vec![Token::Int(-42)]);
        assert_eq!(lex("3.25"), vec![Token::Float(3.25)]);
        assert_eq!(lex("-"), vec![Token::Symbol("-".into())]);
        assert_eq!(lex("+x"), vec![Token::Symbol("+x".into())]);
    }

    #[test]
    fn booleans_chars_strings() {
        assert_eq!(lex("#t #f"), vec![Token::Bool(true), Token::Bool(false)]);
        assert_eq!(lex("#\\a"), vec![Token::Char('a')]);
        assert_eq!(lex("#\\space"), vec![Token::Char(' ')]);
        assert_eq!(
            lex("\"a\\\"b\\n\""),
            vec![Token::Str("a\"b\n".into())]
        );
    }

    #[test]
    fn dot_and_quote() {
        assert_eq!(
            lex("(1 . 2)"),
            vec![
                Token::LParen,
                Token::Int(1),
                Token::Dot,
                Token::Int(2),
                Token::RParen
            ]
        );
        assert_eq!(lex("'x"), vec![Token::Quote, Token::Symbol("x".into())]);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(lex("1 ; two\n3"), vec![Token::Int(1), Token::Int(3)]);
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let tokens = tokenize(intern("test"), "a\n  b").unwrap();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.col, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.col, 3);
    }

    #[test]
    fn unterminated_string_is_a_reader_error() {
        let err = tokenize(intern("test"), "\"abc").unwrap_err();
        assert!(matches!(err, SkiffError::Reader { .. }));
    }
}
