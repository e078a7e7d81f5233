use skiff_core::{intern, SkiffError, Span, Spur, Value};

use crate::lexer::{tokenize, SpannedToken, Token};

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    eof_span: Span,
}

impl Parser {
    fn new(source: Spur, tokens: Vec<SpannedToken>) -> Self {
        let eof_span = tokens
            .last()
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(source, 1, 1));
        Parser {
            tokens,
            pos: 0,
            eof_span,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or(self.eof_span)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_expr(&mut self) -> Result<Value, SkiffError> {
        let span = self.span();
        let Some(tok) = self.advance() else {
            return Err(SkiffError::Reader {
                message: "unexpected end of input".to_string(),
                span,
            });
        };
        match tok.token {
            Token::LParen => self.parse_list(span),
            Token::RParen => Err(SkiffError::Reader {
                message: "unexpected )".to_string(),
                span,
            }),
            Token::Dot => Err(SkiffError::Reader {
                message: "unexpected . outside a list".to_string(),
                span,
            }),
            Token::Quote => {
                let inner = self.parse_expr()?;
                Ok(Value::cons_at(
                    span,
                    Value::symbol("quote"),
                    Value::cons_at(span, inner, Value::Null),
                ))
            }
            Token::Bool(b) => Ok(Value::Bool(b)),
            Token::Int(n) => Ok(Value::int(n)),
            Token::Float(f) => Ok(Value::float(f)),
            Token::Str(s) => Ok(Value::string(s)),
            Token::Char(c) => Ok(Value::Char(c)),
            Token::Symbol(s) => Ok(Value::symbol(&s)),
        }
    }

    /// Parse the remainder of a list after the opening paren. Each cell
    /// carries the span of the element it holds, so list traversal can
    /// locate failures element by element.
    fn parse_list(&mut self, open_span: Span) -> Result<Value, SkiffError> {
        let mut items: Vec<(Span, Value)> = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(SkiffError::Reader {
                        message: "unterminated list".to_string(),
                        span: open_span,
                    });
                }
                Some(Token::RParen) => {
                    self.advance();
                    return Ok(build_list(items, Value::Null));
                }
                Some(Token::Dot) => {
                    let dot_span = self.span();
                    self.advance();
                    if items.is_empty() {
                        return Err(SkiffError::Reader {
                            message: "unexpected . at start of list".to_string(),
                            span: dot_span,
                        });
                    }
                    let tail = self.parse_expr()?;
                    match self.advance() {
                        Some(SpannedToken {
                            token: Token::RParen,
                            ..
                        }) => return Ok(build_list(items, tail)),
                        _ => {
                            return Err(SkiffError::Reader {
                                message: "expected ) after dotted tail".to_string(),
                                span: dot_span,
                            });
                        }
                    }
                }
                Some(_) => {
                    let span = self.span();
                    let value = self.parse_expr()?;
                    items.push((span, value));
                }
            }
        }
    }
}

fn build_list(items: Vec<(Span, Value)>, tail: Value) -> Value {
    let mut result = tail;
    for (span, value) in items.into_iter().rev() {
        result = Value::cons_at(span, value, result);
    }
    result
}

/// Parse every top-level form in `input`. `source` is the logical source
/// name used in diagnostics.
pub fn read_all(source: &str, input: &str) -> Result<Vec<Value>, SkiffError> {
    let src = intern(source);
    let tokens = tokenize(src, input)?;
    let mut parser = Parser::new(src, tokens);
    let mut forms = Vec::new();
    while parser.peek().is_some() {
        forms.push(parser.parse_expr()?);
    }
    Ok(forms)
}

/// Parse exactly one form.
pub fn read_one(source: &str, input: &str) -> Result<Value, SkiffError> {
    let src = intern(source);
    let forms = read_all(source, input)?;
    let mut iter = forms.into_iter();
    match iter.next() {
        Some(form) => Ok(form),
        None => Err(SkiffError::Reader {
            message: "empty input".to_string(),
            span: Span::point(src, 1, 1),
        }),
    }
}
