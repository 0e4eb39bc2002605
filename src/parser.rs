//! Recursive-descent parsing from the token stream into a [`Block`].
use crate::{
    ast::{As, Block, Calculation, Call, If, Index, Node, Operator, StoreAccess, StoreAssign},
    lexer::{LexerError, Span, Token},
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{error}")]
    Lexer { error: LexerError, span: Span },
    #[error("expected {expected}, found `{found}`")]
    Unexpected {
        expected: &'static str,
        found: Box<str>,
        span: Span,
    },
    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: &'static str, span: Span },
    #[error("only store entries can be assigned to, found {found}")]
    InvalidTarget { found: &'static str, span: Span },
    #[error("`create` can only create a store, not `{found}`")]
    UnknownCreate { found: Box<str>, span: Span },
}

impl ParseError {
    /// Byte range of the source the error points at.
    pub fn span(&self) -> Span {
        match self {
            Self::Lexer { span, .. }
            | Self::Unexpected { span, .. }
            | Self::UnexpectedEof { span, .. }
            | Self::InvalidTarget { span, .. }
            | Self::UnknownCreate { span, .. } => span.clone(),
        }
    }
}

/// Parse a whole source file into its top level block.
pub fn parse(source: &str) -> Result<Block, ParseError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(error) => return Err(ParseError::Lexer { error, span }),
        }
    }

    Parser {
        tokens,
        pos: 0,
        end: source.len(),
    }
    .program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(self.end..self.end, |(_, span)| span.clone())
    }

    fn next(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Error for the token at the current position (which is not consumed).
    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some((token, span)) => ParseError::Unexpected {
                expected,
                found: Box::from(token.to_string().as_str()),
                span: span.clone(),
            },
            None => ParseError::UnexpectedEof {
                expected,
                span: self.end..self.end,
            },
        }
    }

    fn found(item: Option<(Token, Span)>, expected: &'static str, end: usize) -> ParseError {
        match item {
            Some((token, span)) => ParseError::Unexpected {
                expected,
                found: Box::from(token.to_string().as_str()),
                span,
            },
            None => ParseError::UnexpectedEof {
                expected,
                span: end..end,
            },
        }
    }

    fn program(mut self) -> Result<Block, ParseError> {
        let mut body = vec![];
        while self.peek().is_some() {
            body.push(self.statement()?);
        }
        Ok(Block::new(body))
    }

    /// Either a braced block or a single statement.
    fn body(&mut self) -> Result<Block, ParseError> {
        if !self.eat(&Token::LBrace) {
            return Ok(Block::new(vec![self.statement()?]));
        }

        let mut body = vec![];
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.unexpected("`}`")),
                Some(_) => body.push(self.statement()?),
            }
        }
        Ok(Block::new(body))
    }

    fn statement(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some(Token::Create) => self.create(),
            Some(Token::If) => self.conditional(),
            Some(Token::As) => self.execute_as(),
            Some(_) => self.assignment_or_expression(),
            None => Err(self.unexpected("a statement")),
        }
    }

    fn create(&mut self) -> Result<Node, ParseError> {
        self.expect(&Token::Create, "`create`")?;
        match self.next() {
            Some((Token::Identifier(kind), _)) if kind.as_ref() == "store" => {}
            Some((Token::Identifier(kind), span)) => {
                return Err(ParseError::UnknownCreate { found: kind, span })
            }
            other => return Err(Self::found(other, "`store`", self.end)),
        }
        match self.next() {
            Some((Token::Identifier(name), _)) => Ok(Node::CreateStore(name)),
            other => Err(Self::found(other, "a store name", self.end)),
        }
    }

    fn conditional(&mut self) -> Result<Node, ParseError> {
        self.expect(&Token::If, "`if`")?;
        let negate = self.eat(&Token::Not);
        let first = self.expression()?;
        let comparator = match self.next() {
            Some((Token::Comparison(comparator), _)) => comparator,
            other => return Err(Self::found(other, "a comparator", self.end)),
        };
        let second = self.expression()?;
        let body = self.body()?;
        Ok(Node::If(If {
            first: Box::new(first),
            comparator,
            second: Box::new(second),
            negate,
            body,
        }))
    }

    fn execute_as(&mut self) -> Result<Node, ParseError> {
        self.expect(&Token::As, "`as`")?;
        let selector = match self.next() {
            Some((Token::String(selector), _)) => selector,
            other => return Err(Self::found(other, "a selector string", self.end)),
        };
        let body = self.body()?;
        Ok(Node::As(As { selector, body }))
    }

    fn assignment_or_expression(&mut self) -> Result<Node, ParseError> {
        let target_span = self.peek_span();
        let target = self.primary()?;
        let assignment = match self.peek() {
            Some(Token::Assignment(operation)) => Some((*operation, None)),
            Some(Token::Increment) => Some((Operator::Add, Some(1))),
            Some(Token::Decrement) => Some((Operator::Sub, Some(1))),
            _ => None,
        };

        match (target, assignment) {
            (Node::StoreAccess(access), Some((operation, step))) => {
                self.pos += 1;
                let value = match step {
                    Some(step) => Node::Int(step),
                    None => self.expression()?,
                };
                Ok(Node::StoreAssign(StoreAssign::new(
                    access.identifier,
                    access.store,
                    operation,
                    value,
                )))
            }
            (target, Some(_)) => Err(ParseError::InvalidTarget {
                found: target.kind(),
                span: target_span,
            }),
            (target, None) => self.binary(target, 0),
        }
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        let first = self.primary()?;
        self.binary(first, 0)
    }

    // precedence climbing, all operators are left associative
    fn binary(&mut self, mut first: Node, min_precedence: u8) -> Result<Node, ParseError> {
        while let Some(&Token::Operation(operator)) = self.peek() {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;

            let mut second = self.primary()?;
            while let Some(&Token::Operation(next)) = self.peek() {
                if next.precedence() <= precedence {
                    break;
                }
                second = self.binary(second, precedence + 1)?;
            }
            first = Node::Calculation(Calculation::new(first, operator, second));
        }
        Ok(first)
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        match self.next() {
            Some((Token::Integer(value), _)) => Ok(Node::Int(value)),
            Some((Token::Float(value), _)) => Ok(Node::Float(value)),
            Some((Token::String(value), _)) => Ok(Node::String(value)),
            Some((Token::Operation(Operator::Sub), _)) => match self.next() {
                Some((Token::Integer(value), _)) => Ok(Node::Int(-value)),
                Some((Token::Float(value), _)) => Ok(Node::Float(-value)),
                other => Err(Self::found(other, "a number after `-`", self.end)),
            },
            Some((Token::LParen, _)) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some((Token::Identifier(name), _)) => match self.peek() {
                Some(Token::LParen) => {
                    self.pos += 1;
                    let args = self.arguments()?;
                    Ok(Node::Call(Call {
                        identifier: name,
                        args,
                    }))
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let identifier = match self.next() {
                        Some((Token::Identifier(entry), _)) => Index::variable(entry),
                        Some((Token::String(entry), _)) => Index::literal(entry),
                        other => return Err(Self::found(other, "an entry name", self.end)),
                    };
                    self.expect(&Token::RBracket, "`]`")?;
                    Ok(Node::StoreAccess(StoreAccess::new(identifier, name)))
                }
                _ => Err(self.unexpected("`[` or `(` after an identifier")),
            },
            other => Err(Self::found(other, "a value", self.end)),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut args = vec![];
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma, "`,` or `)`")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, ParseError};
    use crate::{
        ast::{As, Block, Calculation, Call, Comparator, If, Index, Node, Operator, StoreAccess, StoreAssign},
        lexer::LexerError,
    };
    use assert2::{check, let_assert};

    fn access(store: &str, entry: &str) -> Node {
        Node::StoreAccess(StoreAccess::new(Index::variable(entry), store))
    }

    fn assign(store: &str, entry: &str, operation: Operator, value: Node) -> Node {
        Node::StoreAssign(StoreAssign::new(Index::variable(entry), store, operation, value))
    }

    fn calc(first: Node, operator: Operator, second: Node) -> Node {
        Node::Calculation(Calculation::new(first, operator, second))
    }

    #[test]
    fn value_assignment() {
        let_assert!(
            Ok(block) = parse(
                "
                store[test] = 100
                store[test]++
                store[test] += 120
                store[test] -= 2
                store[test]--
                "
            )
        );
        check!(
            block
                == Block::new(vec![
                    assign("store", "test", Operator::Set, Node::Int(100)),
                    assign("store", "test", Operator::Add, Node::Int(1)),
                    assign("store", "test", Operator::Add, Node::Int(120)),
                    assign("store", "test", Operator::Sub, Node::Int(2)),
                    assign("store", "test", Operator::Sub, Node::Int(1)),
                ])
        );
    }

    #[test]
    fn store_assignment() {
        let_assert!(Ok(block) = parse("a[b] = c[d]"));
        check!(block == Block::new(vec![assign("a", "b", Operator::Set, access("c", "d"))]));
    }

    #[test]
    fn literal_entries() {
        let_assert!(Ok(block) = parse("points['@s'] *= 2"));
        check!(
            block
                == Block::new(vec![Node::StoreAssign(StoreAssign::new(
                    Index::literal("@s"),
                    "points",
                    Operator::Mul,
                    Node::Int(2),
                ))])
        );
    }

    #[test]
    fn calculation_precedence_and_associativity() {
        let_assert!(Ok(block) = parse("a[b] = 1 - 2 - c[d] * 3 % 4"));
        let expected = calc(
            calc(Node::Int(1), Operator::Sub, Node::Int(2)),
            Operator::Sub,
            calc(
                calc(access("c", "d"), Operator::Mul, Node::Int(3)),
                Operator::Mod,
                Node::Int(4),
            ),
        );
        check!(block == Block::new(vec![assign("a", "b", Operator::Set, expected)]));
    }

    #[test]
    fn parentheses_and_negative_literals() {
        let_assert!(Ok(block) = parse("a[b] = (1 + -2) * 3"));
        let expected = calc(
            calc(Node::Int(1), Operator::Add, Node::Int(-2)),
            Operator::Mul,
            Node::Int(3),
        );
        check!(block == Block::new(vec![assign("a", "b", Operator::Set, expected)]));
    }

    #[test]
    fn create_store() {
        let_assert!(Ok(block) = parse("create store points"));
        check!(block == Block::new(vec![Node::CreateStore("points".into())]));

        let_assert!(Err(ParseError::UnknownCreate { found, span }) = parse("create table x"));
        check!(found.as_ref() == "table");
        check!(span == (7..12));
    }

    #[test]
    fn conditionals() {
        let_assert!(Ok(block) = parse("if not s[a] >= 2 { 'say hi' 'say bye' }\nif s[a] == s[b] 'say eq'"));
        check!(
            block
                == Block::new(vec![
                    Node::If(If {
                        first: Box::new(access("s", "a")),
                        comparator: Comparator::Gte,
                        second: Box::new(Node::Int(2)),
                        negate: true,
                        body: Block::new(vec![
                            Node::String("say hi".into()),
                            Node::String("say bye".into()),
                        ]),
                    }),
                    Node::If(If {
                        first: Box::new(access("s", "a")),
                        comparator: Comparator::Eq,
                        second: Box::new(access("s", "b")),
                        negate: false,
                        body: Block::new(vec![Node::String("say eq".into())]),
                    }),
                ])
        );
    }

    #[test]
    fn execute_as() {
        let_assert!(Ok(block) = parse("as '@a' { s[x]++ }"));
        check!(
            block
                == Block::new(vec![Node::As(As {
                    selector: "@a".into(),
                    body: Block::new(vec![assign("s", "x", Operator::Add, Node::Int(1))]),
                })])
        );
    }

    #[test]
    fn calls() {
        let_assert!(Ok(block) = parse("route('/test/', yeet('me', 'out'))"));
        check!(
            block
                == Block::new(vec![Node::Call(Call {
                    identifier: "route".into(),
                    args: vec![
                        Node::String("/test/".into()),
                        Node::Call(Call {
                            identifier: "yeet".into(),
                            args: vec![Node::String("me".into()), Node::String("out".into())],
                        }),
                    ],
                })])
        );
    }

    #[test]
    fn errors_carry_spans() {
        let_assert!(Err(ParseError::UnexpectedEof { span, .. }) = parse("if s[a] < 2 {"));
        check!(span == (13..13));

        let_assert!(Err(ParseError::Unexpected { found, span, .. }) = parse("s[a] = ]"));
        check!(found.as_ref() == "]");
        check!(span == (7..8));

        let_assert!(Err(ParseError::InvalidTarget { span, .. }) = parse("3 = 4"));
        check!(span == (0..1));

        let_assert!(Err(ParseError::Lexer { error, span }) = parse("s[a] = 'oops"));
        check!(error == LexerError::UnterminatedString);
        check!(span == (7..12));
    }

    #[test]
    fn comparator_required() {
        let_assert!(Err(ParseError::Unexpected { expected, .. }) = parse("if s[a] 'say'"));
        check!(expected == "a comparator");
    }
}
