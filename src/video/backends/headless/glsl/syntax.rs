use nom::{ErrorKind, IResult, InputLength};

use super::lex::{Keyword, Lexeme, Operator, Punctuation, Token};
use super::{Diagnostic, Storage};

/// An identifier and the line it appears on.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub text: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Minus,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(f32),
    Ident(Name),
    /// `- expr`
    Neg(Box<Expression>),
    /// An operator with the line it appears on, and both operands.
    Binary(BinaryOperator, u32, Box<Expression>, Box<Expression>),
    /// A `float`/`vecN` constructor: component count, line and arguments.
    Construct(usize, u32, Vec<Expression>),
}

/// `target = value;` where `line` is the line of `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub target: Name,
    pub line: u32,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `precision <qualifier> <type>;`, keeping the type for later checks.
    Precision(Name),
    /// `attribute`/`uniform` declaration, with the line of the storage keyword.
    Variable {
        storage: Storage,
        line: u32,
        size: usize,
        name: Name,
    },
    Function {
        name: Name,
        body: Vec<Statement>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Sum,
    Product,
}

#[derive(Debug, Clone, Copy)]
pub struct Tokens<'a> {
    lexemes: &'a [Lexeme],
    eof: u32,
}

impl<'a> Tokens<'a> {
    pub fn new(lexemes: &'a [Lexeme]) -> Self {
        Tokens {
            lexemes,
            eof: lexemes.last().map(|v| v.line).unwrap_or(1),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.lexemes.first().map(|v| &v.token)
    }

    fn line(&self) -> u32 {
        self.lexemes.first().map(|v| v.line).unwrap_or(self.eof)
    }

    fn advance(&self) -> Self {
        Tokens {
            lexemes: self.lexemes.get(1..).unwrap_or(&[]),
            eof: self.eof,
        }
    }

    fn diagnostic(&self) -> Diagnostic {
        match self.lexemes.first() {
            Some(v) => Diagnostic::new(v.line, &v.token, "syntax error"),
            None => Diagnostic::new(self.eof, "end of file", "syntax error"),
        }
    }

    fn unexpected<T>(&self) -> IResult<Tokens<'a>, T, Diagnostic> {
        IResult::Error(ErrorKind::Custom(self.diagnostic()))
    }
}

impl<'a> InputLength for Tokens<'a> {
    #[inline]
    fn input_len(&self) -> usize {
        self.lexemes.len()
    }
}

/// Consumes `$tag`, returning the line it was found on.
macro_rules! tag_token (
    ($i:expr, $tag:expr) => ({
        let input: Tokens = $i;
        let res: IResult<Tokens, u32, Diagnostic> = match input.peek() {
            Some(token) if *token == $tag => IResult::Done(input.advance(), input.line()),
            _ => input.unexpected(),
        };
        res
    });
);

/// Parses a whole translation unit.
pub fn parse(lexemes: &[Lexeme]) -> Result<Vec<Item>, Diagnostic> {
    let mut rest = Tokens::new(lexemes);
    let mut items = Vec::new();

    while rest.input_len() > 0 {
        match parse_item(rest) {
            IResult::Done(next, item) => {
                items.push(item);
                rest = next;
            }
            IResult::Error(ErrorKind::Custom(err)) => return Err(err),
            _ => return Err(rest.diagnostic()),
        }
    }

    Ok(items)
}

fn parse_item(input: Tokens) -> IResult<Tokens, Item, Diagnostic> {
    match input.peek() {
        Some(Token::Keyword(Keyword::Precision)) => parse_precision(input),
        Some(Token::Keyword(Keyword::Attribute)) | Some(Token::Keyword(Keyword::Uniform)) => {
            parse_variable(input)
        }
        Some(Token::Keyword(Keyword::Void)) => parse_function(input),
        _ => input.unexpected(),
    }
}

named!(parse_precision<Tokens, Item, Diagnostic>, do_parse!(
    apply!(parse_keyword, Keyword::Precision) >>
    parse_precision_qualifier >>
    ty: parse_word >>
    tag_token!(Token::Punctuation(Punctuation::SemiColon)) >>
    (Item::Precision(ty))
));

/// `attribute vec4 a_position;` or `uniform mediump float u_scale;`
named!(parse_variable<Tokens, Item, Diagnostic>, do_parse!(
    storage: parse_storage >>
    opt_res!(parse_precision_qualifier) >>
    size: parse_type >>
    name: parse_name >>
    tag_token!(Token::Punctuation(Punctuation::SemiColon)) >>
    (Item::Variable { storage: storage.0, line: storage.1, size: size.0, name })
));

named!(parse_function<Tokens, Item, Diagnostic>, do_parse!(
    apply!(parse_keyword, Keyword::Void) >>
    name: parse_name >>
    tag_token!(Token::Punctuation(Punctuation::LParen)) >>
    opt_res!(apply!(parse_keyword, Keyword::Void)) >>
    tag_token!(Token::Punctuation(Punctuation::RParen)) >>
    body: parse_block >>
    (Item::Function { name, body })
));

fn parse_block(input: Tokens) -> IResult<Tokens, Vec<Statement>, Diagnostic> {
    let (mut rest, _) = try_parse!(input, tag_token!(Token::Punctuation(Punctuation::LBrace)));
    let mut statements = Vec::new();

    loop {
        if let IResult::Done(next, _) = tag_token!(rest, Token::Punctuation(Punctuation::RBrace)) {
            return IResult::Done(next, statements);
        }

        let (next, statement) = try_parse!(rest, parse_statement);
        statements.push(statement);
        rest = next;
    }
}

named!(parse_statement<Tokens, Statement, Diagnostic>, do_parse!(
    target: parse_name >>
    line: tag_token!(Token::Operator(Operator::Assign)) >>
    value: parse_expr >>
    tag_token!(Token::Punctuation(Punctuation::SemiColon)) >>
    (Statement { target, line, value })
));

fn parse_keyword(input: Tokens, keyword: Keyword) -> IResult<Tokens, u32, Diagnostic> {
    tag_token!(input, Token::Keyword(keyword))
}

fn parse_name(input: Tokens) -> IResult<Tokens, Name, Diagnostic> {
    match input.peek() {
        Some(Token::Ident(text)) => {
            let name = Name {
                text: text.clone(),
                line: input.line(),
            };

            IResult::Done(input.advance(), name)
        }
        _ => input.unexpected(),
    }
}

/// Any identifier or keyword.
fn parse_word(input: Tokens) -> IResult<Tokens, Name, Diagnostic> {
    match input.lexemes.first() {
        Some(lexeme) => match lexeme.token {
            Token::Keyword(_) | Token::Ident(_) => {
                let name = Name {
                    text: lexeme.token.to_string(),
                    line: lexeme.line,
                };

                IResult::Done(input.advance(), name)
            }
            _ => input.unexpected(),
        },
        None => input.unexpected(),
    }
}

fn parse_storage(input: Tokens) -> IResult<Tokens, (Storage, u32), Diagnostic> {
    let storage = match input.peek() {
        Some(Token::Keyword(Keyword::Attribute)) => Storage::Attribute,
        Some(Token::Keyword(Keyword::Uniform)) => Storage::Uniform,
        _ => return input.unexpected(),
    };

    IResult::Done(input.advance(), (storage, input.line()))
}

fn parse_precision_qualifier(input: Tokens) -> IResult<Tokens, Keyword, Diagnostic> {
    match input.peek() {
        Some(&Token::Keyword(keyword)) if keyword.is_precision() => {
            IResult::Done(input.advance(), keyword)
        }
        _ => input.unexpected(),
    }
}

/// A `float`/`vecN` type keyword, as its component count and line.
fn parse_type(input: Tokens) -> IResult<Tokens, (usize, u32), Diagnostic> {
    let size = match input.peek() {
        Some(&Token::Keyword(keyword)) => keyword.size(),
        _ => None,
    };

    match size {
        Some(size) => IResult::Done(input.advance(), (size, input.line())),
        None => input.unexpected(),
    }
}

pub fn parse_expr(input: Tokens) -> IResult<Tokens, Expression, Diagnostic> {
    parse_expr_from(input, Precedence::Lowest)
}

fn parse_expr_from(
    input: Tokens,
    precedence: Precedence,
) -> IResult<Tokens, Expression, Diagnostic> {
    do_parse!(input,
        head: parse_atomic_expr >>
        expr: apply!(parse_expr_recursive, precedence, head) >>
        (expr)
    )
}

fn parse_expr_recursive(
    input: Tokens,
    precedence: Precedence,
    head: Expression,
) -> IResult<Tokens, Expression, Diagnostic> {
    match input.peek().and_then(binary_operator) {
        Some((next, op)) if precedence < next => {
            let line = input.line();
            let (rest, rhs) = try_parse!(input.advance(), apply!(parse_expr_from, next));
            let head = Expression::Binary(op, line, Box::new(head), Box::new(rhs));
            parse_expr_recursive(rest, precedence, head)
        }
        _ => IResult::Done(input, head),
    }
}

fn binary_operator(token: &Token) -> Option<(Precedence, BinaryOperator)> {
    match *token {
        Token::Operator(Operator::Add) => Some((Precedence::Sum, BinaryOperator::Add)),
        Token::Operator(Operator::Minus) => Some((Precedence::Sum, BinaryOperator::Minus)),
        Token::Operator(Operator::Mul) => Some((Precedence::Product, BinaryOperator::Mul)),
        Token::Operator(Operator::Div) => Some((Precedence::Product, BinaryOperator::Div)),
        _ => None,
    }
}

fn parse_atomic_expr(input: Tokens) -> IResult<Tokens, Expression, Diagnostic> {
    match input.peek() {
        Some(&Token::Number(v)) => IResult::Done(input.advance(), Expression::Literal(v)),
        Some(Token::Ident(_)) => map!(input, parse_name, Expression::Ident),
        Some(Token::Keyword(_)) => parse_construct(input),
        Some(Token::Operator(Operator::Minus)) => parse_neg_expr(input),
        Some(Token::Operator(Operator::Add)) => do_parse!(input,
            tag_token!(Token::Operator(Operator::Add)) >>
            expr: parse_atomic_expr >>
            (expr)
        ),
        Some(Token::Punctuation(Punctuation::LParen)) => parse_paren_expr(input),
        _ => input.unexpected(),
    }
}

named!(parse_neg_expr<Tokens, Expression, Diagnostic>, do_parse!(
    tag_token!(Token::Operator(Operator::Minus)) >>
    expr: parse_atomic_expr >>
    (Expression::Neg(Box::new(expr)))
));

named!(parse_paren_expr<Tokens, Expression, Diagnostic>, do_parse!(
    tag_token!(Token::Punctuation(Punctuation::LParen)) >>
    expr: parse_expr >>
    tag_token!(Token::Punctuation(Punctuation::RParen)) >>
    (expr)
));

named!(parse_construct<Tokens, Expression, Diagnostic>, do_parse!(
    ty: parse_type >>
    tag_token!(Token::Punctuation(Punctuation::LParen)) >>
    args: parse_call_params >>
    tag_token!(Token::Punctuation(Punctuation::RParen)) >>
    (Expression::Construct(ty.0, ty.1, args))
));

fn parse_call_params(input: Tokens) -> IResult<Tokens, Vec<Expression>, Diagnostic> {
    let (mut rest, head) = try_parse!(input, parse_expr);
    let mut params = vec![head];

    while let IResult::Done(next, _) = tag_token!(rest, Token::Punctuation(Punctuation::Comma)) {
        let (next, param) = try_parse!(next, parse_expr);
        params.push(param);
        rest = next;
    }

    IResult::Done(rest, params)
}

#[cfg(test)]
mod test {
    use super::super::lex::tokenize;
    use super::*;

    fn expr(source: &str) -> Expression {
        let lexemes = tokenize(source).unwrap();
        match parse_expr(Tokens::new(&lexemes)) {
            IResult::Done(rest, v) => {
                assert_eq!(rest.input_len(), 0);
                v
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    fn ident(text: &str) -> Box<Expression> {
        Box::new(Expression::Ident(Name {
            text: text.to_owned(),
            line: 1,
        }))
    }

    #[test]
    fn precedence() {
        let expected = Expression::Binary(
            BinaryOperator::Minus,
            1,
            Box::new(Expression::Binary(BinaryOperator::Minus, 1, ident("a"), ident("b"))),
            Box::new(Expression::Binary(BinaryOperator::Mul, 1, ident("c"), ident("d"))),
        );

        assert_eq!(expr("a - b - c * d"), expected);

        let expected = Expression::Binary(
            BinaryOperator::Mul,
            1,
            Box::new(Expression::Neg(ident("a"))),
            Box::new(Expression::Binary(BinaryOperator::Add, 1, ident("b"), ident("c"))),
        );

        assert_eq!(expr("-a * (b + c)"), expected);
    }

    #[test]
    fn construct() {
        let expected = Expression::Construct(
            4,
            1,
            vec![*ident("a"), Expression::Literal(0.0), Expression::Literal(1.0)],
        );

        assert_eq!(expr("vec4(a, 0.0, +1)"), expected);
    }

    #[test]
    fn items() {
        let source = "precision mediump float;\nuniform highp vec2 u_offset;\nvoid main(void) {\n}\n";
        let items = parse(&tokenize(source).unwrap()).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[1],
            Item::Variable {
                storage: Storage::Uniform,
                line: 2,
                size: 2,
                name: Name {
                    text: "u_offset".to_owned(),
                    line: 2,
                },
            }
        );

        match items[2] {
            Item::Function { ref name, ref body } => {
                assert_eq!(name.text, "main");
                assert!(body.is_empty());
            }
            ref other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn unexpected_tokens() {
        let err = parse(&tokenize("precision vec4 float;").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:1: 'vec4' : syntax error");

        let err = parse(&tokenize("void main() {\n  gl_Position = vec4(1.0,);\n}").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:2: ')' : syntax error");

        let err = parse(&tokenize("void main() {").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:1: 'end of file' : syntax error");
    }
}
