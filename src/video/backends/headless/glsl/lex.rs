use std::fmt;

use nom::IResult;

use super::Diagnostic;

/// Reserved words of the subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Attribute,
    Uniform,
    Precision,
    Void,
    Lowp,
    Mediump,
    Highp,
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl Keyword {
    /// Number of float components of a type keyword.
    pub fn size(self) -> Option<usize> {
        match self {
            Keyword::Float => Some(1),
            Keyword::Vec2 => Some(2),
            Keyword::Vec3 => Some(3),
            Keyword::Vec4 => Some(4),
            _ => None,
        }
    }

    pub fn is_precision(self) -> bool {
        match self {
            Keyword::Lowp | Keyword::Mediump | Keyword::Highp => true,
            _ => false,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Keyword::Attribute => "attribute",
            Keyword::Uniform => "uniform",
            Keyword::Precision => "precision",
            Keyword::Void => "void",
            Keyword::Lowp => "lowp",
            Keyword::Mediump => "mediump",
            Keyword::Highp => "highp",
            Keyword::Float => "float",
            Keyword::Vec2 => "vec2",
            Keyword::Vec3 => "vec3",
            Keyword::Vec4 => "vec4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Assign,
    /// `+`
    Add,
    /// `-`
    Minus,
    /// `*`
    Mul,
    /// `/`
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    /// `,`
    Comma,
    /// `;`
    SemiColon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    Number(f32),
    Operator(Operator),
    Punctuation(Punctuation),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Keyword(v) => write!(f, "{}", v.as_str()),
            Token::Ident(ref v) => write!(f, "{}", v),
            Token::Number(v) => write!(f, "{}", v),
            Token::Operator(v) => {
                let c = match v {
                    Operator::Assign => '=',
                    Operator::Add => '+',
                    Operator::Minus => '-',
                    Operator::Mul => '*',
                    Operator::Div => '/',
                };
                write!(f, "{}", c)
            }
            Token::Punctuation(v) => {
                let c = match v {
                    Punctuation::Comma => ',',
                    Punctuation::SemiColon => ';',
                    Punctuation::LParen => '(',
                    Punctuation::RParen => ')',
                    Punctuation::LBrace => '{',
                    Punctuation::RBrace => '}',
                };
                write!(f, "{}", c)
            }
        }
    }
}

/// A token and the source line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum Piece<'a> {
    Blank,
    Comment,
    Directive,
    Unterminated,
    Number(&'a str),
    Token(Token),
    Illegal(&'a str),
}

fn is_blank(c: char) -> bool {
    c.is_whitespace()
}

fn is_line(c: char) -> bool {
    c != '\n'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

named!(lex_comment<&str, &str>, alt_complete!(
    recognize!(pair!(tag!("//"), take_while!(is_line))) |
    recognize!(pair!(tag!("/*"), take_until_and_consume!("*/")))
));

named!(lex_directive<&str, &str>, recognize!(pair!(tag!("#"), take_while!(is_line))));

// `/` stays below the comment openers in `lex_piece`.
named!(lex_operator<&str, Operator>, alt_complete!(
    value!(Operator::Assign, tag!("=")) |
    value!(Operator::Add, tag!("+")) |
    value!(Operator::Minus, tag!("-")) |
    value!(Operator::Mul, tag!("*")) |
    value!(Operator::Div, tag!("/"))
));

named!(lex_punctuation<&str, Punctuation>, alt_complete!(
    value!(Punctuation::Comma, tag!(",")) |
    value!(Punctuation::SemiColon, tag!(";")) |
    value!(Punctuation::LParen, tag!("(")) |
    value!(Punctuation::RParen, tag!(")")) |
    value!(Punctuation::LBrace, tag!("{")) |
    value!(Punctuation::RBrace, tag!("}"))
));

named!(lex_ident<&str, &str>, recognize!(pair!(
    take_while1!(is_ident_start),
    take_while!(is_ident_char)
)));

named!(lex_piece<&str, Piece>, alt_complete!(
    value!(Piece::Blank, take_while1!(is_blank)) |
    value!(Piece::Comment, lex_comment) |
    value!(Piece::Unterminated, tag!("/*")) |
    value!(Piece::Directive, lex_directive) |
    map!(lex_operator, from_operator) |
    map!(lex_punctuation, from_punctuation) |
    map!(take_while1!(is_number_char), Piece::Number) |
    map!(lex_ident, from_ident) |
    map!(take!(1), Piece::Illegal)
));

fn from_operator<'a>(op: Operator) -> Piece<'a> {
    Piece::Token(Token::Operator(op))
}

fn from_punctuation<'a>(pun: Punctuation) -> Piece<'a> {
    Piece::Token(Token::Punctuation(pun))
}

fn from_ident(ident: &str) -> Piece {
    let keyword = match ident {
        "attribute" => Keyword::Attribute,
        "uniform" => Keyword::Uniform,
        "precision" => Keyword::Precision,
        "void" => Keyword::Void,
        "lowp" => Keyword::Lowp,
        "mediump" => Keyword::Mediump,
        "highp" => Keyword::Highp,
        "float" => Keyword::Float,
        "vec2" => Keyword::Vec2,
        "vec3" => Keyword::Vec3,
        "vec4" => Keyword::Vec4,
        _ => return Piece::Token(Token::Ident(ident.to_owned())),
    };

    Piece::Token(Token::Keyword(keyword))
}

/// Splits `source` into tokens. Comments and preprocessor lines are dropped.
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, Diagnostic> {
    let mut lexemes = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut line_start = true;

    while !rest.is_empty() {
        let (next, piece) = match lex_piece(rest) {
            IResult::Done(next, piece) => (next, piece),
            _ => return Err(Diagnostic::new(line, "end of file", "syntax error")),
        };

        let consumed = &rest[..rest.len() - next.len()];
        match piece {
            Piece::Blank => line_start = line_start || consumed.contains('\n'),
            Piece::Comment => line_start = false,
            Piece::Directive if line_start => {}
            Piece::Directive => return Err(Diagnostic::new(line, "#", "unexpected character")),
            Piece::Unterminated => return Err(Diagnostic::new(line, "/*", "unterminated comment")),
            Piece::Illegal(c) => return Err(Diagnostic::new(line, c, "unexpected character")),
            Piece::Number(text) => {
                let value = text
                    .parse::<f32>()
                    .map_err(|_| Diagnostic::new(line, text, "invalid number"))?;

                lexemes.push(Lexeme {
                    token: Token::Number(value),
                    line,
                });
                line_start = false;
            }
            Piece::Token(token) => {
                lexemes.push(Lexeme { token, line });
                line_start = false;
            }
        }

        line += consumed.matches('\n').count() as u32;
        rest = next;
    }

    Ok(lexemes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|v| v.token).collect()
    }

    #[test]
    fn declaration() {
        let expected = vec![
            Token::Keyword(Keyword::Attribute),
            Token::Keyword(Keyword::Vec4),
            Token::Ident("a_position".to_owned()),
            Token::Punctuation(Punctuation::SemiColon),
        ];

        assert_eq!(tokens("attribute vec4 a_position;"), expected);
    }

    #[test]
    fn numbers_and_operators() {
        let expected = vec![
            Token::Ident("gl_FragColor".to_owned()),
            Token::Operator(Operator::Assign),
            Token::Number(0.5),
            Token::Operator(Operator::Mul),
            Token::Number(2.0),
            Token::Operator(Operator::Div),
            Token::Number(0.25),
            Token::Operator(Operator::Minus),
            Token::Number(1.0),
        ];

        assert_eq!(tokens("gl_FragColor=0.5*2./.25-1"), expected);
    }

    #[test]
    fn lines() {
        let source = "#version 100\n// line comment\nvoid /* a\nb */ main\n\n  (";
        let lexemes = tokenize(source).unwrap();
        let lines: Vec<_> = lexemes.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![3, 4, 6]);
        assert_eq!(lexemes[0].token, Token::Keyword(Keyword::Void));
    }

    #[test]
    fn errors() {
        let err = tokenize("float a;\n  @").unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:2: '@' : unexpected character");

        let err = tokenize("void main() # define").unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:1: '#' : unexpected character");

        let err = tokenize("\n/* open").unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:2: '/*' : unterminated comment");

        let err = tokenize("1.2.3").unwrap_err();
        assert_eq!(err.to_string(), "ERROR: 0:1: '1.2.3' : invalid number");
    }
}
