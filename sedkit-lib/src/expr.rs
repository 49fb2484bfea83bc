//! Closed-form spectral expressions in the variable `wave`.
//!
//! The grammar is deliberately small: numbers, `wave`, the constants `pi`
//! and `e`, `+ - * /`, powers (`**` or `^`), parentheses, and a handful of
//! unary functions. Anything else is rejected when the expression is parsed.

use std::fmt;

use crate::error::{Result, SedError};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Wave,
    Const(f64),
    Func(Func),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
    Eos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Exp,
    Log,
    Log10,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Abs,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "exp" => Some(Self::Exp),
            "log" | "ln" => Some(Self::Log),
            "log10" => Some(Self::Log10),
            "sqrt" => Some(Self::Sqrt),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Self::Exp => v.exp(),
            Self::Log => v.ln(),
            Self::Log10 => v.log10(),
            Self::Sqrt => v.sqrt(),
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Tan => v.tan(),
            Self::Abs => v.abs(),
        }
    }
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    fn new(input: &str) -> Self {
        Tokenizer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next_token(&mut self) -> std::result::Result<Token, String> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        let Some(ch) = self.peek_char() else {
            return Ok(Token::Eos);
        };

        let single = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Pow),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(tok) = single {
            self.pos += 1;
            return Ok(tok);
        }

        if ch == '*' {
            self.pos += 1;
            if self.peek_char() == Some('*') {
                self.pos += 1;
                return Ok(Token::Pow);
            }
            return Ok(Token::Star);
        }

        if ch.is_ascii_digit() || ch == '.' {
            return self.read_number();
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = self.pos;
            while self
                .peek_char()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                self.pos += 1;
            }
            let name: String = self.chars[start..self.pos].iter().collect();
            return match name.as_str() {
                "wave" => Ok(Token::Wave),
                "pi" => Ok(Token::Const(std::f64::consts::PI)),
                "e" => Ok(Token::Const(std::f64::consts::E)),
                _ => Func::lookup(&name)
                    .map(Token::Func)
                    .ok_or_else(|| format!("unknown identifier '{name}'")),
            };
        }

        Err(format!(
            "unrecognized character '{}' at position {}",
            ch, self.pos
        ))
    }

    fn read_number(&mut self) -> std::result::Result<Token, String> {
        let start = self.pos;

        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }

        if self.peek_char() == Some('.') {
            self.pos += 1;
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.pos += 1;
            }
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let s: String = self.chars[start..self.pos].iter().collect();
        s.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| format!("invalid number '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Wave,
    Neg(Box<Node>),
    Call(Func, Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
}

impl Node {
    fn eval(&self, wave: f64) -> f64 {
        match self {
            Node::Num(v) => *v,
            Node::Wave => wave,
            Node::Neg(inner) => -inner.eval(wave),
            Node::Call(func, arg) => func.apply(arg.eval(wave)),
            Node::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(wave), rhs.eval(wave));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
        }
    }

    fn uses_wave(&self) -> bool {
        match self {
            Node::Num(_) => false,
            Node::Wave => true,
            Node::Neg(inner) | Node::Call(_, inner) => inner.uses_wave(),
            Node::Binary(_, lhs, rhs) => lhs.uses_wave() || rhs.uses_wave(),
        }
    }
}

struct Parser {
    tokenizer: Tokenizer,
    current: Token,
}

impl Parser {
    fn new(input: &str) -> std::result::Result<Self, String> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Parser { tokenizer, current })
    }

    fn advance(&mut self) -> std::result::Result<(), String> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> std::result::Result<Node, String> {
        let mut node = self.term()?;
        loop {
            let op = match self.current {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(node),
            };
            self.advance()?;
            node = Node::Binary(op, Box::new(node), Box::new(self.term()?));
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> std::result::Result<Node, String> {
        let mut node = self.unary()?;
        loop {
            let op = match self.current {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => return Ok(node),
            };
            self.advance()?;
            node = Node::Binary(op, Box::new(node), Box::new(self.unary()?));
        }
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> std::result::Result<Node, String> {
        match self.current {
            Token::Minus => {
                self.advance()?;
                Ok(Node::Neg(Box::new(self.unary()?)))
            }
            Token::Plus => {
                self.advance()?;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := atom (('**' | '^') unary)?
    fn power(&mut self) -> std::result::Result<Node, String> {
        let base = self.atom()?;
        if self.current == Token::Pow {
            self.advance()?;
            let exponent = self.unary()?;
            return Ok(Node::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> std::result::Result<Node, String> {
        match self.current {
            Token::Num(v) | Token::Const(v) => {
                self.advance()?;
                Ok(Node::Num(v))
            }
            Token::Wave => {
                self.advance()?;
                Ok(Node::Wave)
            }
            Token::Func(func) => {
                self.advance()?;
                if self.current != Token::LParen {
                    return Err("expected '(' after function name".to_string());
                }
                let arg = self.parenthesized()?;
                Ok(Node::Call(func, Box::new(arg)))
            }
            Token::LParen => self.parenthesized(),
            Token::Eos => Err("unexpected end of expression".to_string()),
            tok => Err(format!("unexpected token {tok:?}")),
        }
    }

    fn parenthesized(&mut self) -> std::result::Result<Node, String> {
        self.advance()?;
        let inner = self.expr()?;
        if self.current != Token::RParen {
            return Err("expected closing parenthesis".to_string());
        }
        self.advance()?;
        Ok(inner)
    }
}

/// A validated expression of wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parse and validate `source`.
    ///
    /// # Examples
    /// ```
    /// let e = sedkit::expr::Expression::parse("1./(wave-700)").unwrap();
    /// assert_eq!(e.eval(702.0), 0.5);
    /// assert!(sedkit::expr::Expression::parse("somewhere/a/file").is_err());
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |msg: String| SedError::construction(format!("invalid expression '{source}': {msg}"));

        let mut parser = Parser::new(source).map_err(invalid)?;
        let root = parser.expr().map_err(invalid)?;
        if parser.current != Token::Eos {
            return Err(invalid(format!("unexpected token {:?}", parser.current)));
        }

        Ok(Expression {
            source: source.to_string(),
            root,
        })
    }

    pub fn eval(&self, wave: f64) -> f64 {
        self.root.eval(wave)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// False for expressions that do not reference `wave`.
    pub fn depends_on_wave(&self) -> bool {
        self.root.uses_wave()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Returns true if the expression can be successfully parsed.
pub fn validate_expression(source: &str) -> bool {
    Expression::parse(source).is_ok()
}
