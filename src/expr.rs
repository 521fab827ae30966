use std::f64::consts::{E, PI};
use std::fmt;

/// Errors raised while compiling a ρ(φ) formula
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("{func} expects {expected} argument(s), got {found}")]
    Arity {
        func: Func,
        expected: &'static str,
        found: usize,
    },

    #[error("expression does not evaluate to a number at φ = 0")]
    NotANumber,
}

/// Whitelisted functions callable from a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Abs,
    Sqrt,
    Pow,
    Exp,
    Log,
    Max,
    Min,
    Floor,
    Ceil,
}

impl Func {
    fn lookup(name: &str) -> Option<Func> {
        let func = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "abs" => Func::Abs,
            "sqrt" => Func::Sqrt,
            "pow" => Func::Pow,
            "exp" => Func::Exp,
            "log" => Func::Log,
            "max" => Func::Max,
            "min" => Func::Min,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            _ => return None,
        };
        Some(func)
    }

    fn check_arity(self, found: usize) -> Result<(), ExprError> {
        let (ok, expected) = match self {
            Func::Max | Func::Min => (found >= 1, "at least 1"),
            Func::Pow => (found == 2, "2"),
            _ => (found == 1, "1"),
        };
        if ok {
            Ok(())
        } else {
            Err(ExprError::Arity {
                func: self,
                expected,
                found,
            })
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Func::Sin => args[0].sin(),
            Func::Cos => args[0].cos(),
            Func::Tan => args[0].tan(),
            Func::Asin => args[0].asin(),
            Func::Acos => args[0].acos(),
            Func::Atan => args[0].atan(),
            Func::Abs => args[0].abs(),
            Func::Sqrt => args[0].sqrt(),
            Func::Pow => args[0].powf(args[1]),
            Func::Exp => args[0].exp(),
            Func::Log => args[0].ln(),
            // NaN poisons the result, matching how a NaN argument behaves elsewhere
            Func::Max => args.iter().copied().fold(f64::NEG_INFINITY, |acc, v| {
                if acc.is_nan() || v.is_nan() {
                    f64::NAN
                } else {
                    acc.max(v)
                }
            }),
            Func::Min => args.iter().copied().fold(f64::INFINITY, |acc, v| {
                if acc.is_nan() || v.is_nan() {
                    f64::NAN
                } else {
                    acc.min(v)
                }
            }),
            Func::Floor => args[0].floor(),
            Func::Ceil => args[0].ceil(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Phi,
    Neg(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Call(Func, Vec<Node>),
}

impl Node {
    fn eval(&self, phi: f64) -> f64 {
        match self {
            Node::Num(v) => *v,
            Node::Phi => phi,
            Node::Neg(inner) => -inner.eval(phi),
            Node::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(phi), rhs.eval(phi));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Rem => a % b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Node::Call(func, args) => {
                let values: Vec<f64> = args.iter().map(|a| a.eval(phi)).collect();
                func.apply(&values)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(v) => write!(f, "number {v}"),
            Token::Ident(name) => write!(f, "'{name}'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::Caret => write!(f, "'^'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // exponent only when digits follow, so `2*E` still reads as the constant
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ExprError::InvalidNumber(text.clone()))?;
            tokens.push((start, Token::Num(value)));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
            continue;
        }

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::Caret
            }
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            other => return Err(ExprError::UnexpectedChar { ch: other, pos: start }),
        };
        tokens.push((start, token));
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, wanted: Token) -> Result<(), ExprError> {
        match self.next() {
            Some((_, ref t)) if *t == wanted => Ok(()),
            Some((pos, t)) => Err(ExprError::UnexpectedToken {
                found: t.to_string(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expression(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // Unary minus binds looser than power: -phi^2 == -(phi^2)
    fn unary(&mut self) -> Result<Node, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Node::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Node, ExprError> {
        let base = self.primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Node::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node, ExprError> {
        match self.next() {
            Some((_, Token::Num(v))) => Ok(Node::Num(v)),
            Some((_, Token::LParen)) => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some((_, Token::Ident(name))) => self.identifier(name),
            Some((pos, t)) => Err(ExprError::UnexpectedToken {
                found: t.to_string(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn identifier(&mut self, name: String) -> Result<Node, ExprError> {
        match name.as_str() {
            "phi" | "φ" => return Ok(Node::Phi),
            "PI" | "π" => return Ok(Node::Num(PI)),
            "E" => return Ok(Node::Num(E)),
            _ => {}
        }

        let func = Func::lookup(&name).ok_or(ExprError::UnknownIdentifier(name))?;
        self.expect(Token::LParen)?;

        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.pos += 1;
        } else {
            loop {
                args.push(self.expression()?);
                match self.next() {
                    Some((_, Token::Comma)) => continue,
                    Some((_, Token::RParen)) => break,
                    Some((pos, t)) => {
                        return Err(ExprError::UnexpectedToken {
                            found: t.to_string(),
                            pos,
                        })
                    }
                    None => return Err(ExprError::UnexpectedEnd),
                }
            }
        }

        func.check_arity(args.len())?;
        Ok(Node::Call(func, args))
    }
}

/// A validated ρ(φ) formula, ready to be sampled
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    root: Node,
}

impl CompiledExpr {
    /// A formula that ignores φ and always yields `value`
    pub fn constant(value: f64) -> Self {
        Self {
            source: value.to_string(),
            root: Node::Num(value),
        }
    }

    pub fn eval(&self, phi: f64) -> f64 {
        self.root.eval(phi)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Parse `src` and evaluate it once at φ = 0.
///
/// Nothing is returned unless that first evaluation produced a number, so callers never
/// discover a broken formula halfway through a sweep.
pub fn compile(src: &str) -> Result<CompiledExpr, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let root = parser.expression()?;
    if let Some((pos, t)) = parser.next() {
        return Err(ExprError::UnexpectedToken {
            found: t.to_string(),
            pos,
        });
    }

    let compiled = CompiledExpr {
        source: src.trim().to_string(),
        root,
    };

    let at_zero = compiled.eval(0.0);
    if at_zero.is_nan() {
        return Err(ExprError::NotANumber);
    }
    log::debug!("compiled ρ(φ) = {} (at 0: {at_zero})", compiled.source);

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn eval(src: &str, phi: f64) -> f64 {
        compile(src).unwrap().eval(phi)
    }

    #[test]
    fn test_constant_expression() {
        assert_eq!(eval("100", 1.3), 100.0);
        assert_eq!(CompiledExpr::constant(100.0).eval(2.0), 100.0);
    }

    #[test]
    fn test_default_exercise_formula() {
        let phi = 0.4;
        assert!((eval("200*sin(3*phi)", phi) - 200.0 * (3.0 * phi).sin()).abs() < 1e-12);
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("2 ** 3", 0.0), 8.0);
        assert_eq!(eval("-2 ^ 2", 0.0), -4.0);
        assert_eq!(eval("2 ^ -1", 0.0), 0.5);
        assert_eq!(eval("7 % 4", 0.0), 3.0);
        assert_eq!(eval("+5", 0.0), 5.0);
    }

    #[test]
    fn test_constants_and_aliases() {
        assert_eq!(eval("PI", 0.0), PI);
        assert_eq!(eval("π", 0.0), PI);
        assert_eq!(eval("E", 0.0), E);
        assert_eq!(eval("φ * 2", 1.5), 3.0);
        assert_eq!(eval("2*E", 0.0), 2.0 * E);
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(eval("1e2", 0.0), 100.0);
        assert_eq!(eval("2.5E-1", 0.0), 0.25);
        assert_eq!(eval(".5", 0.0), 0.5);
    }

    #[test]
    fn test_whitelisted_functions() {
        assert_eq!(eval("abs(-3)", 0.0), 3.0);
        assert_eq!(eval("sqrt(16)", 0.0), 4.0);
        assert_eq!(eval("pow(2, 10)", 0.0), 1024.0);
        assert!((eval("log(E)", 0.0) - 1.0).abs() < 1e-12);
        assert_eq!(eval("exp(0)", 0.0), 1.0);
        assert_eq!(eval("max(1, 5, 3)", 0.0), 5.0);
        assert_eq!(eval("min(4, -2)", 0.0), -2.0);
        assert_eq!(eval("floor(2.7) + ceil(2.1)", 0.0), 5.0);
        assert!((eval("atan(1)", 0.0) - PI / 4.0).abs() < 1e-12);
        assert!((eval("acos(0)", 0.0) - PI / 2.0).abs() < 1e-12);
        assert_eq!(eval("asin(0) + tan(0) + cos(0)", 0.0), 1.0);
    }

    #[test]
    fn test_rejects_dangling_operator() {
        assert_matches!(compile("1 +"), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_matches!(compile(""), Err(ExprError::Empty));
        assert_matches!(compile("   "), Err(ExprError::Empty));
    }

    #[test]
    fn test_rejects_unknown_identifier() {
        assert_matches!(
            compile("theta * 2"),
            Err(ExprError::UnknownIdentifier(name)) if name == "theta"
        );
        assert_matches!(compile("alert(1)"), Err(ExprError::UnknownIdentifier(_)));
    }

    #[test]
    fn test_rejects_bad_arity() {
        assert_matches!(
            compile("pow(2)"),
            Err(ExprError::Arity { func: Func::Pow, found: 1, .. })
        );
        assert_matches!(compile("sin(1, 2)"), Err(ExprError::Arity { .. }));
        assert_matches!(compile("max()"), Err(ExprError::Arity { .. }));
    }

    #[test]
    fn test_rejects_trailing_tokens() {
        assert_matches!(compile("1 2"), Err(ExprError::UnexpectedToken { .. }));
        assert_matches!(compile("(1 + 2"), Err(ExprError::UnexpectedEnd));
        assert_matches!(compile("1 + 2)"), Err(ExprError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_rejects_unexpected_character() {
        assert_matches!(
            compile("phi; 1"),
            Err(ExprError::UnexpectedChar { ch: ';', .. })
        );
    }

    #[test]
    fn test_compile_rejects_nan_at_zero() {
        assert_matches!(compile("sqrt(phi - 1)"), Err(ExprError::NotANumber));
        assert_matches!(compile("0 / 0"), Err(ExprError::NotANumber));
    }

    #[test]
    fn test_compile_accepts_infinity() {
        let f = compile("1 / phi").unwrap();
        assert!(f.eval(0.0).is_infinite());
        assert_eq!(f.eval(2.0), 0.5);
    }

    #[test]
    fn test_source_is_trimmed() {
        assert_eq!(compile("  phi + 1 ").unwrap().source(), "phi + 1");
    }

    #[test]
    fn test_func_display() {
        assert_eq!(Func::Asin.to_string(), "asin");
        let err = compile("pow(1)").unwrap_err();
        assert_eq!(err.to_string(), "pow expects 2 argument(s), got 1");
    }
}
