//! Numeric expression parsing and compile-time constant folding.
//!
//! Used by the arg coercer (temp-var hoisting) and the assignment
//! sugars. Atoms are identifiers, optionally carrying `%…%` placeholder
//! segments which are kept verbatim.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumExpr {
    Num(f64),
    /// Identifier or placeholder reference, verbatim.
    Atom(String),
    Neg(Box<NumExpr>),
    Bin { op: ArithOp, lhs: Box<NumExpr>, rhs: Box<NumExpr> },
}

impl NumExpr {
    /// A single value with no arithmetic around it.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Num(_) | Self::Atom(_))
    }

    /// Evaluates the expression when every leaf is a constant.
    #[must_use]
    pub fn fold(&self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(*v),
            Self::Atom(_) => None,
            Self::Neg(inner) => inner.fold().map(|v| -v),
            Self::Bin { op, lhs, rhs } => {
                let (l, r) = (lhs.fold()?, rhs.fold()?);
                Some(match op {
                    ArithOp::Add => l + r,
                    ArithOp::Sub => l - r,
                    ArithOp::Mul => l * r,
                    ArithOp::Div => l / r,
                })
            }
        }
    }
}

/// Emits a folded constant in its shortest form: integral values lose
/// the fraction, everything else keeps the round-trip decimal form.
#[must_use]
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Atom(String),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(s: &str) -> Option<Vec<Tok>> {
    let mut toks = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            i += 1;
        } else if ch.is_ascii_digit() || (ch == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let raw: String = chars[start..i].iter().collect();
            toks.push(Tok::Num(raw.parse().ok()?));
        } else if matches!(ch, '+' | '-' | '*' | '/') {
            toks.push(Tok::Op(ch));
            i += 1;
        } else if ch == '(' {
            toks.push(Tok::LParen);
            i += 1;
        } else if ch == ')' {
            toks.push(Tok::RParen);
            i += 1;
        } else if ch == '%' || ch == '_' || ch.is_alphanumeric() {
            // Identifier, possibly with %…% placeholder segments that may
            // themselves contain parentheses (e.g. `row_%var(z)%`).
            let start = i;
            let mut in_placeholder = false;
            while i < chars.len() {
                let c = chars[i];
                if c == '%' {
                    in_placeholder = !in_placeholder;
                    i += 1;
                } else if in_placeholder {
                    i += 1;
                } else if c == '_' || c.is_alphanumeric() {
                    i += 1;
                } else {
                    break;
                }
            }
            if in_placeholder {
                return None;
            }
            toks.push(Tok::Atom(chars[start..i].iter().collect()));
        } else {
            return None;
        }
    }
    Some(toks)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek_op(&self) -> Option<char> {
        match self.toks.get(self.pos) {
            Some(Tok::Op(c)) => Some(*c),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Option<NumExpr> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek_op().filter(|c| matches!(c, '+' | '-')) {
            self.pos += 1;
            let rhs = self.term()?;
            let op = if op == '+' { ArithOp::Add } else { ArithOp::Sub };
            lhs = NumExpr::Bin { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn term(&mut self) -> Option<NumExpr> {
        let mut lhs = self.factor()?;
        while let Some(op) = self.peek_op().filter(|c| matches!(c, '*' | '/')) {
            self.pos += 1;
            let rhs = self.factor()?;
            let op = if op == '*' { ArithOp::Mul } else { ArithOp::Div };
            lhs = NumExpr::Bin { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Some(lhs)
    }

    fn factor(&mut self) -> Option<NumExpr> {
        match self.next()? {
            Tok::Op('-') => Some(NumExpr::Neg(Box::new(self.factor()?))),
            Tok::Op('+') => self.factor(),
            Tok::Num(v) => Some(NumExpr::Num(v)),
            Tok::Atom(a) => Some(NumExpr::Atom(a)),
            Tok::LParen => {
                let inner = self.expr()?;
                matches!(self.next()?, Tok::RParen).then_some(inner)
            }
            _ => None,
        }
    }
}

/// Parses a numeric expression; `None` when the text is not shaped like
/// one (quotes, commas, unknown characters).
#[must_use]
pub fn parse_num_expr(s: &str) -> Option<NumExpr> {
    let toks = tokenize(s)?;
    if toks.is_empty() {
        return None;
    }
    let mut parser = Parser { toks, pos: 0 };
    let expr = parser.expr()?;
    (parser.pos == parser.toks.len()).then_some(expr)
}
