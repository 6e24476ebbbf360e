//! Java operator tokens and the printing precedence table

use serde::Serialize;

/// Precedence levels; a smaller number binds tighter
pub mod precedence {
    pub const PARENTHESIZED: u8 = 0;
    pub const LITERAL: u8 = PARENTHESIZED;
    pub const METHOD_CALL: u8 = 1;
    pub const POSTFIX: u8 = 2;
    pub const PREFIX: u8 = 3;
    pub const TYPE_CAST: u8 = 4;
    pub const MULTIPLICATIVE: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const SHIFT: u8 = 7;
    pub const RELATIONAL: u8 = 8;
    pub const EQUALITY: u8 = 9;
    pub const BITWISE_AND: u8 = 10;
    pub const BITWISE_XOR: u8 = 11;
    pub const BITWISE_OR: u8 = 12;
    pub const AND: u8 = 13;
    pub const OR: u8 = 14;
    pub const CONDITIONAL: u8 = 15;
    pub const ASSIGNMENT: u8 = 16;
    pub const LAMBDA: u8 = 17;
    /// Context meaning "no parentheses are ever needed"
    pub const NUM_PRECEDENCES: u8 = 18;
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorToken {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    AndAnd,
    OrOr,
}

impl OperatorToken {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "+" => Self::Add,
            "-" => Self::Sub,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            ">>>" => Self::UShr,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "&" => Self::BitAnd,
            "^" => Self::BitXor,
            "|" => Self::BitOr,
            "&&" => Self::AndAnd,
            "||" => Self::OrOr,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Rem => precedence::MULTIPLICATIVE,
            Self::Add | Self::Sub => precedence::ADDITIVE,
            Self::Shl | Self::Shr | Self::UShr => precedence::SHIFT,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => precedence::RELATIONAL,
            Self::Eq | Self::Ne => precedence::EQUALITY,
            Self::BitAnd => precedence::BITWISE_AND,
            Self::BitXor => precedence::BITWISE_XOR,
            Self::BitOr => precedence::BITWISE_OR,
            Self::AndAnd => precedence::AND,
            Self::OrOr => precedence::OR,
        }
    }

    /// Operators whose same-operator chains are kept as one polyadic node
    pub fn is_chainable(self) -> bool {
        matches!(
            self,
            Self::AndAnd | Self::OrOr | Self::Add | Self::Mul | Self::BitAnd | Self::BitOr | Self::BitXor
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    pub fn is_comparison(self) -> bool {
        self.is_equality() || self.is_relational()
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::AndAnd | Self::OrOr)
    }

    /// Logical inverse of a comparison: `a OP b` is false exactly when
    /// `a OP.negated() b` is true (ignoring NaN)
    pub fn negated(self) -> Option<Self> {
        Some(match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Ge => Self::Lt,
            Self::Gt => Self::Le,
            Self::Le => Self::Gt,
            _ => return None,
        })
    }

    /// The comparison with its operands swapped: `a OP b` iff `b OP.flipped() a`
    pub fn flipped(self) -> Option<Self> {
        Some(match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Gt => Self::Lt,
            Self::Le => Self::Ge,
            Self::Ge => Self::Le,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignOp {
    Assign,
    /// Compound assignment `op=`
    Compound(OperatorToken),
}

impl AssignOp {
    pub fn from_text(text: &str) -> Option<Self> {
        if text == "=" {
            return Some(Self::Assign);
        }
        let op = text.strip_suffix('=')?;
        let token = OperatorToken::from_text(op)?;
        match token {
            OperatorToken::Mul
            | OperatorToken::Div
            | OperatorToken::Rem
            | OperatorToken::Add
            | OperatorToken::Sub
            | OperatorToken::Shl
            | OperatorToken::Shr
            | OperatorToken::UShr
            | OperatorToken::BitAnd
            | OperatorToken::BitXor
            | OperatorToken::BitOr => Some(Self::Compound(token)),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Compound(OperatorToken::Mul) => "*=",
            Self::Compound(OperatorToken::Div) => "/=",
            Self::Compound(OperatorToken::Rem) => "%=",
            Self::Compound(OperatorToken::Add) => "+=",
            Self::Compound(OperatorToken::Sub) => "-=",
            Self::Compound(OperatorToken::Shl) => "<<=",
            Self::Compound(OperatorToken::Shr) => ">>=",
            Self::Compound(OperatorToken::UShr) => ">>>=",
            Self::Compound(OperatorToken::BitAnd) => "&=",
            Self::Compound(OperatorToken::BitXor) => "^=",
            Self::Compound(OperatorToken::BitOr) => "|=",
            Self::Compound(_) => "?=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrefixOp {
    Not,
    Minus,
    Plus,
    BitNot,
    Inc,
    Dec,
}

impl PrefixOp {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "!" => Self::Not,
            "-" => Self::Minus,
            "+" => Self::Plus,
            "~" => Self::BitNot,
            "++" => Self::Inc,
            "--" => Self::Dec,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::BitNot => "~",
            Self::Inc => "++",
            Self::Dec => "--",
        }
    }

    pub fn is_update(self) -> bool {
        matches!(self, Self::Inc | Self::Dec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "++" => Some(Self::Inc),
            "--" => Some(Self::Dec),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inc => "++",
            Self::Dec => "--",
        }
    }
}
