//! Operator tokens, shared between the surface AST and the IR (spec.md §4.4
//! gives the full operator-to-C mapping table).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
}

impl BinOp {
    pub fn from_token(token: &str) -> BinOp {
        match token {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "//" => BinOp::FloorDiv,
            "%" => BinOp::Mod,
            "&" => BinOp::BitAnd,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "and" => BinOp::And,
            "or" => BinOp::Or,
            "==" => BinOp::Eq,
            "!=" => BinOp::NotEq,
            "<" => BinOp::Lt,
            "<=" => BinOp::LtEq,
            ">" => BinOp::Gt,
            ">=" => BinOp::GtEq,
            "in" => BinOp::In,
            other => {
                let collapsed: String = other.split_whitespace().collect::<Vec<_>>().join(" ");
                if collapsed == "not in" {
                    BinOp::NotIn
                } else {
                    unreachable!("unknown binary operator token '{other}'")
                }
            }
        }
    }

    /// True for the comparison operators the analyzer requires matching
    /// operand types for rather than arithmetic promotion.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq
                | BinOp::NotEq
                | BinOp::Lt
                | BinOp::LtEq
                | BinOp::Gt
                | BinOp::GtEq
                | BinOp::In
                | BinOp::NotIn
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
    BitNot,
}

impl UnOp {
    pub fn from_token(token: &str) -> UnOp {
        match token {
            "-" => UnOp::Neg,
            "+" => UnOp::Pos,
            "!" => UnOp::Not,
            "~" => UnOp::BitNot,
            other => unreachable!("unknown unary operator token '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AugOp {
    pub fn from_token(token: &str) -> AugOp {
        match token {
            "+=" => AugOp::Add,
            "-=" => AugOp::Sub,
            "*=" => AugOp::Mul,
            "/=" => AugOp::Div,
            "%=" => AugOp::Mod,
            other => unreachable!("unknown augmented assignment operator '{other}'"),
        }
    }

    pub fn as_bin_op(self) -> BinOp {
        match self {
            AugOp::Add => BinOp::Add,
            AugOp::Sub => BinOp::Sub,
            AugOp::Mul => BinOp::Mul,
            AugOp::Div => BinOp::Div,
            AugOp::Mod => BinOp::Mod,
        }
    }
}
