//! Initializer expressions and constant evaluation
//!
//! Only the expression shapes that may occur in a static initializer and that
//! matter to value derivation are modeled. Anything else is an
//! [`Expr::Opaque`] which never folds.
use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

use crate::{member::FieldMember, types::Type};

/// Literal value produced by constant folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Bool(bool),
    Char(char),
    Str(Arc<str>),
    Null,
}

impl Constant {
    pub fn str(value: impl Into<Arc<str>>) -> Self {
        Constant::Str(value.into())
    }

    /// Numeric value after unary numeric promotion, if numeric.
    fn as_long(&self) -> Option<i64> {
        match self {
            Constant::Int(v) => Some(*v as i64),
            Constant::Long(v) => Some(*v),
            Constant::Char(c) => Some(*c as u32 as i64),
            _ => None,
        }
    }

    /// Text of the constant as produced by string concatenation.
    fn concat_text(&self) -> String {
        match self {
            Constant::Int(v) => v.to_string(),
            Constant::Long(v) => v.to_string(),
            Constant::Bool(v) => v.to_string(),
            Constant::Char(c) => c.to_string(),
            Constant::Str(s) => s.to_string(),
            Constant::Null => "null".to_string(),
        }
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Long(v) => write!(f, "{}L", v),
            Constant::Bool(v) => write!(f, "{}", v),
            Constant::Char(c) => write!(f, "'{}'", c.escape_default()),
            Constant::Str(s) => write!(f, "\"{}\"", s.escape_default()),
            Constant::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    BitNot,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// An expression appearing in a field initializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Expr {
    Literal(Constant),
    /// Brace initializer `{a, b, c}`.
    ArrayInitializer(Vec<Expr>),
    /// `new T[d0][d1]...` or `new T[] {a, b}`.
    NewArray {
        element_type: Type,
        dimensions: Vec<Expr>,
        initializer: Option<Vec<Expr>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Read of a static field.
    FieldRef(Arc<FieldMember>),
    /// An expression the engine does not model (calls, lambdas, ...).
    Opaque(Arc<str>),
}

impl Expr {
    pub fn int(value: i32) -> Self {
        Expr::Literal(Constant::Int(value))
    }

    pub fn str(value: impl Into<Arc<str>>) -> Self {
        Expr::Literal(Constant::str(value))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// `new T[size]`.
    pub fn new_array(element_type: Type, size: Expr) -> Self {
        Expr::NewArray {
            element_type,
            dimensions: vec![size],
            initializer: None,
        }
    }
}

/// Folds expressions to literals when they are statically determinable.
pub trait ConstantEvaluator: Send + Sync {
    fn compute_constant(&self, expr: &Expr) -> Option<Constant>;
}

/// Default evaluator following the language's constant-expression rules.
#[derive(Debug, Clone, Copy)]
pub struct ConstantFolder {
    /// Maximum number of nested static field references followed.
    pub max_field_depth: u32,
}

impl Default for ConstantFolder {
    fn default() -> Self {
        Self {
            max_field_depth: Self::DEFAULT_MAX_FIELD_DEPTH,
        }
    }
}

impl ConstantFolder {
    pub const DEFAULT_MAX_FIELD_DEPTH: u32 = 16;

    fn fold(&self, expr: &Expr, depth: u32) -> Option<Constant> {
        match expr {
            Expr::Literal(constant) => Some(constant.clone()),
            Expr::Unary { op, operand } => fold_unary(*op, self.fold(operand, depth)?),
            // Both operands must be constant, `&&` and `||` included
            Expr::Binary { op, lhs, rhs } => {
                fold_binary(*op, self.fold(lhs, depth)?, self.fold(rhs, depth)?)
            }
            Expr::FieldRef(field) => {
                if depth >= self.max_field_depth || !field.is_static_final() {
                    return None;
                }
                let initializer = field.initializer.as_ref()?;
                self.fold(initializer, depth + 1)
            }
            Expr::ArrayInitializer(_) | Expr::NewArray { .. } | Expr::Opaque(_) => None,
        }
    }
}

impl ConstantEvaluator for ConstantFolder {
    fn compute_constant(&self, expr: &Expr) -> Option<Constant> {
        self.fold(expr, 0)
    }
}

fn fold_unary(op: UnaryOp, operand: Constant) -> Option<Constant> {
    match (op, operand) {
        (UnaryOp::Not, Constant::Bool(b)) => Some(Constant::Bool(!b)),
        (UnaryOp::Neg, Constant::Long(v)) => Some(Constant::Long(v.wrapping_neg())),
        (UnaryOp::BitNot, Constant::Long(v)) => Some(Constant::Long(!v)),
        (UnaryOp::Neg, other) => Some(Constant::Int(promote_int(&other)?.wrapping_neg())),
        (UnaryOp::BitNot, other) => Some(Constant::Int(!promote_int(&other)?)),
        _ => None,
    }
}

fn promote_int(constant: &Constant) -> Option<i32> {
    match constant {
        Constant::Int(v) => Some(*v),
        Constant::Char(c) => Some(*c as u32 as i32),
        _ => None,
    }
}

fn fold_binary(op: BinaryOp, lhs: Constant, rhs: Constant) -> Option<Constant> {
    if op == BinaryOp::Add && (lhs.is_str() || rhs.is_str()) {
        let text = lhs.concat_text() + &rhs.concat_text();
        return Some(Constant::str(text));
    }

    if let (Constant::Bool(a), Constant::Bool(b)) = (&lhs, &rhs) {
        let (a, b) = (*a, *b);
        return match op {
            BinaryOp::And | BinaryOp::BitAnd => Some(Constant::Bool(a & b)),
            BinaryOp::Or | BinaryOp::BitOr => Some(Constant::Bool(a | b)),
            BinaryOp::BitXor | BinaryOp::Ne => Some(Constant::Bool(a ^ b)),
            BinaryOp::Eq => Some(Constant::Bool(a == b)),
            _ => None,
        };
    }

    // Shift amounts do not take part in binary numeric promotion
    if matches!(op, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr) {
        let amount = rhs.as_long()?;
        return match lhs {
            Constant::Long(v) => {
                let amount = (amount & 0x3f) as u32;
                Some(Constant::Long(match op {
                    BinaryOp::Shl => v.wrapping_shl(amount),
                    BinaryOp::Shr => v.wrapping_shr(amount),
                    _ => ((v as u64) >> amount) as i64,
                }))
            }
            other => {
                let v = promote_int(&other)?;
                let amount = (amount & 0x1f) as u32;
                Some(Constant::Int(match op {
                    BinaryOp::Shl => v.wrapping_shl(amount),
                    BinaryOp::Shr => v.wrapping_shr(amount),
                    _ => ((v as u32) >> amount) as i32,
                }))
            }
        };
    }

    if lhs.is_long() || rhs.is_long() {
        let (a, b) = (lhs.as_long()?, rhs.as_long()?);
        return fold_arithmetic(op, a, b, Constant::Long);
    }

    let (a, b) = (promote_int(&lhs)?, promote_int(&rhs)?);
    fold_arithmetic(op, a, b, Constant::Int)
}

/// Folds an arithmetic, bitwise or comparison operator over promoted operands.
fn fold_arithmetic<T>(op: BinaryOp, a: T, b: T, wrap: fn(T) -> Constant) -> Option<Constant>
where
    T: WrappingInt,
{
    let value = match op {
        BinaryOp::Add => a.add(b),
        BinaryOp::Sub => a.sub(b),
        BinaryOp::Mul => a.mul(b),
        BinaryOp::Div => a.div(b)?,
        BinaryOp::Rem => a.rem(b)?,
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Eq => return Some(Constant::Bool(a == b)),
        BinaryOp::Ne => return Some(Constant::Bool(a != b)),
        BinaryOp::Lt => return Some(Constant::Bool(a < b)),
        BinaryOp::Le => return Some(Constant::Bool(a <= b)),
        BinaryOp::Gt => return Some(Constant::Bool(a > b)),
        BinaryOp::Ge => return Some(Constant::Bool(a >= b)),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr | BinaryOp::And | BinaryOp::Or => {
            return None;
        }
    };
    Some(wrap(value))
}

/// Two's complement integer arithmetic with the analysed language's overflow rules.
trait WrappingInt:
    Copy
    + Ord
    + std::ops::BitAnd<Output = Self>
    + std::ops::BitOr<Output = Self>
    + std::ops::BitXor<Output = Self>
{
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    /// `None` on division by zero.
    fn div(self, rhs: Self) -> Option<Self>;
    fn rem(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_wrapping_int {
    ($($ty:ty),*) => {
        $(
            impl WrappingInt for $ty {
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                #[inline]
                fn div(self, rhs: Self) -> Option<Self> {
                    (rhs != 0).then(|| self.wrapping_div(rhs))
                }

                #[inline]
                fn rem(self, rhs: Self) -> Option<Self> {
                    (rhs != 0).then(|| self.wrapping_rem(rhs))
                }
            }
        )*
    };
}

impl_wrapping_int!(i32, i64);
