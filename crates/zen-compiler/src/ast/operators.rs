//! Operator tokens and the operator functions they dispatch to.
//!
//! Every arithmetic, bitwise, relational and unary operator lowers to a
//! virtual call on the left operand. The function names are fixed: the
//! runtime provides them for built-in values and classes may define them.

/// Operators taking two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    BitAnd,
    BitOr,
    BitXor,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn function_name(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "plusOperator",
            Subtract => "minusOperator",
            Multiply => "multiplyOperator",
            Divide => "divideOperator",
            Modulo => "moduloOperator",
            LeftShift => "leftShiftOperator",
            RightShift => "rightShiftOperator",
            UnsignedRightShift => "rightShift3Operator",
            BitAnd => "andOperator",
            BitOr => "orOperator",
            BitXor => "xorOperator",
            Equal => "equalsOperator",
            NotEqual => "notEqualsOperator",
            Less => "lessThanOperator",
            LessEqual => "lessThanOrEqualToOperator",
            Greater => "greaterThanOperator",
            GreaterEqual => "greaterThanOrEqualToOperator",
        }
    }

    pub fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            LeftShift => "<<",
            RightShift => ">>",
            UnsignedRightShift => ">>>",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
        }
    }

    /// The binary operator named by an operator function, if any.
    pub fn from_function_name(name: &str) -> Option<Self> {
        use BinaryOperator::*;
        [
            Add,
            Subtract,
            Multiply,
            Divide,
            Modulo,
            LeftShift,
            RightShift,
            UnsignedRightShift,
            BitAnd,
            BitOr,
            BitXor,
            Equal,
            NotEqual,
            Less,
            LessEqual,
            Greater,
            GreaterEqual,
        ]
        .into_iter()
        .find(|op| op.function_name() == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Complement,
    Not,
    Increment,
    Decrement,
}

impl UnaryOperator {
    pub fn function_name(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "positiveOperator",
            UnaryOperator::Minus => "negateOperator",
            UnaryOperator::Complement => "complementOperator",
            UnaryOperator::Not => "notOperator",
            UnaryOperator::Increment => "incrementOperator",
            UnaryOperator::Decrement => "decrementOperator",
        }
    }

    /// `++x` and `--x` also store the result back.
    pub fn is_update(self) -> bool {
        matches!(self, UnaryOperator::Increment | UnaryOperator::Decrement)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl PostfixOperator {
    pub fn function_name(self) -> &'static str {
        match self {
            PostfixOperator::Increment => UnaryOperator::Increment.function_name(),
            PostfixOperator::Decrement => UnaryOperator::Decrement.function_name(),
        }
    }
}

/// `=` and the compound forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignmentOperator {
    Assign,
    Compound(BinaryOperator),
}
