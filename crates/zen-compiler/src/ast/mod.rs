//! Abstract syntax tree consumed by the generator.
//!
//! The tree is produced by the parser (outside this crate) or by
//! [`AstBuilder`]. Nodes that introduce a lexical scope carry a [`NodeId`]
//! so the symbol-table pass can annotate them; everything else is plain
//! owned data walked read-only.

mod builder;
mod operators;

pub use builder::AstBuilder;
pub use operators::{AssignmentOperator, BinaryOperator, LogicalOperator, PostfixOperator, UnaryOperator};

use zen_core::Ident;

/// Identity of a scope-introducing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Placeholder the parser leaves where it recovered from a syntax error.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorNode {
    pub message: String,
}

/// Dotted name such as `zen.core.Object`.
#[derive(Clone, Debug, PartialEq)]
pub struct QualifiedName {
    pub parts: Vec<Ident>,
}

impl QualifiedName {
    /// The last segment.
    pub fn simple_name(&self) -> Option<Ident> {
        self.parts.last().copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompilationUnit {
    pub id: NodeId,
    /// Unit name, used as the entity name when the unit declares no class.
    pub name: Ident,
    pub package: Option<QualifiedName>,
    pub imports: Vec<QualifiedName>,
    pub components: Vec<Component>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    Function(FunctionDecl),
    Class(ClassDecl),
    Enumeration(EnumerationDecl),
    Variable(VariableDecl),
    Error(ErrorNode),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: Ident,
    pub extends: Vec<QualifiedName>,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassMember {
    Function(FunctionDecl),
    Variable(VariableDecl),
    Error(ErrorNode),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumerationDecl {
    pub id: NodeId,
    pub name: Ident,
    pub enumerates: Vec<Ident>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub name: Ident,
    pub parameters: Vec<Ident>,
    pub variadic: Option<Ident>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    /// `final` declarations define constants.
    pub constant: bool,
    pub declarators: Vec<VariableDeclarator>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclarator {
    pub name: Ident,
    pub initializer: Option<Expr>,
}

/// A statement suite.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Variable(VariableDecl),
    Expression(Expr),
    If(IfStmt),
    While(WhileStmt),
    Return(Option<Expr>),
    Throw(Expr),
    Try(TryStmt),
    Block(Block),
    Error(ErrorNode),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub catches: Vec<CatchClause>,
}

/// `catch (Class binding) { ... }`; the binding lives in `body`'s scope.
#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub class: QualifiedName,
    pub binding: Ident,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// Token text, radix prefix and long suffix included.
    Integer(String),
    /// Token text, float suffix included.
    Float(String),
    /// Token text, quotes included.
    String(String),
    True,
    False,
    Null,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(Ident),
    This,
    Assignment {
        target: Box<Expr>,
        operator: AssignmentOperator,
        value: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Postfix {
        operator: PostfixOperator,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        name: Ident,
    },
    Subscript {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    New {
        class: QualifiedName,
    },
    List(Vec<Expr>),
    Map(Vec<MapEntry>),
    Error(ErrorNode),
}

impl Expr {
    pub fn int(text: &str) -> Self {
        Expr::Literal(Literal::Integer(text.to_string()))
    }

    pub fn float(text: &str) -> Self {
        Expr::Literal(Literal::Float(text.to_string()))
    }

    /// String literal from unquoted content.
    pub fn string(content: &str) -> Self {
        Expr::Literal(Literal::String(format!("\"{content}\"")))
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(operator: LogicalOperator, left: Expr, right: Expr) -> Self {
        Expr::Logical {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn postfix(operator: PostfixOperator, operand: Expr) -> Self {
        Expr::Postfix {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn assign(target: Expr, operator: AssignmentOperator, value: Expr) -> Self {
        Expr::Assignment {
            target: Box::new(target),
            operator,
            value: Box::new(value),
        }
    }

    pub fn conditional(condition: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn member(object: Expr, name: Ident) -> Self {
        Expr::Member {
            object: Box::new(object),
            name,
        }
    }

    pub fn subscript(object: Expr, index: Expr) -> Self {
        Expr::Subscript {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    pub fn error(message: &str) -> Self {
        Expr::Error(ErrorNode {
            message: message.to_string(),
        })
    }
}
