//! Programmatic AST construction.
//!
//! Hands out fresh [`NodeId`]s and interns identifier text, so hosts without
//! a parser (and tests) can assemble well-formed trees.

use zen_core::{Ident, Interner};

use super::*;

pub struct AstBuilder<'i> {
    interner: &'i mut Interner,
    next_id: u32,
}

impl<'i> AstBuilder<'i> {
    pub fn new(interner: &'i mut Interner) -> Self {
        Self {
            interner,
            next_id: 0,
        }
    }

    pub fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn ident(&mut self, text: &str) -> Ident {
        self.interner.intern(text)
    }

    /// `"zen.core.Object"` split on dots.
    pub fn qualified(&mut self, dotted: &str) -> QualifiedName {
        QualifiedName {
            parts: dotted.split('.').map(|part| self.ident(part)).collect(),
        }
    }

    /// An identifier expression.
    pub fn name(&mut self, text: &str) -> Expr {
        Expr::Identifier(self.ident(text))
    }

    /// `object.member`.
    pub fn member(&mut self, object: Expr, member: &str) -> Expr {
        let name = self.ident(member);
        Expr::member(object, name)
    }

    /// `callee(arguments)` where `callee` is a plain name.
    pub fn call(&mut self, callee: &str, arguments: Vec<Expr>) -> Expr {
        let callee = self.name(callee);
        Expr::call(callee, arguments)
    }

    /// `object.method(arguments)`.
    pub fn call_method(&mut self, object: Expr, method: &str, arguments: Vec<Expr>) -> Expr {
        let callee = self.member(object, method);
        Expr::call(callee, arguments)
    }

    pub fn new_object(&mut self, class: &str) -> Expr {
        Expr::New {
            class: self.qualified(class),
        }
    }

    pub fn unit(&mut self, name: &str, components: Vec<Component>) -> CompilationUnit {
        CompilationUnit {
            id: self.node_id(),
            name: self.ident(name),
            package: None,
            imports: Vec::new(),
            components,
        }
    }

    pub fn unit_with(
        &mut self,
        name: &str,
        package: Option<&str>,
        imports: &[&str],
        components: Vec<Component>,
    ) -> CompilationUnit {
        let package = package.map(|p| self.qualified(p));
        let imports = imports.iter().map(|i| self.qualified(i)).collect();
        CompilationUnit {
            id: self.node_id(),
            name: self.ident(name),
            package,
            imports,
            components,
        }
    }

    pub fn class(&mut self, name: &str, extends: &[&str], members: Vec<ClassMember>) -> Component {
        let extends = extends.iter().map(|e| self.qualified(e)).collect();
        Component::Class(ClassDecl {
            id: self.node_id(),
            name: self.ident(name),
            extends,
            members,
        })
    }

    pub fn enumeration(&mut self, name: &str, enumerates: &[&str]) -> Component {
        Component::Enumeration(EnumerationDecl {
            id: self.node_id(),
            name: self.ident(name),
            enumerates: enumerates.iter().map(|e| self.ident(e)).collect(),
        })
    }

    pub fn function(&mut self, name: &str, parameters: &[&str], body: Vec<Stmt>) -> FunctionDecl {
        self.function_decl(name, parameters, None, body)
    }

    pub fn variadic_function(
        &mut self,
        name: &str,
        parameters: &[&str],
        variadic: &str,
        body: Vec<Stmt>,
    ) -> FunctionDecl {
        self.function_decl(name, parameters, Some(variadic), body)
    }

    fn function_decl(
        &mut self,
        name: &str,
        parameters: &[&str],
        variadic: Option<&str>,
        body: Vec<Stmt>,
    ) -> FunctionDecl {
        let id = self.node_id();
        let name = self.ident(name);
        let parameters = parameters.iter().map(|p| self.ident(p)).collect();
        let variadic = variadic.map(|v| self.ident(v));
        let body = self.block(body);
        FunctionDecl {
            id,
            name,
            parameters,
            variadic,
            body,
        }
    }

    pub fn block(&mut self, statements: Vec<Stmt>) -> Block {
        Block {
            id: self.node_id(),
            statements,
        }
    }

    /// `var name = initializer;`
    pub fn var(&mut self, name: &str, initializer: Option<Expr>) -> VariableDecl {
        VariableDecl {
            constant: false,
            declarators: vec![VariableDeclarator {
                name: self.ident(name),
                initializer,
            }],
        }
    }

    /// `final name = initializer;`
    pub fn constant(&mut self, name: &str, initializer: Expr) -> VariableDecl {
        VariableDecl {
            constant: true,
            declarators: vec![VariableDeclarator {
                name: self.ident(name),
                initializer: Some(initializer),
            }],
        }
    }

    pub fn if_stmt(&mut self, condition: Expr, then: Vec<Stmt>, otherwise: Option<Vec<Stmt>>) -> Stmt {
        let then_block = self.block(then);
        let else_block = otherwise.map(|stmts| self.block(stmts));
        Stmt::If(IfStmt {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn while_stmt(&mut self, condition: Expr, body: Vec<Stmt>) -> Stmt {
        let body = self.block(body);
        Stmt::While(WhileStmt { condition, body })
    }

    pub fn try_stmt(&mut self, body: Vec<Stmt>, catches: Vec<CatchClause>) -> Stmt {
        let body = self.block(body);
        Stmt::Try(TryStmt { body, catches })
    }

    pub fn catch(&mut self, class: &str, binding: &str, body: Vec<Stmt>) -> CatchClause {
        let class = self.qualified(class);
        let binding = self.ident(binding);
        let body = self.block(body);
        CatchClause {
            class,
            binding,
            body,
        }
    }
}
