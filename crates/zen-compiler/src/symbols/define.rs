//! The definition pass: one scope per scope-introducing node, one symbol
//! per declaration.
//!
//! Declarations of a unit and of a class are defined before any body is
//! walked, so functions may call each other regardless of order. Error
//! nodes are skipped here; the generator reports them.

use zen_core::{Ident, Interner};

use crate::ast::{
    Block, ClassDecl, ClassMember, CompilationUnit, Component, EnumerationDecl, FunctionDecl, Stmt,
    VariableDecl,
};

use super::{
    ResolveError, ScopeAnnotations, ScopeId, ScopeKind, SymbolId, SymbolKind, SymbolTable,
    binary_name,
};

/// Output of [`define_symbols`].
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub table: SymbolTable,
    pub annotations: ScopeAnnotations,
}

pub fn define_symbols(
    unit: &CompilationUnit,
    interner: &Interner,
) -> Result<Resolution, ResolveError> {
    let package = unit
        .package
        .as_ref()
        .map(|p| binary_name(p.parts.iter().map(|&i| interner.resolve(i))));
    let mut pass = DefinePass {
        interner,
        package,
        resolution: Resolution::default(),
    };
    pass.unit(unit)?;
    Ok(pass.resolution)
}

struct DefinePass<'a> {
    interner: &'a Interner,
    package: Option<String>,
    resolution: Resolution,
}

impl DefinePass<'_> {
    fn table(&mut self) -> &mut SymbolTable {
        &mut self.resolution.table
    }

    fn define(&mut self, scope: ScopeId, name: Ident, kind: SymbolKind) -> Result<SymbolId, ResolveError> {
        self.resolution
            .table
            .define(scope, name, kind)
            .ok_or_else(|| ResolveError::DuplicateDefinition {
                name: self.interner.resolve(name).to_string(),
                kind: self.resolution.table.scope(scope).kind,
            })
    }

    fn open_scope(
        &mut self,
        node: crate::ast::NodeId,
        kind: ScopeKind,
        enclosing: ScopeId,
        owner: Option<SymbolId>,
    ) -> ScopeId {
        let scope = self.table().create_scope(kind, Some(enclosing));
        if let Some(owner) = owner {
            self.table().attach_scope(owner, scope);
        }
        self.resolution.annotations.annotate(node, scope);
        scope
    }

    fn qualify(&self, name: Ident) -> String {
        let simple = self.interner.resolve(name);
        match &self.package {
            Some(package) => format!("{package}/{simple}"),
            None => simple.to_string(),
        }
    }

    fn unit(&mut self, unit: &CompilationUnit) -> Result<(), ResolveError> {
        let scope = self.table().create_scope(ScopeKind::CompilationUnit, None);
        self.resolution.annotations.annotate(unit.id, scope);

        for import in &unit.imports {
            let Some(simple) = import.simple_name() else {
                continue;
            };
            let qualified_name = binary_name(import.parts.iter().map(|&p| self.interner.resolve(p)));
            self.define(scope, simple, SymbolKind::Class { qualified_name })?;
        }

        let mut owners = Vec::with_capacity(unit.components.len());
        for component in &unit.components {
            let owner = match component {
                Component::Class(class) => {
                    let qualified_name = self.qualify(class.name);
                    Some(self.define(scope, class.name, SymbolKind::Class { qualified_name })?)
                }
                Component::Enumeration(enumeration) => {
                    let qualified_name = self.qualify(enumeration.name);
                    Some(self.define(
                        scope,
                        enumeration.name,
                        SymbolKind::Enumeration { qualified_name },
                    )?)
                }
                Component::Function(function) => Some(self.define_function(scope, function)?),
                Component::Variable(variable) => {
                    self.define_variables(scope, variable)?;
                    None
                }
                Component::Error(_) => None,
            };
            owners.push(owner);
        }

        for (component, owner) in unit.components.iter().zip(owners) {
            match (component, owner) {
                (Component::Class(class), Some(owner)) => self.class(scope, owner, class)?,
                (Component::Enumeration(enumeration), Some(owner)) => {
                    self.enumeration(scope, owner, enumeration)?
                }
                (Component::Function(function), Some(owner)) => {
                    self.function(scope, owner, function)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn class(&mut self, enclosing: ScopeId, owner: SymbolId, class: &ClassDecl) -> Result<(), ResolveError> {
        let scope = self.open_scope(class.id, ScopeKind::Class, enclosing, Some(owner));
        let mut functions = Vec::new();
        for member in &class.members {
            match member {
                ClassMember::Function(function) => {
                    let symbol = self.define_function(scope, function)?;
                    functions.push((symbol, function));
                }
                ClassMember::Variable(variable) => self.define_variables(scope, variable)?,
                ClassMember::Error(_) => {}
            }
        }
        for (symbol, function) in functions {
            self.function(scope, symbol, function)?;
        }
        Ok(())
    }

    fn enumeration(
        &mut self,
        enclosing: ScopeId,
        owner: SymbolId,
        enumeration: &EnumerationDecl,
    ) -> Result<(), ResolveError> {
        let scope = self.open_scope(enumeration.id, ScopeKind::Enumeration, enclosing, Some(owner));
        for (ordinal, &name) in enumeration.enumerates.iter().enumerate() {
            self.define(scope, name, SymbolKind::Enumerate { ordinal: ordinal as u32 })?;
        }
        Ok(())
    }

    fn define_function(&mut self, scope: ScopeId, function: &FunctionDecl) -> Result<SymbolId, ResolveError> {
        self.define(
            scope,
            function.name,
            SymbolKind::Function {
                fixed_parameters: function.parameters.len(),
                variadic: function.variadic.is_some(),
            },
        )
    }

    fn function(
        &mut self,
        enclosing: ScopeId,
        owner: SymbolId,
        function: &FunctionDecl,
    ) -> Result<(), ResolveError> {
        let scope = self.open_scope(function.id, ScopeKind::Function, enclosing, Some(owner));
        for &parameter in function.parameters.iter().chain(&function.variadic) {
            self.define(scope, parameter, SymbolKind::Variable)?;
        }
        self.block(scope, &function.body, None)
    }

    fn define_variables(&mut self, scope: ScopeId, variable: &VariableDecl) -> Result<(), ResolveError> {
        let kind = if variable.constant {
            SymbolKind::Constant
        } else {
            SymbolKind::Variable
        };
        for declarator in &variable.declarators {
            self.define(scope, declarator.name, kind.clone())?;
        }
        Ok(())
    }

    /// `binding` is a catch parameter defined inside the block's own scope.
    fn block(&mut self, enclosing: ScopeId, block: &Block, binding: Option<Ident>) -> Result<(), ResolveError> {
        let scope = self.open_scope(block.id, ScopeKind::Local, enclosing, None);
        if let Some(binding) = binding {
            self.define(scope, binding, SymbolKind::Variable)?;
        }
        for statement in &block.statements {
            self.statement(scope, statement)?;
        }
        Ok(())
    }

    fn statement(&mut self, scope: ScopeId, statement: &Stmt) -> Result<(), ResolveError> {
        match statement {
            Stmt::Variable(variable) => self.define_variables(scope, variable),
            Stmt::If(stmt) => {
                self.block(scope, &stmt.then_block, None)?;
                match &stmt.else_block {
                    Some(else_block) => self.block(scope, else_block, None),
                    None => Ok(()),
                }
            }
            Stmt::While(stmt) => self.block(scope, &stmt.body, None),
            Stmt::Try(stmt) => {
                self.block(scope, &stmt.body, None)?;
                for catch in &stmt.catches {
                    self.block(scope, &catch.body, Some(catch.binding))?;
                }
                Ok(())
            }
            Stmt::Block(block) => self.block(scope, block, None),
            Stmt::Expression(_) | Stmt::Return(_) | Stmt::Throw(_) | Stmt::Error(_) => Ok(()),
        }
    }
}
