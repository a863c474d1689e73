//! Statements and control flow.

use tracing::error;
use zen_bytecode::{ExceptionHandlerSite, Opcode};
use zen_core::Ident;

use crate::ast::{Block, CatchClause, IfStmt, QualifiedName, Stmt, TryStmt, VariableDecl, WhileStmt};
use crate::emit::{ChannelError, EmitError};
use crate::symbols::{SymbolKind, binary_name};

use super::{Generator, JUMP};

impl Generator<'_> {
    pub(super) fn block(&mut self, block: &Block) -> Result<(), EmitError> {
        self.block_with_binding(block, None)
    }

    /// A block whose first action stores the value on top of the stack into
    /// `binding`, a variable of the block's own scope.
    fn block_with_binding(&mut self, block: &Block, binding: Option<Ident>) -> Result<(), EmitError> {
        let scope = self.enter_scope(block.id)?;
        if let Some(binding) = binding {
            let symbol = self
                .table
                .resolve(scope, binding)
                .ok_or_else(|| self.unresolved(binding))?;
            let slot = self.local_slot(symbol)?;
            self.emit_local(Opcode::StoreA, slot)?;
        }
        for statement in &block.statements {
            self.statement(statement)?;
        }
        self.exit_scope()
    }

    fn statement(&mut self, statement: &Stmt) -> Result<(), EmitError> {
        match statement {
            Stmt::Variable(variable) => self.local_variables(variable),
            Stmt::Expression(expr) => {
                self.expression(expr)?;
                self.emit(Opcode::Pop)
            }
            Stmt::If(stmt) => self.if_statement(stmt),
            Stmt::While(stmt) => self.while_statement(stmt),
            Stmt::Return(Some(value)) => {
                self.expression(value)?;
                self.emit(Opcode::ReturnA)
            }
            Stmt::Return(None) => self.emit(Opcode::Return),
            Stmt::Throw(value) => {
                self.expression(value)?;
                self.emit(Opcode::Throw)
            }
            Stmt::Try(stmt) => self.try_statement(stmt),
            Stmt::Block(block) => self.block(block),
            Stmt::Error(node) => Err(self.erroneous(node)),
        }
    }

    /// Locals never become fields; uninitialized ones start as null.
    fn local_variables(&mut self, variable: &VariableDecl) -> Result<(), EmitError> {
        let scope = self.current_scope()?;
        for declarator in &variable.declarators {
            let symbol = self
                .table
                .resolve(scope, declarator.name)
                .ok_or_else(|| self.unresolved(declarator.name))?;
            let slot = self.local_slot(symbol)?;
            match &declarator.initializer {
                Some(value) => self.expression(value)?,
                None => self.emit(Opcode::PushNull)?,
            }
            self.emit_local(Opcode::StoreA, slot)?;
        }
        Ok(())
    }

    /// ```text
    ///     <condition>
    ///     jump_eq0_i else
    ///     <then>
    ///     jump end        ; only with an else block
    /// else:
    ///     <else>
    /// end:
    /// ```
    fn if_statement(&mut self, stmt: &IfStmt) -> Result<(), EmitError> {
        self.expression(&stmt.condition)?;
        self.track(1, 0)?;
        let then = self.in_channel(|g| g.block(&stmt.then_block))?;
        match &stmt.else_block {
            None => {
                self.write_jump(Opcode::JumpEq0I, (JUMP + then.len()) as isize)?;
                self.append(then)
            }
            Some(else_block) => {
                let otherwise = self.in_channel(|g| g.block(else_block))?;
                self.write_jump(Opcode::JumpEq0I, (JUMP + then.len() + JUMP) as isize)?;
                self.append(then)?;
                self.write_jump(Opcode::Jump, (JUMP + otherwise.len()) as isize)?;
                self.append(otherwise)
            }
        }
    }

    /// Body first, test last, so each iteration runs one conditional jump:
    ///
    /// ```text
    ///     jump test
    /// body:
    ///     <body>
    /// test:
    ///     <condition>
    ///     jump_ne0_i body
    /// ```
    ///
    /// The condition is generated before the body and the two channels are
    /// swapped into layout order.
    fn while_statement(&mut self, stmt: &WhileStmt) -> Result<(), EmitError> {
        let condition = self.builder.push_channel();
        self.expression(&stmt.condition)?;
        self.track(1, 0)?;

        let body = self.builder.push_channel();
        self.block(&stmt.body)?;
        let body_len = self.builder.channel_len();

        self.builder.swap_channels(condition, body)?;
        let back = self.builder.channel_len() + body_len;
        self.write_jump(Opcode::JumpNe0I, -(back as isize))?;
        self.builder.merge_channel()?;
        let looped = self.builder.pop_channel()?;

        self.write_jump(Opcode::Jump, (JUMP + body_len) as isize)?;
        self.append(looped)
    }

    /// ```text
    /// start:
    ///     <body>
    /// end:
    ///     jump done
    ///     store_a e1 ; <handler 1> ; jump done
    ///     ...
    ///     store_a eN ; <handler N>
    /// done:
    /// ```
    ///
    /// Every handler covers `[start, end)`. Sites are recorded in the try
    /// channel after any nested ones, so inner handlers are found first.
    fn try_statement(&mut self, stmt: &TryStmt) -> Result<(), EmitError> {
        let depth = self.stack_depth()?;
        let body = self.in_channel(|g| g.block(&stmt.body))?;

        let mut handlers = Vec::with_capacity(stmt.catches.len());
        for catch in &stmt.catches {
            let catch_type = self.catch_type(&catch.class)?;
            // The thrown value.
            self.set_stack_depth(depth + 1)?;
            let code = self.in_channel(|g| g.catch_body(catch))?;
            handlers.push((catch_type, code));
        }
        self.set_stack_depth(depth)?;

        let count = handlers.len();
        let sizes: Vec<usize> = handlers
            .iter()
            .enumerate()
            .map(|(i, (_, code))| code.len() + if i + 1 < count { JUMP } else { 0 })
            .collect();
        let tail = |from: usize| -> usize { sizes[from..].iter().sum() };

        self.builder.push_channel();
        self.append(body)?;
        let end_pc = self.builder.channel_len();
        if count > 0 {
            self.write_jump(Opcode::Jump, (JUMP + tail(0)) as isize)?;
        }

        let mut sites = Vec::with_capacity(count);
        for (i, (catch_type, code)) in handlers.into_iter().enumerate() {
            let handler_pc = self.builder.channel_len();
            self.append(code)?;
            if i + 1 < count {
                self.write_jump(Opcode::Jump, (JUMP + tail(i + 1)) as isize)?;
            }
            sites.push(ExceptionHandlerSite {
                start_pc: 0,
                end_pc: address(end_pc)?,
                handler_pc: address(handler_pc)?,
                catch_type,
            });
        }
        for site in sites {
            self.builder.record_handler(site);
        }
        Ok(self.builder.merge_channel()?)
    }

    fn catch_body(&mut self, catch: &CatchClause) -> Result<(), EmitError> {
        self.block_with_binding(&catch.body, Some(catch.binding))
    }

    /// Pool index of the caught class.
    fn catch_type(&mut self, class: &QualifiedName) -> Result<u16, EmitError> {
        let scope = self.current_scope()?;
        let resolved = self
            .table
            .resolve_qualified_symbol(scope, class, self.interner)
            .map(|symbol| &self.table.symbol(symbol).kind);
        let Some(SymbolKind::Class { qualified_name }) = resolved else {
            let name = binary_name(class.parts.iter().map(|&p| self.text(p)));
            error!(%name, "caught type is not a class; semantic analysis must have failed");
            return Err(EmitError::NotAClass { name });
        };
        let qualified_name = qualified_name.clone();
        self.pool.intern_class(&qualified_name)
    }
}

fn address(pc: usize) -> Result<u16, EmitError> {
    u16::try_from(pc).map_err(|_| ChannelError::CodeTooLarge(pc).into())
}
