//! Single-pass top-down type checker (spec.md §4.C)
//!
//! Walks the AST once, in source order, threading a [`SymbolTable`] and a
//! table of named types. Every error is accumulated as a diagnostic and
//! checking continues with [`Type::Error`] standing in for the broken
//! expression, so one mistake never cascades into a flood of follow-on
//! reports (spec.md §7).

use crate::ast::*;
use crate::error::{SemanticDiagnostic, SemanticErrorKind};
use crate::symtab::{SymbolKind, SymbolTable};
use crate::types::{Type, TypeInterner};
use anvil_core::SourceSpan;
use std::collections::HashMap;

/// Runs [`TypeChecker::check_program`] and reports the outcome.
pub struct TypeChecker {
    symbols: SymbolTable,
    /// Named struct/alias types, registered as declarations are seen.
    type_decls: HashMap<String, Type>,
    /// Return type of the function currently being checked, `None` at
    /// module scope (a bare `return` there is always an error).
    current_return: Option<Type>,
    /// Canonicalizes every `Type` this checker produces, per spec.md §3
    /// ("types are interned per-checker; the checker owns them").
    interner: TypeInterner,
    diagnostics: Vec<SemanticDiagnostic>,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            symbols: SymbolTable::new(),
            type_decls: HashMap::new(),
            current_return: None,
            interner: TypeInterner::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Number of distinct types this checker has interned so far.
    pub fn interned_type_count(&self) -> usize {
        self.interner.len()
    }

    /// Type-check an entire program. Returns `Ok(())` if no diagnostics were
    /// raised, otherwise every diagnostic collected along the way.
    pub fn check_program(mut self, program: &Program) -> Result<(), Vec<SemanticDiagnostic>> {
        if let Some(package) = &program.package {
            let _ = self.symbols.define(
                package.name.clone(),
                SymbolKind::Package,
                Type::Custom(package.name.clone()),
                true,
                package.span,
            );
        }

        for import in &program.imports {
            let _ = self.symbols.define(
                import.short_name(),
                SymbolKind::Import,
                Type::Custom(import.path.clone()),
                true,
                import.span,
            );
        }

        for decl in &program.decls {
            self.check_decl(decl);
        }

        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(self.diagnostics)
        }
    }

    fn error(&mut self, kind: SemanticErrorKind, span: SourceSpan, message: impl Into<String>) {
        self.diagnostics.push(SemanticDiagnostic::new(kind, span, message));
    }

    fn resolve_type_name(&mut self, type_name: &TypeName, span: SourceSpan) -> Type {
        let resolved = match type_name {
            TypeName::Void => Type::Void,
            TypeName::Bool => Type::Bool,
            TypeName::Int => Type::Int,
            TypeName::Float => Type::Float,
            TypeName::String => Type::String,
            TypeName::Array(elem) => Type::Array(Box::new(self.resolve_type_name(elem, span))),
            TypeName::Named(name) => match self.type_decls.get(name) {
                Some(ty) => ty.clone(),
                None => {
                    self.error(
                        SemanticErrorKind::UndefinedType,
                        span,
                        format!("undefined type '{name}'"),
                    );
                    Type::Error
                }
            },
            TypeName::Function(params, returns) => {
                let params = params.iter().map(|p| self.resolve_type_name(p, span)).collect();
                let returns = Box::new(self.resolve_type_name(returns, span));
                Type::Function { params, returns }
            }
        };
        self.interner.intern(resolved)
    }

    fn check_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Package(_) | Decl::Import(_) => {
                // handled up front in check_program
            }
            Decl::Function(func) => self.check_function(func),
            Decl::Variable(var) => self.check_variable(var),
            Decl::Constant(constant) => self.check_constant(constant),
            Decl::TypeAlias(alias) => {
                let resolved = self.resolve_type_name(&alias.target, alias.span);
                self.type_decls.insert(alias.name.clone(), resolved.clone());
                let _ = self.symbols.define(
                    alias.name.clone(),
                    SymbolKind::Type,
                    resolved,
                    true,
                    alias.span,
                );
            }
            Decl::Struct(s) => self.check_struct(s),
            Decl::Comptime(c) => {
                self.symbols.enter_scope();
                for stmt in &c.body.stmts {
                    self.check_stmt(stmt);
                }
                self.symbols.leave_scope();
            }
            Decl::Parallel(p) => self.check_parallel(p),
        }
    }

    fn check_struct(&mut self, s: &StructDecl) {
        let mut fields = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            let ty = self.resolve_type_name(&field.type_name, field.span);
            fields.push(crate::types::FieldInfo {
                name: field.name.clone(),
                ty,
            });
        }
        let ty = self.interner.intern(Type::Struct {
            name: s.name.clone(),
            fields,
        });
        self.type_decls.insert(s.name.clone(), ty.clone());
        let _ = self.symbols.define(s.name.clone(), SymbolKind::Type, ty, true, s.span);
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        let return_type = match &func.return_type {
            Some(tn) => self.resolve_type_name(tn, func.span),
            None => Type::Void,
        };
        let param_types: Vec<Type> = func
            .params
            .iter()
            .map(|p| self.resolve_type_name(&p.type_name, p.span))
            .collect();

        let fn_type = self.interner.intern(Type::Function {
            params: param_types.clone(),
            returns: Box::new(return_type.clone()),
        });

        if let Err(err) = self.symbols.define(
            func.name.clone(),
            SymbolKind::Function,
            fn_type,
            true,
            func.span,
        ) {
            self.error(
                SemanticErrorKind::Redefinition,
                func.span,
                err.to_string(),
            );
        }

        self.symbols.enter_scope();
        for (param, ty) in func.params.iter().zip(param_types.iter()) {
            if let Err(err) = self.symbols.define(
                param.name.clone(),
                SymbolKind::Variable,
                ty.clone(),
                true,
                param.span,
            ) {
                self.error(SemanticErrorKind::Redefinition, param.span, err.to_string());
            }
        }

        let previous_return = self.current_return.replace(return_type);
        for stmt in &func.body.stmts {
            self.check_stmt(stmt);
        }
        self.current_return = previous_return;
        self.symbols.leave_scope();
    }

    fn check_variable(&mut self, var: &VariableDecl) {
        let init_ty = var.init.as_ref().map(|e| self.check_expr(e));
        let declared_ty = var.type_name.as_ref().map(|tn| self.resolve_type_name(tn, var.span));

        let ty = match (declared_ty, &init_ty) {
            (Some(declared), Some(actual)) => {
                if !Type::compat(&declared, actual) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        var.span,
                        format!("cannot initialize '{}' of type {declared} with {actual}", var.name),
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(actual)) => actual.clone(),
            (None, None) => {
                self.error(
                    SemanticErrorKind::InvalidOperation,
                    var.span,
                    format!(
                        "variable '{}' needs a type annotation, an initializer, or both",
                        var.name
                    ),
                );
                Type::Error
            }
        };

        if let Err(err) = self.symbols.define(
            var.name.clone(),
            SymbolKind::Variable,
            ty,
            var.init.is_some(),
            var.span,
        ) {
            self.error(SemanticErrorKind::Redefinition, var.span, err.to_string());
        }
    }

    fn check_constant(&mut self, constant: &ConstantDecl) {
        let init_ty = self.check_expr(&constant.init);
        let ty = match &constant.type_name {
            Some(tn) => {
                let declared = self.resolve_type_name(tn, constant.span);
                if !Type::compat(&declared, &init_ty) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        constant.span,
                        format!(
                            "cannot initialize constant '{}' of type {declared} with {init_ty}",
                            constant.name
                        ),
                    );
                }
                declared
            }
            None => init_ty,
        };

        if let Err(err) = self.symbols.define(
            constant.name.clone(),
            SymbolKind::Constant,
            ty,
            true,
            constant.span,
        ) {
            self.error(SemanticErrorKind::Redefinition, constant.span, err.to_string());
        }
    }

    fn check_parallel(&mut self, p: &ParallelDecl) {
        let start_ty = self.check_expr(&p.start);
        if !Type::compat(&Type::Int, &start_ty) {
            self.error(
                SemanticErrorKind::TypeMismatch,
                p.start.span(),
                format!("parallel for bound must be int, found {start_ty}"),
            );
        }
        let end_ty = self.check_expr(&p.end);
        if !Type::compat(&Type::Int, &end_ty) {
            self.error(
                SemanticErrorKind::TypeMismatch,
                p.end.span(),
                format!("parallel for bound must be int, found {end_ty}"),
            );
        }
        if let Some(step) = &p.step {
            let step_ty = self.check_expr(step);
            if !Type::compat(&Type::Int, &step_ty) {
                self.error(
                    SemanticErrorKind::TypeMismatch,
                    step.span(),
                    format!("parallel for step must be int, found {step_ty}"),
                );
            }
        }

        self.symbols.enter_scope();
        if let Err(err) = self.symbols.define(
            p.loop_var.clone(),
            SymbolKind::Variable,
            Type::Int,
            true,
            p.span,
        ) {
            self.error(SemanticErrorKind::Redefinition, p.span, err.to_string());
        }
        for stmt in &p.body.stmts {
            self.check_stmt(stmt);
        }
        self.symbols.leave_scope();
    }

    /// Checks one statement, returning the type of its "value" for the
    /// purposes of a block's tail-statement type (only expression
    /// statements carry a meaningful one; everything else is `Void`).
    fn check_stmt(&mut self, stmt: &Stmt) -> Type {
        match stmt {
            Stmt::Expression(expr) => self.check_expr(expr),
            Stmt::Return { value, span } => {
                let actual = match value {
                    Some(expr) => self.check_expr(expr),
                    None => Type::Void,
                };
                match self.current_return.clone() {
                    Some(expected) => {
                        if !Type::compat(&expected, &actual) {
                            self.error(
                                SemanticErrorKind::TypeMismatch,
                                *span,
                                format!("function returns {expected}, found {actual}"),
                            );
                        }
                    }
                    None => self.error(
                        SemanticErrorKind::InvalidOperation,
                        *span,
                        "return statement outside of a function",
                    ),
                }
                Type::Void
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                span,
            } => {
                let cond_ty = self.check_expr(cond);
                if !Type::compat(&Type::Bool, &cond_ty) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        *span,
                        format!("if condition must be bool, found {cond_ty}"),
                    );
                }
                self.symbols.enter_scope();
                for s in &then_branch.stmts {
                    self.check_stmt(s);
                }
                self.symbols.leave_scope();
                if let Some(else_stmt) = else_branch {
                    self.check_stmt(else_stmt);
                }
                Type::Void
            }
            Stmt::For { cond, body, kind, span } => {
                let cond_ty = self.check_expr(cond);
                if !Type::compat(&Type::Bool, &cond_ty) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        *span,
                        format!("loop condition must be bool, found {cond_ty}"),
                    );
                }
                let _ = kind;
                self.symbols.enter_scope();
                for s in &body.stmts {
                    self.check_stmt(s);
                }
                self.symbols.leave_scope();
                Type::Void
            }
            Stmt::Block(block) => {
                self.symbols.enter_scope();
                let mut last = Type::Void;
                for s in &block.stmts {
                    last = self.check_stmt(s);
                }
                self.symbols.leave_scope();
                last
            }
            Stmt::Assignment { target, value, span } => {
                let value_ty = self.check_expr(value);
                match target {
                    Expr::Identifier { name, .. } => {
                        let existing = self.symbols.lookup(name).cloned();
                        match existing {
                            Some(symbol) => {
                                if !Type::compat(&symbol.ty, &value_ty) {
                                    self.error(
                                        SemanticErrorKind::TypeMismatch,
                                        *span,
                                        format!(
                                            "cannot assign {value_ty} to '{name}' of type {}",
                                            symbol.ty
                                        ),
                                    );
                                }
                                if symbol.kind == SymbolKind::Constant {
                                    self.error(
                                        SemanticErrorKind::InvalidAssignment,
                                        *span,
                                        format!("cannot assign to constant '{name}'"),
                                    );
                                }
                                self.symbols.mark_initialized(name);
                            }
                            None => self.error(
                                SemanticErrorKind::UndefinedVariable,
                                *span,
                                format!("undefined variable '{name}'"),
                            ),
                        }
                    }
                    Expr::Index { .. } | Expr::Member { .. } => {
                        let _ = self.check_expr(target);
                    }
                    _ => self.error(
                        SemanticErrorKind::InvalidAssignment,
                        *span,
                        "left-hand side of assignment is not assignable",
                    ),
                }
                Type::Void
            }
            Stmt::Local(decl) => {
                self.check_decl(decl);
                Type::Void
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::IntLiteral { .. } => self.interner.intern(Type::Int),
            Expr::FloatLiteral { .. } => self.interner.intern(Type::Float),
            Expr::StringLiteral { .. } => self.interner.intern(Type::String),
            Expr::BoolLiteral { .. } => self.interner.intern(Type::Bool),
            Expr::Identifier { name, span } => match self.symbols.lookup(name) {
                Some(symbol) => {
                    if symbol.kind == SymbolKind::Variable && !symbol.is_initialized {
                        self.error(
                            SemanticErrorKind::UseBeforeInit,
                            *span,
                            format!("'{name}' used before initialization"),
                        );
                    }
                    symbol.ty.clone()
                }
                None => {
                    self.error(
                        SemanticErrorKind::UndefinedVariable,
                        *span,
                        format!("undefined name '{name}'"),
                    );
                    Type::Error
                }
            },
            Expr::Prefix { op, operand, span } => {
                let ty = self.check_expr(operand);
                match op {
                    PrefixOp::Not => {
                        if !Type::compat(&Type::Bool, &ty) {
                            self.error(
                                SemanticErrorKind::InvalidOperation,
                                *span,
                                format!("'!' requires bool, found {ty}"),
                            );
                            return Type::Error;
                        }
                        Type::Bool
                    }
                    PrefixOp::Neg => {
                        if !ty.is_numeric() && !matches!(ty, Type::Error) {
                            self.error(
                                SemanticErrorKind::InvalidOperation,
                                *span,
                                format!("unary '-' requires a numeric type, found {ty}"),
                            );
                            return Type::Error;
                        }
                        ty
                    }
                }
            }
            Expr::Infix { op, left, right, span } => self.check_infix(*op, left, right, *span),
            Expr::Call { callee, args, span } => self.check_call(callee, args, *span),
            Expr::Index { base, index, span } => {
                let base_ty = self.check_expr(base);
                let index_ty = self.check_expr(index);
                if !Type::compat(&Type::Int, &index_ty) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        *span,
                        format!("array index must be int, found {index_ty}"),
                    );
                }
                match base_ty {
                    Type::Array(elem) => *elem,
                    Type::Error => Type::Error,
                    other => {
                        self.error(
                            SemanticErrorKind::InvalidOperation,
                            *span,
                            format!("cannot index into {other}"),
                        );
                        Type::Error
                    }
                }
            }
            Expr::Member { base, field, span } => {
                let base_ty = self.check_expr(base);
                match base_ty {
                    Type::Struct { fields, .. } => fields
                        .iter()
                        .find(|f| &f.name == field)
                        .map(|f| f.ty.clone())
                        .unwrap_or_else(|| {
                            self.error(
                                SemanticErrorKind::UndefinedVariable,
                                *span,
                                format!("no field '{field}' on struct"),
                            );
                            Type::Error
                        }),
                    Type::Error => Type::Error,
                    other => {
                        self.error(
                            SemanticErrorKind::InvalidOperation,
                            *span,
                            format!("cannot access field '{field}' on {other}"),
                        );
                        Type::Error
                    }
                }
            }
        }
    }

    fn check_infix(&mut self, op: InfixOp, left: &Expr, right: &Expr, span: SourceSpan) -> Type {
        let lhs = self.check_expr(left);
        let rhs = self.check_expr(right);
        if matches!(lhs, Type::Error) || matches!(rhs, Type::Error) {
            return Type::Error;
        }

        match op {
            InfixOp::Add if lhs == Type::String && rhs == Type::String => Type::String,
            InfixOp::Add | InfixOp::Sub | InfixOp::Mul | InfixOp::Div => {
                if !lhs.is_numeric() || !rhs.is_numeric() {
                    self.error(
                        SemanticErrorKind::InvalidOperation,
                        span,
                        format!("arithmetic requires numeric operands, found {lhs} and {rhs}"),
                    );
                    return Type::Error;
                }
                if lhs == Type::Float || rhs == Type::Float {
                    Type::Float
                } else {
                    Type::Int
                }
            }
            InfixOp::Eq | InfixOp::Ne => {
                if lhs != rhs {
                    self.error(
                        SemanticErrorKind::InvalidOperation,
                        span,
                        format!("cannot compare {lhs} with {rhs}"),
                    );
                    return Type::Error;
                }
                Type::Bool
            }
            InfixOp::Lt | InfixOp::Le | InfixOp::Gt | InfixOp::Ge => {
                let ordered = (lhs.is_numeric() && rhs.is_numeric()) || (lhs == Type::String && rhs == Type::String);
                if !ordered {
                    self.error(
                        SemanticErrorKind::InvalidOperation,
                        span,
                        format!("cannot order {lhs} and {rhs}"),
                    );
                    return Type::Error;
                }
                Type::Bool
            }
            InfixOp::And | InfixOp::Or => {
                if lhs != Type::Bool || rhs != Type::Bool {
                    self.error(
                        SemanticErrorKind::InvalidOperation,
                        span,
                        format!("logical operator requires bool operands, found {lhs} and {rhs}"),
                    );
                    return Type::Error;
                }
                Type::Bool
            }
        }
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: SourceSpan) -> Type {
        let callee_ty = self.check_expr(callee);
        let arg_types: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();

        match callee_ty {
            Type::Function { params, returns } => {
                if params.len() != arg_types.len() {
                    self.error(
                        SemanticErrorKind::InvalidFunctionCall,
                        span,
                        format!("expected {} argument(s), found {}", params.len(), arg_types.len()),
                    );
                    return Type::Error;
                }
                for (i, (expected, actual)) in params.iter().zip(arg_types.iter()).enumerate() {
                    if !Type::compat(expected, actual) {
                        self.error(
                            SemanticErrorKind::TypeMismatch,
                            span,
                            format!("argument {} expects {expected}, found {actual}", i + 1),
                        );
                    }
                }
                *returns
            }
            Type::Error => Type::Error,
            other => {
                self.error(
                    SemanticErrorKind::InvalidFunctionCall,
                    span,
                    format!("cannot call a value of type {other}"),
                );
                Type::Error
            }
        }
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::Position;

    fn span() -> SourceSpan {
        SourceSpan::point(Position::new(1, 1))
    }

    fn ident(name: &str) -> Expr {
        Expr::Identifier {
            name: name.to_string(),
            span: span(),
        }
    }

    #[test]
    fn well_typed_function_checks_clean() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![Decl::Function(FunctionDecl {
                name: "add".to_string(),
                params: vec![
                    Param {
                        name: "a".to_string(),
                        type_name: TypeName::Int,
                        span: span(),
                    },
                    Param {
                        name: "b".to_string(),
                        type_name: TypeName::Int,
                        span: span(),
                    },
                ],
                return_type: Some(TypeName::Int),
                body: Block {
                    stmts: vec![Stmt::Return {
                        value: Some(Expr::Infix {
                            op: InfixOp::Add,
                            left: Box::new(ident("a")),
                            right: Box::new(ident("b")),
                            span: span(),
                        }),
                        span: span(),
                    }],
                    span: span(),
                },
                span: span(),
            })],
        };

        assert!(TypeChecker::new().check_program(&program).is_ok());
    }

    #[test]
    fn mismatched_return_type_is_reported() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![Decl::Function(FunctionDecl {
                name: "f".to_string(),
                params: vec![],
                return_type: Some(TypeName::Int),
                body: Block {
                    stmts: vec![Stmt::Return {
                        value: Some(Expr::StringLiteral {
                            value: "oops".to_string(),
                            span: span(),
                        }),
                        span: span(),
                    }],
                    span: span(),
                },
                span: span(),
            })],
        };

        let errs = TypeChecker::new().check_program(&program).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, SemanticErrorKind::TypeMismatch);
    }

    #[test]
    fn undefined_variable_is_reported_once() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![Decl::Function(FunctionDecl {
                name: "f".to_string(),
                params: vec![],
                return_type: None,
                body: Block {
                    stmts: vec![Stmt::Assignment {
                        target: ident("y"),
                        value: Expr::IntLiteral { value: 1, span: span() },
                        span: span(),
                    }],
                    span: span(),
                },
                span: span(),
            })],
        };

        let errs = TypeChecker::new().check_program(&program).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, SemanticErrorKind::UndefinedVariable);
    }

    #[test]
    fn variable_with_neither_type_nor_initializer_is_reported() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![Decl::Variable(VariableDecl {
                name: "x".to_string(),
                type_name: None,
                init: None,
                span: span(),
            })],
        };

        let errs = TypeChecker::new().check_program(&program).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, SemanticErrorKind::InvalidOperation);
    }

    #[test]
    fn assigning_to_a_constant_is_invalid() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![
                Decl::Constant(ConstantDecl {
                    name: "PI".to_string(),
                    type_name: None,
                    init: Expr::FloatLiteral { value: 3.14, span: span() },
                    span: span(),
                }),
                Decl::Function(FunctionDecl {
                    name: "f".to_string(),
                    params: vec![],
                    return_type: None,
                    body: Block {
                        stmts: vec![Stmt::Assignment {
                            target: ident("PI"),
                            value: Expr::FloatLiteral { value: 6.28, span: span() },
                            span: span(),
                        }],
                        span: span(),
                    },
                    span: span(),
                }),
            ],
        };

        let errs = TypeChecker::new().check_program(&program).unwrap_err();
        assert!(errs.iter().any(|e| e.kind == SemanticErrorKind::InvalidAssignment));
    }

    #[test]
    fn return_outside_function_is_invalid() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![Decl::Comptime(ComptimeDecl {
                body: Block {
                    stmts: vec![Stmt::Return {
                        value: None,
                        span: span(),
                    }],
                    span: span(),
                },
                span: span(),
            })],
        };

        let errs = TypeChecker::new().check_program(&program).unwrap_err();
        assert_eq!(errs[0].kind, SemanticErrorKind::InvalidOperation);
    }

    #[test]
    fn string_concatenation_with_plus_is_allowed() {
        let expr = Expr::Infix {
            op: InfixOp::Add,
            left: Box::new(Expr::StringLiteral {
                value: "a".to_string(),
                span: span(),
            }),
            right: Box::new(Expr::StringLiteral {
                value: "b".to_string(),
                span: span(),
            }),
            span: span(),
        };
        let mut checker = TypeChecker::new();
        assert_eq!(checker.check_expr(&expr), Type::String);
    }

    #[test]
    fn mixed_int_float_arithmetic_widens_to_float() {
        let expr = Expr::Infix {
            op: InfixOp::Mul,
            left: Box::new(Expr::IntLiteral { value: 2, span: span() }),
            right: Box::new(Expr::FloatLiteral { value: 1.5, span: span() }),
            span: span(),
        };
        let mut checker = TypeChecker::new();
        assert_eq!(checker.check_expr(&expr), Type::Float);
    }

    #[test]
    fn repeated_primitive_types_intern_to_a_single_entry() {
        let mut checker = TypeChecker::new();
        checker.check_expr(&Expr::IntLiteral { value: 1, span: span() });
        checker.check_expr(&Expr::IntLiteral { value: 2, span: span() });
        checker.check_expr(&Expr::FloatLiteral { value: 1.0, span: span() });
        // Two `int` literals share one interned entry; `float` adds a second.
        assert_eq!(checker.interned_type_count(), 2);
    }

    #[test]
    fn calling_a_non_function_is_reported() {
        let program = Program {
            package: None,
            imports: vec![],
            decls: vec![
                Decl::Constant(ConstantDecl {
                    name: "x".to_string(),
                    type_name: None,
                    init: Expr::IntLiteral { value: 1, span: span() },
                    span: span(),
                }),
                Decl::Function(FunctionDecl {
                    name: "f".to_string(),
                    params: vec![],
                    return_type: None,
                    body: Block {
                        stmts: vec![Stmt::Expression(Expr::Call {
                            callee: Box::new(ident("x")),
                            args: vec![],
                            span: span(),
                        })],
                        span: span(),
                    },
                    span: span(),
                }),
            ],
        };

        let errs = TypeChecker::new().check_program(&program).unwrap_err();
        assert!(errs.iter().any(|e| e.kind == SemanticErrorKind::InvalidFunctionCall));
    }
}
