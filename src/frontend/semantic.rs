//! Semantic Analysis for Offside
//!
//! Performs:
//! - Symbol table management (scope stack, declarations)
//! - Best-effort type inference and checking
//! - Deduplicated diagnostic accumulation
//!
//! The AST is read-only input: types are recomputed by `infer_expr` whenever
//! needed and never written back onto nodes. Inference is deliberately
//! permissive: anything unresolved becomes `unknown`, and `unknown` never
//! triggers a mismatch.
#![allow(dead_code)]

use std::collections::HashMap;

use log::debug;

use crate::frontend::ast::*;
use crate::types::Ty;
use crate::utils::{Diagnostic, Diagnostics};

// ==================== Symbol Table ====================

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
    pub mutable: bool,
    pub line: usize,
    pub is_function: bool,
    /// Ordered parameters; a synthetic trailing `return` entry carries the
    /// inferred return type
    pub params: Option<Vec<ParamInfo>>,
}

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: String,
    pub ty: Ty,
}

/// One scope frame: a label (`global`, a function or class name, or a
/// synthetic `for_<line>`) plus its symbols
#[derive(Debug)]
struct Scope {
    label: String,
    symbols: HashMap<String, Symbol>,
}

/// Symbol table as an explicit scope stack; lookup walks outward from the
/// innermost scope. Popping a scope drops everything declared in it.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                label: "global".to_string(),
                symbols: HashMap::new(),
            }],
        }
    }

    fn push(&mut self, label: String) {
        debug!("enter scope {label}");
        self.scopes.push(Scope { label, symbols: HashMap::new() });
    }

    fn pop(&mut self) {
        if self.scopes.len() > 1 {
            let scope = self.scopes.pop().unwrap();
            debug!("leave scope {}", scope.label);
        }
    }

    fn define(&mut self, symbol: Symbol) {
        let scope = self.scopes.last_mut().unwrap();
        scope.symbols.insert(symbol.name.clone(), symbol);
    }

    /// Define under the global scope; used for `ClassName.member` entries
    /// that must outlive the class scope
    fn define_global(&mut self, symbol: Symbol) {
        self.scopes[0].symbols.insert(symbol.name.clone(), symbol);
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(name))
    }

    /// Look up only in the innermost scope (redeclaration check)
    fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().unwrap().symbols.get(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer
pub struct SemanticAnalyzer {
    table: SymbolTable,
    diagnostics: Diagnostics,
    /// Names of the functions currently being visited, innermost last
    function_stack: Vec<String>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            function_stack: Vec::new(),
        }
    }

    /// Analyze a program, returning the ordered, deduplicated diagnostics.
    /// An empty list means it is safe to hand the tree to code generation.
    pub fn analyze(&mut self, program: &Program) -> Vec<Diagnostic> {
        for stmt in &program.stmts {
            self.visit_stmt(stmt);
        }
        self.diagnostics.take()
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDecl(func) => self.visit_function(func),
            Stmt::VariableDecl(var) => self.visit_variable(var),
            Stmt::ClassDecl(class) => self.visit_class(class),
            Stmt::If(stmt) => self.visit_if(stmt),
            Stmt::While(stmt) => self.visit_while(stmt),
            Stmt::ForTo(stmt) => self.visit_for_to(stmt),
            Stmt::ForIn(stmt) => self.visit_for_in(stmt),
            Stmt::Print(stmt) => self.visit_print(stmt),
            Stmt::Return(stmt) => self.visit_return(stmt),
            Stmt::Call(call) => self.check_call(call),
            Stmt::Assignment(assign) => self.visit_assignment(assign),
            Stmt::Expr(expr) => {
                self.infer_expr(expr);
            }
        }
    }

    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_function(&mut self, func: &FunctionDecl) {
        if self.table.lookup(&func.name).is_some() {
            self.diagnostics
                .report(func.line, format!("redeclaration of function '{}'", func.name));
        }

        // parameters default to int unless annotated; the trailing `return`
        // slot starts unknown and is fixed by the first return visited
        let mut params: Vec<ParamInfo> = func
            .params
            .iter()
            .map(|p| ParamInfo {
                name: p.name.clone(),
                ty: p.ty.as_deref().map(Ty::from_annotation).unwrap_or(Ty::Int),
            })
            .collect();
        params.push(ParamInfo { name: "return".to_string(), ty: Ty::Unknown });

        self.table.define(Symbol {
            name: func.name.clone(),
            ty: Ty::Function,
            mutable: false,
            line: func.line,
            is_function: true,
            params: Some(params.clone()),
        });

        self.table.push(func.name.clone());
        for param in params.iter().take(params.len() - 1) {
            self.table.define(Symbol {
                name: param.name.clone(),
                ty: param.ty.clone(),
                mutable: false,
                line: func.line,
                is_function: false,
                params: None,
            });
        }
        self.function_stack.push(func.name.clone());
        self.visit_block(&func.body);
        self.function_stack.pop();
        self.table.pop();
    }

    fn visit_variable(&mut self, var: &VariableDecl) {
        if self.table.lookup_local(&var.name).is_some() {
            self.diagnostics
                .report(var.line, format!("redeclaration of variable '{}'", var.name));
            return;
        }

        let mut ty = match &var.init {
            Some(expr) => self.infer_expr(expr),
            None => Ty::Unknown,
        };
        if let Some(annotation) = &var.ty {
            ty = Ty::from_annotation(annotation);
        }
        debug!("declare '{}' : {} (mutable: {})", var.name, ty, var.mutable);

        self.table.define(Symbol {
            name: var.name.clone(),
            ty,
            mutable: var.mutable,
            line: var.line,
            is_function: false,
            params: None,
        });
    }

    fn visit_assignment(&mut self, assign: &Assignment) {
        let Some(symbol) = self.table.lookup(&assign.target) else {
            self.diagnostics.report(
                assign.line,
                format!("use of undeclared variable '{}'", assign.target),
            );
            return;
        };
        let target_ty = symbol.ty.clone();
        if !symbol.mutable {
            self.diagnostics.report(
                assign.line,
                format!("cannot assign to immutable variable '{}'", assign.target),
            );
        }

        if let Some(value) = &assign.value {
            let value_ty = self.infer_expr(value);
            if target_ty.conflicts_with(&value_ty) {
                self.diagnostics.report(
                    assign.line,
                    format!("type mismatch: expected '{target_ty}', got '{value_ty}'"),
                );
            }
        }
    }

    fn check_call(&mut self, call: &CallExpr) {
        let Some(symbol) = self.table.lookup(&call.callee) else {
            self.diagnostics.report(
                call.line,
                format!("call to undeclared function '{}'", call.callee),
            );
            return;
        };
        if !symbol.is_function {
            self.diagnostics.report(
                call.line,
                format!("call to undeclared function '{}'", call.callee),
            );
            return;
        }

        let params = symbol.params.clone().unwrap_or_default();
        // the synthetic return slot does not count toward the arity
        let declared = params.len().saturating_sub(1);
        if call.args.len() != declared {
            self.diagnostics.report(
                call.line,
                format!(
                    "argument count mismatch: expected {declared}, got {}",
                    call.args.len()
                ),
            );
            return;
        }
        for (i, arg) in call.args.iter().enumerate() {
            let arg_ty = self.infer_expr(arg);
            let param_ty = &params[i].ty;
            if param_ty.conflicts_with(&arg_ty) {
                self.diagnostics.report(
                    arg.line(),
                    format!(
                        "argument {} type mismatch: expected '{param_ty}', got '{arg_ty}'",
                        i + 1
                    ),
                );
            }
        }
    }

    fn visit_if(&mut self, stmt: &IfStmt) {
        let cond_ty = self.infer_condition(&stmt.cond);
        if cond_ty.conflicts_with(&Ty::Bool) {
            self.diagnostics.report(
                stmt.line,
                format!("if condition must be 'bool', got '{cond_ty}'"),
            );
        }
        self.visit_block(&stmt.then_block);
        for elif in &stmt.elifs {
            let cond_ty = self.infer_condition(&elif.cond);
            if cond_ty.conflicts_with(&Ty::Bool) {
                self.diagnostics.report(
                    elif.line,
                    format!("if condition must be 'bool', got '{cond_ty}'"),
                );
            }
            self.visit_block(&elif.body);
        }
        if let Some(block) = &stmt.else_block {
            self.visit_block(block);
        }
    }

    fn visit_while(&mut self, stmt: &WhileStmt) {
        let cond_ty = self.infer_condition(&stmt.cond);
        if cond_ty.conflicts_with(&Ty::Bool) {
            self.diagnostics.report(
                stmt.line,
                format!("while condition must be 'bool', got '{cond_ty}'"),
            );
        }
        self.visit_block(&stmt.body);
    }

    fn visit_for_to(&mut self, stmt: &ForToStmt) {
        self.table.push(format!("for_{}", stmt.line));
        self.table.define(Symbol {
            name: stmt.var_name.clone(),
            ty: Ty::Int,
            mutable: true,
            line: stmt.line,
            is_function: false,
            params: None,
        });
        self.infer_expr(&stmt.start);
        self.infer_expr(&stmt.end);
        self.visit_block(&stmt.body);
        self.table.pop();
    }

    fn visit_for_in(&mut self, stmt: &ForInStmt) {
        let collection_ty = self.infer_expr(&stmt.iterable);
        if !collection_ty.is_iterable() {
            self.diagnostics.report(
                stmt.line,
                format!("for..in expects a collection, got '{collection_ty}'"),
            );
        }

        let iter_ty = match &collection_ty {
            Ty::Range => Ty::Int,
            other => other.element().cloned().unwrap_or(Ty::Unknown),
        };

        self.table.push(format!("for_{}", stmt.line));
        self.table.define(Symbol {
            name: stmt.var_name.clone(),
            ty: iter_ty,
            mutable: true,
            line: stmt.line,
            is_function: false,
            params: None,
        });
        self.visit_block(&stmt.body);
        self.table.pop();
    }

    fn visit_class(&mut self, class: &ClassDecl) {
        self.table.define(Symbol {
            name: class.name.clone(),
            ty: Ty::Class,
            mutable: false,
            line: class.line,
            is_function: false,
            params: None,
        });

        // constructor parameters become ClassName.param members; they must
        // survive the class scope so property access can resolve them later
        for param in &class.ctor_params {
            let ty = param.ty.as_deref().map(Ty::from_annotation).unwrap_or(Ty::Unknown);
            self.table.define_global(Symbol {
                name: format!("{}.{}", class.name, param.name),
                ty,
                mutable: false,
                line: class.line,
                is_function: false,
                params: None,
            });
        }

        self.table.push(class.name.clone());
        // members may refer to constructor parameters by their bare name
        for param in &class.ctor_params {
            let ty = param.ty.as_deref().map(Ty::from_annotation).unwrap_or(Ty::Unknown);
            self.table.define(Symbol {
                name: param.name.clone(),
                ty,
                mutable: false,
                line: class.line,
                is_function: false,
                params: None,
            });
        }
        for member in &class.members {
            match &member.kind {
                MemberKind::Method { params, body } => {
                    self.table.push(format!("{}.{}", class.name, member.name));
                    for param in params {
                        let ty = param.ty.as_deref().map(Ty::from_annotation).unwrap_or(Ty::Int);
                        self.table.define(Symbol {
                            name: param.name.clone(),
                            ty,
                            mutable: false,
                            line: param.line,
                            is_function: false,
                            params: None,
                        });
                    }
                    self.visit_block(body);
                    self.table.pop();
                }
                MemberKind::Field { value } => {
                    if let Some(expr) = value {
                        self.infer_expr(expr);
                    }
                }
            }
        }
        self.table.pop();
    }

    fn visit_print(&mut self, stmt: &PrintStmt) {
        for arg in &stmt.args {
            self.infer_expr(arg);
        }
    }

    fn visit_return(&mut self, stmt: &ReturnStmt) {
        let Some(expr) = &stmt.value else { return };
        let return_ty = self.infer_expr(expr);

        let Some(function) = self.function_stack.last().cloned() else { return };
        let Some(symbol) = self.table.lookup_mut(&function) else { return };
        let Some(params) = &mut symbol.params else { return };
        let Some(slot) = params.iter_mut().rev().find(|p| p.name == "return") else {
            return;
        };

        if slot.ty.is_unknown() {
            // first return fixes a still-undetermined return type
            slot.ty = return_ty;
        } else if slot.ty.conflicts_with(&return_ty) {
            let expected = slot.ty.clone();
            self.diagnostics.report(
                stmt.line,
                format!("return type mismatch: expected '{expected}', got '{return_ty}'"),
            );
        }
    }

    // ==================== Type Inference ====================

    fn infer_condition(&mut self, cond: &Condition) -> Ty {
        match &cond.cmp {
            Some((CmpOp::Mod, right)) => {
                let left_ty = self.infer_expr(&cond.left);
                let right_ty = self.infer_expr(right);
                if left_ty == Ty::Float || right_ty == Ty::Float {
                    Ty::Float
                } else {
                    Ty::Int
                }
            }
            Some((_, right)) => {
                // comparison: operands are visited for their own diagnostics
                self.infer_expr(&cond.left);
                self.infer_expr(right);
                Ty::Bool
            }
            None => self.infer_expr(&cond.left),
        }
    }

    /// Infer an expression's type. Pure with respect to the AST, but reports
    /// diagnostics (undeclared names, index violations, operand mismatches)
    /// as a side channel.
    fn infer_expr(&mut self, expr: &Expr) -> Ty {
        match expr {
            Expr::Number { .. } => Ty::Int,
            Expr::Float { .. } => Ty::Float,
            Expr::Str { .. } => Ty::Str,
            Expr::Char { .. } => Ty::Char,
            Expr::Bool { .. } => Ty::Bool,
            Expr::Range { .. } => Ty::Range,

            Expr::Ident { name, line } => match self.table.lookup(name) {
                Some(symbol) => symbol.ty.clone(),
                None => {
                    self.diagnostics
                        .report(*line, format!("use of undeclared variable '{name}'"));
                    Ty::Unknown
                }
            },

            Expr::Binary { op, left, right, line } => self.infer_binary(*op, left, right, *line),

            Expr::Call(call) => {
                self.check_call(call);
                // return types are not propagated through calls
                Ty::Unknown
            }

            Expr::ArrayIndex { target, index, line } => self.infer_index(target, index, *line),

            Expr::PropertyAccess { object, property, line } => {
                let object_ty = self.infer_expr(&Expr::Ident {
                    name: object.clone(),
                    line: *line,
                });
                let qualified = format!("{object_ty}.{property}");
                match self.table.lookup(&qualified) {
                    Some(symbol) => symbol.ty.clone(),
                    None => Ty::Unknown,
                }
            }

            Expr::List { elements, .. } => {
                let tys: Vec<Ty> = elements.iter().map(|e| self.infer_expr(e)).collect();
                Ty::List(Box::new(Ty::unify(tys)))
            }
            Expr::Array { elements, .. } => {
                let tys: Vec<Ty> = elements.iter().map(|e| self.infer_expr(e)).collect();
                Ty::Array(Box::new(Ty::unify(tys)))
            }
            Expr::SetLit { elements, .. } => {
                let tys: Vec<Ty> = elements.iter().map(|e| self.infer_expr(e)).collect();
                Ty::Set(Box::new(Ty::unify(tys)))
            }
            Expr::Seq { entries, .. } => {
                let tys: Vec<Ty> = entries
                    .iter()
                    .map(|e| match self.infer_expr(e) {
                        Ty::Range => Ty::Int,
                        other => other,
                    })
                    .collect();
                Ty::Seq(Box::new(Ty::unify(tys)))
            }
            Expr::MapLit { pairs, .. } => {
                let key_tys: Vec<Ty> = pairs.iter().map(|(k, _)| self.infer_expr(k)).collect();
                let value_tys: Vec<Ty> = pairs.iter().map(|(_, v)| self.infer_expr(v)).collect();
                Ty::Map(Box::new(Ty::unify(key_tys)), Box::new(Ty::unify(value_tys)))
            }
        }
    }

    fn infer_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, line: usize) -> Ty {
        let left_ty = self.infer_expr(left);
        let right_ty = self.infer_expr(right);

        if op == BinOp::Add && (left_ty == Ty::Str || right_ty == Ty::Str) {
            if left_ty == Ty::Str && right_ty == Ty::Str {
                return Ty::Str;
            }
            if !left_ty.is_unknown() && !right_ty.is_unknown() {
                self.diagnostics.report(
                    line,
                    format!(
                        "string concatenation requires both operands to be 'string', got '{left_ty}' and '{right_ty}'"
                    ),
                );
            }
            return Ty::Unknown;
        }

        let left_bad = !left_ty.is_numeric() && !left_ty.is_unknown();
        let right_bad = !right_ty.is_numeric() && !right_ty.is_unknown();
        if left_bad || right_bad {
            self.diagnostics.report(
                line,
                format!(
                    "arithmetic operator '{}' requires numeric operands, got '{left_ty}' and '{right_ty}'",
                    op.as_str()
                ),
            );
        }

        if left_ty == Ty::Float || right_ty == Ty::Float {
            Ty::Float
        } else {
            Ty::Int
        }
    }

    fn infer_index(&mut self, target: &str, index: &Expr, line: usize) -> Ty {
        let Some(symbol) = self.table.lookup(target) else {
            self.diagnostics
                .report(line, format!("use of undeclared array '{target}'"));
            return Ty::Unknown;
        };
        let target_ty = symbol.ty.clone();

        if !target_ty.is_indexable() {
            self.diagnostics
                .report(line, format!("'{target}' is not an array or list"));
        }

        let index_ty = self.infer_expr(index);
        if index_ty.conflicts_with(&Ty::Int) {
            self.diagnostics
                .report(line, format!("array index must be 'int', got '{index_ty}'"));
        }
        if let Expr::Number { text, .. } = index {
            if text.parse::<i64>().map_or(false, |n| n < 0) {
                self.diagnostics.report(line, "array index cannot be negative");
            }
        }
        if matches!(index, Expr::Float { .. }) {
            self.diagnostics
                .report(line, "array index must be an integer, got a float literal");
        }

        target_ty.element().cloned().unwrap_or(Ty::Unknown)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;

    fn analyze(source: &str) -> Vec<Diagnostic> {
        let tokens = Lexer::new(source).tokenize();
        let mut parser = Parser::new(tokens);
        parser.validate_tokens().expect("tokens should validate");
        let program = parser.parse_program().expect("program should parse");
        SemanticAnalyzer::new().analyze(&program)
    }

    fn messages(source: &str) -> Vec<String> {
        analyze(source).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_function_declaration_clean() {
        let errors = analyze("let add(a, b) =\n    a + b\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_mutable_assignment_ok() {
        let errors = analyze("let mutable x = 5\nx = 6\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_immutable_assignment_rejected() {
        let errors = analyze("let x = 5\nx = 6\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert_eq!(errors[0].message, "cannot assign to immutable variable 'x'");
    }

    #[test]
    fn test_for_in_range_clean() {
        let errors = analyze("for i in 1..5 do\n    printfn \"%d\" i\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_undeclared_in_condition() {
        let errors = analyze("if z then 1 else 0\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "use of undeclared variable 'z'");
    }

    #[test]
    fn test_undeclared_variable_reported_once() {
        // the same offending identifier on one line must not produce duplicates
        let errors = analyze("let y = z + z\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "use of undeclared variable 'z'");
    }

    #[test]
    fn test_redeclaration_same_scope() {
        let msgs = messages("let x = 5\nlet x = 6\n");
        assert_eq!(msgs, vec!["redeclaration of variable 'x'"]);
    }

    #[test]
    fn test_shadowing_across_scopes_allowed() {
        let errors = analyze("let x = 5\nlet wrap(a) =\n    let x = 7\n    x + a\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_assignment_type_mismatch() {
        let msgs = messages("let mutable x = 5\nx = \"six\"\n");
        assert_eq!(msgs, vec!["type mismatch: expected 'int', got 'string'"]);
    }

    #[test]
    fn test_annotation_overrides_initializer() {
        let msgs = messages("let mutable x: float = 5\nx = 1.5\n");
        assert!(msgs.is_empty(), "unexpected diagnostics: {msgs:?}");
    }

    #[test]
    fn test_call_arity_mismatch() {
        let msgs = messages("let add(a, b) =\n    a + b\nlet r = add(1, 2, 3)\n");
        assert_eq!(msgs, vec!["argument count mismatch: expected 2, got 3"]);
    }

    #[test]
    fn test_call_argument_type_mismatch() {
        let msgs = messages("let add(a, b) =\n    a + b\nlet r = add(\"one\", 2)\n");
        assert_eq!(
            msgs,
            vec!["argument 1 type mismatch: expected 'int', got 'string'"]
        );
    }

    #[test]
    fn test_call_undeclared_function() {
        let msgs = messages("let r = missing(1)\n");
        assert_eq!(msgs, vec!["call to undeclared function 'missing'"]);
    }

    #[test]
    fn test_calling_a_variable_rejected() {
        let msgs = messages("let x = 5\nlet r = x(1)\n");
        assert_eq!(msgs, vec!["call to undeclared function 'x'"]);
    }

    #[test]
    fn test_return_type_fixed_then_checked() {
        // the first return fixes the type; a conflicting one is reported
        let source = "let pick(a) =\n    if a > 0 then\n        return 1\n    return \"no\"\n";
        let msgs = messages(source);
        assert_eq!(msgs, vec!["return type mismatch: expected 'int', got 'string'"]);
    }

    #[test]
    fn test_condition_must_be_bool() {
        let msgs = messages("let x = 5\nif x then\n    printfn \"yes\"\n");
        assert_eq!(msgs, vec!["if condition must be 'bool', got 'int'"]);
    }

    #[test]
    fn test_comparison_condition_is_bool() {
        let errors = analyze("let x = 5\nif x > 3 then\n    printfn \"yes\"\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_while_condition_checked() {
        let msgs = messages("let s = \"go\"\nwhile s do\n    printfn \"spin\"\n");
        assert_eq!(msgs, vec!["while condition must be 'bool', got 'string'"]);
    }

    #[test]
    fn test_loop_variable_scope_released() {
        // the counter is visible inside the loop body but not after it
        let source = "for i = 1 to 3 do\n    printfn \"%d\" i\nlet y = i\n";
        let msgs = messages(source);
        assert_eq!(msgs, vec!["use of undeclared variable 'i'"]);
    }

    #[test]
    fn test_for_in_rejects_scalar() {
        let msgs = messages("let n = 5\nfor x in n do\n    printfn \"%d\" x\n");
        assert_eq!(msgs, vec!["for..in expects a collection, got 'int'"]);
    }

    #[test]
    fn test_for_in_element_type() {
        let source = "let xs = [1; 2; 3]\nfor x in xs do\n    let y = x + 1\n";
        let errors = analyze(source);
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_string_iteration_allowed() {
        let errors = analyze("let s = \"abc\"\nfor c in s do\n    printfn \"%c\" c\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_array_literal_inference() {
        // homogeneous arrays keep their element type; mixed ones collapse
        let msgs = messages("let mutable a = [|1; 2|]\na = [|1.5|]\n");
        assert_eq!(
            msgs,
            vec!["type mismatch: expected 'array<int>', got 'array<float>'"]
        );
    }

    #[test]
    fn test_index_requires_collection() {
        let msgs = messages("let n = 5\nlet v = n.[0]\n");
        assert_eq!(msgs, vec!["'n' is not an array or list"]);
    }

    #[test]
    fn test_negative_index_rejected() {
        let msgs = messages("let xs = [|1; 2|]\nlet v = xs.[-1]\n");
        assert_eq!(msgs, vec!["array index cannot be negative"]);
    }

    #[test]
    fn test_float_index_rejected() {
        let msgs = messages("let xs = [|1; 2|]\nlet v = xs.[1.5]\n");
        assert_eq!(
            msgs,
            vec![
                "array index must be 'int', got 'float'",
                "array index must be an integer, got a float literal"
            ]
        );
    }

    #[test]
    fn test_index_element_type_flows() {
        let errors = analyze("let xs = [|1; 2|]\nlet mutable v = 0\nv = xs.[0]\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_string_concatenation() {
        let errors = analyze("let a = \"x\"\nlet b = a + \"y\"\n");
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");

        let msgs = messages("let a = \"x\"\nlet b = a + 1\n");
        assert_eq!(
            msgs,
            vec!["string concatenation requires both operands to be 'string', got 'string' and 'int'"]
        );
    }

    #[test]
    fn test_arithmetic_operand_check() {
        let msgs = messages("let t = true\nlet x = t * 2\n");
        assert_eq!(
            msgs,
            vec!["arithmetic operator '*' requires numeric operands, got 'bool' and 'int'"]
        );
    }

    #[test]
    fn test_float_promotion() {
        let msgs = messages("let mutable x = 1.5\nx = 2 * 3.0\n");
        assert!(msgs.is_empty(), "unexpected diagnostics: {msgs:?}");
    }

    #[test]
    fn test_unknown_suppresses_mismatch() {
        // a call's result is unknown and must not trigger assignment checks
        let source = "let f(a) =\n    a + 1\nlet mutable x = 5\nx = f(1)\n";
        let errors = analyze(source);
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_class_property_access() {
        let source = "type Point(x: int, y: int) =\n    member this.X = x\nlet p: Point = 0\nlet mutable v = 1\nv = p.x\n";
        let errors = analyze(source);
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }

    #[test]
    fn test_method_and_field_see_ctor_params() {
        let source = "type Point(x: int, y: int) =\n    member this.Scale(k: int) =\n        k * x\n    member this.X = x\n";
        let errors = analyze(source);
        assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
    }
}
