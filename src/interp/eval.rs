//! Postfix stack interpreter

use crate::ast::*;
use crate::config::RunConfig;
use crate::diagnostics::InterpreterError;

use super::scope::Scope;
use super::value::Operand;

/// Budget the entry function gets unless configured otherwise
pub const DEFAULT_RECURSION_LIMIT: i64 = 100;

/// Largest budget accepted. Each unit is one native call frame, so this
/// bounds host stack use.
pub const MAX_RECURSION_LIMIT: i64 = 1000;

/// Function run when no other entry point is named
pub const DEFAULT_ENTRY: &str = "main";

/// Stack interpreter over a parsed function table
pub struct Interpreter {
    /// Function definitions (by name), fixed after parsing
    functions: FunctionTable,
}

impl Interpreter {
    /// Create an interpreter that owns a parsed program
    pub fn new(functions: FunctionTable) -> Self {
        Interpreter { functions }
    }

    /// Run the configured entry function with no arguments
    pub fn run(&self, config: &RunConfig) -> Result<Scope, InterpreterError> {
        self.execute(&config.entry, &[], config.recursion_limit)
    }

    /// Run `main` with the default recursion budget
    pub fn run_main(&self) -> Result<Scope, InterpreterError> {
        self.execute(DEFAULT_ENTRY, &[], DEFAULT_RECURSION_LIMIT)
    }

    /// Call a function with arguments and a recursion budget.
    ///
    /// Every nested call spends one unit of `budget`; entering a function
    /// with a budget of zero or less fails. A budget above
    /// [`MAX_RECURSION_LIMIT`] is rejected before anything runs. Returns the
    /// callee's final scope.
    pub fn execute(&self, name: &str, args: &[f64], budget: i64) -> Result<Scope, InterpreterError> {
        if budget > MAX_RECURSION_LIMIT {
            return Err(InterpreterError::RecursionLimitTooLarge {
                line: 0,
                requested: budget,
                max: MAX_RECURSION_LIMIT,
            });
        }
        self.call_function(name, args, budget, None)
    }

    fn call_function(
        &self,
        name: &str,
        args: &[f64],
        budget: i64,
        site: Option<&Term>,
    ) -> Result<Scope, InterpreterError> {
        let line = site.map_or(0, |t| t.line);
        let span = site.map(|t| t.span.into());

        if budget <= 0 {
            return Err(InterpreterError::RecursionLimit {
                line,
                function: name.to_string(),
                span,
            });
        }

        let func = self
            .functions
            .get(name)
            .ok_or_else(|| InterpreterError::UnknownFunction {
                line,
                name: name.to_string(),
                span,
            })?;

        if func.params.len() != args.len() {
            return Err(InterpreterError::ArityMismatch {
                line,
                function: name.to_string(),
                expected: func.params.len(),
                found: args.len(),
                span,
            });
        }

        // Bind parameters
        let mut scope = Scope::new();
        for (param, arg) in func.params.iter().zip(args) {
            scope.set(param.clone(), *arg);
        }

        self.exec_statements(func, &mut scope, budget)?;

        tracing::debug!(function = name, budget, "final scope:\n{}", scope);
        Ok(scope)
    }

    /// Replay each statement against its own operand stack
    fn exec_statements(
        &self,
        func: &FunctionDef,
        scope: &mut Scope,
        budget: i64,
    ) -> Result<(), InterpreterError> {
        for stmt in &func.statements {
            tracing::trace!(function = %func.name, line = stmt.line, "{}", stmt);

            let mut stack: Vec<Operand<'_>> = Vec::new();
            for term in &stmt.terms {
                match &term.kind {
                    TermKind::Number(_) | TermKind::Variable(_) | TermKind::Unknown(_) => {
                        stack.push(Operand::Term(term));
                    }
                    TermKind::Operator(op) => apply_operator(*op, term, &mut stack, scope)?,
                    TermKind::Call { name, arity } => {
                        let args = pop_arguments(*arity, term, &mut stack, scope)?;
                        self.call_function(name, &args, budget - 1, Some(term))?;
                    }
                    TermKind::Keyword(_) => {}
                }
            }

            if let Some(first) = stack.first() {
                return Err(InterpreterError::UnbalancedStatement {
                    line: first.line(),
                    leftover: stack.len(),
                    span: first.span().into(),
                });
            }
        }
        Ok(())
    }
}

/// Pop two operands and either assign or push the computed number
fn apply_operator<'a>(
    op: BinaryOp,
    term: &'a Term,
    stack: &mut Vec<Operand<'a>>,
    scope: &mut Scope,
) -> Result<(), InterpreterError> {
    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
        return Err(InterpreterError::MalformedExpression {
            line: term.line,
            operator: op.to_string(),
            span: term.span.into(),
        });
    };

    if op == BinaryOp::Assign {
        let Some(target) = left.as_variable() else {
            return Err(InterpreterError::AssignToNonVariable {
                line: term.line,
                span: left.span().into(),
            });
        };
        let value = right.resolve(scope)?;
        scope.set(target, value);
        return Ok(());
    }

    let lhs = left.resolve(scope)?;
    let rhs = right.resolve(scope)?;
    stack.push(Operand::Computed {
        value: eval_binary(op, lhs, rhs),
        line: term.line,
        span: left.span().merge(right.span()),
    });
    Ok(())
}

/// Arithmetic and comparison; comparisons yield 1.0 or 0.0
fn eval_binary(op: BinaryOp, lhs: f64, rhs: f64) -> f64 {
    let truth = |b: bool| if b { 1.0 } else { 0.0 };
    match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => lhs / rhs,
        BinaryOp::Equals => truth(lhs == rhs),
        BinaryOp::NotEquals => truth(lhs != rhs),
        // assignment never reaches here
        BinaryOp::Assign => rhs,
    }
}

/// Pop a call's arguments and resolve them in source order
fn pop_arguments(
    arity: usize,
    term: &Term,
    stack: &mut Vec<Operand<'_>>,
    scope: &Scope,
) -> Result<Vec<f64>, InterpreterError> {
    if stack.len() < arity {
        return Err(InterpreterError::MalformedExpression {
            line: term.line,
            operator: term.to_string(),
            span: term.span.into(),
        });
    }
    stack
        .split_off(stack.len() - arity)
        .iter()
        .map(|arg| arg.resolve(scope))
        .collect()
}
