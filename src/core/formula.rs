//! Shared arithmetic for burden, percent change and revenue balance.
//!
//! Each formula is evaluated here with checked `Decimal` arithmetic and also
//! rendered as a JavaScript function for the interactive page, so the page
//! script and the static render always use the same expression.

use super::calculator::ComplianceVerdict;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormulaError {
    #[error("unbound variable '{0}' in formula")]
    UnboundVariable(String),
    #[error("formula {name} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}

/// Arithmetic expression over named variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(&'static str),
    Num(Decimal),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: &'static str) -> Expr {
        Expr::Var(name)
    }

    pub fn num(value: Decimal) -> Expr {
        Expr::Num(value)
    }

    pub fn eval<F>(&self, lookup: &F) -> Result<Decimal, FormulaError>
    where
        F: Fn(&str) -> Option<Decimal>,
    {
        match self {
            Expr::Var(name) => {
                lookup(*name).ok_or_else(|| FormulaError::UnboundVariable(name.to_string()))
            }
            Expr::Num(value) => Ok(*value),
            Expr::Add(a, b) => a
                .eval(lookup)?
                .checked_add(b.eval(lookup)?)
                .ok_or(FormulaError::Overflow),
            Expr::Sub(a, b) => a
                .eval(lookup)?
                .checked_sub(b.eval(lookup)?)
                .ok_or(FormulaError::Overflow),
            Expr::Mul(a, b) => a
                .eval(lookup)?
                .checked_mul(b.eval(lookup)?)
                .ok_or(FormulaError::Overflow),
            Expr::Div(a, b) => {
                let numerator = a.eval(lookup)?;
                let denominator = b.eval(lookup)?;
                if denominator.is_zero() {
                    return Err(FormulaError::DivisionByZero);
                }
                numerator
                    .checked_div(denominator)
                    .ok_or(FormulaError::Overflow)
            }
        }
    }

    /// Render as a fully parenthesised JavaScript expression
    pub fn to_js(&self) -> String {
        match self {
            Expr::Var(name) => name.to_string(),
            Expr::Num(value) => value.normalize().to_string(),
            Expr::Add(a, b) => format!("({} + {})", a.to_js(), b.to_js()),
            Expr::Sub(a, b) => format!("({} - {})", a.to_js(), b.to_js()),
            Expr::Mul(a, b) => format!("({} * {})", a.to_js(), b.to_js()),
            Expr::Div(a, b) => format!("({} / {})", a.to_js(), b.to_js()),
        }
    }
}

macro_rules! expr_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl std::ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

expr_op!(Add, add, Add);
expr_op!(Sub, sub, Sub);
expr_op!(Mul, mul, Mul);
expr_op!(Div, div, Div);

/// A named expression with positional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub expr: Expr,
}

impl Formula {
    pub fn eval(&self, args: &[Decimal]) -> Result<Decimal, FormulaError> {
        if args.len() != self.params.len() {
            return Err(FormulaError::ArityMismatch {
                name: self.name,
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        let lookup = |name: &str| {
            self.params
                .iter()
                .position(|p| *p == name)
                .map(|i| args[i])
        };
        self.expr.eval(&lookup)
    }

    pub fn to_js(&self) -> String {
        format!(
            "function {}({}) {{ return {}; }}",
            self.name,
            self.params.join(", "),
            self.expr.to_js()
        )
    }
}

/// Assessed value per mill
pub const PER_MILLE: Decimal = dec!(1000);

/// `rate * value / 1000`
pub fn burden() -> Formula {
    Formula {
        name: "burden",
        params: &["rate", "value"],
        expr: Expr::var("rate") * Expr::var("value") / Expr::num(PER_MILLE),
    }
}

/// `100 * (current - previous) / previous`
pub fn percent_change() -> Formula {
    Formula {
        name: "percentChange",
        params: &["current", "previous"],
        expr: Expr::num(dec!(100)) * (Expr::var("current") - Expr::var("previous"))
            / Expr::var("previous"),
    }
}

/// `required - revenue`; negative means more was collected than required
pub fn balance() -> Formula {
    Formula {
        name: "balance",
        params: &["required", "revenue"],
        expr: Expr::var("required") - Expr::var("revenue"),
    }
}

/// Tolerance comparison as a JS `verdict(balance, tolerance)` function.
///
/// Returns the `ComplianceVerdict` variant name, matching `evaluate_compliance`.
pub fn compliance_js() -> String {
    format!(
        "function verdict(balance, tolerance) {{ \
         if (balance < -tolerance) {{ return '{surplus:?}'; }} \
         if (balance > tolerance) {{ return '{shortfall:?}'; }} \
         return '{exact:?}'; }}",
        surplus = ComplianceVerdict::Surplus,
        shortfall = ComplianceVerdict::Shortfall,
        exact = ComplianceVerdict::ExactMatch,
    )
}

/// All formula functions used by the page script
pub fn page_script() -> String {
    [burden(), percent_change(), balance()]
        .iter()
        .map(Formula::to_js)
        .chain(std::iter::once(compliance_js()))
        .collect::<Vec<_>>()
        .join("\n")
}
