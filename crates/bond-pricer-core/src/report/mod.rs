//! Spreadsheet-style pricing report as plain data.
//!
//! A [`Report`] is an ordered list of named sheets. Each cell is either a
//! value or a formula expression tree that carries the value the engine
//! computed for it. Cross-sheet references are structured ([`CellRef`]), so
//! a renderer decides how they are spelled; [`a1`] spells them the way
//! spreadsheet applications do.

pub mod a1;
pub mod builder;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::PricerResult;

pub use builder::{build_report, generate_report};

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// A named table: one header row followed by data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// 1-based sheet row of data row `index` (the header occupies row 1).
    pub fn row_number(index: usize) -> u32 {
        index as u32 + 2
    }

    /// Cell at data row `row` and zero-based column `column`.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Value(Value),
    Formula { expr: Expr, cached: Value },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Value(Value::Text(s.into()))
    }

    pub fn number(n: Decimal) -> Self {
        Cell::Value(Value::Number(n))
    }

    pub fn date(d: NaiveDate) -> Self {
        Cell::Value(Value::Date(d))
    }

    pub fn boolean(b: bool) -> Self {
        Cell::Value(Value::Bool(b))
    }

    pub fn formula(expr: Expr, cached: Value) -> Self {
        Cell::Formula { expr, cached }
    }

    /// The value a reader sees, whether stored or computed.
    pub fn value(&self) -> &Value {
        match self {
            Cell::Value(v) => v,
            Cell::Formula { cached, .. } => cached,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self.value() {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Formula expressions
// ---------------------------------------------------------------------------

/// Reference to a single cell. `column` is zero-based, `row` is the 1-based
/// sheet row. `sheet` is `None` for a reference on the formula's own sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub sheet: Option<String>,
    pub column: u32,
    pub row: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 1,
            BinaryOp::Add | BinaryOp::Sub => 2,
            BinaryOp::Mul | BinaryOp::Div => 3,
            BinaryOp::Pow => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(Decimal),
    Ref(CellRef),
    Range(CellRef, CellRef),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    pub fn num(n: Decimal) -> Self {
        Expr::Number(n)
    }

    /// Cell on another sheet.
    pub fn sheet_cell(sheet: &str, column: u32, row: u32) -> Self {
        Expr::Ref(CellRef {
            sheet: Some(sheet.into()),
            column,
            row,
        })
    }

    /// Cell on the formula's own sheet.
    pub fn cell(column: u32, row: u32) -> Self {
        Expr::Ref(CellRef {
            sheet: None,
            column,
            row,
        })
    }

    /// Vertical range of one column on another sheet.
    pub fn sheet_column(sheet: &str, column: u32, first_row: u32, last_row: u32) -> Self {
        Expr::Range(
            CellRef {
                sheet: Some(sheet.into()),
                column,
                row: first_row,
            },
            CellRef {
                sheet: Some(sheet.into()),
                column,
                row: last_row,
            },
        )
    }

    pub fn call(function: &str, args: Vec<Expr>) -> Self {
        Expr::Call(function.into(), args)
    }

    pub fn pow(self, exponent: Expr) -> Self {
        Expr::binary(BinaryOp::Pow, self, exponent)
    }

    pub fn ge(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Ge, self, rhs)
    }

    pub fn le(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Le, self, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Gt, self, rhs)
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

// ---------------------------------------------------------------------------
// Rendering seam
// ---------------------------------------------------------------------------

/// Whether formula cells are written as formulas or as their cached values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellMode {
    Formulas,
    #[default]
    Values,
}

/// Turns a report into some output format.
pub trait ReportRenderer {
    type Output;

    fn render(&self, report: &Report) -> PricerResult<Self::Output>;
}
