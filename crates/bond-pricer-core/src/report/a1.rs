//! A1-notation spelling of report cells and formulas.

use crate::report::{BinaryOp, Cell, CellMode, CellRef, Expr, Value};

/// Spreadsheet column letters for a zero-based index (0 → A, 26 → AA).
pub fn column_name(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Sheet name as it must appear before `!`. Names that are not plain
/// identifiers are single-quoted with embedded quotes doubled.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

pub fn cell_ref(r: &CellRef) -> String {
    let local = format!("{}{}", column_name(r.column), r.row);
    match &r.sheet {
        Some(sheet) => format!("{}!{}", quote_sheet_name(sheet), local),
        None => local,
    }
}

/// Formula text including the leading `=`.
pub fn formula(expr: &Expr) -> String {
    let mut out = String::from("=");
    write_expr(expr, 0, &mut out);
    out
}

/// Text written for a cell under the given mode.
pub fn cell_text(cell: &Cell, mode: CellMode) -> String {
    match (cell, mode) {
        (Cell::Formula { expr, .. }, CellMode::Formulas) => formula(expr),
        _ => value_text(cell.value()),
    }
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => n.normalize().to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Bool(true) => "TRUE".into(),
        Value::Bool(false) => "FALSE".into(),
    }
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Pow => "^",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
    }
}

fn write_expr(expr: &Expr, min_prec: u8, out: &mut String) {
    match expr {
        Expr::Number(n) => out.push_str(&n.normalize().to_string()),
        Expr::Ref(r) => out.push_str(&cell_ref(r)),
        Expr::Range(start, end) => {
            out.push_str(&cell_ref(start));
            out.push(':');
            // The sheet prefix is written once, on the start of the range.
            out.push_str(&format!("{}{}", column_name(end.column), end.row));
        }
        Expr::Binary(op, lhs, rhs) => {
            let prec = op.precedence();
            let wrap = prec < min_prec;
            if wrap {
                out.push('(');
            }
            write_expr(lhs, prec, out);
            out.push_str(op_symbol(*op));
            // Operators are left-associative: an equal-precedence right
            // operand needs parentheses.
            write_expr(rhs, prec + 1, out);
            if wrap {
                out.push(')');
            }
        }
        Expr::Call(name, args) => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_expr(arg, 0, out);
            }
            out.push(')');
        }
    }
}
