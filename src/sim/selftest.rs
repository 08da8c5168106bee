/// Built-in row-reduction check, run with `2048 test`.
///
/// Prints the first failing case, or a one-line success summary.
/// Independent of the terminal: no raw mode, no alternate screen.

use std::io::{self, Write};

use crate::domain::grid::Row;
use crate::domain::row::reduce_row;

/// (input, expected) rank rows; rank r is the tile 2^r.
pub const CASES: [(Row, Row); 13] = [
    ([0, 0, 0, 1], [1, 0, 0, 0]),
    ([0, 0, 1, 1], [2, 0, 0, 0]),
    ([0, 1, 0, 1], [2, 0, 0, 0]),
    ([1, 0, 0, 1], [2, 0, 0, 0]),
    ([1, 0, 1, 0], [2, 0, 0, 0]),
    ([1, 1, 1, 0], [2, 1, 0, 0]),
    ([1, 0, 1, 1], [2, 1, 0, 0]),
    ([1, 1, 0, 1], [2, 1, 0, 0]),
    ([1, 1, 1, 1], [2, 2, 0, 0]),
    ([2, 2, 1, 1], [3, 2, 0, 0]),
    ([1, 1, 2, 2], [2, 3, 0, 0]),
    ([3, 0, 1, 1], [3, 2, 0, 0]),
    ([2, 0, 1, 1], [2, 2, 0, 0]),
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Failure {
    pub input: Row,
    pub got: Row,
    pub expected: Row,
}

/// Run every case; stop at the first mismatch.
pub fn check(cases: &[(Row, Row)]) -> Result<usize, Failure> {
    for &(input, expected) in cases {
        let mut got = input;
        reduce_row(&mut got);
        if got != expected {
            return Err(Failure { input, got, expected });
        }
    }
    Ok(cases.len())
}

fn fmt_row(row: &Row) -> String {
    row.iter().map(|r| format!("{r} ")).collect()
}

/// Run the built-in table, report on `out`, and return the process exit code.
pub fn run(out: &mut impl Write) -> io::Result<i32> {
    match check(&CASES) {
        Ok(n) => {
            writeln!(out, "All {n} tests executed successfully")?;
            Ok(0)
        }
        Err(f) => {
            writeln!(
                out,
                "{}=> {}expected {}=> {}",
                fmt_row(&f.input),
                fmt_row(&f.got),
                fmt_row(&f.input),
                fmt_row(&f.expected),
            )?;
            Ok(1)
        }
    }
}
