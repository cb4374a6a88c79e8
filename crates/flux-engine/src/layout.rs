//! Spreadsheet coordinates and formula text.
//!
//! The sheet has a fixed shape:
//!
//! ```text
//!        A          B         C      D        E ...
//!   1               Average   Line   Percent  <periods>
//!   2    Total
//!   3    Positive
//!   4    Negative
//!   5..  <positive-flow accounts>
//!        <negative-flow accounts>
//! ```
//!
//! Every generated formula refers to cells through the constants below.
//! Changing the header height or the leading columns only requires
//! changing them here.

use crate::options::AverageDivisor;
use std::fmt;

/// Number of columns before the first period column.
pub const FIXED_COLUMNS: usize = 4;
/// Column of the row label.
pub const LABEL_COLUMN: usize = 0;
/// Column of the per-row average.
pub const AVERAGE_COLUMN: usize = 1;
/// Column of the sparkline.
pub const LINE_COLUMN: usize = 2;
/// Column of the share of the group average.
pub const PERCENT_COLUMN: usize = 3;

/// Row of the column labels.
pub const HEADER_ROW: usize = 1;
/// Row of the net total.
pub const TOTAL_ROW: usize = 2;
/// Row of the positive-flow subtotal.
pub const POSITIVE_ROW: usize = 3;
/// Row of the negative-flow subtotal.
pub const NEGATIVE_ROW: usize = 4;
/// First account row.
pub const FIRST_ACCOUNT_ROW: usize = 5;

/// Spreadsheet letters for a zero-based column index (`0 → A`, `26 → AA`).
///
/// # Examples
///
/// ```
/// use flux_engine::layout::column_letter;
///
/// assert_eq!(column_letter(0), "A");
/// assert_eq!(column_letter(25), "Z");
/// assert_eq!(column_letter(26), "AA");
/// assert_eq!(column_letter(701), "ZZ");
/// assert_eq!(column_letter(702), "AAA");
/// ```
#[must_use]
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Letters of the column holding the `period_index`-th period.
#[must_use]
pub fn period_column(period_index: usize) -> String {
    column_letter(FIXED_COLUMNS + period_index)
}

/// A single cell reference such as `E5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Zero-based column.
    pub column: usize,
    /// One-based row.
    pub row: usize,
}

impl Cell {
    /// Create a cell reference.
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// The cell of the `period_index`-th period in `row`.
    #[must_use]
    pub const fn period(period_index: usize, row: usize) -> Self {
        Self::new(FIXED_COLUMNS + period_index, row)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

/// An inclusive rectangular range such as `E5:H5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Top-left corner.
    pub start: Cell,
    /// Bottom-right corner.
    pub end: Cell,
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// One of the two account groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Positive-flow accounts, directly below the header.
    Positive,
    /// Negative-flow accounts, below the positive group.
    Negative,
}

impl Group {
    /// The subtotal row of this group.
    #[must_use]
    pub const fn summary_row(self) -> usize {
        match self {
            Self::Positive => POSITIVE_ROW,
            Self::Negative => NEGATIVE_ROW,
        }
    }
}

/// Row arithmetic for a sheet with a given number of rows per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    positive_rows: usize,
    negative_rows: usize,
    periods: usize,
}

impl SheetLayout {
    /// Describe a sheet.
    #[must_use]
    pub const fn new(positive_rows: usize, negative_rows: usize, periods: usize) -> Self {
        Self {
            positive_rows,
            negative_rows,
            periods,
        }
    }

    /// Number of period columns.
    #[must_use]
    pub const fn periods(&self) -> usize {
        self.periods
    }

    /// Row of the `index`-th account of `group`.
    #[must_use]
    pub const fn account_row(&self, group: Group, index: usize) -> usize {
        match group {
            Group::Positive => FIRST_ACCOUNT_ROW + index,
            Group::Negative => FIRST_ACCOUNT_ROW + self.positive_rows + index,
        }
    }

    /// First and last row of `group`, `None` when it is empty.
    #[must_use]
    pub const fn group_rows(&self, group: Group) -> Option<(usize, usize)> {
        let len = match group {
            Group::Positive => self.positive_rows,
            Group::Negative => self.negative_rows,
        };
        if len == 0 {
            return None;
        }
        let first = self.account_row(group, 0);
        Some((first, first + len - 1))
    }

    /// `=SUM(..)` of a group's cells in one period column; `None` when the
    /// group is empty.
    #[must_use]
    pub fn group_sum(&self, group: Group, period_index: usize) -> Option<String> {
        let (first, last) = self.group_rows(group)?;
        let range = CellRange {
            start: Cell::period(period_index, first),
            end: Cell::period(period_index, last),
        };
        Some(format!("=SUM({range})"))
    }

    /// Net total of one period column: positive plus negative subtotal.
    #[must_use]
    pub fn total_formula(&self, period_index: usize) -> String {
        format!(
            "={}+{}",
            Cell::period(period_index, POSITIVE_ROW),
            Cell::period(period_index, NEGATIVE_ROW)
        )
    }

    /// Average of `row` over the period columns `first..=last`.
    ///
    /// `span` is the elapsed period count used by [`AverageDivisor::Span`].
    #[must_use]
    pub fn average_formula(
        &self,
        row: usize,
        first: usize,
        last: usize,
        averaging: AverageDivisor,
        span: u32,
    ) -> String {
        let range = CellRange {
            start: Cell::period(first, row),
            end: Cell::period(last, row),
        };
        match averaging {
            AverageDivisor::Span => format!("=SUM({range})/{span}"),
            AverageDivisor::Columns => format!("=AVERAGE({range})"),
        }
    }

    /// Sparkline over every period column of `row`; `None` without periods.
    #[must_use]
    pub fn sparkline_formula(&self, row: usize) -> Option<String> {
        if self.periods == 0 {
            return None;
        }
        let range = CellRange {
            start: Cell::period(0, row),
            end: Cell::period(self.periods - 1, row),
        };
        Some(format!("=SPARKLINE({range})"))
    }

    /// Share of `row`'s average in the average of `base_row`.
    #[must_use]
    pub fn percent_formula(&self, row: usize, base_row: usize) -> String {
        format!(
            "={}/{}",
            Cell::new(AVERAGE_COLUMN, row),
            Cell::new(AVERAGE_COLUMN, base_row)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_period_columns_skip_fixed_columns() {
        assert_eq!(period_column(0), "E");
        assert_eq!(period_column(21), "Z");
        assert_eq!(period_column(22), "AA");
        assert_eq!(period_column(25), "AD");
        assert_eq!(period_column(26), "AE");
        assert_eq!(period_column(51), "BD");
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::period(0, FIRST_ACCOUNT_ROW).to_string(), "E5");
        assert_eq!(Cell::new(AVERAGE_COLUMN, TOTAL_ROW).to_string(), "B2");
        assert_eq!(Cell::new(LABEL_COLUMN, HEADER_ROW).to_string(), "A1");
        assert_eq!(Cell::new(LINE_COLUMN, 7).to_string(), "C7");
        assert_eq!(Cell::new(PERCENT_COLUMN, 7).to_string(), "D7");
    }

    #[test]
    fn test_group_rows() {
        let sheet = SheetLayout::new(3, 2, 4);
        assert_eq!(sheet.group_rows(Group::Positive), Some((5, 7)));
        assert_eq!(sheet.group_rows(Group::Negative), Some((8, 9)));
        assert_eq!(sheet.account_row(Group::Negative, 1), 9);

        let no_positive = SheetLayout::new(0, 2, 4);
        assert_eq!(no_positive.group_rows(Group::Positive), None);
        assert_eq!(no_positive.group_rows(Group::Negative), Some((5, 6)));
    }

    #[test]
    fn test_group_sum_formula() {
        let sheet = SheetLayout::new(3, 2, 4);
        assert_eq!(sheet.group_sum(Group::Positive, 0).unwrap(), "=SUM(E5:E7)");
        assert_eq!(sheet.group_sum(Group::Negative, 2).unwrap(), "=SUM(G8:G9)");
        assert_eq!(SheetLayout::new(0, 1, 1).group_sum(Group::Positive, 0), None);
    }

    #[test]
    fn test_total_formula() {
        let sheet = SheetLayout::new(1, 1, 2);
        assert_eq!(sheet.total_formula(0), "=E3+E4");
        assert_eq!(sheet.total_formula(1), "=F3+F4");
    }

    #[test]
    fn test_average_formulas() {
        let sheet = SheetLayout::new(1, 0, 30);
        assert_eq!(
            sheet.average_formula(5, 0, 3, AverageDivisor::Span, 12),
            "=SUM(E5:H5)/12"
        );
        assert_eq!(
            sheet.average_formula(2, 0, 25, AverageDivisor::Columns, 40),
            "=AVERAGE(E2:AD2)"
        );
    }

    #[test]
    fn test_sparkline_and_percent() {
        let sheet = SheetLayout::new(2, 1, 3);
        assert_eq!(sheet.sparkline_formula(6).unwrap(), "=SPARKLINE(E6:G6)");
        assert_eq!(SheetLayout::new(0, 0, 0).sparkline_formula(2), None);
        assert_eq!(sheet.percent_formula(7, Group::Negative.summary_row()), "=B7/B4");
    }
}
