//! Comma-separated rendering of a [`FlowTable`].

use crate::aggregate::Bucket;
use crate::error::FluxError;
use crate::layout::{Group, SheetLayout, NEGATIVE_ROW, POSITIVE_ROW, TOTAL_ROW};
use crate::options::{Layout, PartitionMode};
use crate::table::FlowTable;
use flux_core::PeriodKey;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::info;

/// Format a value with at most two decimals and no trailing zeros.
///
/// ```
/// use flux_engine::render::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(52200, 2)), "522");
/// assert_eq!(format_amount(Decimal::new(-3333, 3)), "-3.33");
/// assert_eq!(format_amount(Decimal::ZERO), "0");
/// ```
#[must_use]
pub fn format_amount(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

/// Render `table` in the requested layout.
pub fn render(table: &FlowTable, layout: Layout) -> Result<String, FluxError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let periods: Vec<PeriodKey> = table.registry().periods().collect();

    match layout {
        Layout::Plain => render_plain(table, &periods, &mut writer)?,
        Layout::Averaged => render_averaged(table, &periods, &mut writer)?,
        Layout::Spreadsheet => render_spreadsheet(table, &periods, &mut writer)?,
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FluxError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a fully rendered report to `path` in one call.
pub fn write_report(path: &Path, report: &str) -> Result<(), FluxError> {
    fs::write(path, report).map_err(|source| FluxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = report.len(), "wrote report");
    Ok(())
}

type CsvWriter = csv::Writer<Vec<u8>>;

fn values<'a>(bucket: &'a Bucket, periods: &'a [PeriodKey]) -> impl Iterator<Item = String> + 'a {
    periods.iter().map(|p| format_amount(bucket.value(*p)))
}

fn header(fixed: &[&str], periods: &[PeriodKey]) -> Vec<String> {
    std::iter::once(String::new())
        .chain(fixed.iter().map(ToString::to_string))
        .chain(periods.iter().map(ToString::to_string))
        .collect()
}

fn render_plain(table: &FlowTable, periods: &[PeriodKey], w: &mut CsvWriter) -> Result<(), FluxError> {
    w.write_record(header(&[], periods))?;
    let groups = table.groups();
    let mut buckets: Vec<&Bucket> = groups.positive.into_iter().chain(groups.negative).collect();
    buckets.sort_by(|a, b| a.name().cmp(b.name()));
    for bucket in buckets {
        let record: Vec<String> = std::iter::once(bucket.name().to_string())
            .chain(values(bucket, periods))
            .collect();
        w.write_record(&record)?;
    }
    Ok(())
}

fn render_averaged(
    table: &FlowTable,
    periods: &[PeriodKey],
    w: &mut CsvWriter,
) -> Result<(), FluxError> {
    w.write_record(header(&["Average"], periods))?;
    let groups = table.groups();
    for bucket in groups.positive.iter().chain(&groups.negative) {
        let record: Vec<String> = [bucket.name().to_string(), format_amount(table.average(bucket))]
            .into_iter()
            .chain(values(bucket, periods))
            .collect();
        w.write_record(&record)?;
    }
    Ok(())
}

fn render_spreadsheet(
    table: &FlowTable,
    periods: &[PeriodKey],
    w: &mut CsvWriter,
) -> Result<(), FluxError> {
    let groups = table.groups();
    let undivided = table.partition() == PartitionMode::Undivided;
    let sheet = SheetLayout::new(groups.positive.len(), groups.negative.len(), periods.len());
    let registry = table.registry();

    let summary_average = |row: usize| match (periods.len().checked_sub(1), registry.span()) {
        (Some(last), Some(span)) => sheet.average_formula(row, 0, last, table.averaging(), span),
        _ => format_amount(Decimal::ZERO),
    };
    let summary_row = |label: &str, row: usize, cells: Vec<String>| -> Vec<String> {
        [
            label.to_string(),
            summary_average(row),
            sheet.sparkline_formula(row).unwrap_or_default(),
            String::new(),
        ]
        .into_iter()
        .chain(cells)
        .collect()
    };
    let subtotal = |group: Group, totals: &Bucket| -> Vec<String> {
        (0..periods.len())
            .map(|i| {
                if undivided {
                    format_amount(totals.value(periods[i]))
                } else {
                    sheet
                        .group_sum(group, i)
                        .unwrap_or_else(|| format_amount(Decimal::ZERO))
                }
            })
            .collect()
    };

    w.write_record(header(&["Average", "Line", "Percent"], periods))?;
    w.write_record(summary_row(
        "Total",
        TOTAL_ROW,
        (0..periods.len()).map(|i| sheet.total_formula(i)).collect(),
    ))?;
    w.write_record(summary_row(
        "Positive",
        POSITIVE_ROW,
        subtotal(Group::Positive, table.positive_totals()),
    ))?;
    w.write_record(summary_row(
        "Negative",
        NEGATIVE_ROW,
        subtotal(Group::Negative, table.negative_totals()),
    ))?;

    for (group, buckets) in [
        (Group::Positive, &groups.positive),
        (Group::Negative, &groups.negative),
    ] {
        let base_row = if undivided {
            TOTAL_ROW
        } else {
            group.summary_row()
        };
        for (index, bucket) in buckets.iter().enumerate() {
            let row = sheet.account_row(group, index);
            let average = account_average(table, &sheet, bucket, row)
                .unwrap_or_else(|| format_amount(Decimal::ZERO));
            let record: Vec<String> = [
                bucket.name().to_string(),
                average,
                sheet.sparkline_formula(row).unwrap_or_default(),
                sheet.percent_formula(row, base_row),
            ]
            .into_iter()
            .chain(values(bucket, periods))
            .collect();
            w.write_record(&record)?;
        }
    }
    Ok(())
}

fn account_average(
    table: &FlowTable,
    sheet: &SheetLayout,
    bucket: &Bucket,
    row: usize,
) -> Option<String> {
    let registry = table.registry();
    let first = registry.position(bucket.first_period()?)?;
    let last = registry.position(bucket.last_period()?)?;
    let span = bucket.span(registry.granularity())?;
    Some(sheet.average_formula(row, first, last, table.averaging(), span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Flow;
    use crate::options::{AverageDivisor, ReportOptions};
    use crate::registry::{Closure, PeriodRegistry};
    use chrono::NaiveDate;
    use flux_core::Granularity;
    use rust_decimal_macros::dec;

    fn p(year: i32, month: u32) -> PeriodKey {
        PeriodKey::new(year, month)
    }

    fn table(options: &ReportOptions, flows: &[(&str, PeriodKey, Decimal)]) -> FlowTable {
        let today = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        let registry = PeriodRegistry::for_today(today, Closure::Strict, Granularity::Month);
        let mut table = FlowTable::new(registry, options);
        for (account, period, value) in flows {
            table.record(&Flow {
                account: (*account).to_string(),
                value: *value,
                period: *period,
            });
        }
        table
    }

    fn sample(options: &ReportOptions) -> FlowTable {
        table(
            options,
            &[
                ("Income:Salary", p(2020, 1), dec!(2000)),
                ("Expenses:Rent", p(2020, 1), dec!(-800)),
                ("Expenses:Food", p(2020, 1), dec!(-120.40)),
                ("Expenses:Food", p(2020, 3), dec!(-99.6)),
                ("Income:Salary", p(2020, 3), dec!(2000)),
                ("Expenses:Rent", p(2020, 4), dec!(-800)),
            ],
        )
    }

    #[test]
    fn test_plain_layout_is_one_sorted_block() {
        let out = render(&sample(&ReportOptions::default()), Layout::Plain).unwrap();
        assert_eq!(
            out,
            ",2020-01,2020-03\n\
             Expenses:Food,-120.4,-99.6\n\
             Expenses:Rent,-800,0\n\
             Income:Salary,2000,2000\n"
        );
    }

    #[test]
    fn test_averaged_layout_groups_by_sign() {
        let out = render(&sample(&ReportOptions::default()), Layout::Averaged).unwrap();
        assert_eq!(
            out,
            ",Average,2020-01,2020-03\n\
             Income:Salary,1333.33,2000,2000\n\
             Expenses:Food,-73.33,-120.4,-99.6\n\
             Expenses:Rent,-800,-800,0\n"
        );
    }

    #[test]
    fn test_spreadsheet_layout() {
        let out = render(&sample(&ReportOptions::default()), Layout::Spreadsheet).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                ",Average,Line,Percent,2020-01,2020-03",
                "Total,=SUM(E2:F2)/3,=SPARKLINE(E2:F2),,=E3+E4,=F3+F4",
                "Positive,=SUM(E3:F3)/3,=SPARKLINE(E3:F3),,=SUM(E5:E5),=SUM(F5:F5)",
                "Negative,=SUM(E4:F4)/3,=SPARKLINE(E4:F4),,=SUM(E6:E7),=SUM(F6:F7)",
                "Income:Salary,=SUM(E5:F5)/3,=SPARKLINE(E5:F5),=B5/B3,2000,2000",
                "Expenses:Food,=SUM(E6:F6)/3,=SPARKLINE(E6:F6),=B6/B4,-120.4,-99.6",
                "Expenses:Rent,=SUM(E7:E7)/1,=SPARKLINE(E7:F7),=B7/B4,-800,0",
            ]
        );
    }

    #[test]
    fn test_spreadsheet_column_average() {
        let options = ReportOptions::builder()
            .averaging(AverageDivisor::Columns)
            .build()
            .unwrap();
        let out = render(&sample(&options), Layout::Spreadsheet).unwrap();
        assert!(out.contains("Income:Salary,=AVERAGE(E5:F5),"));
        assert!(out.contains("Total,=AVERAGE(E2:F2),"));
    }

    #[test]
    fn test_spreadsheet_undivided_prints_accumulators() {
        let options = ReportOptions::builder()
            .partition(PartitionMode::Undivided)
            .build()
            .unwrap();
        let out = render(&sample(&options), Layout::Spreadsheet).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "Positive,=SUM(E3:F3)/3,=SPARKLINE(E3:F3),,2000,2000");
        assert_eq!(lines[3], "Negative,=SUM(E4:F4)/3,=SPARKLINE(E4:F4),,-920.4,-99.6");
        assert_eq!(lines[4], "Expenses:Food,=SUM(E5:F5)/3,=SPARKLINE(E5:F5),=B5/B2,-120.4,-99.6");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_spreadsheet_empty_group_sums_to_zero() {
        let options = ReportOptions::default();
        let t = table(&options, &[("Income:Salary", p(2020, 2), dec!(10))]);
        let out = render(&t, Layout::Spreadsheet).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "Positive,=SUM(E3:E3)/1,=SPARKLINE(E3:E3),,=SUM(E5:E5)");
        assert_eq!(lines[3], "Negative,=SUM(E4:E4)/1,=SPARKLINE(E4:E4),,0");
    }

    #[test]
    fn test_spreadsheet_without_periods() {
        let out = render(&table(&ReportOptions::default(), &[]), Layout::Spreadsheet).unwrap();
        assert_eq!(
            out,
            ",Average,Line,Percent\nTotal,0,,\nPositive,0,,\nNegative,0,,\n"
        );
    }

    #[test]
    fn test_names_with_commas_are_quoted() {
        let options = ReportOptions::default();
        let t = table(&options, &[("Expenses:Food, Drinks", p(2020, 1), dec!(-3))]);
        let out = render(&t, Layout::Plain).unwrap();
        assert!(out.contains("\"Expenses:Food, Drinks\",-3"));
    }

    #[test]
    fn test_write_report_failure_is_io_error() {
        let err = write_report(Path::new("/nonexistent/dir/flux.csv"), "x").unwrap_err();
        assert!(matches!(err, FluxError::Io { .. }));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flux.csv");
        write_report(&path, ",2020-01\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), ",2020-01\n");
    }
}
