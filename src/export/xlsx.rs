use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::path::Path;
use tracing::info;

use super::sheet::{ReportSheet, COLUMN_WIDTHS, HEADERS, MONEY_COLUMNS, SHEET_NAME};
use crate::error::Result;

const RUPEE_FORMAT: &str = "\"₹\"#,##0.00";

/// Write the sheet to `path`. The workbook is built in memory and saved once.
pub fn write_report_xlsx(sheet: &ReportSheet, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let header = Format::new().set_bold().set_align(FormatAlign::Center);
    let text = Format::new().set_align(FormatAlign::Center);
    let money = Format::new()
        .set_num_format(RUPEE_FORMAT)
        .set_align(FormatAlign::Center);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, width)?;
        worksheet.write_string_with_format(0, col, *title, &header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (idx, row) in sheet.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        worksheet.write_string_with_format(r, 0, row.employee_name.as_str(), &text)?;
        worksheet.write_string_with_format(r, 1, row.employee_id.as_str(), &text)?;
        worksheet.write_string_with_format(r, 2, row.salary_month.as_str(), &text)?;

        for (col, amount) in MONEY_COLUMNS.zip(row.amounts()) {
            let col = col as u16;
            match amount {
                Some(value) => worksheet.write_number_with_format(r, col, value, &money)?,
                None => worksheet.write_blank(r, col, &money)?,
            };
        }
    }

    workbook.save(path)?;
    info!(path = %path.display(), rows = sheet.rows.len(), "report spreadsheet written");
    Ok(())
}
