use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error};

use crate::error::{Result, SalaryGenError};
use crate::payslip::PayslipDocument;

/// Embedded Typst template for payslips.
/// `DATA_JSON_PATH` and `LOGO_PATH` are replaced before compiling.
const PAYSLIP_TEMPLATE: &str = r##"// Payslip Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (x: 40pt, y: 40pt),
)

#set text(font: "Helvetica", size: 11pt)

// Header: company and staff
#table(
  columns: (40%, 1fr),
  stroke: 0.5pt + black,
  inset: 6pt,
  align: (center + horizon, left + horizon),
  [
    #text(size: 14pt, weight: "bold")[#data.header.company]
    #if data.header.has_logo [
      #box(image("LOGO_PATH", height: 12pt))
    ]
  ],
  [Name: #data.header.staff_name],
  [#text(size: 12pt)[Salary Slip for #data.header.salary_month]],
  [Emp. No: #data.header.employee_number],
)

#v(20pt)

// Identity and bank details
#table(
  columns: (13%, 14%, 14%, 1fr, 15%, 15%),
  stroke: 0.4pt + black,
  inset: 6pt,
  align: center + horizon,
  fill: (x, y) => if y == 0 { luma(220) } else { none },
  text(size: 10pt, weight: "bold")[Dept],
  text(size: 10pt, weight: "bold")[Join-Date],
  text(size: 10pt, weight: "bold")[Relieved Date],
  text(size: 10pt, weight: "bold")[Bank Name],
  text(size: 10pt, weight: "bold")[IFSC Code],
  text(size: 10pt, weight: "bold")[AC_NUM],
  text(size: 10pt)[#data.identity.department],
  text(size: 10pt)[#data.identity.joining_date],
  text(size: 10pt)[#data.identity.relieved_date],
  text(size: 10pt)[#data.identity.bank_name],
  text(size: 10pt)[#data.identity.ifsc_code],
  text(size: 10pt)[#data.identity.account_number],
)

#v(20pt)

// Earnings and deductions
#table(
  columns: (1fr, auto, 1fr, auto),
  stroke: 0.3pt + black,
  inset: 6pt,
  align: (left, right, left, right),
  fill: (x, y) => if y == 0 { luma(200) } else if calc.rem(y, 2) == 1 { luma(245) } else { none },

  [*Earnings*], [*Amount*], [*Deductions*], [*Amount*],

  ..data.lines.map(row => (
    row.earning,
    row.earning_amount,
    row.deduction,
    row.deduction_amount,
  )).flatten()
)

#v(10pt)

// Totals
#table(
  columns: (1fr, auto),
  stroke: 0.3pt + black,
  inset: 6pt,
  align: (left, right),
  [*Gross Salary*], [*#data.totals.gross*],
  [*Total Deductions*], [*#data.totals.deductions*],
  [*Net Pay*], [*#data.totals.net*],
)

#v(10pt)

#table(
  columns: (1fr,),
  stroke: 0.3pt + black,
  inset: 6pt,
  [Amount in Words: #data.amount_in_words],
)

#v(20pt)

#align(center)[
  #set text(size: 9pt, fill: luma(100))
  #for note in data.footer [
    #note \
  ]
]
"##;

/// Scratch directory for one render; concurrent runs never share files
fn work_dir() -> PathBuf {
    std::env::temp_dir().join(format!("salarygen-{}", std::process::id()))
}

/// Render a payslip to `output_path` using the Typst CLI.
///
/// The document is compiled in one step, so a failure leaves no partial file
/// at `output_path`.
pub fn generate_payslip_pdf(
    doc: &PayslipDocument,
    logo: Option<&Path>,
    output_path: &Path,
) -> Result<()> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(SalaryGenError::TypstNotFound);
    }

    if let Some(missing) = logo.filter(|l| !l.exists()) {
        return Err(SalaryGenError::LogoNotFound(missing.to_path_buf()));
    }

    let temp_dir = work_dir();
    std::fs::create_dir_all(&temp_dir)?;

    let json_data = serde_json::to_string(doc)
        .map_err(|e| SalaryGenError::PdfGeneration(e.to_string()))?;
    let json_path = temp_dir.join("payslip.json");
    std::fs::write(&json_path, &json_data)?;

    // Typst only reads files under --root, so the logo is copied alongside
    let mut template = PAYSLIP_TEMPLATE.replace("DATA_JSON_PATH", "payslip.json");
    if let Some(logo) = logo {
        let ext = logo
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let name = format!("logo.{ext}");
        std::fs::copy(logo, temp_dir.join(&name))?;
        template = template.replace("LOGO_PATH", &name);
    }

    let template_path = temp_dir.join("payslip.typ");
    std::fs::write(&template_path, &template)?;

    debug!(output = %output_path.display(), "compiling payslip");
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    let _ = std::fs::remove_dir_all(&temp_dir);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(stderr = %stderr, "typst compile failed");
        return Err(SalaryGenError::PdfGeneration(stderr.to_string()));
    }

    Ok(())
}
