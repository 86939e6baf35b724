use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::model::SalaryTransaction;
use crate::api::{decode_list, path_segment, Backend, TRANSACTIONS_PATH};
use crate::error::{Result, SalaryGenError};

/// Which slice of salary transactions a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportType {
    AllStaffAllMonths,
    AllStaffSpecificMonth,
    AllStaffLatestMonth,
    SpecificStaffAllMonths,
    SpecificStaffSpecificMonth,
    SpecificStaffLatestMonth,
}

impl ReportType {
    pub const ALL: [ReportType; 6] = [
        ReportType::AllStaffAllMonths,
        ReportType::AllStaffSpecificMonth,
        ReportType::AllStaffLatestMonth,
        ReportType::SpecificStaffAllMonths,
        ReportType::SpecificStaffSpecificMonth,
        ReportType::SpecificStaffLatestMonth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReportType::AllStaffAllMonths => "All Staff - All Months",
            ReportType::AllStaffSpecificMonth => "All Staff - Specific Month",
            ReportType::AllStaffLatestMonth => "All Staff - Latest Month",
            ReportType::SpecificStaffAllMonths => "Specific Staff - All Months",
            ReportType::SpecificStaffSpecificMonth => "Specific Staff - Specific Month",
            ReportType::SpecificStaffLatestMonth => "Specific Staff - Latest Month",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportType {
    type Err = String;

    /// Accepts the display label or the kebab-case name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportType::ALL
            .into_iter()
            .find(|t| {
                t.label().eq_ignore_ascii_case(wanted)
                    || t.to_possible_value()
                        .is_some_and(|v| v.get_name().eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| format!("unknown report type '{wanted}'"))
    }
}

/// Check a `YYYY-MM` month value
pub fn validate_month(month: &str) -> Result<()> {
    let invalid = || SalaryGenError::InvalidMonth(month.to_string());
    let (year, mm) = month.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if mm.len() != 2 || !mm.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    match mm.parse::<u32>() {
        Ok(1..=12) => Ok(()),
        _ => Err(invalid()),
    }
}

/// A report request: type plus the inputs some types require
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub report_type: ReportType,
    pub staff_id: Option<String>,
    pub month: Option<String>,
}

impl ReportQuery {
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            staff_id: None,
            month: None,
        }
    }

    pub fn staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    pub fn month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }

    fn required_month(&self) -> Result<&str> {
        let month = self
            .month
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(SalaryGenError::MissingMonth)?;
        validate_month(month)?;
        Ok(month)
    }

    fn required_staff(&self) -> Result<&str> {
        let staff = self
            .staff_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SalaryGenError::MissingStaff)?;
        path_segment(staff)
    }

    /// Validate the inputs and produce the request path
    pub fn build(&self) -> Result<String> {
        let path = match self.report_type {
            ReportType::AllStaffAllMonths => TRANSACTIONS_PATH.to_string(),
            ReportType::AllStaffSpecificMonth => {
                format!("{TRANSACTIONS_PATH}/month?month={}", self.required_month()?)
            }
            ReportType::AllStaffLatestMonth => format!("{TRANSACTIONS_PATH}/latest"),
            ReportType::SpecificStaffAllMonths => {
                format!("{TRANSACTIONS_PATH}/staff/{}/all", self.required_staff()?)
            }
            ReportType::SpecificStaffSpecificMonth => {
                let month = self.required_month()?;
                let staff = self.required_staff()?;
                format!("{TRANSACTIONS_PATH}/staff/{staff}/month?month={month}")
            }
            ReportType::SpecificStaffLatestMonth => {
                format!("{TRANSACTIONS_PATH}/staff/{}/latest", self.required_staff()?)
            }
        };
        Ok(path)
    }

    /// Validate, then issue exactly one request and coerce the response to a list
    pub fn fetch(&self, backend: &dyn Backend) -> Result<Vec<SalaryTransaction>> {
        let path = self.build()?;
        debug!(report = %self.report_type, path = %path, "fetching report");
        decode_list(&path, backend.get(&path)?)
    }
}
