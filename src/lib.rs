pub mod api;
pub mod audit;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod payslip;
pub mod pdf;
pub mod report;

pub use config::{Config, Role, Session};
pub use error::{Result, SalaryGenError};
pub use report::{EnrichedReportRow, ReportQuery, ReportSession, ReportType, SalaryTransaction};
