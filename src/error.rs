use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalaryGenError {
    #[error("Config directory not found at {0}. Run 'salarygen init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Please select a month first")]
    MissingMonth,

    #[error("Invalid month '{0}'. Expected YYYY-MM (e.g., 2025-03)")]
    InvalidMonth(String),

    #[error("Please select a staff member first (use --staff <id>)")]
    MissingStaff,

    #[error("Your session has no staff id. Log in again with 'salarygen login'.")]
    SessionWithoutStaffId,

    #[error("Invalid id '{0}'. Ids cannot contain '/', '?', '#', '%' or spaces")]
    InvalidId(String),

    #[error("Unknown salary component '{0}'. Expected one of: DA, HRA, SPECIAL_ALLOWANCE, TRANSPORT_ALLOWANCE, MEDICAL_ALLOWANCE, PF, ESI, PT, TDS, OTHER_DEDUCTIONS")]
    InvalidComponentName(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD (e.g., 2025-04-01)")]
    InvalidDate(String),

    #[error("Invalid year '{0}'. Expected four digits (e.g., 2025)")]
    InvalidYear(String),

    #[error("Invalid month '{0}'. Expected a number from 1 to 12")]
    InvalidMonthNumber(String),

    #[error("Username and password are required.")]
    MissingCredentials,

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Please enter month and year.")]
    InvalidAuditFilter,

    #[error("Not logged in. Run 'salarygen login' first.")]
    NotLoggedIn,

    #[error("Role '{role}' is not allowed to {action}")]
    Forbidden { role: String, action: String },

    #[error("Unexpected user role. Contact support.")]
    UnexpectedRole,

    #[error("Request to {path} failed: {message}")]
    Http { path: String, message: String },

    #[error("Request to {path} failed with HTTP {status}")]
    Status { status: u16, path: String },

    #[error("Unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("No reports to export")]
    NoReports,

    #[error("No salary record with id '{0}' in the current result set")]
    RowNotFound(String),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate payslip: {0}")]
    PdfGeneration(String),

    #[error("Logo file not found: {0}")]
    LogoNotFound(PathBuf),

    #[error("Failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SalaryGenError>;
