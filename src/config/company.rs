use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub company: Company,
    pub api: ApiSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    /// Image placed next to the company name on payslips
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    /// Payroll backend (staff, salary transactions, audit logs)
    pub base_url: String,
    /// Authentication service serving `/login`
    pub auth_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputSettings {
    pub output_dir: String,
}

fn default_timeout_secs() -> u64 {
    30
}
