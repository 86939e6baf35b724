use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use salarygen::api::{login, register, HttpBackend};
use salarygen::audit::{fetch_audit_logs, select_logs, AuditFilter, AuditLog};
use salarygen::components::{
    create_component, delete_component, fetch_components, update_component, ComponentDraft,
    ComponentFilter, ComponentType, SalaryComponent,
};
use salarygen::config::{
    clear_session, config_dir, load_config, load_session, require_session, resolve_path,
    save_session, session::ANY_ROLE, session::MANAGERS, Config, Session, CONFIG_TEMPLATE,
};
use salarygen::error::{Result, SalaryGenError};
use salarygen::export::export_report;
use salarygen::generate::{generate_salaries, SalaryPeriod};
use salarygen::payslip::{export_payslip, format_inr};
use salarygen::report::{
    fetch_staff, staff_status, EnrichedReportRow, ReportQuery, ReportSession, ReportType,
    SalaryTransaction, SortField, StaffDirectory, StaffRecord, PAYSLIP_PAGE_SIZE,
    REPORT_PAGE_SIZE,
};

#[derive(Parser)]
#[command(name = "salarygen")]
#[command(version, about = "Payroll reports, payslips and spreadsheet exports", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.salarygen or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Search, sort, paging and per-row actions shared by the table screens
#[derive(Args)]
struct ViewArgs {
    /// Case-insensitive search over staff name, staff id, month and status
    #[arg(short, long)]
    search: Option<String>,

    /// Sort column; repeat the same column to flip the direction
    #[arg(long, value_enum)]
    sort: Vec<SortField>,

    /// Page to show (out-of-range pages are clamped)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Render the payslip PDF of this salary transaction id
    #[arg(long, value_name = "TRANSACTION_ID")]
    payslip: Option<String>,

    /// Open generated files with the system default viewer
    #[arg(long)]
    open: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PayslipMode {
    Latest,
    Month,
    All,
}

/// Fields of a salary component form
#[derive(Args)]
struct ComponentArgs {
    /// Component name (DA, HRA, SPECIAL_ALLOWANCE, TRANSPORT_ALLOWANCE, MEDICAL_ALLOWANCE, PF, ESI, PT, TDS, OTHER_DEDUCTIONS)
    #[arg(short, long)]
    name: String,

    #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
    component_type: ComponentType,

    #[arg(long)]
    percentage: Option<f64>,

    #[arg(long)]
    fixed_amount: Option<f64>,

    /// Date the component applies from, as YYYY-MM-DD
    #[arg(short, long)]
    effective_date: String,
}

impl ComponentArgs {
    fn draft(&self) -> Result<ComponentDraft> {
        ComponentDraft::new(
            &self.name,
            self.component_type,
            self.fixed_amount,
            self.percentage,
            &self.effective_date,
        )
    }
}

#[derive(Subcommand)]
enum ComponentAction {
    /// List salary components, newest effective date first
    List {
        /// Case-insensitive search over the component name
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
        component_type: Option<ComponentType>,
    },

    /// Add a salary component
    Add(ComponentArgs),

    /// Replace a salary component
    Update {
        id: String,

        #[command(flatten)]
        fields: ComponentArgs,
    },

    /// Delete a salary component
    Delete { id: String },
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create a user account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List staff members
    Staff,

    /// Salary report over one of the six report types
    Report {
        /// Report type, by label ("All Staff - Latest Month") or name (all-staff-latest-month)
        #[arg(short = 't', long = "type", value_parser = parse_report_type)]
        report_type: ReportType,

        /// Staff id, for the Specific Staff reports
        #[arg(long)]
        staff: Option<String>,

        /// Month as YYYY-MM, for the Specific Month reports
        #[arg(short, long)]
        month: Option<String>,

        /// Export the full filtered result set to SalaryReports.xlsx
        #[arg(long)]
        export_xlsx: bool,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Payslips of one staff member (your own when logged in as staff)
    Payslips {
        #[arg(value_enum, default_value_t = PayslipMode::Latest)]
        mode: PayslipMode,

        /// Month as YYYY-MM, for `month` mode
        #[arg(short, long)]
        month: Option<String>,

        /// Staff id (Admin and HR only)
        #[arg(long)]
        staff: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Generate salaries for a month
    Generate {
        /// Four-digit year
        #[arg(short, long)]
        year: String,

        /// Month number, 1 to 12
        #[arg(short, long)]
        month: String,
    },

    /// Manage salary components (allowances and deductions)
    Components {
        #[command(subcommand)]
        action: ComponentAction,
    },

    /// Show audit logs, most recent first
    AuditLogs {
        #[arg(long)]
        month: Option<u32>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        day: Option<u32>,
    },
}

fn parse_report_type(raw: &str) -> std::result::Result<ReportType, String> {
    raw.parse()
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("salarygen={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Login { username, password } => cmd_login(&cfg_dir, &username, &password),
        Commands::Register { username, password } => {
            cmd_register(&cfg_dir, &username, &password)
        }
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::Whoami => cmd_whoami(&cfg_dir),
        Commands::Staff => cmd_staff(&cfg_dir),
        Commands::Report {
            report_type,
            staff,
            month,
            export_xlsx,
            view,
        } => cmd_report(&cfg_dir, report_type, staff, month, export_xlsx, &view),
        Commands::Payslips {
            mode,
            month,
            staff,
            view,
        } => cmd_payslips(&cfg_dir, mode, month, staff, &view),
        Commands::Generate { year, month } => cmd_generate(&cfg_dir, &year, &month),
        Commands::Components { action } => cmd_components(&cfg_dir, action),
        Commands::AuditLogs { month, year, day } => {
            cmd_audit_logs(&cfg_dir, AuditFilter { month, year, day })
        }
    }
}

/// Initialize config directory with the template config
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(SalaryGenError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized salarygen config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your payroll API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Log in:                        salarygen login -u <username> -p <password>");

    Ok(())
}

fn cmd_login(cfg_dir: &Path, username: &str, password: &str) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let auth = HttpBackend::new(&config.api.auth_url, config.api.timeout_secs, None);

    let session = match login(&auth, username, password) {
        Ok(session) => session,
        Err(e) => {
            if matches!(e, SalaryGenError::UnexpectedRole) {
                clear_session(cfg_dir)?;
            }
            return Err(e);
        }
    };

    save_session(cfg_dir, &session)?;
    println!("Logged in as {} ({})", session.display_name, session.role);
    Ok(())
}

fn cmd_register(cfg_dir: &Path, username: &str, password: &str) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let auth = HttpBackend::new(&config.api.auth_url, config.api.timeout_secs, None);

    register(&auth, username, password)?;
    println!("Registered {username}. Log in with 'salarygen login'.");
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    clear_session(cfg_dir)?;
    println!("Logged out.");
    Ok(())
}

fn cmd_whoami(cfg_dir: &Path) -> Result<()> {
    let session = load_session(cfg_dir)?.ok_or(SalaryGenError::NotLoggedIn)?;
    println!("User:     {}", session.display_name);
    println!("Role:     {}", session.role);
    if let Some(staff_id) = &session.staff_id {
        println!("Staff ID: {staff_id}");
    }
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "STAFF ID")]
    staff_id: String,
    #[tabled(rename = "STAFF NAME")]
    staff_name: String,
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "NET SALARY")]
    net_salary: String,
}

impl From<&EnrichedReportRow> for ReportRow {
    fn from(row: &EnrichedReportRow) -> Self {
        Self {
            id: row.id().map(|id| id.to_string()).unwrap_or_default(),
            staff_id: row.staff_id().map(|id| id.to_string()).unwrap_or_default(),
            staff_name: row.staff_name.clone(),
            month: row.salary_month().to_string(),
            status: row.status.to_string(),
            net_salary: money(row.net_salary),
        }
    }
}

#[derive(Tabled)]
struct StaffRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DEPARTMENT")]
    department: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct GeneratedRow {
    #[tabled(rename = "STAFF ID")]
    staff_id: String,
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "BASIC")]
    basic: String,
    #[tabled(rename = "GROSS")]
    gross: String,
    #[tabled(rename = "DEDUCTIONS")]
    deductions: String,
    #[tabled(rename = "NET")]
    net: String,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "ENTITY")]
    entity: String,
    #[tabled(rename = "ENTITY ID")]
    entity_id: String,
    #[tabled(rename = "TIMESTAMP")]
    timestamp: String,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "COMPONENT TYPE")]
    component_type: String,
    #[tabled(rename = "PERCENTAGE")]
    percentage: String,
    #[tabled(rename = "FIXED AMOUNT")]
    fixed_amount: String,
    #[tabled(rename = "EFFECTIVE DATE")]
    effective_date: String,
}

fn money(value: Option<f64>) -> String {
    value.map(format_inr).unwrap_or_else(|| "-".to_string())
}

fn number_or_na(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "NA".to_string())
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "NA".to_string())
}

fn backend_for(config: &Config, session: &Session) -> HttpBackend {
    HttpBackend::from_settings(&config.api, Some(session.token.clone()))
}

/// Load the staff directory into `report`; names fall back to ids when it fails
fn load_directory(backend: &HttpBackend, report: &mut ReportSession) {
    match fetch_staff(backend) {
        Ok(staff) => report.set_directory(StaffDirectory::new(staff)),
        Err(e) => warn!(error = %e, "staff directory unavailable, showing staff ids"),
    }
}

fn apply_view(report: &mut ReportSession, view: &ViewArgs) {
    if let Some(query) = &view.search {
        report.set_search(query.as_str());
    }
    for field in &view.sort {
        report.select_sort(*field);
    }
    report.go_to(view.page);
}

fn print_page(report: &ReportSession) {
    let page = report.current_page();
    let rows: Vec<ReportRow> = page.rows.iter().map(|row| ReportRow::from(*row)).collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Page {} of {}", page.page, page.total_pages);
    println!("Showing {} of {} results", page.shown_through(), page.total_rows);
}

fn output_dir(config: &Config, cfg_dir: &Path) -> PathBuf {
    resolve_path(&config.output.output_dir, cfg_dir)
}

/// Render the payslip of one row from the current result set
fn write_payslip(
    cfg_dir: &Path,
    config: &Config,
    backend: &HttpBackend,
    report: &ReportSession,
    transaction_id: &str,
    open: bool,
) -> Result<()> {
    let row = report
        .find(transaction_id)
        .ok_or_else(|| SalaryGenError::RowNotFound(transaction_id.to_string()))?;
    let logo = config
        .company
        .logo
        .as_deref()
        .map(|logo| resolve_path(logo, cfg_dir));

    let pdf_path = export_payslip(
        backend,
        row,
        &config.company.name,
        logo.as_deref(),
        &output_dir(config, cfg_dir),
    )?;

    println!("Payslip saved: {}", pdf_path.display());
    if open {
        open_path(&pdf_path)?;
    }
    Ok(())
}

fn cmd_report(
    cfg_dir: &Path,
    report_type: ReportType,
    staff: Option<String>,
    month: Option<String>,
    export_xlsx: bool,
    view: &ViewArgs,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let session = require_session(cfg_dir, MANAGERS, "view salary reports")?;

    let mut query = ReportQuery::new(report_type);
    if let Some(staff) = staff {
        query = query.staff(staff);
    }
    if let Some(month) = month {
        query = query.month(month);
    }
    // Validation errors must not cost a request
    query.build()?;

    let backend = backend_for(&config, &session);
    let mut report = ReportSession::new(REPORT_PAGE_SIZE);
    load_directory(&backend, &mut report);
    report.load(query.fetch(&backend)?);
    apply_view(&mut report, view);

    println!("{report_type}");
    print_page(&report);

    if export_xlsx {
        let path = export_report(&report.export_rows(), &output_dir(&config, cfg_dir))?;
        println!("Report saved: {}", path.display());
        if view.open {
            open_path(&path)?;
        }
    }

    if let Some(transaction_id) = &view.payslip {
        write_payslip(cfg_dir, &config, &backend, &report, transaction_id, view.open)?;
    }

    Ok(())
}

fn cmd_payslips(
    cfg_dir: &Path,
    mode: PayslipMode,
    month: Option<String>,
    staff: Option<String>,
    view: &ViewArgs,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let session = require_session(cfg_dir, ANY_ROLE, "view payslips")?;

    let staff_id = session.payslip_staff_id(staff)?;

    let report_type = match mode {
        PayslipMode::Latest => ReportType::SpecificStaffLatestMonth,
        PayslipMode::Month => ReportType::SpecificStaffSpecificMonth,
        PayslipMode::All => ReportType::SpecificStaffAllMonths,
    };
    let mut query = ReportQuery::new(report_type).staff(staff_id);
    if let Some(month) = month {
        query = query.month(month);
    }
    query.build()?;

    let backend = backend_for(&config, &session);
    let mut report = ReportSession::new(PAYSLIP_PAGE_SIZE);
    report.load(query.fetch(&backend)?);

    if report.rows().is_empty() {
        match (mode, query.month.as_deref()) {
            (PayslipMode::Month, Some(month)) => println!("No salary found for {month}"),
            _ => println!("No salary records found."),
        }
        return Ok(());
    }

    apply_view(&mut report, view);
    print_page(&report);

    if let Some(transaction_id) = &view.payslip {
        write_payslip(cfg_dir, &config, &backend, &report, transaction_id, view.open)?;
    }

    Ok(())
}

fn cmd_staff(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let session = require_session(cfg_dir, MANAGERS, "list staff")?;
    let staff = fetch_staff(&backend_for(&config, &session))?;

    if staff.is_empty() {
        println!("No staff found.");
        return Ok(());
    }

    let rows: Vec<StaffRow> = staff.iter().map(staff_row).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} staff", staff.len());

    Ok(())
}

fn staff_row(staff: &StaffRecord) -> StaffRow {
    StaffRow {
        id: staff.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        name: staff.display_name().unwrap_or_else(|| "-".to_string()),
        department: or_na(staff.department.clone()),
        status: staff_status(staff).to_string(),
    }
}

fn cmd_generate(cfg_dir: &Path, year: &str, month: &str) -> Result<()> {
    let period = SalaryPeriod::parse(year, month)?;
    let config = load_config(cfg_dir)?;
    let session = require_session(cfg_dir, MANAGERS, "generate salaries")?;

    let generated = generate_salaries(&backend_for(&config, &session), period)?;
    if generated.is_empty() {
        println!("No salaries generated for {}-{:02}.", period.year, period.month);
        return Ok(());
    }

    let rows: Vec<GeneratedRow> = generated.iter().map(generated_row).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!(
        "Generated {} salaries for {}-{:02}",
        generated.len(),
        period.year,
        period.month
    );

    Ok(())
}

fn generated_row(tx: &SalaryTransaction) -> GeneratedRow {
    GeneratedRow {
        staff_id: tx.owner_id().map(|id| id.to_string()).unwrap_or_default(),
        month: tx.salary_month.clone().unwrap_or_default(),
        basic: money(tx.basic_pay),
        gross: money(tx.gross_salary),
        deductions: money(tx.total_deductions),
        net: money(tx.net_salary),
    }
}

fn cmd_components(cfg_dir: &Path, action: ComponentAction) -> Result<()> {
    match action {
        ComponentAction::List {
            search,
            component_type,
        } => {
            let filter = ComponentFilter {
                search,
                component_type,
            };
            let components = filter.apply(fetch_components(&components_backend(cfg_dir)?)?);
            if components.is_empty() {
                println!("No salary components found");
                return Ok(());
            }

            let rows: Vec<ComponentRow> = components.iter().map(component_row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
            println!();
            println!("Total: {} components", components.len());
        }
        ComponentAction::Add(fields) => {
            let draft = fields.draft()?;
            create_component(&components_backend(cfg_dir)?, &draft)?;
            println!("Added salary component {}", draft.name);
        }
        ComponentAction::Update { id, fields } => {
            let draft = fields.draft()?;
            update_component(&components_backend(cfg_dir)?, &id, &draft)?;
            println!("Updated salary component {id}");
        }
        ComponentAction::Delete { id } => {
            delete_component(&components_backend(cfg_dir)?, &id)?;
            println!("Deleted salary component {id}");
        }
    }

    Ok(())
}

fn components_backend(cfg_dir: &Path) -> Result<HttpBackend> {
    let config = load_config(cfg_dir)?;
    let session = require_session(cfg_dir, MANAGERS, "manage salary components")?;
    Ok(backend_for(&config, &session))
}

fn component_row(component: &SalaryComponent) -> ComponentRow {
    ComponentRow {
        id: component.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        name: or_na(component.name.clone()),
        component_type: or_na(component.component_type.clone()),
        percentage: number_or_na(component.percentage),
        fixed_amount: number_or_na(component.fixed_amount),
        effective_date: or_na(component.effective_day().map(str::to_string)),
    }
}

fn cmd_audit_logs(cfg_dir: &Path, filter: AuditFilter) -> Result<()> {
    filter.validate()?;
    let config = load_config(cfg_dir)?;
    let session = require_session(cfg_dir, MANAGERS, "view audit logs")?;

    let logs = select_logs(fetch_audit_logs(&backend_for(&config, &session))?, &filter)?;

    println!("{}", filter.heading());
    if logs.is_empty() {
        println!("No logs found.");
        return Ok(());
    }

    let rows: Vec<AuditRow> = logs.into_iter().map(audit_row).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn audit_row(log: AuditLog) -> AuditRow {
    AuditRow {
        entity_id: or_na(log.entity_id()),
        user: or_na(log.username),
        action: or_na(log.action),
        entity: or_na(log.entity_name),
        timestamp: or_na(log.timestamp),
    }
}

fn open_path(path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", path.to_str().unwrap_or("")])
            .spawn()?;
    }
    Ok(())
}
