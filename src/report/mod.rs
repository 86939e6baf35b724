mod model;
mod normalize;
mod query;
mod view;

pub use model::{
    amount_from_value, is_deduction, EmploymentStatus, EnrichedReportRow, Id, SalaryDetails,
    SalaryTransaction, StaffRecord, DEDUCTION_KEYS,
};
pub(crate) use model::{lenient_amount, lenient_id, lenient_text};
pub use normalize::{
    classify_status, enrich, enrich_row, resolve_net_salary, resolve_staff_name, resolve_status,
    staff_status, StaffDirectory,
};
pub use query::{validate_month, ReportQuery, ReportType};
pub use view::{
    Page, ReportSession, SortDirection, SortField, SortState, TableView, PAYSLIP_PAGE_SIZE,
    REPORT_PAGE_SIZE,
};

use crate::api::{decode_list, Backend, STAFF_PATH};
use crate::error::Result;

/// Fetch the staff directory used to resolve names
pub fn fetch_staff(backend: &dyn Backend) -> Result<Vec<StaffRecord>> {
    decode_list(STAFF_PATH, backend.get(STAFF_PATH)?)
}
