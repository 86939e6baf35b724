use clap::ValueEnum;
use std::cmp::Ordering;

use super::model::{EnrichedReportRow, SalaryTransaction};
use super::normalize::{enrich, StaffDirectory};

/// Rows per page on the admin report screen
pub const REPORT_PAGE_SIZE: usize = 10;
/// Rows per page on the staff payslip screen
pub const PAYSLIP_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    #[default]
    Id,
    StaffName,
    SalaryMonth,
    NetSalary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    /// Re-selecting the current field flips direction; a new field sorts ascending
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flip();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }

    fn compare(&self, a: &EnrichedReportRow, b: &EnrichedReportRow) -> Ordering {
        let ordering = match self.field {
            SortField::Id => numeric_id(a).total_cmp(&numeric_id(b)),
            SortField::StaffName => a
                .staff_name
                .to_lowercase()
                .cmp(&b.staff_name.to_lowercase()),
            SortField::SalaryMonth => a.salary_month().cmp(b.salary_month()),
            SortField::NetSalary => a
                .net_salary
                .unwrap_or(0.0)
                .total_cmp(&b.net_salary.unwrap_or(0.0)),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn numeric_id(row: &EnrichedReportRow) -> f64 {
    row.id().and_then(|id| id.as_number()).unwrap_or(0.0)
}

fn matches_query(row: &EnrichedReportRow, needle: &str) -> bool {
    let staff_id = row.staff_id().map(|id| id.to_string()).unwrap_or_default();
    [
        row.staff_name.as_str(),
        staff_id.as_str(),
        row.salary_month(),
        row.status.label(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// One page of a table view
#[derive(Debug)]
pub struct Page<'a> {
    pub rows: Vec<&'a EnrichedReportRow>,
    /// 1-based, already clamped
    pub page: usize,
    pub total_pages: usize,
    /// Rows after filtering, across all pages
    pub total_rows: usize,
    pub page_size: usize,
}

impl Page<'_> {
    /// Count of rows up to and including this page
    pub fn shown_through(&self) -> usize {
        (self.page * self.page_size).min(self.total_rows)
    }
}

/// Filter, sort and paginate enriched rows. Nothing is cached; every call
/// recomputes from the inputs.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    rows: &'a [EnrichedReportRow],
    query: &'a str,
    sort: SortState,
    page_size: usize,
}

impl<'a> TableView<'a> {
    pub fn new(rows: &'a [EnrichedReportRow], query: &'a str, sort: SortState, page_size: usize) -> Self {
        Self {
            rows,
            query,
            sort,
            page_size: page_size.max(1),
        }
    }

    /// Every row matching the query, sorted
    pub fn filtered(&self) -> Vec<&'a EnrichedReportRow> {
        let needle = self.query.trim().to_lowercase();
        let mut rows: Vec<&EnrichedReportRow> = self
            .rows
            .iter()
            .filter(|row| needle.is_empty() || matches_query(row, &needle))
            .collect();
        let sort = self.sort;
        rows.sort_by(|a, b| sort.compare(a, b));
        rows
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// The requested page, clamped into range
    pub fn page(&self, requested: usize) -> Page<'a> {
        let filtered = self.filtered();
        let total_rows = filtered.len();
        let total_pages = self.total_pages(total_rows);
        let page = requested.clamp(1, total_pages);
        let rows = filtered
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();

        Page {
            rows,
            page,
            total_pages,
            total_rows,
            page_size: self.page_size,
        }
    }
}

/// State behind one report screen: fetched rows, the staff directory and the
/// current search, sort and page.
#[derive(Debug, Clone)]
pub struct ReportSession {
    raw: Vec<SalaryTransaction>,
    directory: StaffDirectory,
    rows: Vec<EnrichedReportRow>,
    search: String,
    sort: SortState,
    page: usize,
    page_size: usize,
}

impl ReportSession {
    pub fn new(page_size: usize) -> Self {
        Self {
            raw: Vec::new(),
            directory: StaffDirectory::default(),
            rows: Vec::new(),
            search: String::new(),
            sort: SortState::default(),
            page: 1,
            page_size,
        }
    }

    /// Replace the result set after a successful fetch and go back to page 1
    pub fn load(&mut self, raw: Vec<SalaryTransaction>) {
        self.raw = raw;
        self.rows = enrich(&self.raw, &self.directory);
        self.page = 1;
    }

    pub fn set_directory(&mut self, directory: StaffDirectory) {
        self.directory = directory;
        self.rows = enrich(&self.raw, &self.directory);
    }

    /// A new search starts from the first page
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 1;
    }

    pub fn select_sort(&mut self, field: SortField) {
        self.sort.select(field);
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Remember the requested page; it is clamped when the page is derived
    pub fn go_to(&mut self, page: usize) {
        self.page = page;
    }

    pub fn rows(&self) -> &[EnrichedReportRow] {
        &self.rows
    }

    pub fn view(&self) -> TableView<'_> {
        TableView::new(&self.rows, &self.search, self.sort, self.page_size)
    }

    pub fn current_page(&self) -> Page<'_> {
        self.view().page(self.page)
    }

    /// Full filtered and sorted result set, as exported
    pub fn export_rows(&self) -> Vec<&EnrichedReportRow> {
        self.view().filtered()
    }

    /// Look up a row of the filtered result set by transaction id
    pub fn find(&self, transaction_id: &str) -> Option<&EnrichedReportRow> {
        self.export_rows()
            .into_iter()
            .find(|row| row.id().is_some_and(|id| id.as_str() == transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows(values: Vec<Value>) -> Vec<EnrichedReportRow> {
        let raw: Vec<SalaryTransaction> = values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        enrich(&raw, &StaffDirectory::default())
    }

    fn many(n: usize) -> Vec<EnrichedReportRow> {
        rows(
            (1..=n)
                .map(|i| json!({"id": i, "staffId": i, "staffName": format!("Staff {i}"), "salaryMonth": "2025-01"}))
                .collect(),
        )
    }

    #[test]
    fn select_toggles_then_resets() {
        let mut sort = SortState::default();
        sort.select(SortField::Id);
        assert_eq!(sort.direction, SortDirection::Descending);
        sort.select(SortField::Id);
        assert_eq!(sort.direction, SortDirection::Ascending);
        sort.select(SortField::NetSalary);
        sort.select(SortField::StaffName);
        assert_eq!(sort.field, SortField::StaffName);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn net_salary_descending_treats_missing_as_zero() {
        let data = rows(vec![
            json!({"id": 1, "netSalary": 500}),
            json!({"id": 2, "netSalary": null}),
            json!({"id": 3, "netSalary": 1200}),
        ]);
        let sort = SortState {
            field: SortField::NetSalary,
            direction: SortDirection::Descending,
        };
        let ordered: Vec<Option<f64>> = TableView::new(&data, "", sort, 10)
            .filtered()
            .iter()
            .map(|r| r.net_salary)
            .collect();
        assert_eq!(ordered, vec![Some(1200.0), Some(500.0), None]);
    }

    #[test]
    fn ids_sort_numerically_and_names_ignore_case() {
        let data = rows(vec![
            json!({"id": 10, "staffName": "bala"}),
            json!({"id": 9, "staffName": "Arun"}),
            json!({"id": "2", "staffName": "chitra"}),
        ]);
        let by_id: Vec<String> = TableView::new(&data, "", SortState::default(), 10)
            .filtered()
            .iter()
            .map(|r| r.staff_name.clone())
            .collect();
        assert_eq!(by_id, vec!["chitra", "Arun", "bala"]);

        let by_name = SortState {
            field: SortField::StaffName,
            direction: SortDirection::Ascending,
        };
        let names: Vec<String> = TableView::new(&data, "", by_name, 10)
            .filtered()
            .iter()
            .map(|r| r.staff_name.clone())
            .collect();
        assert_eq!(names, vec!["Arun", "bala", "chitra"]);
    }

    #[test]
    fn search_matches_name_id_month_and_status() {
        let data = rows(vec![
            json!({"id": 1, "staffId": 41, "staffName": "Priya", "salaryMonth": "2025-02", "status": "Working"}),
            json!({"id": 2, "staffId": 7, "staffName": "Joseph", "salaryMonth": "2025-03", "status": "Resigned"}),
        ]);
        let count = |q: &str| TableView::new(&data, q, SortState::default(), 10).filtered().len();
        assert_eq!(count("PRIYA"), 1);
        assert_eq!(count("41"), 1);
        assert_eq!(count("2025-03"), 1);
        assert_eq!(count("relieved"), 1);
        assert_eq!(count("  "), 2);
    }

    #[test]
    fn no_match_gives_single_empty_page() {
        let data = many(5);
        let page = TableView::new(&data, "zzz", SortState::default(), 10).page(1);
        assert!(page.rows.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn pages_clamp_into_range() {
        let data = many(23);
        let view = TableView::new(&data, "", SortState::default(), REPORT_PAGE_SIZE);

        let last = view.page(5);
        assert_eq!(last.total_pages, 3);
        assert_eq!(last.page, 3);
        assert_eq!(last.rows.len(), 3);
        assert_eq!(last.shown_through(), 23);

        let first = view.page(0);
        assert_eq!(first.page, 1);
        assert_eq!(first.rows.len(), 10);
    }

    #[test]
    fn session_resets_page_on_load_and_search() {
        let mut session = ReportSession::new(PAYSLIP_PAGE_SIZE);
        let raw: Vec<SalaryTransaction> = (1..=20)
            .map(|i| serde_json::from_value(json!({"id": i, "staffId": 3})).unwrap())
            .collect();

        session.load(raw.clone());
        session.go_to(3);
        assert_eq!(session.current_page().page, 3);

        session.load(raw);
        assert_eq!(session.current_page().page, 1);

        session.go_to(2);
        session.set_search("3");
        assert_eq!(session.current_page().page, 1);
        assert_eq!(session.export_rows().len(), 20);
    }

    #[test]
    fn directory_changes_recompute_names() {
        let mut session = ReportSession::new(REPORT_PAGE_SIZE);
        session.load(vec![serde_json::from_value(json!({"id": 1, "staffId": 4})).unwrap()]);
        assert_eq!(session.rows()[0].staff_name, "(4)");

        let staff = serde_json::from_value(json!({"id": 4, "name": "Farah"})).unwrap();
        session.set_directory(StaffDirectory::new(vec![staff]));
        assert_eq!(session.rows()[0].staff_name, "Farah");
        assert!(session.find("1").is_some());
        assert!(session.find("2").is_none());
    }
}
