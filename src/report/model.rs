use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier that the backend may send either as a number or as a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Id(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_number(&self) -> Option<f64> {
        self.0.parse().ok()
    }

    /// Read an id out of an arbitrary JSON value
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Id(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Id(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Id>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(Id::from_value))
}

pub(crate) fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(amount_from_value))
}

pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(text_from_value))
}

/// Numbers and numeric strings become amounts, anything else is absent
pub fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-blank strings and numbers become text, anything else is absent
pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Breakdown keys that are deductions; every other key is an earning
pub const DEDUCTION_KEYS: [&str; 6] = ["PF", "PT", "ESI", "TDS", "INSURANCE", "OTHER_DEDUCTIONS"];

pub fn is_deduction(component: &str) -> bool {
    let upper = component.trim().to_uppercase();
    DEDUCTION_KEYS.contains(&upper.as_str())
}

/// One salary transaction as returned by the payroll backend.
///
/// The backend shape differs between endpoints, so every field is optional and
/// unknown keys are kept in `extra` for the status classifier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryTransaction {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<Id>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub staff_id: Option<Id>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary_month: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub basic_pay: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub gross_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_deductions: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub net_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    /// Component name to amount, in backend order
    #[serde(default)]
    pub component_breakdown: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub staff_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_name: Option<String>,
    /// Nested staff object (`staff.name`, `staff.id`)
    #[serde(default)]
    pub staff: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub active: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub generated_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SalaryTransaction {
    /// `staffId`, else the nested `staff.id`
    pub fn owner_id(&self) -> Option<Id> {
        self.staff_id.clone().or_else(|| {
            self.staff
                .as_ref()
                .and_then(|staff| staff.get("id"))
                .and_then(Id::from_value)
        })
    }

    /// Nested `staff.name`
    pub fn nested_staff_name(&self) -> Option<&str> {
        self.staff
            .as_ref()
            .and_then(|staff| staff.get("name"))
            .and_then(Value::as_str)
    }

    /// Breakdown entries with a numeric amount, in backend order
    pub fn components(&self) -> Vec<(&str, f64)> {
        self.component_breakdown
            .as_ref()
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter())
            .filter_map(|(name, value)| amount_from_value(value).map(|a| (name.as_str(), a)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryDetails {
    #[serde(default, deserialize_with = "lenient_text")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ifsc_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bank_account_number: Option<String>,
}

/// One member of staff from `/api/staff`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<Id>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub joining_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub relieved_date: Option<String>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub salary_details: Option<SalaryDetails>,
}

impl StaffRecord {
    /// `name`, else `firstName lastName`; `None` when both are blank
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_string())
    }
}

/// Employment label shown next to each report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmploymentStatus {
    Active,
    Relieved,
    Unknown,
    /// Any other backend status, capitalized
    Other(String),
}

impl EmploymentStatus {
    pub fn label(&self) -> &str {
        match self {
            EmploymentStatus::Active => "Active",
            EmploymentStatus::Relieved => "Relieved",
            EmploymentStatus::Unknown => "Unknown",
            EmploymentStatus::Other(label) => label,
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A transaction with its owner's name, employment status and net pay resolved
#[derive(Debug, Clone)]
pub struct EnrichedReportRow {
    pub transaction: SalaryTransaction,
    pub staff_name: String,
    pub status: EmploymentStatus,
    pub net_salary: Option<f64>,
}

impl EnrichedReportRow {
    pub fn id(&self) -> Option<&Id> {
        self.transaction.id.as_ref()
    }

    pub fn staff_id(&self) -> Option<Id> {
        self.transaction.owner_id()
    }

    pub fn salary_month(&self) -> &str {
        self.transaction.salary_month.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_tolerates_mixed_shapes() {
        let tx: SalaryTransaction = serde_json::from_value(json!({
            "id": "17",
            "staffId": 4,
            "salaryMonth": "2025-03",
            "basicPay": "30000",
            "grossSalary": 42000.5,
            "netSalary": null,
            "componentBreakdown": {"HRA": 8000, "PF": 1800, "NOTE": "n/a", "TDS": null},
            "staff": {"id": 4, "name": "Kiran"},
            "relievedAt": null
        }))
        .unwrap();

        assert_eq!(tx.id, Some(Id::new("17")));
        assert_eq!(tx.staff_id, Some(Id::new("4")));
        assert_eq!(tx.basic_pay, Some(30000.0));
        assert_eq!(tx.net_salary, None);
        assert_eq!(tx.nested_staff_name(), Some("Kiran"));
        assert_eq!(tx.components(), vec![("HRA", 8000.0), ("PF", 1800.0)]);
        assert!(tx.extra.contains_key("relievedAt"));
    }

    #[test]
    fn owner_id_falls_back_to_nested_staff() {
        let tx: SalaryTransaction =
            serde_json::from_value(json!({"staff": {"id": 9}})).unwrap();
        assert_eq!(tx.owner_id(), Some(Id::new("9")));
    }

    #[test]
    fn deduction_keys_are_case_insensitive() {
        assert!(is_deduction("pf"));
        assert!(is_deduction("Other_Deductions"));
        assert!(!is_deduction("HRA"));
        assert!(!is_deduction("DA"));
    }

    #[test]
    fn staff_display_name_prefers_name() {
        let staff = StaffRecord {
            name: Some("  ".to_string()),
            first_name: Some("Anil".to_string()),
            last_name: None,
            ..Default::default()
        };
        assert_eq!(staff.display_name().as_deref(), Some("Anil"));

        let nameless = StaffRecord::default();
        assert_eq!(nameless.display_name(), None);
    }

    #[test]
    fn staff_bank_account_may_be_numeric() {
        let staff: StaffRecord = serde_json::from_value(json!({
            "id": 4,
            "salaryDetails": {"bankName": "SBI", "bankAccountNumber": 1234567890u64}
        }))
        .unwrap();
        let details = staff.salary_details.unwrap();
        assert_eq!(details.bank_account_number.as_deref(), Some("1234567890"));
        assert_eq!(details.ifsc_code, None);
    }
}
