use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::api::{decode_list, path_segment, Backend, COMPONENTS_PATH};
use crate::error::{Result, SalaryGenError};
use crate::report::{lenient_amount, lenient_id, lenient_text, Id};

/// Component names the payroll backend knows how to apply
pub const COMPONENT_NAMES: [&str; 10] = [
    "DA",
    "HRA",
    "SPECIAL_ALLOWANCE",
    "TRANSPORT_ALLOWANCE",
    "MEDICAL_ALLOWANCE",
    "PF",
    "ESI",
    "PT",
    "TDS",
    "OTHER_DEDUCTIONS",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Allowance,
    Deduction,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Allowance => "ALLOWANCE",
            ComponentType::Deduction => "DEDUCTION",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A salary component as stored by the backend.
///
/// The type is kept as text so unknown values from the backend still list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryComponent {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<Id>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub fixed_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub component_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub effective_date: Option<String>,
}

impl SalaryComponent {
    /// Date part of `effectiveDate`, which may carry a time suffix
    pub fn effective_day(&self) -> Option<&str> {
        let raw = self.effective_date.as_deref()?.trim();
        Some(raw.get(..10).unwrap_or(raw))
    }

    pub fn effective_on(&self) -> Option<NaiveDate> {
        self.effective_day()
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }
}

/// Newest effective date first; components without a readable date go last
pub fn sort_by_effective_date(components: &mut [SalaryComponent]) {
    components.sort_by(|a, b| b.effective_on().cmp(&a.effective_on()));
}

/// Name search and type filter for the components list
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    pub search: Option<String>,
    pub component_type: Option<ComponentType>,
}

impl ComponentFilter {
    pub fn matches(&self, component: &SalaryComponent) -> bool {
        let name_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => component
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&query.to_lowercase())),
        };
        let type_ok = self
            .component_type
            .map_or(true, |wanted| component.component_type.as_deref() == Some(wanted.as_str()));
        name_ok && type_ok
    }

    pub fn apply(&self, components: Vec<SalaryComponent>) -> Vec<SalaryComponent> {
        components.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Body of a create or update request. Missing amounts are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDraft {
    pub name: String,
    pub fixed_amount: Option<f64>,
    pub percentage: Option<f64>,
    pub component_type: ComponentType,
    pub effective_date: String,
}

impl ComponentDraft {
    /// Validate the name against `COMPONENT_NAMES` and the date as YYYY-MM-DD
    pub fn new(
        name: &str,
        component_type: ComponentType,
        fixed_amount: Option<f64>,
        percentage: Option<f64>,
        effective_date: &str,
    ) -> Result<Self> {
        let upper = name.trim().to_uppercase();
        if !COMPONENT_NAMES.contains(&upper.as_str()) {
            return Err(SalaryGenError::InvalidComponentName(name.to_string()));
        }
        let date = NaiveDate::parse_from_str(effective_date.trim(), "%Y-%m-%d")
            .map_err(|_| SalaryGenError::InvalidDate(effective_date.to_string()))?;

        Ok(Self {
            name: upper,
            fixed_amount,
            percentage,
            component_type,
            effective_date: date.format("%Y-%m-%d").to_string(),
        })
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| SalaryGenError::Decode {
            path: COMPONENTS_PATH.to_string(),
            message: e.to_string(),
        })
    }
}

fn component_path(id: &str) -> Result<String> {
    Ok(format!("{COMPONENTS_PATH}/{}", path_segment(id)?))
}

/// All components, newest effective date first
pub fn fetch_components(backend: &dyn Backend) -> Result<Vec<SalaryComponent>> {
    let mut components: Vec<SalaryComponent> =
        decode_list(COMPONENTS_PATH, backend.get(COMPONENTS_PATH)?)?;
    sort_by_effective_date(&mut components);
    Ok(components)
}

pub fn create_component(backend: &dyn Backend, draft: &ComponentDraft) -> Result<()> {
    backend.post(COMPONENTS_PATH, Some(&draft.to_json()?))?;
    info!(name = %draft.name, "salary component created");
    Ok(())
}

pub fn update_component(backend: &dyn Backend, id: &str, draft: &ComponentDraft) -> Result<()> {
    let path = component_path(id)?;
    backend.put(&path, &draft.to_json()?)?;
    info!(id, name = %draft.name, "salary component updated");
    Ok(())
}

pub fn delete_component(backend: &dyn Backend, id: &str) -> Result<()> {
    let path = component_path(id)?;
    backend.delete(&path)?;
    info!(id, "salary component deleted");
    Ok(())
}
