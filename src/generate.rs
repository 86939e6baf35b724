use tracing::info;

use crate::api::{decode_list, Backend, TRANSACTIONS_PATH};
use crate::error::{Result, SalaryGenError};
use crate::report::SalaryTransaction;

/// Year and month of a salary run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryPeriod {
    pub year: u32,
    pub month: u32,
}

impl SalaryPeriod {
    /// Validate a four-digit year and a month from 1 to 12
    pub fn parse(year: &str, month: &str) -> Result<Self> {
        let year_str = year.trim();
        if year_str.len() != 4 || !year_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(SalaryGenError::InvalidYear(year.to_string()));
        }
        let year = year_str
            .parse()
            .map_err(|_| SalaryGenError::InvalidYear(year.to_string()))?;

        let month = match month.trim().parse::<u32>() {
            Ok(m @ 1..=12) => m,
            _ => return Err(SalaryGenError::InvalidMonthNumber(month.to_string())),
        };

        Ok(Self { year, month })
    }

    pub fn path(&self) -> String {
        format!(
            "{TRANSACTIONS_PATH}/generate?year={}&month={:02}",
            self.year, self.month
        )
    }
}

/// Ask the backend to generate salaries for `period` and return what it created
pub fn generate_salaries(
    backend: &dyn Backend,
    period: SalaryPeriod,
) -> Result<Vec<SalaryTransaction>> {
    let path = period.path();
    let generated = decode_list(&path, backend.post(&path, None)?)?;
    info!(
        year = period.year,
        month = period.month,
        count = generated.len(),
        "salaries generated"
    );
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::RecordingBackend;
    use serde_json::json;

    #[test]
    fn month_is_zero_padded() {
        let period = SalaryPeriod::parse("2025", "3").unwrap();
        assert_eq!(
            period.path(),
            "/api/salary-transactions/generate?year=2025&month=03"
        );
    }

    #[test]
    fn bad_periods_are_rejected() {
        assert!(matches!(
            SalaryPeriod::parse("25", "3"),
            Err(SalaryGenError::InvalidYear(_))
        ));
        assert!(matches!(
            SalaryPeriod::parse("2025", "13"),
            Err(SalaryGenError::InvalidMonthNumber(_))
        ));
        assert!(matches!(
            SalaryPeriod::parse("2025", "0"),
            Err(SalaryGenError::InvalidMonthNumber(_))
        ));
    }

    #[test]
    fn generation_posts_once() {
        let backend = RecordingBackend::default().with(
            "/api/salary-transactions/generate?year=2025&month=04",
            json!([{"id": 1, "staffId": 2, "netSalary": 100}, {"id": 2, "staffId": 3}]),
        );
        let period = SalaryPeriod::parse("2025", "04").unwrap();
        let generated = generate_salaries(&backend, period).unwrap();
        assert_eq!(generated.len(), 2);
        assert_eq!(
            *backend.calls.borrow(),
            vec!["POST /api/salary-transactions/generate?year=2025&month=04".to_string()]
        );
    }
}
