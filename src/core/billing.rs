//! Single-resource invoice requests.
//!
//! A request bills one employee on a project at a rate per FTE for a billing
//! period. The total is kept in step with the rate and FTE inputs, and
//! validation collects every field problem at once so a form can show them
//! side by side.

use crate::{
    core::field::NumericField,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How often a resource is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingType {
    /// Billed every month
    Monthly,
    /// Billed every quarter
    Quarterly,
    /// Billed once a year
    Yearly,
    /// Billed per hour worked
    Hourly,
}

impl BillingType {
    /// Display name used on forms and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
            Self::Hourly => "Hourly",
        }
    }
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            "hourly" => Ok(Self::Hourly),
            _ => Err(Error::InvalidBillingType {
                value: s.to_string(),
            }),
        }
    }
}

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestField {
    /// Employee selection
    Employee,
    /// Billing type selection
    BillingType,
    /// First day of the billing period
    BillingStartDate,
    /// Last day of the billing period
    BillingEndDate,
    /// Rate per FTE
    RatePerFte,
    /// Number of FTEs
    NumberOfFtes,
}

/// One field's validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field
    pub field: RequestField,
    /// Message shown next to the field
    pub message: &'static str,
}

/// Every validation failure of one request, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: RequestField, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: RequestField) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    /// All failures.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(error.message)?;
        }
        Ok(())
    }
}

/// An invoice request as it is being filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    /// Selected employee
    pub employee_id: Option<i64>,
    /// Name of the selected employee
    pub employee_name: String,
    /// Agency of the selected employee
    pub employee_agency: Option<String>,
    /// Billing cadence
    pub billing_type: Option<BillingType>,
    /// First day billed
    pub billing_start_date: Option<NaiveDate>,
    /// Last day billed
    pub billing_end_date: Option<NaiveDate>,
    /// Engagement length in months
    pub tenure_months: Option<u32>,
    /// Monetary rate per FTE
    pub rate_per_fte: NumericField,
    /// FTEs billed
    pub number_of_ftes: NumericField,
    /// Free-text notes
    pub notes: String,
}

impl Default for InvoiceRequest {
    fn default() -> Self {
        Self {
            employee_id: None,
            employee_name: String::new(),
            employee_agency: None,
            billing_type: Some(BillingType::Monthly),
            billing_start_date: None,
            billing_end_date: None,
            tenure_months: None,
            rate_per_fte: NumericField::Blank,
            number_of_ftes: NumericField::Value(1.0),
            notes: String::new(),
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Selected employee
    pub employee_id: i64,
    /// Name of the selected employee
    pub employee_name: String,
    /// Agency of the selected employee
    pub employee_agency: Option<String>,
    /// Billing cadence
    pub billing_type: BillingType,
    /// First day billed
    pub billing_start_date: NaiveDate,
    /// Last day billed
    pub billing_end_date: NaiveDate,
    /// Engagement length in months
    pub tenure_months: Option<u32>,
    /// Monetary rate per FTE, positive
    pub rate_per_fte: f64,
    /// FTEs billed, positive
    pub number_of_ftes: f64,
    /// `rate_per_fte × number_of_ftes`
    pub total_amount: f64,
    /// Free-text notes
    pub notes: String,
}

impl InvoiceRequest {
    /// `rate × FTEs`, with blank inputs counted as zero.
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.rate_per_fte.value() * self.number_of_ftes.value()
    }

    /// Checks every field and returns the validated request or all failures.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let mut errors = ValidationErrors::default();

        if self.employee_id.is_none() {
            errors.push(RequestField::Employee, "Please select an employee");
        }
        if self.billing_type.is_none() {
            errors.push(RequestField::BillingType, "Please select a billing type");
        }
        if self.billing_start_date.is_none() {
            errors.push(RequestField::BillingStartDate, "Please select a start date");
        }
        match (self.billing_start_date, self.billing_end_date) {
            (_, None) => errors.push(RequestField::BillingEndDate, "Please select an end date"),
            (Some(start), Some(end)) if end < start => errors.push(
                RequestField::BillingEndDate,
                "End date must be after start date",
            ),
            _ => {}
        }
        if self.rate_per_fte.value() <= 0.0 {
            errors.push(RequestField::RatePerFte, "Please enter a valid rate per FTE");
        }
        if self.number_of_ftes.value() <= 0.0 {
            errors.push(
                RequestField::NumberOfFtes,
                "Please enter a valid number of FTEs",
            );
        }

        match (
            self.employee_id,
            self.billing_type,
            self.billing_start_date,
            self.billing_end_date,
        ) {
            (Some(employee_id), Some(billing_type), Some(start), Some(end))
                if errors.is_empty() =>
            {
                Ok(ValidatedRequest {
                    employee_id,
                    employee_name: self.employee_name.clone(),
                    employee_agency: self.employee_agency.clone(),
                    billing_type,
                    billing_start_date: start,
                    billing_end_date: end,
                    tenure_months: self.tenure_months,
                    rate_per_fte: self.rate_per_fte.value(),
                    number_of_ftes: self.number_of_ftes.value(),
                    total_amount: self.total_amount(),
                    notes: self.notes.clone(),
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled_request() -> InvoiceRequest {
        InvoiceRequest {
            employee_id: Some(7),
            employee_name: "Asha Rao".to_string(),
            employee_agency: Some("Northwind".to_string()),
            billing_start_date: Some(date(2025, 11, 1)),
            billing_end_date: Some(date(2025, 11, 30)),
            tenure_months: Some(6),
            rate_per_fte: NumericField::Value(4000.0),
            number_of_ftes: NumericField::Value(1.5),
            ..InvoiceRequest::default()
        }
    }

    fn validation_errors(request: &InvoiceRequest) -> ValidationErrors {
        match request.validate() {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_total_amount_follows_inputs() {
        let mut request = filled_request();
        assert_eq!(request.total_amount(), 6000.0);

        request.rate_per_fte.apply_input("");
        assert_eq!(request.total_amount(), 0.0);
    }

    #[test]
    fn test_valid_request() {
        let validated = filled_request().validate().unwrap();
        assert_eq!(validated.employee_id, 7);
        assert_eq!(validated.billing_type, BillingType::Monthly);
        assert_eq!(validated.total_amount, 6000.0);
    }

    #[test]
    fn test_default_request_reports_every_missing_field() {
        let errors = validation_errors(&InvoiceRequest::default());

        assert_eq!(errors.get(RequestField::Employee), Some("Please select an employee"));
        assert!(errors.get(RequestField::BillingStartDate).is_some());
        assert!(errors.get(RequestField::BillingEndDate).is_some());
        assert!(errors.get(RequestField::RatePerFte).is_some());
        // defaults to Monthly and one FTE
        assert!(errors.get(RequestField::BillingType).is_none());
        assert!(errors.get(RequestField::NumberOfFtes).is_none());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut request = filled_request();
        request.billing_end_date = Some(date(2025, 10, 31));
        let errors = validation_errors(&request);
        assert_eq!(
            errors.get(RequestField::BillingEndDate),
            Some("End date must be after start date")
        );
        assert_eq!(errors.iter().count(), 1);
    }

    #[test]
    fn test_same_day_period_is_allowed() {
        let mut request = filled_request();
        request.billing_end_date = request.billing_start_date;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_ftes_is_rejected() {
        let mut request = filled_request();
        request.number_of_ftes = NumericField::ZERO;
        request.billing_type = None;
        let errors = validation_errors(&request);
        assert_eq!(
            errors.to_string(),
            "Please select a billing type; Please enter a valid number of FTEs"
        );
    }

    #[test]
    fn test_billing_type_parse() {
        assert_eq!("quarterly".parse::<BillingType>().unwrap(), BillingType::Quarterly);
        assert_eq!(" Hourly ".parse::<BillingType>().unwrap(), BillingType::Hourly);
        assert!(matches!(
            "weekly".parse::<BillingType>(),
            Err(Error::InvalidBillingType { value }) if value == "weekly"
        ));
        assert_eq!(BillingType::Yearly.to_string(), "Yearly");
    }
}
