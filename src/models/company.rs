use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::employee::EmployeeForCreationDto;
use super::validation::{into_result, required_text, FieldErrors};
use crate::api::format::{CsvRow, XmlElement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub id: Uuid,
    pub name: String,
    pub full_address: String,
}

impl From<&Company> for CompanyDto {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            full_address: format!("{} {}", company.address, company.country),
        }
    }
}

impl XmlElement for CompanyDto {
    const ELEMENT: &'static str = "Company";
    const COLLECTION: &'static str = "Companies";
}

impl CsvRow for CompanyDto {
    fn csv_row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.full_address.clone()]
    }
}

/// Body for creating or replacing a company, optionally with employees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForManipulationDto {
    pub name: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub employees: Option<Vec<EmployeeForCreationDto>>,
}

pub type CompanyForCreationDto = CompanyForManipulationDto;
pub type CompanyForUpdateDto = CompanyForManipulationDto;

impl CompanyForManipulationDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.collect_errors(&mut errors, "");
        into_result(errors)
    }

    pub(crate) fn collect_errors(&self, errors: &mut FieldErrors, prefix: &str) {
        required_text(
            errors,
            &format!("{}name", prefix),
            self.name.as_deref(),
            30,
            "Company name is a required field.",
            "Name",
        );
        required_text(
            errors,
            &format!("{}address", prefix),
            self.address.as_deref(),
            30,
            "Company address is a required field.",
            "Address",
        );
        required_text(
            errors,
            &format!("{}country", prefix),
            self.country.as_deref(),
            20,
            "Country is a required field.",
            "Country",
        );
        for (index, employee) in self.employees.iter().flatten().enumerate() {
            employee.collect_errors(errors, &format!("{}employees[{}].", prefix, index));
        }
    }

    /// Split into a new company and its nested employees; call only after validation.
    pub fn into_company(self) -> (Company, Vec<EmployeeForCreationDto>) {
        let company = Company {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default().trim().to_string(),
            address: self.address.unwrap_or_default().trim().to_string(),
            country: self.country.unwrap_or_default().trim().to_string(),
        };
        (company, self.employees.unwrap_or_default())
    }

    /// Overwrite `company` and hand back the nested employees to add.
    pub fn apply_to(self, company: &mut Company) -> Vec<EmployeeForCreationDto> {
        company.name = self.name.unwrap_or_default().trim().to_string();
        company.address = self.address.unwrap_or_default().trim().to_string();
        company.country = self.country.unwrap_or_default().trim().to_string();
        self.employees.unwrap_or_default()
    }
}

/// Validate a batch, prefixing errors with the item index.
pub fn validate_collection(companies: &[CompanyForCreationDto]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for (index, company) in companies.iter().enumerate() {
        company.collect_errors(&mut errors, &format!("[{}].", index));
    }
    into_result(errors)
}
