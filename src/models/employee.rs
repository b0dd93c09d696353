use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{into_result, required_text, FieldErrors};
use crate::api::format::XmlElement;
use crate::api::shaping::{FieldTable, Shapeable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub company_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub position: String,
}

impl XmlElement for EmployeeDto {
    const ELEMENT: &'static str = "Employee";
    const COLLECTION: &'static str = "Employees";
}

impl From<&Employee> for EmployeeDto {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            age: employee.age,
            position: employee.position.clone(),
        }
    }
}

static EMPLOYEE_FIELDS: Lazy<FieldTable> =
    Lazy::new(|| FieldTable::new("Id", &["Id", "Name", "Age", "Position"]));

impl Shapeable for EmployeeDto {
    fn field_table() -> &'static FieldTable {
        &EMPLOYEE_FIELDS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn field_value(&self, field: &str) -> Value {
        match field {
            "Id" => json!(self.id),
            "Name" => json!(self.name),
            "Age" => json!(self.age),
            "Position" => json!(self.position),
            _ => Value::Null,
        }
    }
}

/// Body for creating or fully replacing an employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForManipulationDto {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
}

pub type EmployeeForCreationDto = EmployeeForManipulationDto;
pub type EmployeeForUpdateDto = EmployeeForManipulationDto;

impl EmployeeForManipulationDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.collect_errors(&mut errors, "");
        into_result(errors)
    }

    /// Append errors under `prefix` so nested employees report `employees[0].name`.
    pub(crate) fn collect_errors(&self, errors: &mut FieldErrors, prefix: &str) {
        required_text(
            errors,
            &format!("{}name", prefix),
            self.name.as_deref(),
            30,
            "Employee name is a required field.",
            "Name",
        );
        if self.age.is_none() {
            errors.insert(format!("{}age", prefix), "Age is a required field.".to_string());
        }
        required_text(
            errors,
            &format!("{}position", prefix),
            self.position.as_deref(),
            20,
            "Position is a required field.",
            "Position",
        );
    }

    /// Build a new employee; call only after [`Self::validate`] passed.
    pub fn into_employee(self, company_id: Uuid) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default().trim().to_string(),
            age: self.age.unwrap_or_default(),
            position: self.position.unwrap_or_default().trim().to_string(),
            company_id,
        }
    }

    /// Overwrite every field of `employee`; call only after validation.
    pub fn apply_to(self, employee: &mut Employee) {
        employee.name = self.name.unwrap_or_default().trim().to_string();
        employee.age = self.age.unwrap_or_default();
        employee.position = self.position.unwrap_or_default().trim().to_string();
    }
}

impl From<&Employee> for EmployeeForUpdateDto {
    fn from(employee: &Employee) -> Self {
        Self {
            name: Some(employee.name.clone()),
            age: Some(employee.age),
            position: Some(employee.position.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_employee_passes() {
        let dto = EmployeeForCreationDto {
            name: Some("Sam Raiden".into()),
            age: Some(26),
            position: Some("Software developer".into()),
        };
        assert!(dto.validate().is_ok());
        let company = Uuid::new_v4();
        let employee = dto.into_employee(company);
        assert_eq!(employee.company_id, company);
        assert_eq!(employee.age, 26);
    }

    #[test]
    fn missing_fields_are_reported_per_field() {
        let errors = EmployeeForCreationDto {
            name: None,
            age: None,
            position: Some("A position name that is far too long".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors["name"], "Employee name is a required field.");
        assert_eq!(errors["age"], "Age is a required field.");
        assert_eq!(errors["position"], "Maximum length for the Position is 20 characters.");
    }

    #[test]
    fn dto_declares_shaping_fields_in_order() {
        assert_eq!(EmployeeDto::field_table().fields(), &["Id", "Name", "Age", "Position"]);
        assert_eq!(EmployeeDto::field_table().lookup("position"), Some("Position"));
    }
}
