// handlers/employees.rs - employees nested under a company

use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use json_patch::Patch;
use uuid::Uuid;

use crate::api::compose::compose;
use crate::api::format::{composed_response, json_response, xml_response, XmlElement};
use crate::api::links::{route_names, RouteResolver};
use crate::api::media::{negotiate, negotiate_or_json, Negotiated, OutputFormat};
use crate::database::EmployeeParameters;
use crate::error::ApiError;
use crate::handlers::companies::find_company;
use crate::handlers::extract::{JsonBody, QueryParams};
use crate::models::{Employee, EmployeeDto, EmployeeForCreationDto, EmployeeForUpdateDto, FieldErrors};
use crate::state::{accept_header, AppState};

const X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

async fn find_employee(state: &AppState, company_id: Uuid, id: Uuid) -> Result<Employee, ApiError> {
    match state.repository.employee.get_employee(company_id, id).await? {
        Some(employee) => Ok(employee),
        None => {
            tracing::info!("Employee with id: {} doesn't exist in the database.", id);
            Err(ApiError::not_found(format!(
                "Employee with id: {} doesn't exist in the database.",
                id
            )))
        }
    }
}

/// GET|HEAD /api/companies/:company_id/employees
///
/// Filters, sorts and pages the employees, then shapes them by `fields` and
/// adds links when the hypermedia media type was negotiated. Paging metadata
/// goes out in `X-Pagination`.
pub async fn list(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    QueryParams(params): QueryParams<EmployeeParameters>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let negotiated = negotiate(accept_header(&headers), &state.employee_media())?;

    if !params.valid_age_range() {
        return Err(ApiError::bad_request("Max age can't be less than min age."));
    }
    find_company(&state, company_id).await?;

    let params = params.normalized(state.config.api.max_page_size);
    let page = state
        .repository
        .employee
        .get_employees(company_id, &params)
        .await?
        .map(|employee| EmployeeDto::from(&employee));

    let body = compose(
        &page.items,
        params.fields.as_deref(),
        &negotiated,
        state.routes.as_ref(),
        company_id,
    );

    let pagination = serde_json::to_string(&page.meta)
        .map_err(|_| ApiError::internal_server_error("Failed to serialize paging metadata"))?;

    let mut response = composed_response(StatusCode::OK, &body, &negotiated)?;
    if let Ok(value) = HeaderValue::from_str(&pagination) {
        response.headers_mut().insert(X_PAGINATION, value);
    }
    Ok(response)
}

/// GET /api/companies/:company_id/employees/:id
pub async fn get(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let negotiated = negotiate_or_json(accept_header(&headers), &state.employee_media())?;
    find_company(&state, company_id).await?;
    let employee = find_employee(&state, company_id, id).await?;

    // Single employees are never linked, so always answer as plain JSON
    let plain = Negotiated {
        hypermedia: false,
        ..negotiated
    };
    let dto = EmployeeDto::from(&employee);
    match plain.format {
        OutputFormat::Xml => xml_response(StatusCode::OK, EmployeeDto::ELEMENT, &dto, &plain),
        _ => json_response(StatusCode::OK, &dto, &plain),
    }
}

/// POST /api/companies/:company_id/employees
pub async fn create(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    JsonBody(dto): JsonBody<EmployeeForCreationDto>,
) -> Result<Response, ApiError> {
    dto.validate().map_err(|errors| {
        tracing::error!("Invalid model state for the EmployeeForCreationDto object");
        ApiError::validation(errors)
    })?;
    find_company(&state, company_id).await?;

    let employee = state
        .repository
        .employee
        .create_employee(dto.into_employee(company_id))
        .await?;
    tracing::info!("Created employee {} for company {}", employee.id, company_id);

    let href = state.routes.resolve(
        route_names::GET_EMPLOYEE_FOR_COMPANY,
        &[("companyId", company_id.to_string()), ("id", employee.id.to_string())],
    );
    let mut response = json_response(StatusCode::CREATED, &EmployeeDto::from(&employee), &Negotiated::json())?;
    if let Ok(value) = HeaderValue::from_str(&href) {
        response.headers_mut().insert(LOCATION, value);
    }
    Ok(response)
}

/// PUT /api/companies/:company_id/employees/:id
pub async fn update(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    JsonBody(dto): JsonBody<EmployeeForUpdateDto>,
) -> Result<StatusCode, ApiError> {
    dto.validate().map_err(|errors| {
        tracing::error!("Invalid model state for the EmployeeForUpdateDto object");
        ApiError::validation(errors)
    })?;
    find_company(&state, company_id).await?;

    let mut employee = find_employee(&state, company_id, id).await?;
    dto.apply_to(&mut employee);
    state.repository.employee.update_employee(&employee).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply an RFC 6902 patch to the update view of `employee`.
pub(crate) fn apply_patch(employee: &Employee, patch: &Patch) -> Result<EmployeeForUpdateDto, ApiError> {
    let patch_error = |message: String| {
        let mut errors = FieldErrors::new();
        errors.insert("patch".to_string(), message);
        ApiError::validation(errors)
    };

    let mut document = serde_json::to_value(EmployeeForUpdateDto::from(employee))
        .map_err(|e| patch_error(e.to_string()))?;
    json_patch::patch(&mut document, patch).map_err(|e| patch_error(e.to_string()))?;

    let patched: EmployeeForUpdateDto =
        serde_json::from_value(document).map_err(|e| patch_error(e.to_string()))?;
    patched.validate().map_err(ApiError::validation)?;
    Ok(patched)
}

/// PATCH /api/companies/:company_id/employees/:id
pub async fn patch(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    JsonBody(patch): JsonBody<Patch>,
) -> Result<StatusCode, ApiError> {
    find_company(&state, company_id).await?;
    let mut employee = find_employee(&state, company_id, id).await?;

    let patched = apply_patch(&employee, &patch).map_err(|err| {
        tracing::error!("Invalid model state for the patch document");
        err
    })?;
    patched.apply_to(&mut employee);

    state.repository.employee.update_employee(&employee).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/companies/:company_id/employees/:id
pub async fn delete(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    find_company(&state, company_id).await?;
    find_employee(&state, company_id, id).await?;
    state.repository.employee.delete_employee(company_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn employee() -> Employee {
        Employee {
            id: Uuid::from_u128(7),
            name: "Sam Raiden".into(),
            age: 26,
            position: "Software developer".into(),
            company_id: Uuid::from_u128(1),
        }
    }

    fn patch(ops: serde_json::Value) -> Patch {
        serde_json::from_value(ops).unwrap()
    }

    #[test]
    fn replace_operation_updates_field() {
        let patched = apply_patch(&employee(), &patch(json!([{"op": "replace", "path": "/age", "value": 27}]))).unwrap();
        assert_eq!(patched.age, Some(27));
        assert_eq!(patched.name.as_deref(), Some("Sam Raiden"));
    }

    #[test]
    fn removing_required_field_fails_validation() {
        let err = apply_patch(&employee(), &patch(json!([{"op": "remove", "path": "/age"}]))).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn failed_test_operation_is_unprocessable() {
        let err = apply_patch(
            &employee(),
            &patch(json!([{"op": "test", "path": "/name", "value": "Somebody else"}])),
        )
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_json()["field_errors"]["patch"].is_string());
    }
}
