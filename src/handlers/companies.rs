// handlers/companies.rs - company resource, version 1

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::format::{collection_response, item_response, json_response};
use crate::api::links::{route_names, RouteResolver};
use crate::api::media::{negotiate_or_json, Negotiated};
use crate::error::ApiError;
use crate::handlers::extract::JsonBody;
use crate::middleware::cache_headers::cache_control;
use crate::middleware::AuthUser;
use crate::models::company::validate_collection;
use crate::models::{Company, CompanyDto, CompanyForCreationDto, CompanyForUpdateDto, Employee};
use crate::state::{accept_header, AppState};

pub const MANAGER_ROLE: &str = "Manager";

/// Look up a company or answer 404.
pub(crate) async fn find_company(state: &AppState, id: Uuid) -> Result<Company, ApiError> {
    match state.repository.company.get_company(id).await? {
        Some(company) => Ok(company),
        None => {
            tracing::info!("Company with id: {} doesn't exist in the database.", id);
            Err(ApiError::not_found(format!(
                "Company with id: {} doesn't exist in the database.",
                id
            )))
        }
    }
}

fn location(state: &AppState, route_name: &str, params: &[(&str, String)]) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&state.routes.resolve(route_name, params))
        .map_err(|_| ApiError::internal_server_error("Failed to build Location header"))
}

fn with_location(mut response: Response, value: HeaderValue) -> Response {
    response.headers_mut().insert(header::LOCATION, value);
    response
}

/// Parse `(id1,id2,...)` or `id1,id2,...`.
fn parse_ids(raw: &str) -> Option<Vec<Uuid>> {
    let inner = raw.trim().trim_start_matches('(').trim_end_matches(')');
    if inner.trim().is_empty() {
        return None;
    }
    inner
        .split(',')
        .map(|part| Uuid::parse_str(part.trim()).ok())
        .collect()
}

/// GET /api/companies - all companies, managers only
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    user.require_role(MANAGER_ROLE)?;
    let negotiated = negotiate_or_json(accept_header(&headers), &state.company_media())?;

    let companies = state.repository.company.get_all_companies().await?;
    let dtos: Vec<CompanyDto> = companies.iter().map(CompanyDto::from).collect();
    collection_response(StatusCode::OK, &dtos, &negotiated)
}

/// OPTIONS /api/companies
pub async fn options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, "GET, OPTIONS, POST")])
}

/// GET /api/companies/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let negotiated = negotiate_or_json(accept_header(&headers), &state.company_media())?;
    let company = find_company(&state, id).await?;

    let mut response = item_response(StatusCode::OK, &CompanyDto::from(&company), &negotiated)?;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, cache_control(state.config.api.company_cache_max_age_secs));
    Ok(response)
}

/// GET /api/companies/collection/(:ids)
pub async fn get_collection(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let negotiated = negotiate_or_json(accept_header(&headers), &state.company_media())?;
    let ids = parse_ids(&ids).ok_or_else(|| {
        tracing::error!("Parameter ids is null");
        ApiError::bad_request("Parameter ids is null")
    })?;

    let companies = state.repository.company.get_companies_by_ids(&ids).await?;
    if companies.len() != ids.len() {
        tracing::error!("Some ids are not valid in a collection");
        return Err(ApiError::not_found("Some ids are not valid in a collection"));
    }

    let dtos: Vec<CompanyDto> = companies.iter().map(CompanyDto::from).collect();
    collection_response(StatusCode::OK, &dtos, &negotiated)
}

fn stage_company(dto: CompanyForCreationDto) -> (Company, Vec<Employee>) {
    let (company, employees) = dto.into_company();
    let employees = employees.into_iter().map(|e| e.into_employee(company.id)).collect();
    (company, employees)
}

/// POST /api/companies
pub async fn create(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CompanyForCreationDto>,
) -> Result<Response, ApiError> {
    dto.validate().map_err(|errors| {
        tracing::error!("Invalid model state for the CompanyForCreationDto object");
        ApiError::validation(errors)
    })?;

    let (company, employees) = stage_company(dto);
    let company = state.repository.company.create_company(company, employees).await?;
    tracing::info!("Created company {}", company.id);

    let location = location(&state, route_names::GET_COMPANY, &[("id", company.id.to_string())])?;
    let response = json_response(StatusCode::CREATED, &CompanyDto::from(&company), &Negotiated::json())?;
    Ok(with_location(response, location))
}

/// POST /api/companies/collection
pub async fn create_collection(
    State(state): State<AppState>,
    JsonBody(dtos): JsonBody<Vec<CompanyForCreationDto>>,
) -> Result<Response, ApiError> {
    if dtos.is_empty() {
        tracing::error!("Company collection sent from client is null.");
        return Err(ApiError::bad_request("Company collection is null"));
    }
    validate_collection(&dtos).map_err(ApiError::validation)?;

    let staged = dtos.into_iter().map(stage_company).collect();
    let created = state.repository.company.create_companies(staged).await?;

    let ids = created.iter().map(|c| c.id.to_string()).collect::<Vec<_>>().join(",");
    let location = location(&state, route_names::COMPANY_COLLECTION, &[("ids", ids)])?;
    let dtos: Vec<CompanyDto> = created.iter().map(CompanyDto::from).collect();
    let response = json_response(StatusCode::CREATED, &dtos, &Negotiated::json())?;
    Ok(with_location(response, location))
}

/// PUT /api/companies/:id - replace the company; nested employees are added
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(dto): JsonBody<CompanyForUpdateDto>,
) -> Result<StatusCode, ApiError> {
    dto.validate().map_err(|errors| {
        tracing::error!("Invalid model state for the CompanyForUpdateDto object");
        ApiError::validation(errors)
    })?;

    let mut company = find_company(&state, id).await?;
    let new_employees: Vec<Employee> = dto
        .apply_to(&mut company)
        .into_iter()
        .map(|e| e.into_employee(company.id))
        .collect();

    state.repository.company.update_company(&company, new_employees).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/companies/:id - removes the company and its employees
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    find_company(&state, id).await?;
    state.repository.company.delete_company(id).await?;
    tracing::info!("Deleted company {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_parenthesised_lists() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert_eq!(parse_ids(&format!("({},{})", a, b)), Some(vec![a, b]));
        assert_eq!(parse_ids(&format!("{}, {}", a, b)), Some(vec![a, b]));
    }

    #[test]
    fn empty_or_invalid_ids_are_rejected() {
        assert_eq!(parse_ids("()"), None);
        assert_eq!(parse_ids(""), None);
        assert_eq!(parse_ids("(not-a-guid)"), None);
    }
}
