use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::paging::{EmployeeParameters, PagedList};
use crate::models::{Company, Employee, User};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// All companies ordered by name.
    async fn get_all_companies(&self) -> RepositoryResult<Vec<Company>>;

    async fn get_company(&self, id: Uuid) -> RepositoryResult<Option<Company>>;

    /// Companies whose id is in `ids`; missing ids are simply absent.
    async fn get_companies_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Company>>;

    /// Insert a company together with its initial employees.
    async fn create_company(&self, company: Company, employees: Vec<Employee>) -> RepositoryResult<Company>;

    /// Insert several companies in one unit of work; either all are stored or none.
    async fn create_companies(&self, companies: Vec<(Company, Vec<Employee>)>) -> RepositoryResult<Vec<Company>>;

    /// Overwrite a company and add `new_employees` to it.
    async fn update_company(&self, company: &Company, new_employees: Vec<Employee>) -> RepositoryResult<()>;

    /// Delete a company and all of its employees.
    async fn delete_company(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Filter, search, sort and page the employees of one company.
    async fn get_employees(
        &self,
        company_id: Uuid,
        params: &EmployeeParameters,
    ) -> RepositoryResult<PagedList<Employee>>;

    async fn get_employee(&self, company_id: Uuid, id: Uuid) -> RepositoryResult<Option<Employee>>;

    async fn create_employee(&self, employee: Employee) -> RepositoryResult<Employee>;

    async fn update_employee(&self, employee: &Employee) -> RepositoryResult<()>;

    async fn delete_employee(&self, company_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Case-insensitive lookup.
    async fn find_by_user_name(&self, user_name: &str) -> RepositoryResult<Option<User>>;

    /// Fails with [`RepositoryError::Duplicate`] when the user name is taken.
    async fn create_user(&self, user: User) -> RepositoryResult<User>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> RepositoryResult<()>;
}

/// Entry point handlers use to reach every repository.
#[derive(Clone)]
pub struct RepositoryManager {
    pub company: Arc<dyn CompanyRepository>,
    pub employee: Arc<dyn EmployeeRepository>,
    pub user: Arc<dyn UserRepository>,
    health: Arc<dyn HealthCheck>,
}

impl RepositoryManager {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CompanyRepository + EmployeeRepository + UserRepository + HealthCheck + 'static,
    {
        Self {
            company: store.clone(),
            employee: store.clone(),
            user: store.clone(),
            health: store,
        }
    }

    pub async fn health_check(&self) -> RepositoryResult<()> {
        self.health.ping().await
    }
}
