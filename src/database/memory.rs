use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ordering::OrderBy;
use super::paging::{EmployeeParameters, PagedList};
use super::repository::{
    CompanyRepository, EmployeeRepository, HealthCheck, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::{Company, Employee, User};

/// Process-local store used in development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    companies: RwLock<Vec<Company>>,
    employees: RwLock<Vec<Employee>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with two companies and three employees.
    pub fn seeded() -> Self {
        let it_solutions = Uuid::from_u128(0xc9d4c053_49b6_410c_bc78_2d54a9991870);
        let admin_solutions = Uuid::from_u128(0x3d490a70_94ce_4d15_9494_5248280c2ce3);

        let companies = vec![
            Company {
                id: it_solutions,
                name: "IT_Solutions Ltd".into(),
                address: "583 Wall Dr. Gwynn Oak, MD 21207".into(),
                country: "USA".into(),
            },
            Company {
                id: admin_solutions,
                name: "Admin_Solutions Ltd".into(),
                address: "312 Forest Avenue, BF 923".into(),
                country: "USA".into(),
            },
        ];

        let employees = vec![
            Employee {
                id: Uuid::from_u128(0x80abbca8_664d_4b20_b5de_024705497d4a),
                name: "Sam Raiden".into(),
                age: 26,
                position: "Software developer".into(),
                company_id: it_solutions,
            },
            Employee {
                id: Uuid::from_u128(0x86dba8c0_d178_41e7_938c_ed49778fb52a),
                name: "Jana McLeaf".into(),
                age: 30,
                position: "Software developer".into(),
                company_id: it_solutions,
            },
            Employee {
                id: Uuid::from_u128(0x021ca3c1_0deb_4afd_ae94_2159a8479811),
                name: "Kane Miller".into(),
                age: 35,
                position: "Administrator".into(),
                company_id: admin_solutions,
            },
        ];

        Self {
            companies: RwLock::new(companies),
            employees: RwLock::new(employees),
            users: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn get_all_companies(&self) -> RepositoryResult<Vec<Company>> {
        let mut companies = self.companies.read().await.clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn get_company(&self, id: Uuid) -> RepositoryResult<Option<Company>> {
        Ok(self.companies.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn get_companies_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Company>> {
        Ok(self
            .companies
            .read()
            .await
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn create_company(&self, company: Company, employees: Vec<Employee>) -> RepositoryResult<Company> {
        let mut companies = self.companies.write().await;
        let mut stored = self.employees.write().await;
        companies.push(company.clone());
        stored.extend(employees);
        Ok(company)
    }

    async fn create_companies(&self, batch: Vec<(Company, Vec<Employee>)>) -> RepositoryResult<Vec<Company>> {
        let mut companies = self.companies.write().await;
        let mut stored = self.employees.write().await;

        for (i, (company, _)) in batch.iter().enumerate() {
            let taken = companies.iter().any(|c| c.id == company.id)
                || batch[..i].iter().any(|(earlier, _)| earlier.id == company.id);
            if taken {
                return Err(RepositoryError::Duplicate(format!(
                    "Company with id: {} already exists",
                    company.id
                )));
            }
        }

        let mut created = Vec::with_capacity(batch.len());
        for (company, employees) in batch {
            companies.push(company.clone());
            stored.extend(employees);
            created.push(company);
        }
        Ok(created)
    }

    async fn update_company(&self, company: &Company, new_employees: Vec<Employee>) -> RepositoryResult<()> {
        let mut companies = self.companies.write().await;
        let slot = companies
            .iter_mut()
            .find(|c| c.id == company.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Company with id: {} doesn't exist", company.id)))?;
        *slot = company.clone();
        self.employees.write().await.extend(new_employees);
        Ok(())
    }

    async fn delete_company(&self, id: Uuid) -> RepositoryResult<()> {
        let mut companies = self.companies.write().await;
        let before = companies.len();
        companies.retain(|c| c.id != id);
        if companies.len() == before {
            return Err(RepositoryError::NotFound(format!("Company with id: {} doesn't exist", id)));
        }
        self.employees.write().await.retain(|e| e.company_id != id);
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn get_employees(
        &self,
        company_id: Uuid,
        params: &EmployeeParameters,
    ) -> RepositoryResult<PagedList<Employee>> {
        let search = params.search_term();
        let min_age = i64::from(params.min_age);
        let max_age = i64::from(params.max_age);

        let mut matching: Vec<Employee> = self
            .employees
            .read()
            .await
            .iter()
            .filter(|e| e.company_id == company_id)
            .filter(|e| (min_age..=max_age).contains(&i64::from(e.age)))
            .filter(|e| search.as_ref().map_or(true, |term| e.name.to_lowercase().contains(term)))
            .cloned()
            .collect();

        let keys = OrderBy::parse(params.order_by.as_deref());
        matching.sort_by(|a, b| OrderBy::compare(&keys, a, b));

        Ok(PagedList::from_all(matching, params.page_number, params.page_size))
    }

    async fn get_employee(&self, company_id: Uuid, id: Uuid) -> RepositoryResult<Option<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .iter()
            .find(|e| e.company_id == company_id && e.id == id)
            .cloned())
    }

    async fn create_employee(&self, employee: Employee) -> RepositoryResult<Employee> {
        self.employees.write().await.push(employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, employee: &Employee) -> RepositoryResult<()> {
        let mut employees = self.employees.write().await;
        let slot = employees
            .iter_mut()
            .find(|e| e.id == employee.id && e.company_id == employee.company_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Employee with id: {} doesn't exist", employee.id)))?;
        *slot = employee.clone();
        Ok(())
    }

    async fn delete_employee(&self, company_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut employees = self.employees.write().await;
        let before = employees.len();
        employees.retain(|e| !(e.company_id == company_id && e.id == id));
        if employees.len() == before {
            return Err(RepositoryError::NotFound(format!("Employee with id: {} doesn't exist", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_user_name(&self, user_name: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.user_name.eq_ignore_ascii_case(user_name))
            .cloned())
    }

    async fn create_user(&self, user: User) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user_name.eq_ignore_ascii_case(&user.user_name)) {
            return Err(RepositoryError::Duplicate(format!(
                "Username '{}' is already taken.",
                user.user_name
            )));
        }
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
