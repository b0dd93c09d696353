//! Postgres-backed repositories.
//!
//! Expects the `companies`, `employees` and `users` tables from `sql/schema.sql`;
//! applying that script is left to deployment tooling.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ordering::OrderBy;
use super::paging::{EmployeeParameters, PagedList};
use super::repository::{
    CompanyRepository, EmployeeRepository, HealthCheck, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::{Company, Employee, User};

const COMPANY_COLUMNS: &str = "id, name, address, country";
const EMPLOYEE_COLUMNS: &str = "id, name, age, position, company_id";
const USER_COLUMNS: &str = "id, user_name, first_name, last_name, email, phone_number, password_hash, roles";

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_employee<'e, E>(executor: E, employee: &Employee) -> RepositoryResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(&format!(
        "INSERT INTO employees ({}) VALUES ($1, $2, $3, $4, $5)",
        EMPLOYEE_COLUMNS
    ))
    .bind(employee.id)
    .bind(&employee.name)
    .bind(employee.age)
    .bind(&employee.position)
    .bind(employee.company_id)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_company(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company: &Company,
    employees: &[Employee],
) -> RepositoryResult<()> {
    sqlx::query(&format!(
        "INSERT INTO companies ({}) VALUES ($1, $2, $3, $4)",
        COMPANY_COLUMNS
    ))
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.address)
    .bind(&company.country)
    .execute(&mut **tx)
    .await?;
    for employee in employees {
        insert_employee(&mut **tx, employee).await?;
    }
    Ok(())
}

/// Substring pattern for `LIKE ... ESCAPE '\'` that matches `term` literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl CompanyRepository for PgRepository {
    async fn get_all_companies(&self) -> RepositoryResult<Vec<Company>> {
        let sql = format!("SELECT {} FROM companies ORDER BY name", COMPANY_COLUMNS);
        Ok(sqlx::query_as::<_, Company>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_company(&self, id: Uuid) -> RepositoryResult<Option<Company>> {
        let sql = format!("SELECT {} FROM companies WHERE id = $1", COMPANY_COLUMNS);
        Ok(sqlx::query_as::<_, Company>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn get_companies_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Company>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {} FROM companies WHERE id = ANY($1)", COMPANY_COLUMNS);
        Ok(sqlx::query_as::<_, Company>(&sql).bind(ids).fetch_all(&self.pool).await?)
    }

    async fn create_company(&self, company: Company, employees: Vec<Employee>) -> RepositoryResult<Company> {
        let mut tx = self.pool.begin().await?;
        insert_company(&mut tx, &company, &employees).await?;
        tx.commit().await?;
        Ok(company)
    }

    async fn create_companies(&self, companies: Vec<(Company, Vec<Employee>)>) -> RepositoryResult<Vec<Company>> {
        let mut tx = self.pool.begin().await?;
        for (company, employees) in &companies {
            insert_company(&mut tx, company, employees).await?;
        }
        tx.commit().await?;
        Ok(companies.into_iter().map(|(company, _)| company).collect())
    }

    async fn update_company(&self, company: &Company, new_employees: Vec<Employee>) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE companies SET name = $2, address = $3, country = $4 WHERE id = $1")
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.address)
            .bind(&company.country)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Company with id: {} doesn't exist", company.id)));
        }
        for employee in &new_employees {
            insert_employee(&mut *tx, employee).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_company(&self, id: Uuid) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM employees WHERE company_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Company with id: {} doesn't exist", id)));
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for PgRepository {
    async fn get_employees(
        &self,
        company_id: Uuid,
        params: &EmployeeParameters,
    ) -> RepositoryResult<PagedList<Employee>> {
        let search = params.search_term().map(|term| like_pattern(&term));
        let filter = "company_id = $1 AND age >= $2 AND age <= $3 AND ($4::text IS NULL OR LOWER(name) LIKE $4 ESCAPE '\\')";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM employees WHERE {}", filter))
            .bind(company_id)
            .bind(i64::from(params.min_age))
            .bind(i64::from(params.max_age))
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let order = OrderBy::generate(&OrderBy::parse(params.order_by.as_deref()));
        let sql = format!(
            "SELECT {} FROM employees WHERE {} {} LIMIT $5 OFFSET $6",
            EMPLOYEE_COLUMNS, filter, order
        );
        let items = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(i64::from(params.min_age))
            .bind(i64::from(params.max_age))
            .bind(&search)
            .bind(i64::from(params.page_size))
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(PagedList::new(items, total.max(0) as u64, params.page_number, params.page_size))
    }

    async fn get_employee(&self, company_id: Uuid, id: Uuid) -> RepositoryResult<Option<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE company_id = $1 AND id = $2",
            EMPLOYEE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_employee(&self, employee: Employee) -> RepositoryResult<Employee> {
        insert_employee(&self.pool, &employee).await?;
        Ok(employee)
    }

    async fn update_employee(&self, employee: &Employee) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE employees SET name = $3, age = $4, position = $5 WHERE company_id = $1 AND id = $2",
        )
        .bind(employee.company_id)
        .bind(employee.id)
        .bind(&employee.name)
        .bind(employee.age)
        .bind(&employee.position)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Employee with id: {} doesn't exist", employee.id)));
        }
        Ok(())
    }

    async fn delete_employee(&self, company_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Employee with id: {} doesn't exist", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_by_user_name(&self, user_name: &str) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(user_name) = LOWER($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: User) -> RepositoryResult<User> {
        let result = sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.user_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(&user.roles)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(RepositoryError::Duplicate(
                format!("Username '{}' is already taken.", user.user_name),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl HealthCheck for PgRepository {
    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("sam"), "%sam%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
