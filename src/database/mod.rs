pub mod manager;
pub mod memory;
pub mod ordering;
pub mod paging;
pub mod postgres;
pub mod repository;

pub use memory::MemoryStore;
pub use paging::{EmployeeParameters, MetaData, PagedList};
pub use postgres::PgRepository;
pub use repository::{
    CompanyRepository, EmployeeRepository, HealthCheck, RepositoryError, RepositoryManager, RepositoryResult,
    UserRepository,
};
