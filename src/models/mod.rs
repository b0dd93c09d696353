pub mod company;
pub mod employee;
pub mod user;
pub mod validation;

pub use company::{Company, CompanyDto, CompanyForCreationDto, CompanyForManipulationDto, CompanyForUpdateDto};
pub use employee::{
    Employee, EmployeeDto, EmployeeForCreationDto, EmployeeForManipulationDto, EmployeeForUpdateDto,
};
pub use user::{User, UserForAuthenticationDto, UserForRegistrationDto, ROLES};
pub use validation::FieldErrors;
