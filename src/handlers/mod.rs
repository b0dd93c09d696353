// handlers/mod.rs - HTTP handlers grouped by resource
//
// authentication: public registration and login
// companies:      version 1 company resource (list requires a Manager token)
// companies_v2:   version 2 company listing
// employees:      employees nested under a company
// root:           service description and health

pub mod authentication;
pub mod companies;
pub mod companies_v2;
pub mod employees;
pub mod extract;
pub mod root;
