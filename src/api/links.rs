//! Hypermedia links for the employee resource.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shaping::ShapedEntity;

/// Named route lookup supplied by the routing layer.
pub trait RouteResolver: Send + Sync {
    fn resolve(&self, route_name: &str, params: &[(&str, String)]) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    pub method: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.into(),
        }
    }
}

/// Route names shared by the router and the link builder.
pub mod route_names {
    pub const GET_COMPANY: &str = "CompanyById";
    pub const COMPANY_COLLECTION: &str = "CompanyCollection";
    pub const GET_EMPLOYEE_FOR_COMPANY: &str = "GetEmployeeForCompany";
    pub const GET_EMPLOYEES_FOR_COMPANY: &str = "GetEmployeesForCompany";
    pub const CREATE_EMPLOYEE_FOR_COMPANY: &str = "CreateEmployeeForCompany";
}

/// Relation names clients may depend on.
pub mod rels {
    pub const SELF: &str = "self";
    pub const EMPLOYEE: &str = "employee";
    pub const CREATE_EMPLOYEE_FOR_COMPANY: &str = "create_employee_for_company";
    pub const COMPANY: &str = "company";
}

/// Links attached to a single employee, in a fixed order.
pub fn employee_links(employee_id: Uuid, company_id: Uuid, routes: &dyn RouteResolver) -> Vec<Link> {
    let company = ("companyId", company_id.to_string());
    vec![
        Link::new(
            routes.resolve(
                route_names::GET_EMPLOYEE_FOR_COMPANY,
                &[company.clone(), ("id", employee_id.to_string())],
            ),
            rels::SELF,
            "GET",
        ),
        Link::new(
            routes.resolve(route_names::GET_EMPLOYEES_FOR_COMPANY, &[company.clone()]),
            rels::EMPLOYEE,
            "GET",
        ),
        Link::new(
            routes.resolve(route_names::CREATE_EMPLOYEE_FOR_COMPANY, &[company]),
            rels::CREATE_EMPLOYEE_FOR_COMPANY,
            "POST",
        ),
    ]
}

/// Links describing an employee collection as a whole.
pub fn employee_collection_links(company_id: Uuid, routes: &dyn RouteResolver) -> Vec<Link> {
    vec![
        Link::new(
            routes.resolve(
                route_names::GET_EMPLOYEES_FOR_COMPANY,
                &[("companyId", company_id.to_string())],
            ),
            rels::SELF,
            "GET",
        ),
        Link::new(
            routes.resolve(route_names::GET_COMPANY, &[("id", company_id.to_string())]),
            rels::COMPANY,
            "GET",
        ),
    ]
}

/// Attach employee links when hypermedia was negotiated; otherwise return the
/// entity untouched.
pub fn add_links(
    mut shaped: ShapedEntity,
    employee_id: Uuid,
    company_id: Uuid,
    hypermedia: bool,
    routes: &dyn RouteResolver,
) -> ShapedEntity {
    if !hypermedia {
        return shaped;
    }
    shaped.links.extend(employee_links(employee_id, company_id, routes));
    shaped
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::shaping::Record;

    /// Resolver that renders `name?key=value` so tests can assert on inputs.
    pub(crate) struct EchoRoutes;

    impl RouteResolver for EchoRoutes {
        fn resolve(&self, route_name: &str, params: &[(&str, String)]) -> String {
            let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}?{}", route_name, query.join("&"))
        }
    }

    #[test]
    fn no_links_without_hypermedia() {
        let id = Uuid::new_v4();
        let shaped = ShapedEntity::new(id, Record::new());
        let out = add_links(shaped.clone(), id, Uuid::new_v4(), false, &EchoRoutes);
        assert_eq!(out, shaped);
    }

    #[test]
    fn hypermedia_adds_fixed_relation_set() {
        let id = Uuid::new_v4();
        let company = Uuid::new_v4();
        let out = add_links(ShapedEntity::new(id, Record::new()), id, company, true, &EchoRoutes);

        let rels: Vec<&str> = out.links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "employee", "create_employee_for_company"]);
        let methods: Vec<&str> = out.links.iter().map(|l| l.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "GET", "POST"]);
        assert_eq!(
            out.links[0].href,
            format!("GetEmployeeForCompany?companyId={}&id={}", company, id)
        );
        assert!(out.entity.is_empty());
    }

    #[test]
    fn collection_links_point_at_collection_and_company() {
        let company = Uuid::new_v4();
        let links = employee_collection_links(company, &EchoRoutes);
        assert_eq!(links[0].rel, "self");
        assert_eq!(links[1].rel, "company");
        assert_eq!(links[1].href, format!("CompanyById?id={}", company));
    }
}
