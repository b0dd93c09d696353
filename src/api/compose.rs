//! Assemble the employee collection response from shaping and links.

use serde::Serialize;
use uuid::Uuid;

use super::links::{add_links, employee_collection_links, Link, RouteResolver};
use super::media::Negotiated;
use super::shaping::{shape, ShapedEntity};
use crate::models::EmployeeDto;

/// Bare array for plain consumers, `{value, links}` envelope for hypermedia.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Plain(Vec<ShapedEntity>),
    Envelope {
        value: Vec<ShapedEntity>,
        links: Vec<Link>,
    },
}

impl ResponseBody {
    pub fn entities(&self) -> &[ShapedEntity] {
        match self {
            ResponseBody::Plain(value) | ResponseBody::Envelope { value, .. } => value,
        }
    }
}

/// Shape `employees` with `fields_query` and, for hypermedia clients, link
/// every entity and wrap the collection. Order of `employees` is preserved.
pub fn compose(
    employees: &[EmployeeDto],
    fields_query: Option<&str>,
    negotiated: &Negotiated,
    routes: &dyn RouteResolver,
    company_id: Uuid,
) -> ResponseBody {
    let shaped = shape(employees, fields_query);

    if !negotiated.hypermedia {
        return ResponseBody::Plain(shaped);
    }

    let value = shaped
        .into_iter()
        .map(|entity| {
            let id = entity.id;
            add_links(entity, id, company_id, true, routes)
        })
        .collect();

    ResponseBody::Envelope {
        value,
        links: employee_collection_links(company_id, routes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::links::tests::EchoRoutes;
    use crate::api::media::OutputFormat;
    use serde_json::{json, Value};

    fn plain() -> Negotiated {
        Negotiated::new("application/json", OutputFormat::Json, false)
    }

    fn hateoas() -> Negotiated {
        Negotiated::new("application/vnd.tnguyen.hateoas+json", OutputFormat::Json, true)
    }

    fn ann() -> EmployeeDto {
        EmployeeDto {
            id: Uuid::from_u128(1),
            name: "Ann".into(),
            age: 30,
            position: "Dev".into(),
        }
    }

    #[test]
    fn plain_response_is_bare_shaped_array() {
        let body = compose(&[ann()], Some("name"), &plain(), &EchoRoutes, Uuid::from_u128(9));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!([{ "Id": Uuid::from_u128(1), "Name": "Ann" }])
        );
    }

    #[test]
    fn hypermedia_response_is_enveloped_and_linked() {
        let company = Uuid::from_u128(9);
        let body = compose(&[ann()], Some("name"), &hateoas(), &EchoRoutes, company);
        let value = serde_json::to_value(&body).unwrap();

        let obj = value.as_object().unwrap();
        assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["value", "links"]);

        let entity = &value["value"][0];
        assert_eq!(entity["Id"], json!(Uuid::from_u128(1)));
        assert_eq!(entity["Name"], "Ann");
        assert!(entity.get("Age").is_none());

        let rels: Vec<&str> = entity["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["rel"].as_str().unwrap())
            .collect();
        assert_eq!(rels, vec!["self", "employee", "create_employee_for_company"]);
        assert!(entity["links"][0]["href"]
            .as_str()
            .unwrap()
            .ends_with(&Uuid::from_u128(1).to_string()));
        assert_eq!(value["links"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn plain_response_has_no_links_at_any_level() {
        let body = compose(&[ann()], None, &plain(), &EchoRoutes, Uuid::from_u128(9));
        let value = serde_json::to_value(&body).unwrap();
        let items = value.as_array().unwrap();
        assert!(items.iter().all(|item| item.get("links").is_none()));
        assert_eq!(
            items[0].as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["Id", "Name", "Age", "Position"]
        );
    }

    #[test]
    fn input_order_is_preserved() {
        let employees: Vec<EmployeeDto> = (1..=3u128)
            .rev()
            .map(|n| EmployeeDto {
                id: Uuid::from_u128(n),
                name: format!("E{}", n),
                age: 20 + n as i32,
                position: "Dev".into(),
            })
            .collect();

        for negotiated in [plain(), hateoas()] {
            let body = compose(&employees, Some("id"), &negotiated, &EchoRoutes, Uuid::from_u128(9));
            let ids: Vec<Uuid> = body.entities().iter().map(|e| e.id).collect();
            assert_eq!(ids, vec![Uuid::from_u128(3), Uuid::from_u128(2), Uuid::from_u128(1)]);
        }
    }

    #[test]
    fn empty_collection_still_gets_envelope_for_hypermedia() {
        let body = compose(&[], None, &hateoas(), &EchoRoutes, Uuid::from_u128(9));
        let value: Value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["value"], json!([]));
        assert_eq!(value["links"][0]["rel"], "self");
    }
}
