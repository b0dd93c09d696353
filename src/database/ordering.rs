use std::cmp::Ordering;

use crate::models::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSortField {
    Name,
    Age,
    Position,
}

impl EmployeeSortField {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "name" => Some(EmployeeSortField::Name),
            "age" => Some(EmployeeSortField::Age),
            "position" => Some(EmployeeSortField::Position),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            EmployeeSortField::Name => "name",
            EmployeeSortField::Age => "age",
            EmployeeSortField::Position => "position",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: EmployeeSortField,
    pub sort: SortDirection,
}

pub struct OrderBy;

impl OrderBy {
    /// Parse `"age desc, name"`; unknown columns are skipped and an empty
    /// result falls back to ordering by name.
    pub fn parse(order_by: Option<&str>) -> Vec<SortKey> {
        let mut out = Vec::new();
        for part in order_by.unwrap_or_default().split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            let Some(field) = it.next().and_then(EmployeeSortField::parse) else { continue };
            let dir = it.next().unwrap_or("asc");
            let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
            if !out.iter().any(|k: &SortKey| k.field == field) {
                out.push(SortKey { field, sort });
            }
        }
        if out.is_empty() {
            out.push(SortKey { field: EmployeeSortField::Name, sort: SortDirection::Asc });
        }
        out
    }

    pub fn generate(keys: &[SortKey]) -> String {
        if keys.is_empty() { return String::new(); }
        let parts: Vec<String> = keys
            .iter()
            .map(|k| format!("\"{}\" {}", k.field.column(), k.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    pub fn compare(keys: &[SortKey], a: &Employee, b: &Employee) -> Ordering {
        keys.iter()
            .map(|key| {
                let ord = match key.field {
                    EmployeeSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                    EmployeeSortField::Age => a.age.cmp(&b.age),
                    EmployeeSortField::Position => a.position.to_lowercase().cmp(&b.position.to_lowercase()),
                };
                match key.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}
