//! Rendering negotiated responses to JSON, XML or CSV bodies.

use std::fmt::Display;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use csv::{Terminator, WriterBuilder};
use serde::{ser::SerializeStruct, Serialize, Serializer};

use super::compose::ResponseBody;
use super::media::{Negotiated, OutputFormat};
use crate::error::ApiError;
use crate::models::EmployeeDto;

/// A resource that can be written as one CSV line.
pub trait CsvRow {
    fn csv_row(&self) -> Vec<String>;
}

/// Element names a resource is written under in XML bodies.
pub trait XmlElement {
    /// Element for one resource, also the document root for a single item
    const ELEMENT: &'static str;
    /// Document root for a collection
    const COLLECTION: &'static str;
}

/// A sequence written as repeated `element` children of the document root.
pub struct XmlList<'a, T> {
    element: &'static str,
    items: &'a [T],
}

impl<'a, T> XmlList<'a, T> {
    pub fn new(element: &'static str, items: &'a [T]) -> Self {
        Self { element, items }
    }
}

impl<T: Serialize> Serialize for XmlList<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut list = serializer.serialize_struct("XmlList", 1)?;
        list.serialize_field(self.element, self.items)?;
        list.end()
    }
}

fn format_error(err: impl Display) -> ApiError {
    tracing::error!("Failed to serialize response data: {}", err);
    ApiError::internal_server_error("Failed to format response")
}

/// Write rows as CSV without a header line, CRLF terminated.
pub fn to_csv<T: CsvRow>(rows: &[T]) -> Result<String, ApiError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row.csv_row()).map_err(format_error)?;
    }
    let bytes = writer.into_inner().map_err(|e| format_error(e.into_error()))?;
    String::from_utf8(bytes).map_err(format_error)
}

/// Serialize `data` as an XML document rooted at `root`.
pub fn to_xml<T: Serialize>(root: &str, data: &T) -> Result<String, ApiError> {
    quick_xml::se::to_string_with_root(root, data).map_err(format_error)
}

fn with_content_type(status: StatusCode, media_type: &str, body: String) -> Response {
    let mut response = (status, body).into_response();
    let value = HeaderValue::from_str(media_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/json"));
    response.headers_mut().insert(header::CONTENT_TYPE, value);
    response
}

/// Serialize `data` as JSON under the negotiated media type.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    data: &T,
    negotiated: &Negotiated,
) -> Result<Response, ApiError> {
    let body = serde_json::to_string(data).map_err(format_error)?;
    Ok(with_content_type(status, &negotiated.media_type, body))
}

/// Serialize `data` as XML under the negotiated media type.
pub fn xml_response<T: Serialize>(
    status: StatusCode,
    root: &str,
    data: &T,
    negotiated: &Negotiated,
) -> Result<Response, ApiError> {
    let body = to_xml(root, data)?;
    Ok(with_content_type(status, &negotiated.media_type, body))
}

/// Render a collection in whichever format was negotiated.
pub fn collection_response<T: Serialize + CsvRow + XmlElement>(
    status: StatusCode,
    data: &[T],
    negotiated: &Negotiated,
) -> Result<Response, ApiError> {
    match negotiated.format {
        OutputFormat::Json => json_response(status, &data, negotiated),
        OutputFormat::Xml => xml_response(status, T::COLLECTION, &XmlList::new(T::ELEMENT, data), negotiated),
        OutputFormat::Csv => Ok(with_content_type(status, &negotiated.media_type, to_csv(data)?)),
    }
}

/// Render a single resource in whichever format was negotiated.
pub fn item_response<T: Serialize + CsvRow + XmlElement>(
    status: StatusCode,
    data: &T,
    negotiated: &Negotiated,
) -> Result<Response, ApiError> {
    match negotiated.format {
        OutputFormat::Json => json_response(status, data, negotiated),
        OutputFormat::Xml => xml_response(status, T::ELEMENT, data, negotiated),
        OutputFormat::Csv => collection_response(status, std::slice::from_ref(data), negotiated),
    }
}

/// Render a composed employee collection. Employees have no CSV form, so
/// anything but XML is written as JSON.
pub fn composed_response(
    status: StatusCode,
    body: &ResponseBody,
    negotiated: &Negotiated,
) -> Result<Response, ApiError> {
    if negotiated.format != OutputFormat::Xml {
        return json_response(status, body, negotiated);
    }
    match body {
        ResponseBody::Plain(items) => xml_response(
            status,
            EmployeeDto::COLLECTION,
            &XmlList::new(EmployeeDto::ELEMENT, items),
            negotiated,
        ),
        ResponseBody::Envelope { .. } => xml_response(status, EmployeeDto::COLLECTION, body, negotiated),
    }
}
