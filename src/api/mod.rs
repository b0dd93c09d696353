pub mod compose;
pub mod format;
pub mod links;
pub mod media;
pub mod shaping;

pub use compose::{compose, ResponseBody};
pub use links::{add_links, Link, RouteResolver};
pub use media::{negotiate, negotiate_or_json, Negotiated, NegotiationError, OutputFormat, SupportedMedia};
pub use shaping::{shape, FieldSpec, FieldTable, Record, Shapeable, ShapedEntity};
