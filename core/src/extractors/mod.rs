//! # Model Extractors
//!
//! Turn classified components and operations into the models the emission layer renders.

pub mod clients;
pub mod enums;
pub mod errors;
pub mod handlers;
pub mod operations;
pub mod records;
pub mod results;
pub mod tuples;
pub mod unions;

pub use clients::{extract_clients, ClientMethod, ClientModel, PathSegment};
pub use enums::{extract_enum, EnumModel};
pub use errors::{extract_errors, ErrorModel};
pub use handlers::{extract_handlers, HandlerInterface, HandlerMethod};
pub use operations::{extract_operations, OperationModel, ParameterModel, RequestBodyModel};
pub use records::{extract_record, PropertyModel, RecordModel};
pub use results::{extract_result, ResultCase, ResultModel, StatusCode};
pub use tuples::{extract_tuple, TupleModel};
pub use unions::{extract_hierarchy, extract_union, UnionKind, UnionModel};
