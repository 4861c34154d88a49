//! Request-shaping primitives shared by the resource model and the pipeline.
//!
//! - **[path]** - segment joining and positional-argument normalization
//! - **[query]** - deterministic query-string serialization
//! - **[headers]** - default headers and header merging

pub mod headers;
pub mod path;
pub mod query;

pub use headers::{apply_default_headers, default_headers, find_header, merge_headers};
pub use path::{concat_paths, normalize_leading_arg, path_from_value, PathSegment};
pub use query::{serialize_params, with_query};
