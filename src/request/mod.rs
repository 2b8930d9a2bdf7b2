//! Request assembly.
//!
//! Turns a resolved path and a normalized parameter set into a single
//! transport-ready request descriptor: host choice, query vs body encoding,
//! multipart composition, and conditional-request headers.

pub mod builder;
pub mod hosts;
pub mod multipart;
pub mod path;

pub use builder::{build_request, BuildContext, RequestBody, RequestDescriptor, ETAG_KEY};
pub use multipart::MultipartBody;
pub use path::{resolve_path, ResolvedPath};
