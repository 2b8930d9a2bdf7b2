//! fbgraph
//!
//! Request assembly and response interpretation for the Facebook Graph API
//! and the legacy REST API. The engine turns a loosely-typed parameter set
//! and a target path into a single transport-ready request descriptor, then
//! decodes the raw response into a value or a classified error. Socket I/O
//! itself is delegated to a shared `reqwest::Client`.
#![deny(unsafe_code)]

pub mod client;
pub mod encoding;
pub mod error;
pub mod params;
pub mod request;
pub mod response;

mod macros;

pub use client::{FacebookClient, FacebookClientBuilder};
pub use error::FbError;
pub use params::{MediaBytes, MediaStream, ParamValue, Params};
pub use request::builder::{build_request, BuildContext, RequestBody, RequestDescriptor, ETAG_KEY};
pub use response::{interpret, DecodedResponse, ResponseEnvelope};
