//! # cluster-operator
//!
//! Operator invocation for clusterctl.
//!
//! A cluster exposes named *operators*, plugins that declare their operations
//! together with typed parameter schemas. This crate discovers those schemas at
//! runtime, validates and converts user supplied `key=value` arguments against
//! them, and dispatches the resulting request to the cluster's HTTP API.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  fetch   ┌───────────────┐  GET (fallback)  ┌──────────────┐
//! │ Dispatcher │─────────►│ SchemaFetcher │─────────────────►│              │
//! │            │          └───────────────┘                  │ RemoteClient │──► cluster nodes
//! │            │  validate ┌───────────┐                     │              │
//! │            │──────────►│ validate  │── convert           │              │
//! │            │           └───────────┘                     │              │
//! │            │  POST (single node)                         │              │
//! │            │────────────────────────────────────────────►│              │
//! └────────────┘                                             └──────────────┘
//! ```
//!
//! The [`transport::Transport`] trait is the seam between the client and the
//! network, so everything above it can be exercised without real sockets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod fetcher;
pub mod remote;
pub mod schema;
pub mod transport;
pub mod validate;
pub mod value;

pub use api::{ApiResponse, LeaderRecord, NodeRecord, OperatorPayload, OperatorSummary};
pub use dispatcher::{ArgumentNamespace, Dispatcher, TriggerRequest, TriggerResult};
pub use endpoint::{Endpoint, NodeEndpoints};
pub use error::{
    ClientError, ConversionError, OperatorError, ResponseError, TransportError, ValidationError,
};
pub use fetcher::{FetchedSchema, SchemaFetcher};
pub use remote::{RemoteClient, RemoteSettings};
pub use schema::{OperationSchema, OperatorSchema, ParameterMap, ParameterSchema, RequiredParameter};
pub use transport::{HttpTransport, Transport};
pub use validate::{RawArguments, ValidatedArguments, validate};
pub use value::{ParamType, TypedValue, convert};
