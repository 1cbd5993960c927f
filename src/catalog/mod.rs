//! Endpoint catalog and request builder
//!
//! Every dataset the transparency service exposes differs only in its path,
//! HTTP method and body layout. The catalog is therefore a static table of
//! [`EndpointDescriptor`]s keyed by dataset name, and building a request is
//! pure data assembly with no network access.
//!
//! ## Key Components
//!
//! - [`Catalog`] - Versioned registry of descriptors
//! - [`EndpointDescriptor`] - Path, method and payload shape of one dataset
//! - [`PayloadShape`] / [`RequestParams`] - Body layouts and per-call parameters
//! - [`DateRange`] - Inclusive day range with the service's timestamp format
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridfetch::catalog::{Catalog, DateRange, RequestParams};
//!
//! let catalog = Catalog::v1();
//! let mcp = catalog.get("mcp")?;
//! let request = mcp.build(&RequestParams::for_range(range))?;
//! ```

mod dates;
mod descriptors;
mod payload;

pub use dates::{DateRange, SERVICE_OFFSET, start_of_day};
pub use payload::{DEFAULT_REGION, IdKind, PayloadShape, RequestParams, build_body};

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Catalog version shipped with this build
pub const DEFAULT_CATALOG_VERSION: &str = "v1";

/// Caller errors raised while assembling a request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("organization id and uevcb id must be given together or not at all")]
    PartialUnitIds,

    #[error("a date range is required")]
    MissingDateRange,

    #[error("a date is required")]
    MissingDate,

    #[error("required identifier '{0}' is missing")]
    MissingIdentifier(&'static str),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("dataset '{dataset}' does not accept a {parameter}")]
    UnsupportedParameter {
        dataset: &'static str,
        parameter: &'static str,
    },

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("unknown catalog version: {0}")]
    UnknownCatalog(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.pad("GET"),
            HttpMethod::Post => f.pad("POST"),
        }
    }
}

/// Static definition of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub method: HttpMethod,
    /// Path relative to the service base URL
    pub path: &'static str,
    pub shape: PayloadShape,
    /// Append the national region default to the body
    pub with_region: bool,
    pub requires_ticket: bool,
    pub description: &'static str,
}

/// A fully assembled call, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub dataset: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    /// `None` for bodiless GET lookups
    pub body: Option<Value>,
    pub requires_ticket: bool,
}

impl EndpointDescriptor {
    /// Build the request for this dataset.
    ///
    /// Rejects parameters the shape does not consume, and half-specified
    /// unit ids, before anything is sent.
    pub fn build(&self, params: &RequestParams) -> Result<ApiRequest, RequestError> {
        let accepted = payload::accepted(self.shape);
        if let Some(parameter) = params
            .supplied()
            .into_iter()
            .find(|name| !accepted.contains(name))
        {
            return Err(RequestError::UnsupportedParameter {
                dataset: self.name,
                parameter,
            });
        }

        let body = match self.method {
            HttpMethod::Get => None,
            HttpMethod::Post => Some(build_body(self.shape, self.with_region, params)?),
        };

        Ok(ApiRequest {
            dataset: self.name,
            method: self.method,
            path: self.path,
            body,
            requires_ticket: self.requires_ticket,
        })
    }
}

/// Registry mapping dataset names to descriptors
#[derive(Debug, Clone)]
pub struct Catalog {
    version: &'static str,
    endpoints: BTreeMap<&'static str, &'static EndpointDescriptor>,
}

impl Catalog {
    fn from_table(version: &'static str, table: &'static [EndpointDescriptor]) -> Self {
        let endpoints = table.iter().map(|d| (d.name, d)).collect();
        Self { version, endpoints }
    }

    /// The `v1/<area>/data/<dataset>` electricity service catalog
    pub fn v1() -> Self {
        Self::from_table("v1", descriptors::V1)
    }

    /// Select a catalog by configured version
    pub fn for_version(version: &str) -> Result<Self, RequestError> {
        match version {
            "v1" => Ok(Self::v1()),
            other => Err(RequestError::UnknownCatalog(other.to_string())),
        }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn get(&self, dataset: &str) -> Result<&'static EndpointDescriptor, RequestError> {
        self.endpoints
            .get(dataset)
            .copied()
            .ok_or_else(|| RequestError::UnknownDataset(dataset.to_string()))
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.endpoints.contains_key(dataset)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Descriptors in dataset-name order
    pub fn iter(&self) -> impl Iterator<Item = &'static EndpointDescriptor> + '_ {
        self.endpoints.values().copied()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::v1()
    }
}
