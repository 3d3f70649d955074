//! Reporting and analytics engine.
//!
//! Requests flow through [`filter::FilterBuilder`] into one or more
//! [`store::RecordStore`] reads, are aggregated into a format-independent
//! [`model::Report`] by [`composer::ReportComposer`], and are finally handed
//! to a [`render::Renderer`].

pub mod aggregate;
pub mod composer;
pub mod error;
pub mod filter;
pub mod model;
pub mod performance;
pub mod policy;
pub mod render;
pub mod store;
pub mod trend;

pub use composer::ReportComposer;
pub use error::ReportError;
pub use filter::{CallerScope, ReportParams};
pub use model::{Report, ReportType};
pub use policy::LeavePolicy;
pub use render::{OutputFormat, RenderedFile, RenderedOutput, Renderer};
pub use store::{RecordStore, StoreError};
