//! Release publishing on the hosting service.
//!
//! - [`api`] - Release records and the [`api::ReleaseApi`] seam
//! - [`github`] - The GitHub REST implementation
//! - [`notes`] - Release note composition
//! - [`publisher`] - Draft selection and asset upload

pub mod api;
mod error;
pub mod github;
pub mod notes;
pub mod publisher;

pub use error::PublishError;
