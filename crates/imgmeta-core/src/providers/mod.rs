//! External services that annotate images.
//!
//! Two provider traits (labels and captions) with one HTTP implementation
//! each: Google Cloud Vision for labels and Astica for captions. Clients
//! never return errors to the caller; failures are carried in the outcome
//! types from [`crate::types`].

pub mod astica;
pub mod auth;
pub(crate) mod provider;
pub mod vision;

pub use astica::AsticaClient;
pub use auth::{ServiceAccountKey, ServiceAccountTokens, StaticToken, TokenProvider};
pub use provider::{resolve_env_var, DescriptionProvider, ImageInput, TagProvider};
pub use vision::VisionClient;
