//! Common transport-layer types shared between the service crates and the
//! HTTP handlers, so response shapes are not duplicated per layer.

mod credentials;

pub use credentials::ProvisionedCredentials;
