//! The membership admission workflow: username allocation, account
//! provisioning on approval, and rejection.

pub mod allocator;
pub mod approval;
pub mod error;
pub mod password;

pub use approval::{
    approve_admission, approve_admission_with_retry, reject_admission, ProvisioningSettings,
};
pub use error::{AdmissionError, Result};
