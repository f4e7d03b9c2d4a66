pub mod auditor;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod helpers;
pub mod htlc;
pub mod identity;
pub mod multisig;
pub mod token;

pub use auditor::{Auditor, AuditError, CheckContext};
pub use config::AuditorConfig;
pub use identity::Identity;

#[cfg(test)]
mod tests;
