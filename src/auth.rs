//! Auth-domain identifiers, secrets, credentials, and freshness policy.

pub mod account;
pub mod correlation;
pub mod credential;
pub mod freshness;
pub mod id;
pub mod secret;
pub mod step_up;

pub use account::*;
pub use correlation::*;
pub use credential::*;
pub use freshness::*;
pub use id::*;
pub use secret::*;
pub use step_up::*;
