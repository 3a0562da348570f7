//! Environment composition for external build tools.

pub mod composer;
pub mod credentials;
pub mod platform;

pub use composer::{ComposedEnv, EnvLayer, EnvironmentComposer, LayerSource};
pub use credentials::{AuthStatus, CredentialBridge, CredentialError};
pub use platform::Platform;
