//! Application Layer
//!
//! Use cases and application services.

pub mod account_settings;
pub mod authenticate;
pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod reconcile;
pub mod sign_in;
pub mod sign_up;

// Re-exports
pub use account_settings::{AccountSettingsUseCase, ChangePasswordInput};
pub use authenticate::{RequestAuthenticator, TokenSource, extract_token};
pub use bootstrap::{BootstrapAdmin, ensure_bootstrap_admin};
pub use config::AuthConfig;
pub use reconcile::{ExternalIdentity, ExternalSignInOutput, ExternalSignInUseCase, IdentityReconciler};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
