pub mod identity_client;

pub use identity_client::{FirebaseIdentityClient, IdentityProvider, ProviderSession};
