pub mod content_binder;
pub mod credential_registry;
