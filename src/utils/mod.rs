pub mod clock;
pub mod crypto;
pub mod serialization;
