//! Infrastructure implementation of the `TokenSource` port.

use uuid::Uuid;

use crate::application::ports::TokenSource;

/// Random UUIDv4 tokens drawn from the OS RNG on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokenGenerator;

impl TokenSource for UuidTokenGenerator {
    fn token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
