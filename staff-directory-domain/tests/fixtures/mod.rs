#![allow(dead_code)]

use staff_directory_domain::domain::entities::{attribute_keys, Attributes, Identity, NewIdentity};

pub const VALID_PASSWORD: &str = "Passw0rd!";

/// Attribute set that passes every creation rule
pub fn valid_attributes() -> Attributes {
    Attributes::new()
        .with(attribute_keys::DOCUMENT, "123456789")
        .with(attribute_keys::EMAIL, "user@test.com")
        .with(attribute_keys::PHONE_NUMBER, "3001234567")
        .with(attribute_keys::ADDRESS, "Calle 123")
        .with(attribute_keys::BIRTHDATE, "01/01/1990")
        .with(attribute_keys::GIVEN_NAME, "Ana")
        .with(attribute_keys::FAMILY_NAME, "Rojas")
}

pub fn valid_candidate(handle: &str) -> NewIdentity {
    NewIdentity::new(handle, valid_attributes(), VALID_PASSWORD)
}

pub fn candidate_with(key: &str, value: &str) -> NewIdentity {
    valid_candidate("user123").with_attribute(key, value)
}

pub fn candidate_without(key: &str) -> NewIdentity {
    let mut candidate = valid_candidate("user123");
    candidate.attributes.remove(key);
    candidate
}

pub fn existing_identity(handle: &str) -> Identity {
    Identity::new(handle, valid_attributes())
}
