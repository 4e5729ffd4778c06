//! Test fixtures and constants.

/// Variables used across several tests.
pub const STANDARD_VARS: &[(&str, &str)] = &[
    ("DATABASE_URL", "postgres://localhost/mydb"),
    ("API_KEY", "sk-test-12345"),
    ("REDIS_URL", "redis://localhost:6379"),
];

/// A well-formed key that opens nothing in a fresh directory.
pub const STRANGER_KEY: &str = "dGhpcyBpcyBub3QgdGhlIGtleSB5b3UgYXJlIGxvb2s=";

/// Dotenv content for import tests.
pub const SAMPLE_DOTENV: &str = r#"
# exported from a legacy system
SIMPLE=value
QUOTED="quoted value"
export SINGLE_QUOTED='single $quoted'
SECRET_KEY=must-not-be-imported
"#;

/// An environment file written before the metadata fields existed.
///
/// The placeholders are replaced with real ciphertext by the tests.
pub const LEGACY_TEMPLATE: &str = r#"{
    "SECRET_KEY": "@SECRET@",
    "name": "@NAME@",
    "signed_name": "@SIGNED@"
}"#;
