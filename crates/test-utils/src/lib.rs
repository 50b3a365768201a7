//! Fixtures and in-memory collaborators for testing the passkey crates.

pub mod asserts;
pub mod fixtures;
pub mod mock_ledger;
pub mod software_authenticator;

pub use self::{
    asserts::ResultAssertsExt,
    mock_ledger::MockLedger,
    software_authenticator::{AttestationFormat, SoftwareAuthenticator},
};

use rstest::fixture;

pub const AUTHENTICATOR_SEED: [u8; 32] = [0x2a; 32];

#[fixture]
pub fn authenticator() -> SoftwareAuthenticator {
    SoftwareAuthenticator::new(AUTHENTICATOR_SEED, fixtures::CREDENTIAL_ID)
}

#[fixture]
pub fn ledger() -> MockLedger {
    MockLedger::new(1_000)
}
