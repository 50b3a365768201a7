use passkey_crypto::sha256;
use stellar_xdr::curr::{
    ContractIdPreimage, ContractIdPreimageFromAddress, HashIdPreimage, HashIdPreimageContractId,
    Limits, ScAddress, Uint256, WriteXdr,
};

use crate::{ContractAddress, Result, preimage::network_id};

/// Address of a contract deployed by `deployer` with `salt`
pub fn derive_contract_id(
    passphrase: &str,
    deployer: ScAddress,
    salt: [u8; 32],
) -> Result<ContractAddress> {
    let preimage = HashIdPreimage::ContractId(HashIdPreimageContractId {
        network_id: network_id(passphrase),
        contract_id_preimage: ContractIdPreimage::Address(ContractIdPreimageFromAddress {
            address: deployer,
            salt: Uint256(salt),
        }),
    });
    Ok(ContractAddress(sha256(preimage.to_xdr(Limits::none())?)))
}

/// Wallet deployed by `factory` for a passkey: salted with the SHA-256 of
/// the credential id
pub fn derive_wallet_address(
    passphrase: &str,
    factory: ContractAddress,
    key_id: &[u8],
) -> Result<ContractAddress> {
    derive_contract_id(passphrase, factory.to_sc_address(), sha256(key_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTNET: &str = "Test SDF Network ; September 2015";

    #[test]
    fn deterministic_per_key() {
        let factory = ContractAddress([0xfa; 32]);

        let a = derive_wallet_address(TESTNET, factory, b"credential a").unwrap();
        assert_eq!(
            derive_wallet_address(TESTNET, factory, b"credential a").unwrap(),
            a
        );
        assert_ne!(
            derive_wallet_address(TESTNET, factory, b"credential b").unwrap(),
            a
        );
        assert_ne!(
            derive_wallet_address(TESTNET, ContractAddress([0xfb; 32]), b"credential a").unwrap(),
            a
        );
        assert_ne!(
            derive_wallet_address(
                "Public Global Stellar Network ; September 2015",
                factory,
                b"credential a"
            )
            .unwrap(),
            a
        );
        assert!(a.to_string().starts_with('C'));
    }

    #[test]
    fn wallet_salt_is_hashed_key_id() {
        let factory = ContractAddress([0xfa; 32]);
        assert_eq!(
            derive_wallet_address(TESTNET, factory, b"id").unwrap(),
            derive_contract_id(TESTNET, factory.into(), sha256(b"id")).unwrap()
        );
    }
}
