use std::collections::BTreeMap;

use passkey_crypto::{Ed25519PublicKey, P256Signature};
use passkey_webauthn::Secp256r1Signature;
use stellar_xdr::curr::ScVal;

use crate::{
    ContractAddress, Error, Result,
    scval::{self, as_array, as_bytes, as_map, as_variant, field},
};

/// Identity of a wallet signer, i.e. the key of the signature map
///
/// Variants are declared in symbol order, so `Ord` agrees with the order
/// of the encoded keys in a host map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::IntoStaticStr)]
pub enum SignerKey {
    Ed25519([u8; 32]),
    Policy(ContractAddress),
    /// WebAuthn credential id
    Secp256r1(Vec<u8>),
}

impl SignerKey {
    pub fn to_sc_val(&self) -> Result<ScVal> {
        let tag: &'static str = self.into();
        let payload = match self {
            Self::Policy(address) => ScVal::Address(address.to_sc_address()),
            Self::Ed25519(public_key) => scval::bytes(*public_key)?,
            Self::Secp256r1(key_id) => scval::bytes(key_id.clone())?,
        };
        scval::variant(tag, [payload])
    }

    pub fn from_sc_val(val: &ScVal) -> Result<Self> {
        const WHAT: &str = "signer key";

        let (tag, [payload]) = as_variant(val, WHAT)? else {
            return Err(Error::InvalidScVal(WHAT));
        };
        match tag {
            b"Policy" => match payload {
                ScVal::Address(address) => ContractAddress::from_sc_address(address)
                    .map(Self::Policy)
                    .ok_or(Error::InvalidScVal(WHAT)),
                _ => Err(Error::InvalidScVal(WHAT)),
            },
            b"Ed25519" => as_array(payload, WHAT).map(Self::Ed25519),
            b"Secp256r1" => as_bytes(payload, WHAT).map(|id| Self::Secp256r1(id.to_vec())),
            _ => Err(Error::InvalidScVal(WHAT)),
        }
    }
}

impl From<Ed25519PublicKey> for SignerKey {
    #[inline]
    fn from(public_key: Ed25519PublicKey) -> Self {
        Self::Ed25519(public_key.0)
    }
}

/// Signature material stored under a [`SignerKey`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Ed25519([u8; 64]),
    Secp256r1(Secp256r1Signature),
}

impl Signature {
    pub fn to_sc_val(&self) -> Result<ScVal> {
        match self {
            Self::Ed25519(signature) => scval::variant("Ed25519", [scval::bytes(*signature)?]),
            Self::Secp256r1(signature) => scval::variant(
                "Secp256r1",
                [scval::record([
                    (
                        "authenticator_data",
                        scval::bytes(signature.authenticator_data.clone())?,
                    ),
                    (
                        "client_data_json",
                        scval::bytes(signature.client_data_json.clone())?,
                    ),
                    ("signature", scval::bytes(signature.signature.0)?),
                ])?],
            ),
        }
    }

    pub fn from_sc_val(val: &ScVal) -> Result<Self> {
        const WHAT: &str = "signature";

        let (tag, [payload]) = as_variant(val, WHAT)? else {
            return Err(Error::InvalidScVal(WHAT));
        };
        match tag {
            b"Ed25519" => as_array(payload, WHAT).map(Self::Ed25519),
            b"Secp256r1" => {
                let fields = as_map(payload, WHAT)?;
                Ok(Self::Secp256r1(Secp256r1Signature {
                    authenticator_data: as_bytes(field(fields, "authenticator_data", WHAT)?, WHAT)?
                        .to_vec(),
                    client_data_json: as_bytes(field(fields, "client_data_json", WHAT)?, WHAT)?
                        .to_vec(),
                    signature: P256Signature(as_array(field(fields, "signature", WHAT)?, WHAT)?),
                }))
            }
            _ => Err(Error::InvalidScVal(WHAT)),
        }
    }

    /// `Void` for signers without signature material, i.e. policies
    pub fn option_to_sc_val(signature: Option<&Self>) -> Result<ScVal> {
        signature.map_or(Ok(ScVal::Void), Self::to_sc_val)
    }

    pub fn option_from_sc_val(val: &ScVal) -> Result<Option<Self>> {
        match val {
            ScVal::Void => Ok(None),
            val => Self::from_sc_val(val).map(Some),
        }
    }
}

/// Where a signer is stored in the wallet contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::IntoStaticStr)]
pub enum SignerStorage {
    #[default]
    Persistent,
    /// Expires with its ledger entry
    Temporary,
}

impl SignerStorage {
    pub fn to_sc_val(self) -> Result<ScVal> {
        scval::variant(self.into(), [])
    }

    pub fn from_sc_val(val: &ScVal) -> Result<Self> {
        const WHAT: &str = "signer storage";

        match as_variant(val, WHAT)? {
            (b"Persistent", []) => Ok(Self::Persistent),
            (b"Temporary", []) => Ok(Self::Temporary),
            _ => Err(Error::InvalidScVal(WHAT)),
        }
    }
}

/// Restricts a signer to given contract contexts. Each context may in turn
/// require co-signers; `None` means no extra signer is required.
///
/// The empty string stands for "any context" and is not encoded, since an
/// empty map is already unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignerLimits(pub BTreeMap<String, Option<Vec<SignerKey>>>);

impl SignerLimits {
    pub fn to_sc_val(&self) -> Result<ScVal> {
        let entries = self
            .0
            .iter()
            .filter(|(context, _)| !context.is_empty())
            .map(|(context, keys)| {
                let address: ContractAddress = context.parse()?;
                let keys = match keys {
                    Some(keys) => scval::vec(
                        keys.iter()
                            .map(SignerKey::to_sc_val)
                            .collect::<Result<_>>()?,
                    )?,
                    None => ScVal::Void,
                };
                Ok((ScVal::Address(address.to_sc_address()), keys))
            })
            .collect::<Result<Vec<_>>>()?;
        scval::vec(vec![scval::map(entries)?])
    }

    pub fn from_sc_val(val: &ScVal) -> Result<Self> {
        const WHAT: &str = "signer limits";

        let [limits] = scval::as_vec(val, WHAT)? else {
            return Err(Error::InvalidScVal(WHAT));
        };
        as_map(limits, WHAT)?
            .iter()
            .map(|entry| {
                let ScVal::Address(address) = &entry.key else {
                    return Err(Error::InvalidScVal(WHAT));
                };
                let context = ContractAddress::from_sc_address(address)
                    .ok_or(Error::InvalidScVal(WHAT))?
                    .to_string();
                let keys: Option<Vec<SignerKey>> = match &entry.val {
                    ScVal::Void => None,
                    keys => Some(
                        scval::as_vec(keys, WHAT)?
                            .iter()
                            .map(SignerKey::from_sc_val)
                            .collect::<Result<_>>()?,
                    ),
                };
                Ok((context, keys))
            })
            .collect::<Result<_>>()
            .map(Self)
    }
}
