use std::time::{SystemTime, UNIX_EPOCH};

use passkey_auth::{
    ContractAddress, NormalizedTransaction, OperationKind, Signature, SignerKey, TransactionInput,
    add_signature, address_credentials, derive_wallet_address, entry_payload,
    xdr::{ContractDataDurability, ScVal, SorobanAuthorizationEntry},
};
use passkey_crypto::{CryptoHash, Ed25519Keypair, P256PublicKey};
use passkey_webauthn::{
    AttestationConveyancePreference, AuthenticationOptions, Authenticator, AuthenticatorSelection,
    COSE_ALG_ES256, PublicKeyCredentialDescriptor, PublicKeyCredentialParameters,
    PublicKeyCredentialType, RegistrationOptions, RelyingParty, ResidentKeyRequirement,
    Secp256r1Signature, UserEntity, UserVerificationRequirement, base64url, extract_public_key,
};
use tracing::{debug, info, instrument, warn};

use crate::{Error, KitConfig, LedgerRpc, Result};

/// Challenge of ceremonies that only register or identify a credential
pub const IDENTIFY_CHALLENGE: &[u8] = b"stellaristhebetterblockchain";

/// Which passkey may answer a signing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyIdPin {
    /// Any resident credential
    Any,
    /// The key created or connected first, else any
    #[default]
    Default,
    Pinned(Vec<u8>),
}

#[derive(Debug, Clone)]
pub enum SignMethod<'a> {
    Keypair(&'a Ed25519Keypair),
    Passkey { key_id: KeyIdPin },
    /// Policy signers authorize through their own entry and carry no
    /// signature material
    Policy(ContractAddress),
}

impl SignMethod<'_> {
    #[inline]
    pub const fn passkey() -> Self {
        Self::Passkey {
            key_id: KeyIdPin::Default,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Overrides `latest ledger + ledgers to live`
    pub expiration: Option<u32>,
    pub rp_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedKey {
    pub key_id: Vec<u8>,
    pub public_key: P256PublicKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Credential to connect, identified through the authenticator if absent
    pub key_id: Option<Vec<u8>>,
    /// Wallet to fall back to when none is deployed at the derived address
    pub contract_id: Option<ContractAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedWallet {
    pub key_id: Vec<u8>,
    pub contract_id: ContractAddress,
    /// Only probed for fallback wallets, whose key may be a session signer
    pub key_expired: bool,
}

/// Client side of a passkey smart wallet: creates and connects keys and
/// signs Soroban authorization entries on the wallet's behalf.
pub struct PasskeyKit<R, A> {
    config: KitConfig,
    factory: ContractAddress,
    rpc: R,
    authenticator: A,
    key_id: Option<Vec<u8>>,
    wallet: Option<ContractAddress>,
}

#[allow(clippy::future_not_send)]
impl<R, A> PasskeyKit<R, A>
where
    R: LedgerRpc,
    A: Authenticator,
{
    pub fn new(config: KitConfig, rpc: R, authenticator: A) -> Result<Self> {
        let factory = config.validate()?;
        Ok(Self {
            config,
            factory,
            rpc,
            authenticator,
            key_id: None,
            wallet: None,
        })
    }

    #[inline]
    pub const fn config(&self) -> &KitConfig {
        &self.config
    }

    #[inline]
    pub fn key_id(&self) -> Option<&[u8]> {
        self.key_id.as_deref()
    }

    #[inline]
    pub const fn wallet(&self) -> Option<ContractAddress> {
        self.wallet
    }

    /// Registers a new passkey. The first key created or connected becomes
    /// the default signer.
    #[instrument(skip(self))]
    pub async fn create_key(&mut self, app: &str, user: &str) -> Result<CreatedKey> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let response = self
            .authenticator
            .start_registration(RegistrationOptions {
                rp: RelyingParty {
                    id: self.config.rp_id.clone(),
                    name: app.to_owned(),
                },
                user: UserEntity {
                    id: format!("{user}:{now}").into_bytes(),
                    name: user.to_owned(),
                    display_name: user.to_owned(),
                },
                challenge: IDENTIFY_CHALLENGE.to_vec(),
                pub_key_cred_params: vec![PublicKeyCredentialParameters {
                    alg: COSE_ALG_ES256,
                    typ: PublicKeyCredentialType::PublicKey,
                }],
                authenticator_selection: Some(AuthenticatorSelection {
                    resident_key: Some(ResidentKeyRequirement::Preferred),
                    require_resident_key: false,
                    user_verification: UserVerificationRequirement::Discouraged,
                }),
                attestation: AttestationConveyancePreference::None,
            })
            .await?;

        let public_key = extract_public_key(&response)?;
        let key_id = response.raw_id;
        if self.key_id.is_none() {
            self.key_id = Some(key_id.clone());
        }

        info!(key_id = %base64url::encode(&key_id), %public_key, "passkey created");
        Ok(CreatedKey { key_id, public_key })
    }

    /// Resolves the wallet of a passkey: the factory deployment derived from
    /// the key id if it exists, else `options.contract_id`.
    #[instrument(skip_all)]
    pub async fn connect_wallet(&mut self, options: ConnectOptions) -> Result<ConnectedWallet> {
        let key_id = match options.key_id {
            Some(key_id) => key_id,
            None => self.identify().await?,
        };
        if self.key_id.is_none() {
            self.key_id = Some(key_id.clone());
        }

        let derived =
            derive_wallet_address(&self.config.network_passphrase, self.factory, &key_id)?;
        let deployed = self
            .rpc
            .contract_data_exists(
                derived,
                &ScVal::LedgerKeyContractInstance,
                ContractDataDurability::Persistent,
            )
            .await?;

        let (contract_id, key_expired) = if deployed {
            (derived, false)
        } else if let Some(contract_id) = options.contract_id {
            debug!(%derived, %contract_id, "no wallet at derived address");
            let expired = self
                .is_signer_expired(contract_id, &SignerKey::Secp256r1(key_id.clone()))
                .await;
            (contract_id, expired)
        } else {
            return Err(Error::ContractNotFound(derived));
        };

        self.wallet = Some(contract_id);
        info!(%contract_id, key_expired, "wallet connected");
        Ok(ConnectedWallet {
            key_id,
            contract_id,
            key_expired,
        })
    }

    async fn identify(&self) -> Result<Vec<u8>> {
        let response = self
            .authenticator
            .start_authentication(AuthenticationOptions {
                challenge: IDENTIFY_CHALLENGE.to_vec(),
                rp_id: self.config.rp_id.clone(),
                allow_credentials: Vec::new(),
                user_verification: UserVerificationRequirement::Discouraged,
            })
            .await?;
        Ok(response.raw_id)
    }

    /// Expiration ledger for signatures made with `options`
    pub async fn expiration(&self, options: &SignOptions) -> Result<u32> {
        if let Some(expiration) = options.expiration {
            return Ok(expiration);
        }
        let latest = self.rpc.latest_ledger().await?;
        Ok(latest.saturating_add(self.config.ledgers_to_live()))
    }

    #[instrument(skip_all)]
    pub async fn sign_auth_entry(
        &self,
        entry: &mut SorobanAuthorizationEntry,
        method: &SignMethod<'_>,
        options: &SignOptions,
    ) -> Result<()> {
        // fail before prompting the user
        address_credentials(entry)?;
        let expiration = self.expiration(options).await?;
        self.sign_entry_at(entry, method, options.rp_id.as_deref(), expiration)
            .await
    }

    /// Signs the entries authorizing the connected wallet, in order, with a
    /// single expiration. Other entries are left untouched.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn sign_auth_entries(
        &self,
        entries: &mut [SorobanAuthorizationEntry],
        method: &SignMethod<'_>,
        options: &SignOptions,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let wallet = self.wallet.ok_or(Error::WalletNotConnected)?.to_sc_address();

        let mut shared = None;
        let mut signed = 0usize;
        for entry in entries
            .iter_mut()
            .filter(|entry| address_credentials(entry).is_ok_and(|c| c.address == wallet))
        {
            let expiration = match shared {
                Some(expiration) => expiration,
                None => *shared.insert(self.expiration(options).await?),
            };
            self.sign_entry_at(entry, method, options.rp_id.as_deref(), expiration)
                .await?;
            signed += 1;
        }

        debug!(signed, "wallet entries signed");
        Ok(())
    }

    /// Normalizes `tx`, signs the wallet's authorization entries and returns
    /// the rebuilt envelope as base64 XDR.
    #[instrument(skip_all)]
    pub async fn sign(
        &self,
        tx: impl Into<TransactionInput>,
        method: &SignMethod<'_>,
        options: &SignOptions,
    ) -> Result<String> {
        let mut tx = NormalizedTransaction::new(tx)?;
        if tx.kind() == OperationKind::InvokeHostFunction {
            self.sign_auth_entries(tx.auth_entries_mut(), method, options)
                .await?;
        }
        Ok(tx.to_xdr_base64()?)
    }

    /// Adds a policy entry for the already signed `auth[index]`, checked
    /// against the connected wallet
    pub fn attach_policy(
        &self,
        tx: &mut NormalizedTransaction,
        index: usize,
        policy: ContractAddress,
    ) -> Result<()> {
        let wallet = self.wallet.ok_or(Error::WalletNotConnected)?;
        passkey_auth::attach_policy(tx, index, policy, wallet)?;
        Ok(())
    }

    /// Whether `signer` is missing from the temporary storage of `contract`.
    /// Lookup failures count as expired.
    #[instrument(skip(self))]
    pub async fn is_signer_expired(&self, contract: ContractAddress, signer: &SignerKey) -> bool {
        let key = match signer.to_sc_val() {
            Ok(key) => key,
            Err(err) => {
                warn!(%err, "signer key cannot be encoded");
                return true;
            }
        };
        match self
            .rpc
            .contract_data_exists(contract, &key, ContractDataDurability::Temporary)
            .await
        {
            Ok(exists) => !exists,
            Err(err) => {
                warn!(%err, "signer lookup failed, assuming expired");
                true
            }
        }
    }

    async fn sign_entry_at(
        &self,
        entry: &mut SorobanAuthorizationEntry,
        method: &SignMethod<'_>,
        rp_id: Option<&str>,
        expiration: u32,
    ) -> Result<()> {
        let (signer, signature) = match method {
            SignMethod::Keypair(keypair) => {
                let payload = self.payload(entry, expiration)?;
                (
                    SignerKey::from(keypair.public_key()),
                    Some(Signature::Ed25519(keypair.sign(&payload))),
                )
            }
            SignMethod::Passkey { key_id } => {
                let payload = self.payload(entry, expiration)?;
                let (key_id, signature) = self.passkey_signature(&payload, key_id, rp_id).await?;
                (
                    SignerKey::Secp256r1(key_id),
                    Some(Signature::Secp256r1(signature)),
                )
            }
            SignMethod::Policy(policy) => (SignerKey::Policy(*policy), None),
        };

        add_signature(entry, &signer, signature.as_ref(), expiration)?;
        debug!(signer = <&str>::from(&signer), expiration, "entry signed");
        Ok(())
    }

    fn payload(&self, entry: &SorobanAuthorizationEntry, expiration: u32) -> Result<CryptoHash> {
        Ok(entry_payload(
            &self.config.network_passphrase,
            entry,
            expiration,
        )?)
    }

    async fn passkey_signature(
        &self,
        payload: &CryptoHash,
        key_id: &KeyIdPin,
        rp_id: Option<&str>,
    ) -> Result<(Vec<u8>, Secp256r1Signature)> {
        let pinned = match key_id {
            KeyIdPin::Any => None,
            KeyIdPin::Default => self.key_id.as_deref(),
            KeyIdPin::Pinned(key_id) => Some(key_id.as_slice()),
        };

        let response = self
            .authenticator
            .start_authentication(AuthenticationOptions {
                challenge: payload.to_vec(),
                rp_id: rp_id
                    .map(ToOwned::to_owned)
                    .or_else(|| self.config.rp_id.clone()),
                allow_credentials: pinned
                    .map(PublicKeyCredentialDescriptor::new)
                    .into_iter()
                    .collect(),
                user_verification: UserVerificationRequirement::Discouraged,
            })
            .await?;

        let signature = Secp256r1Signature::from_assertion(response.response)?;
        Ok((response.raw_id, signature))
    }
}
