use stellar_xdr::curr::{
    Limits, OperationBody, ReadXdr, SorobanAuthorizationEntry, Transaction, TransactionEnvelope,
    TransactionV1Envelope, VecM, WriteXdr,
};

use crate::{Error, Result};

/// Transaction to be signed, either decoded or as base64 XDR
#[derive(Debug, Clone)]
pub enum TransactionInput {
    Envelope(TransactionEnvelope),
    Xdr(String),
}

impl From<TransactionEnvelope> for TransactionInput {
    #[inline]
    fn from(envelope: TransactionEnvelope) -> Self {
        Self::Envelope(envelope)
    }
}

impl From<String> for TransactionInput {
    #[inline]
    fn from(xdr: String) -> Self {
        Self::Xdr(xdr)
    }
}

impl From<&str> for TransactionInput {
    #[inline]
    fn from(xdr: &str) -> Self {
        Self::Xdr(xdr.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
pub enum OperationKind {
    InvokeHostFunction,
    ExtendFootprintTtl,
    RestoreFootprint,
}

/// Single-operation Soroban transaction with a zero fee, ready to have its
/// authorization entries signed.
///
/// The entries are held apart from the operation while signing and put
/// back when the envelope is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTransaction {
    envelope: TransactionV1Envelope,
    kind: OperationKind,
    auth: Vec<SorobanAuthorizationEntry>,
}

impl NormalizedTransaction {
    pub fn new(input: impl Into<TransactionInput>) -> Result<Self> {
        let envelope = match input.into() {
            TransactionInput::Envelope(envelope) => envelope,
            TransactionInput::Xdr(xdr) => {
                TransactionEnvelope::from_xdr_base64(xdr, Limits::none())?
            }
        };
        let mut envelope = match envelope {
            TransactionEnvelope::Tx(envelope) => envelope,
            other => return Err(Error::UnsupportedEnvelope(other.name())),
        };

        let count = envelope.tx.operations.len();
        let mut operations = envelope.tx.operations.to_vec();
        let [operation] = operations.as_mut_slice() else {
            return Err(Error::TooManyOperations(count));
        };

        let (kind, auth) = match &mut operation.body {
            OperationBody::InvokeHostFunction(op) => (
                OperationKind::InvokeHostFunction,
                Vec::from(std::mem::take(&mut op.auth)),
            ),
            OperationBody::ExtendFootprintTtl(_) => (OperationKind::ExtendFootprintTtl, Vec::new()),
            OperationBody::RestoreFootprint(_) => (OperationKind::RestoreFootprint, Vec::new()),
            body => return Err(Error::UnsupportedOperation(body.name())),
        };

        envelope.tx.operations = operations.try_into()?;
        envelope.tx.fee = 0;
        // signatures over the original fee no longer apply
        envelope.signatures = VecM::default();

        Ok(Self {
            envelope,
            kind,
            auth,
        })
    }

    #[inline]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[inline]
    pub const fn transaction(&self) -> &Transaction {
        &self.envelope.tx
    }

    #[inline]
    pub fn auth_entries(&self) -> &[SorobanAuthorizationEntry] {
        &self.auth
    }

    /// Always empty for operations other than `InvokeHostFunction`
    #[inline]
    pub fn auth_entries_mut(&mut self) -> &mut Vec<SorobanAuthorizationEntry> {
        &mut self.auth
    }

    pub fn to_envelope(&self) -> Result<TransactionEnvelope> {
        self.clone().into_envelope()
    }

    pub fn into_envelope(self) -> Result<TransactionEnvelope> {
        let Self {
            mut envelope,
            kind,
            auth,
        } = self;

        if !auth.is_empty() {
            let mut operations = envelope.tx.operations.to_vec();
            match operations.first_mut().map(|op| &mut op.body) {
                Some(OperationBody::InvokeHostFunction(op)) => op.auth = auth.try_into()?,
                _ => return Err(Error::UnsupportedOperation(kind.into())),
            }
            envelope.tx.operations = operations.try_into()?;
        }

        Ok(TransactionEnvelope::Tx(envelope))
    }

    pub fn to_xdr_base64(&self) -> Result<String> {
        Ok(self.to_envelope()?.to_xdr_base64(Limits::none())?)
    }
}
