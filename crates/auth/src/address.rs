use core::fmt::{self, Debug, Display};
use std::str::FromStr;

use stellar_xdr::curr::{Hash, ScAddress};

use crate::Error;

/// Soroban contract address, rendered as a `C...` strkey
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ContractAddress(pub [u8; 32]);

impl ContractAddress {
    #[inline]
    pub const fn to_sc_address(self) -> ScAddress {
        ScAddress::Contract(Hash(self.0))
    }

    /// `None` for account addresses
    #[inline]
    pub const fn from_sc_address(address: &ScAddress) -> Option<Self> {
        match address {
            ScAddress::Contract(Hash(id)) => Some(Self(*id)),
            ScAddress::Account(_) => None,
        }
    }
}

impl Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stellar_strkey::Contract(self.0).to_string())
    }
}

impl Debug for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for ContractAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(stellar_strkey::Contract::from_string(s)?.0))
    }
}

impl From<ContractAddress> for ScAddress {
    #[inline]
    fn from(address: ContractAddress) -> Self {
        address.to_sc_address()
    }
}
