//! Builders and accessors for the `ScVal` shapes produced by Soroban's
//! `#[contracttype]`: enums are `Vec[Symbol(variant), ..fields]`, structs are
//! maps keyed by field name in symbol order.

use stellar_xdr::curr::{ScBytes, ScMap, ScMapEntry, ScSymbol, ScVal, ScVec};

use crate::{Error, Result};

#[inline]
pub fn symbol(name: &str) -> Result<ScVal> {
    Ok(ScVal::Symbol(ScSymbol(name.try_into()?)))
}

#[inline]
pub fn bytes(data: impl Into<Vec<u8>>) -> Result<ScVal> {
    Ok(ScVal::Bytes(ScBytes(data.into().try_into()?)))
}

#[inline]
pub fn vec(items: Vec<ScVal>) -> Result<ScVal> {
    Ok(ScVal::Vec(Some(ScVec(items.try_into()?))))
}

/// Enum variant with the given fields
pub fn variant(name: &str, fields: impl IntoIterator<Item = ScVal>) -> Result<ScVal> {
    vec(std::iter::once(symbol(name)?).chain(fields).collect())
}

/// Map with entries sorted by key, as the host requires
pub fn map(entries: impl IntoIterator<Item = (ScVal, ScVal)>) -> Result<ScVal> {
    let mut entries: Vec<_> = entries
        .into_iter()
        .map(|(key, val)| ScMapEntry { key, val })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(ScVal::Map(Some(ScMap(entries.try_into()?))))
}

/// Struct with the given `(field, value)` pairs
pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, ScVal)>) -> Result<ScVal> {
    map(fields
        .into_iter()
        .map(|(name, val)| Ok((symbol(name)?, val)))
        .collect::<Result<Vec<_>>>()?)
}

pub fn as_vec<'a>(val: &'a ScVal, what: &'static str) -> Result<&'a [ScVal]> {
    match val {
        ScVal::Vec(Some(items)) => Ok(items.0.as_slice()),
        _ => Err(Error::InvalidScVal(what)),
    }
}

pub fn as_symbol<'a>(val: &'a ScVal, what: &'static str) -> Result<&'a [u8]> {
    match val {
        ScVal::Symbol(ScSymbol(name)) => Ok(name.as_slice()),
        _ => Err(Error::InvalidScVal(what)),
    }
}

pub fn as_bytes<'a>(val: &'a ScVal, what: &'static str) -> Result<&'a [u8]> {
    match val {
        ScVal::Bytes(ScBytes(data)) => Ok(data.as_slice()),
        _ => Err(Error::InvalidScVal(what)),
    }
}

pub fn as_array<const N: usize>(val: &ScVal, what: &'static str) -> Result<[u8; N]> {
    as_bytes(val, what)?
        .try_into()
        .map_err(|_| Error::InvalidScVal(what))
}

pub fn as_map<'a>(val: &'a ScVal, what: &'static str) -> Result<&'a [ScMapEntry]> {
    match val {
        ScVal::Map(Some(entries)) => Ok(entries.0.as_slice()),
        _ => Err(Error::InvalidScVal(what)),
    }
}

/// Splits `Vec[Symbol(variant), ..fields]`
pub fn as_variant<'a>(val: &'a ScVal, what: &'static str) -> Result<(&'a [u8], &'a [ScVal])> {
    let (tag, fields) = as_vec(val, what)?
        .split_first()
        .ok_or(Error::InvalidScVal(what))?;
    Ok((as_symbol(tag, what)?, fields))
}

/// Looks up a struct field by name
pub fn field<'a>(entries: &'a [ScMapEntry], name: &str, what: &'static str) -> Result<&'a ScVal> {
    entries
        .iter()
        .find(|entry| {
            matches!(&entry.key, ScVal::Symbol(ScSymbol(key)) if key.as_slice() == name.as_bytes())
        })
        .map(|entry| &entry.val)
        .ok_or(Error::InvalidScVal(what))
}
