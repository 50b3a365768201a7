use stellar_xdr::curr::{
    ContractExecutable, ContractIdPreimage, ContractIdPreimageFromAddress, InvokeContractArgs,
    ScAddress, ScSymbol, ScVal, ScVec, SorobanAddressCredentials, SorobanAuthorizationEntry,
    SorobanAuthorizedFunction, SorobanAuthorizedInvocation, SorobanCredentials, VecM,
};

use crate::{
    ContractAddress, Error, NormalizedTransaction, Result,
    entry::{address_credentials, signatures},
    scval,
};

pub const CHECK_AUTH: &str = "__check_auth";

/// Appends an entry authorizing `wallet.__check_auth(ctx)` on behalf of
/// `policy`, where `ctx` describes the root invocation of entry `index`.
pub fn attach_policy(
    tx: &mut NormalizedTransaction,
    index: usize,
    policy: ContractAddress,
    wallet: ContractAddress,
) -> Result<()> {
    let entries = tx.auth_entries_mut();
    let entry = entries.get(index).ok_or(Error::AuthEntryNotFound(index))?;
    let sibling = policy_entry(entry, policy, wallet)?;
    entries.push(sibling);
    Ok(())
}

/// Unsigned policy entry sharing nonce and expiration with `entry`.
///
/// `entry` must already be signed, since its expiration ledger is only
/// final once it is.
pub fn policy_entry(
    entry: &SorobanAuthorizationEntry,
    policy: ContractAddress,
    wallet: ContractAddress,
) -> Result<SorobanAuthorizationEntry> {
    let credentials = address_credentials(entry)?;
    if signatures(entry)?.is_empty() {
        return Err(Error::UnsignedEntry);
    }
    let context = auth_context(&entry.root_invocation.function)?;

    Ok(SorobanAuthorizationEntry {
        credentials: SorobanCredentials::Address(SorobanAddressCredentials {
            address: policy.to_sc_address(),
            nonce: credentials.nonce,
            signature_expiration_ledger: credentials.signature_expiration_ledger,
            signature: ScVal::Void,
        }),
        root_invocation: SorobanAuthorizedInvocation {
            function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                contract_address: wallet.to_sc_address(),
                function_name: ScSymbol(CHECK_AUTH.try_into()?),
                args: vec![context].try_into()?,
            }),
            sub_invocations: VecM::default(),
        },
    })
}

/// `Context` value the wallet passes to `__check_auth` for `function`
pub fn auth_context(function: &SorobanAuthorizedFunction) -> Result<ScVal> {
    match function {
        SorobanAuthorizedFunction::ContractFn(invoke) => scval::variant(
            "Contract",
            [scval::record([
                ("args", ScVal::Vec(Some(ScVec(invoke.args.clone())))),
                ("contract", ScVal::Address(invoke.contract_address.clone())),
                ("fn_name", ScVal::Symbol(invoke.function_name.clone())),
            ])?],
        ),
        SorobanAuthorizedFunction::CreateContractHostFn(create) => {
            let (executable, salt) =
                creation_fields(&create.executable, &create.contract_id_preimage)?;
            scval::variant(
                "CreateContractHostFn",
                [scval::record([("executable", executable), ("salt", salt)])?],
            )
        }
        SorobanAuthorizedFunction::CreateContractV2HostFn(create) => {
            let (executable, salt) =
                creation_fields(&create.executable, &create.contract_id_preimage)?;
            scval::variant(
                "CreateContractWithCtorHostFn",
                [scval::record([
                    (
                        "constructor_args",
                        ScVal::Vec(Some(ScVec(create.constructor_args.clone()))),
                    ),
                    ("executable", executable),
                    ("salt", salt),
                ])?],
            )
        }
    }
}

fn creation_fields(
    executable: &ContractExecutable,
    preimage: &ContractIdPreimage,
) -> Result<(ScVal, ScVal)> {
    let ContractExecutable::Wasm(hash) = executable else {
        return Err(Error::UnsupportedContext("stellar asset executable"));
    };
    let ContractIdPreimage::Address(ContractIdPreimageFromAddress { salt, .. }) = preimage else {
        return Err(Error::UnsupportedContext("asset contract id preimage"));
    };
    Ok((
        scval::variant("Wasm", [scval::bytes(hash.0)?])?,
        scval::bytes(salt.0)?,
    ))
}

/// Contract address a policy entry is checked against, if `entry` is one
pub fn check_auth_target(entry: &SorobanAuthorizationEntry) -> Option<&ScAddress> {
    match &entry.root_invocation.function {
        SorobanAuthorizedFunction::ContractFn(invoke)
            if invoke.function_name.0.as_slice() == CHECK_AUTH.as_bytes() =>
        {
            Some(&invoke.contract_address)
        }
        _ => None,
    }
}
