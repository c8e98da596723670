//! Pay-to-Script-Hash (P2SH) helpers.

use slp_script::address::AddressKind;
use slp_script::{Address, Script, ScriptError};

use crate::TransactionError;

/// Create a P2SH locking script from an address.
///
/// Fails for P2PKH addresses.
pub fn lock(address: &Address) -> Result<Script, TransactionError> {
    if address.kind() != AddressKind::P2SH {
        return Err(ScriptError::UnsupportedAddress(format!(
            "{} is not a P2SH address",
            address
        ))
        .into());
    }
    Ok(Script::new_p2sh(address.hash()))
}

/// Assemble a scriptSig: each push in order, then a push of the redeem
/// script.
pub fn unlocking_script(pushes: &[Vec<u8>], redeem_script: &Script) -> Result<Script, TransactionError> {
    let mut script = Script::new();
    for data in pushes {
        script.append_push_data(data)?;
    }
    script.append_push_data(redeem_script.to_bytes())?;
    Ok(script)
}
