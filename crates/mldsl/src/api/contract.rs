//! Post-build shape invariants of the ApiMap.

use super::ApiMap;
use crate::error::{Error, Result};

/// Enforces the API contract:
///
/// 1. the `select` module exists and is non-empty;
/// 2. every select condition domain (`ifplayer_`, `ifmob_`,
///    `ifentity_`) has at least one canonical function;
/// 3. every function carries `meta.paramSource`.
pub fn validate_api_contract(api: &ApiMap) -> Result<()> {
    let select = api.get("select").filter(|funcs| !funcs.is_empty()).ok_or_else(|| {
        Error::Contract(
            "module `select` must exist and be non-empty; rebuild from a fresh actions catalog".to_owned(),
        )
    })?;

    for prefix in ["ifplayer_", "ifmob_", "ifentity_"] {
        if !select.keys().any(|k| k.starts_with(prefix)) {
            return Err(Error::Contract(format!(
                "canonical select domains are incomplete: no function with prefix `{prefix}`"
            )));
        }
    }

    let mut bad_meta: Vec<String> = Vec::new();
    for (module, funcs) in api {
        for (name, spec) in funcs {
            if spec.meta.is_none() {
                bad_meta.push(format!("{module}.{name}: missing meta.paramSource"));
            }
        }
    }
    if !bad_meta.is_empty() {
        let sample = bad_meta.iter().take(8).cloned().collect::<Vec<_>>().join("; ");
        let more = if bad_meta.len() > 8 { "..." } else { "" };
        return Err(Error::Contract(format!(
            "each action must carry meta.paramSource in {{raw, normalized}}; sample: {sample}{more}"
        )));
    }

    Ok(())
}
