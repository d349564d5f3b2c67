use serde::Serialize;

use crate::error::{LexiconError, Result};

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| LexiconError::Serialization(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}
