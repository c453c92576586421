// src/tables/emit.rs
// Emitter seam: a finished Spec in, source text out.

use super::Tables;
use crate::{
    error::{LexError, Result},
    spec::Spec,
};

pub trait Emit {
    fn emit(&self, spec: &Spec) -> Result<String>;
}

/// Writes the flattened tables as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter {
    pub pretty: bool,
}

impl Emit for JsonEmitter {
    fn emit(&self, spec: &Spec) -> Result<String> {
        let tables = Tables::from_spec(spec)?;
        let text = if self.pretty {
            serde_json::to_string_pretty(&tables)
        } else {
            serde_json::to_string(&tables)
        };
        text.map_err(|e| LexError::impossible(format!("serializing tables: {e}")))
    }
}
