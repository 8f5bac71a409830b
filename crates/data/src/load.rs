use crate::schema::{BarterConfig, BarterPack};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Reads a single negotiation config and checks it.
pub fn load_config(path: &Path) -> anyhow::Result<BarterConfig> {
    let config: BarterConfig = load_json(path)?;
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

/// Reads a pack of traders and checks every negotiation it can produce.
pub fn load_pack(path: &Path) -> anyhow::Result<BarterPack> {
    let pack: BarterPack = load_json(path)?;
    validate_pack(&pack).with_context(|| format!("validate {}", path.display()))?;
    Ok(pack)
}

/// Negotiation config against one trader of the pack at `path`.
pub fn load_npc_config(path: &Path, npc: &str) -> anyhow::Result<BarterConfig> {
    let pack = load_pack(path)?;
    match pack.config_for(npc) {
        Some(config) => Ok(config),
        None => bail!(
            "{} has no trader {npc:?} (known: {})",
            path.display(),
            pack.npc_ids().collect::<Vec<_>>().join(", ")
        ),
    }
}

pub fn validate_pack(pack: &BarterPack) -> anyhow::Result<()> {
    if pack.npcs.is_empty() {
        bail!("pack has no traders");
    }
    let mut seen = HashSet::new();
    for npc in &pack.npcs {
        if !seen.insert(npc.id.as_str()) {
            bail!("duplicate trader id {:?}", npc.id);
        }
        pack.config_with(npc)
            .validate()
            .with_context(|| format!("trader {:?}", npc.id))?;
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
