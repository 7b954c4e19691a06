use anyhow::Result;

use strata::config::StrataConfig;

/// Mark one insight as replaced by another.
pub fn supersede(config: &StrataConfig, old_id: &str, new_id: &str) -> Result<()> {
    let (engine, _) = super::open_engine(config)?;
    engine.supersede(old_id, new_id)?;
    println!("{old_id} is now superseded by {new_id}");
    Ok(())
}
