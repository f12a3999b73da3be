// Brewform binary entry point
use anyhow::Result;

fn main() -> Result<()> {
    brewform::cli::run()?;
    Ok(())
}
