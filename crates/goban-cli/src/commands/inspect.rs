//! `inspect`: print the descriptors a mode resolves to.

use goban_config::{BuildMode, ConfigFactory};

use crate::cli::InspectArgs;
use crate::commands::Context;
use crate::error::Result;

pub fn execute(args: InspectArgs, _ctx: &Context) -> Result<()> {
    let mode = BuildMode::from_arg(args.mode.as_deref());
    let descriptors = ConfigFactory::new(mode).build()?;
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}
