use anyhow::{Context, Result};
use kernel_builder::cli::{init_logging, parse_args, BuildArgs};
use kernel_builder::BuilderSettings;

fn main() -> Result<()> {
    let args: BuildArgs = parse_args();
    init_logging(args.common.verbose);

    let settings = BuilderSettings::load(args.common.config.as_deref())
        .and_then(|s| s.with_engine(args.common.engine.clone()))
        .context("loading builder settings")?;

    let invocation = args.invocation();
    kernel_builder::run(&invocation, &settings)
        .with_context(|| format!("building RPMs from '{}'", invocation.srpm_source))?;
    Ok(())
}
