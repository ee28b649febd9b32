use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ProfileArgs,
    context::RunContext,
    engine::clean_table,
    io_utils::{self, load_source, resolve_input_delimiter},
    table::profiles_table,
};

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let config = crate::load_config(&args.read)?;
    let encoding = io_utils::resolve_encoding(args.read.input_encoding.as_deref())?;
    let delimiter = resolve_input_delimiter(&args.input, args.read.delimiter);
    let loaded = load_source(&args.input, delimiter, encoding)?;
    info!(
        "Profiling {} row(s) x {} column(s) from {:?}",
        loaded.table.row_count(),
        loaded.table.column_count(),
        args.input
    );

    let mut ctx = RunContext::new(&args.input, &config);
    let outcome = clean_table(&loaded.table, &mut ctx)
        .with_context(|| format!("Profiling {:?}", args.input))?;

    print!("{}", profiles_table(&outcome.profiles));
    for warning in &outcome.headers.warnings {
        println!("WARNING: long header {warning}");
    }
    for alert in &outcome.headers.alerts {
        println!("ALERT: {alert}");
    }
    for alert in ctx.alerts() {
        println!("ALERT: {alert}");
    }
    Ok(())
}
