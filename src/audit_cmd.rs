use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    cli::AuditArgs,
    context::RunContext,
    engine::{certify, clean_table},
    io_utils::{self, load_source, resolve_input_delimiter},
    table::mismatches_table,
};

/// Re-derives the column profiles from the original, then certifies the
/// given cleaned file against it. Any mismatch fails the command.
pub fn execute(args: &AuditArgs) -> Result<()> {
    let config = crate::load_config(&args.read)?;
    let encoding = io_utils::resolve_encoding(args.read.input_encoding.as_deref())?;

    let original = load_source(
        &args.original,
        resolve_input_delimiter(&args.original, args.read.delimiter),
        encoding,
    )?;
    let cleaned = load_source(
        &args.cleaned,
        resolve_input_delimiter(&args.cleaned, args.read.delimiter),
        encoding,
    )?
    .table
    .with_blank_as_null();

    let mut ctx = RunContext::new(&args.original, &config);
    let profiles = clean_table(&original.table, &mut ctx)
        .with_context(|| format!("Profiling {:?}", args.original))?
        .profiles;
    let report = certify(&original.table, &cleaned, &profiles, &config)
        .with_context(|| format!("Auditing {:?} against {:?}", args.cleaned, args.original))?;

    info!(
        "Audited {} row(s): {} mismatch(es)",
        report.cleaned_rows,
        report.mismatches.len()
    );
    if report.passed() {
        println!("[PASS] Audit PASSED: Data integrity maintained");
        return Ok(());
    }
    print!("{}", mismatches_table(&report.mismatches));
    println!("[FAIL] Audit FAILED: Data integrity issues detected");
    bail!(
        "Audit of {:?} found {} mismatch(es)",
        args.cleaned,
        report.mismatches.len()
    )
}
