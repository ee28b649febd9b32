use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::{error, info, warn};

use crate::{
    cli::CleanArgs,
    config::CleanConfig,
    context::RunContext,
    discover::{base_directory, discover_inputs},
    engine::clean_table,
    io_utils::{self, load_source, printable_delimiter, resolve_input_delimiter, write_table},
    report::{FileReport, RunSummary},
    runlog::RunLog,
};

const DEFAULT_OUTPUT_DIR: &str = "cleaned_csvs";
const DEFAULT_LOG_DIR: &str = "logs";

pub fn execute(args: &CleanArgs) -> Result<()> {
    let config = crate::load_config(&args.read)?;
    let encoding = io_utils::resolve_encoding(args.read.input_encoding.as_deref())?;
    let files = discover_inputs(&args.inputs)?;

    let base = base_directory(&args.inputs);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| base.join(DEFAULT_OUTPUT_DIR));
    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| base.join(DEFAULT_LOG_DIR));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Creating output directory {output_dir:?}"))?;

    let (mut log, log_path) = RunLog::create(&log_dir, config.max_header_len)?;
    log.banner(&args.inputs, &output_dir)?;
    log.found(files.len())?;
    info!("Found {} CSV file(s) to clean", files.len());

    let mut reports = Vec::with_capacity(files.len());
    for path in &files {
        let report = clean_file(path, &output_dir, args.read.delimiter, encoding, &config);
        log.file_section(&report)?;
        reports.push(report);
    }
    log.finish()
        .with_context(|| format!("Writing run log {log_path:?}"))?;

    let summary = RunSummary {
        inputs: args.inputs.clone(),
        output_dir,
        files: reports,
    };
    if let Some(path) = &args.report_json {
        summary.write_json(path)?;
        info!("JSON report written to {path:?}");
    }
    info!("Log file saved to {log_path:?}");

    let failed = summary.failed_count();
    if failed > 0 {
        bail!(
            "{failed} of {} file(s) failed to clean; see {log_path:?}",
            summary.files.len()
        );
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Cleans one file into `output_dir`. Every failure is captured in the
/// returned report so the remaining files still run.
fn clean_file(
    path: &Path,
    output_dir: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    config: &CleanConfig,
) -> FileReport {
    let delimiter = resolve_input_delimiter(path, delimiter);
    info!(
        "Processing {path:?} with delimiter '{}'",
        printable_delimiter(delimiter)
    );
    let loaded = match load_source(path, delimiter, encoding) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("{err:#}");
            return FileReport::failed(path.to_path_buf(), None, format!("{err:#}"));
        }
    };
    let shape = (loaded.table.row_count(), loaded.table.column_count());
    let fail = |message: String| {
        error!("{}: {message}", path.display());
        FileReport::failed(path.to_path_buf(), Some(loaded.fingerprint.clone()), message)
            .with_shape(shape.0, shape.1)
    };

    let Some(file_name) = path.file_name() else {
        return fail("input path has no file name".to_string());
    };
    let output: PathBuf = output_dir.join(file_name);
    if same_file(path, &output) {
        return fail(format!("refusing to overwrite input with output {output:?}"));
    }

    let mut ctx = RunContext::new(path, config);
    let outcome = match clean_table(&loaded.table, &mut ctx) {
        Ok(outcome) => outcome,
        Err(err) => return fail(err.to_string()),
    };
    for mismatch in &outcome.audit.mismatches {
        warn!("{}: {mismatch}", path.display());
    }
    if let Err(err) = write_table(&output, &outcome.cleaned, delimiter) {
        return fail(format!("{err:#}"));
    }
    info!(
        "Cleaned {} row(s) x {} column(s) to {output:?}",
        outcome.cleaned.row_count(),
        outcome.cleaned.column_count()
    );
    FileReport::succeeded(
        path.to_path_buf(),
        loaded.fingerprint.clone(),
        shape,
        &outcome,
        ctx.into_alerts(),
        output,
    )
}
