//! Per-table cleaning pipeline: sanitize headers, profile and normalize each
//! column, then audit the result against the untouched original.

use log::{debug, warn};

use crate::{
    audit::{self, AuditReport},
    config::CleanConfig,
    context::{Alert, RunContext},
    error::CleanError,
    frame::{CleanedTable, RawTable, Table},
    header::{self, HeaderReport},
    normalize::{self, DateOutcome},
    profile::{self, ColumnProfile},
};

#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub cleaned: CleanedTable,
    pub headers: HeaderReport,
    pub profiles: Vec<ColumnProfile>,
    pub audit: AuditReport,
}

/// Cleans `raw` and certifies the result.
///
/// Cell-level problems are absorbed into the outcome; only a broken
/// structural invariant (row or column counts) is returned as an error, in
/// which case no cleaned table is produced.
pub fn clean_table(raw: &RawTable, ctx: &mut RunContext<'_>) -> Result<CleanOutcome, CleanError> {
    let config = ctx.config();
    let headers = header::sanitize_headers(raw.headers(), config.max_header_len);
    if headers.has_collisions() {
        warn!(
            "{}: sanitized headers collide; duplicate names are kept as-is",
            ctx.source().display()
        );
    }

    let mut profiles = Vec::with_capacity(raw.column_count());
    let mut columns = Vec::with_capacity(raw.column_count());
    for (idx, values) in raw.columns().iter().enumerate() {
        let original_name = &raw.headers()[idx];
        let sanitized_name = &headers.names[idx];
        let mut column_profile =
            profile::profile_column(original_name, sanitized_name, values, config);
        let normalized = normalize::normalize_column(values, column_profile.kind, config);

        match &normalized.date {
            DateOutcome::NotTemporal => {}
            DateOutcome::Resolved { resolution, .. } => {
                column_profile.confidence = resolution.match_rate;
                column_profile.date_pattern = Some(resolution.pattern);
            }
            DateOutcome::Fallback { best } => {
                ctx.alert(Alert::DateFallback {
                    column: sanitized_name.clone(),
                    best_pattern: best.map(|b| b.pattern.label.to_string()),
                    match_rate: best.map_or(0.0, |b| b.match_rate),
                });
                column_profile.confidence = 1.0;
            }
        }
        column_profile.kind = normalized.effective_kind(column_profile.kind);
        if normalized.parse_failures > 0 {
            ctx.alert(Alert::ParseFailures {
                column: sanitized_name.clone(),
                kind: column_profile.kind,
                count: normalized.parse_failures,
            });
        }
        debug!(
            "{}: column '{}' profiled as {} (confidence {:.2}, {} sampled)",
            ctx.source().display(),
            column_profile.sanitized_name,
            column_profile.kind,
            column_profile.confidence,
            column_profile.sampled
        );
        profiles.push(column_profile);
        columns.push(normalized.values);
    }

    let cleaned = Table::with_row_count(headers.names.clone(), columns, raw.row_count())?;
    let audit = certify(raw, &cleaned, &profiles, config)?;
    Ok(CleanOutcome {
        cleaned,
        headers,
        profiles,
        audit,
    })
}

/// Audits `cleaned` against `raw`, turning fatal mismatches into an error.
pub fn certify(
    raw: &RawTable,
    cleaned: &CleanedTable,
    profiles: &[ColumnProfile],
    config: &CleanConfig,
) -> Result<AuditReport, CleanError> {
    let report = audit::audit_tables(raw, cleaned, profiles, config);
    if report.has_fatal() {
        return Err(CleanError::Structural {
            mismatches: report.fatal_mismatches(),
        });
    }
    Ok(report)
}
