// ==========================================
// Inventory Count Automation - input pipeline
// ==========================================
// Sources -> normalized rows -> typed records -> launch plan
//   files: counting file (+ optional reference report)
//   feed:  SQLite query (aggregate rows) + reference template for documents
// ==========================================

use crate::batch::error::{RunError, RunResult};
use crate::domain::{ReferenceRecord, ZeroPolicy};
use crate::engine::{LaunchPlan, LaunchPlanBuilder};
use crate::importer::{
    load_storage_codes, DocumentResolver, NormalizeMode, RecordNormalizer, ResolverStats,
    SqliteFeed,
};
use std::path::Path;
use tracing::{info, instrument};

fn load_references(
    normalizer: &RecordNormalizer,
    path: Option<&Path>,
) -> RunResult<Vec<ReferenceRecord>> {
    match path {
        Some(path) => {
            let table = normalizer.load_file(path, NormalizeMode::Reference)?;
            Ok(normalizer.to_reference_records(&table.rows))
        }
        None => Ok(Vec::new()),
    }
}

/// Launch plan from a counting file and an optional reference report.
#[instrument(skip(normalizer, counting, reference), fields(counting = %counting.display()))]
pub fn plan_from_files(
    normalizer: &RecordNormalizer,
    counting: &Path,
    reference: Option<&Path>,
    zero_policy: ZeroPolicy,
) -> RunResult<LaunchPlan> {
    let counted_table = normalizer.load_file(counting, NormalizeMode::Counting)?;
    if counted_table.rows.is_empty() {
        return Err(RunError::NoInput(format!(
            "{} has no counting rows",
            counting.display()
        )));
    }
    let counted = normalizer.to_counted_records(&counted_table.rows);
    let references = load_references(normalizer, reference)?;
    info!(
        counted = counted.len(),
        references = references.len(),
        "inputs loaded"
    );

    Ok(LaunchPlanBuilder::new().build(&counted, &references, zero_policy))
}

/// Launch plan from a data-source query; documents come from `template`.
#[instrument(skip_all)]
pub fn plan_from_feed(
    normalizer: &RecordNormalizer,
    feed: &SqliteFeed,
    query: &str,
    template: &Path,
    zero_policy: ZeroPolicy,
) -> RunResult<(LaunchPlan, ResolverStats)> {
    let raw = feed.fetch_table(query)?;
    let feed_table = normalizer.normalize(&raw, NormalizeMode::Aggregate)?;

    let template_table = normalizer.load_file(template, NormalizeMode::Reference)?;
    let resolver = DocumentResolver::from_template(&template_table.rows);
    let (rows, stats) = resolver.apply(feed_table.rows);
    if rows.is_empty() {
        return Err(RunError::NoInput(
            "data-source feed produced no launchable rows".to_string(),
        ));
    }

    let counted = normalizer.to_counted_records(&rows);
    let references = normalizer.to_reference_records(&template_table.rows);
    let plan = LaunchPlanBuilder::new().build(&counted, &references, zero_policy);
    Ok((plan, stats))
}

/// Storage codes from a list file; an empty list is a run-scoped error.
pub fn storage_codes_from_file(path: &Path) -> RunResult<Vec<String>> {
    let codes = load_storage_codes(path)?;
    if codes.is_empty() {
        return Err(RunError::NoInput(format!(
            "{} lists no storage codes",
            path.display()
        )));
    }
    Ok(codes)
}
