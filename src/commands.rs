//! Command handlers invoked from `main.rs`: one free function per
//! subcommand, each taking `&DriverConfig` plus its parsed args and
//! returning `anyhow::Result<()>`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use futures_util::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::analyzer;
use crate::catalog;
use crate::cli::{AnalyzeArgs, ExplainArgs, StatsCommands};
use crate::config::DriverConfig;
use crate::corpus::{self, CorpusFormat, StatementCorpusEntry};
use crate::db;
use crate::evaluator::{Evaluator, ProbeTimeout};
use crate::model::TableMetadata;
use crate::optimizer::Optimizer;
use crate::report::{AdvisorReport, StatementReport};
use crate::stats::{self, ExportMode, ExportedStatsV1, FallbackAssumption, StatisticsBasis};

/// Which source of table cardinality a run is using, and the export itself
/// when one was loaded.
enum StatisticsBasisData {
    FromAssumption(FallbackAssumption),
    FromStatisticsExport(ExportedStatsV1),
}

impl StatisticsBasisData {
    fn basis(&self) -> StatisticsBasis {
        match self {
            StatisticsBasisData::FromAssumption(_) => StatisticsBasis::FromAssumption,
            StatisticsBasisData::FromStatisticsExport(_) => StatisticsBasis::FromStatisticsExport,
        }
    }
}

async fn resolve_statistics_basis(
    config: &DriverConfig,
    pool: &sqlx::PgPool,
) -> Result<StatisticsBasisData> {
    match &config.statistics_path {
        Some(path) => {
            let export = stats::read_from_path(path)
                .with_context(|| format!("failed to read statistics export {}", path.display()))?;
            info!(path = %path.display(), tables = export.tables.len(), "restoring statistics export");
            let report = stats::restore(pool, &export).await?;
            for warning in &report.warnings {
                warn!(table = %warning.table, detail = %warning.detail, "statistics restore warning");
            }
            Ok(StatisticsBasisData::FromStatisticsExport(export))
        }
        None => {
            debug!("no statistics_path configured; using fallback row-count assumption");
            Ok(StatisticsBasisData::FromAssumption(FallbackAssumption::default()))
        }
    }
}

fn tables_for(basis: &StatisticsBasisData, referenced: &[crate::model::TableReference]) -> Vec<TableMetadata> {
    match basis {
        StatisticsBasisData::FromAssumption(assumption) => catalog::assumed_tables(referenced, *assumption),
        StatisticsBasisData::FromStatisticsExport(export) => referenced
            .iter()
            .filter_map(|t| {
                export
                    .tables
                    .iter()
                    .find(|candidate| candidate.schema == t.schema && candidate.table == t.table)
                    .cloned()
            })
            .collect(),
    }
}

fn load_corpus(args: &AnalyzeArgs) -> Result<Vec<StatementCorpusEntry>> {
    if args.stdin {
        let stdin = std::io::stdin();
        return corpus::stdin::parse(stdin.lock()).context("failed to read statement corpus from stdin");
    }

    let path = args
        .corpus
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("either --corpus <path> or --stdin is required"))?;
    corpus::load_from_path(std::path::Path::new(path), CorpusFormat::from(args.corpus_format))
        .map_err(anyhow::Error::from)
}

async fn evaluate_statement(
    entry: StatementCorpusEntry,
    evaluator: &Evaluator,
    existing_indexes: &[crate::model::ExistingIndex],
    basis: &StatisticsBasisData,
    max_cost: Option<f64>,
) -> StatementReport {
    let outcome = (|| async {
        let parsed = analyzer::analyze(&entry.statement)?;
        let tables = tables_for(basis, &parsed.referenced_tables);
        let optimizer = Optimizer::new(evaluator, existing_indexes, max_cost);
        optimizer
            .optimize(&entry.statement, &[], &parsed, &tables)
            .await
    })()
    .await;

    StatementReport {
        statement: entry.statement,
        source: entry.source,
        outcome: outcome.map_err(|e| e.to_string()),
    }
}

pub async fn run_analyze(config: &DriverConfig, args: &AnalyzeArgs) -> Result<()> {
    let pool = db::connection::connect_with_retry(&config.postgres_url).await?;
    let basis = resolve_statistics_basis(config, &pool).await?;
    let stats_basis = basis.basis();
    let existing_indexes = catalog::load_existing_indexes(&pool).await?;
    let evaluator = Evaluator::new(pool, ProbeTimeout(config.probe_timeout));

    let entries = load_corpus(args)?;
    info!(count = entries.len(), "loaded statement corpus");

    let start = Instant::now();
    let results = stream::iter(entries.into_iter().map(|entry| {
        evaluate_statement(entry, &evaluator, &existing_indexes, &basis, config.max_cost)
    }))
    .buffer_unordered(config.concurrency.max(1))
    .collect::<Vec<_>>()
    .await;
    let elapsed = start.elapsed();

    let skipped = results
        .iter()
        .filter(|r| matches!(r.outcome, Ok(crate::optimizer::OptimizerOutcome::ZeroCostPlan)))
        .count();
    let failed = results.iter().filter(|r| r.outcome.is_err()).count();

    let report = AdvisorReport { statements: results, elapsed, skipped, failed, stats_basis };
    println!("{}", report.render(config.format));

    Ok(())
}

pub async fn run_stats(config: &DriverConfig, command: &StatsCommands) -> Result<()> {
    match command {
        StatsCommands::Dump { output, full, .. } => {
            let pool = db::connection::connect_with_retry(&config.postgres_url).await?;
            let mode = if *full { ExportMode::Full } else { ExportMode::Anonymous };
            info!(mode = ?mode, "dumping statistics");
            let export = stats::dump(&pool, mode).await?;
            stats::write_to_path(&PathBuf::from(output), &export)?;
            info!(tables = export.tables.len(), path = %output, "wrote statistics export");
            Ok(())
        }
        StatsCommands::Restore { input, .. } => {
            let pool = db::connection::connect_with_retry(&config.postgres_url).await?;
            let export = stats::read_from_path(std::path::Path::new(input))?;
            let report = stats::restore(&pool, &export).await?;
            for warning in &report.warnings {
                warn!(table = %warning.table, detail = %warning.detail, "statistics restore warning");
            }
            info!(tables = export.tables.len(), "restored statistics export");
            Ok(())
        }
    }
}

pub async fn run_explain(config: &DriverConfig, args: &ExplainArgs) -> Result<()> {
    let pool = db::connection::connect_with_retry(&config.postgres_url).await?;
    let basis = resolve_statistics_basis(config, &pool).await?;
    let evaluator = Evaluator::new(pool, ProbeTimeout(config.probe_timeout));

    let parsed = analyzer::analyze(&args.query)?;
    let tables = tables_for(&basis, &parsed.referenced_tables);

    let mutations = match &args.candidate {
        Some(spec) => vec![parse_candidate(spec)?],
        None => Vec::new(),
    };

    let outcome = evaluator.run_with_reltuples(&args.query, &[], &tables, &mutations).await?;
    match outcome {
        crate::evaluator::EvaluationOutcome::ZeroCostPlan => {
            println!("baseline plan has zero cost; nothing to explain");
        }
        crate::evaluator::EvaluationOutcome::Evaluated { plan, used_indexes } => {
            println!("{}", serde_json::to_string_pretty(plan.root())?);
            println!("total cost: {}", plan.total_cost());
            println!("new indexes used: {:?}", used_indexes.new);
            println!("existing indexes used: {:?}", used_indexes.existing);
        }
    }
    Ok(())
}

/// Parse `"schema.table.col1,col2"` (schema defaults to `public`) into a
/// one-off `IndexMutation` for the `explain` debug command.
fn parse_candidate(spec: &str) -> Result<crate::evaluator::IndexMutation> {
    let mut parts: Vec<&str> = spec.split('.').collect();
    if parts.len() < 2 {
        anyhow::bail!("--candidate must look like schema.table.col1,col2 or table.col1,col2");
    }
    let columns_str = parts.pop().expect("checked len >= 2 above");
    let (schema, table) = match parts.len() {
        1 => ("public".to_string(), parts[0].to_string()),
        2 => (parts[0].to_string(), parts[1].to_string()),
        _ => anyhow::bail!("--candidate must look like schema.table.col1,col2 or table.col1,col2"),
    };

    let columns: Vec<String> = columns_str.split(',').map(|c| c.trim().to_string()).collect();
    if columns.is_empty() || columns.iter().any(|c| c.is_empty()) {
        anyhow::bail!("--candidate column list must be non-empty");
    }

    let candidate = crate::model::PermutedIndexCandidate::new(schema, table, columns);
    Ok(crate::evaluator::IndexMutation::from_candidate(&candidate))
}
