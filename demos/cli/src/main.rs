use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use triage_core::engine::AcuityStats;
use triage_core::validate::{clamp_resource_count, sanitize_vitals};
use triage_core::{Engine, Evaluation, Level, LevelCounts, Params, ParamsOverride, Preset, ReferenceRanges, Vitals};
use triage_export::{write_csv, write_level_report_csv, ExportBatch, TriageRecord};
use triage_metrics::stats::ScoreStats;
use triage_metrics::{exact_agreement, weighted_kappa, within_one_level, BinaryConfusion, ConfusionMatrix};

#[derive(Parser, Debug)]
#[command(
    name = "triage-cli",
    about = "Score triage cases from a JSON file and print JSON, CSV or a per-level report."
)]
struct Args {
    /// JSON array of cases: `{ "vitals": {...}, "resource_count": 3, "id": "..." }`.
    #[arg(short, long)]
    input: PathBuf,

    /// Named parameter set: default, strict, lenient or research.
    #[arg(long, default_value = "default")]
    preset: Preset,

    /// JSON file with a partial parameter set applied on top of the preset.
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Score against pediatric reference ranges.
    #[arg(long)]
    pediatric: bool,

    /// Clamp out-of-bounds vitals and resource counts before scoring.
    #[arg(long)]
    clamp: bool,

    /// Evaluate on all cores.
    #[arg(long)]
    parallel: bool,

    /// Print score statistics, and agreement metrics when cases carry
    /// `reference_level`, to stderr.
    #[arg(long)]
    summary: bool,

    /// Log filter, e.g. `info` or `triage_core=debug`. `RUST_LOG` wins when set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
    Report,
}

#[derive(Debug, Deserialize)]
struct Case {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    vitals: Vitals,
    #[serde(default)]
    resource_count: i32,
    /// Level assigned by a clinician, used for agreement metrics.
    #[serde(default)]
    reference_level: Option<Level>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let params = build_params(args.preset, args.params.as_deref())?;
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read input file {:?}", args.input))?;
    let cases: Vec<Case> = serde_json::from_str(&data)
        .with_context(|| format!("cannot parse cases in {:?}", args.input))?;
    if cases.is_empty() {
        bail!("no cases in {:?}", args.input);
    }
    tracing::info!(cases = cases.len(), preset = %args.preset, "scoring");

    let (vitals, counts) = prepare_inputs(&cases, &params, args.clamp);
    let ranges = if args.pediatric {
        ReferenceRanges::pediatric()
    } else {
        ReferenceRanges::adult()
    };
    let engine = Engine::with_ranges(params, ranges);
    let evaluations = if args.parallel {
        engine.par_batch_evaluate(&vitals, &counts)?
    } else {
        engine.batch_evaluate(&vitals, &counts)?
    };
    let records = build_records(&cases, &vitals, &counts, &evaluations);

    let source = args.input.file_name().map(|name| name.to_string_lossy().into_owned());
    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {path:?}"))?;
            write_output(BufWriter::new(file), args.format, records, source)?;
        }
        None => write_output(io::stdout().lock(), args.format, records, source)?,
    }

    if args.summary {
        print_summary(&cases, &evaluations)?;
    }
    Ok(())
}

fn build_params(preset: Preset, overrides: Option<&Path>) -> anyhow::Result<Params> {
    let base = preset.params();
    let params = match overrides {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read params file {path:?}"))?;
            let overlay: ParamsOverride = serde_json::from_str(&raw)
                .with_context(|| format!("cannot parse params file {path:?}"))?;
            overlay.apply(base)
        }
        None => base,
    };
    params.validated().context("parameter set rejected")
}

fn prepare_inputs(cases: &[Case], params: &Params, clamp: bool) -> (Vec<Vitals>, Vec<i32>) {
    cases
        .iter()
        .enumerate()
        .map(|(i, case)| {
            if !clamp {
                return (case.vitals, case.resource_count);
            }
            let (clean, report) = sanitize_vitals(&case.vitals);
            if !report.valid {
                let fields: Vec<&str> = report.invalid_fields().map(|sign| sign.code()).collect();
                tracing::info!(case = i, ?fields, "clamped out-of-bounds vitals");
            }
            (clean, clamp_resource_count(case.resource_count, params.max_resources))
        })
        .unzip()
}

fn build_records(
    cases: &[Case],
    vitals: &[Vitals],
    counts: &[i32],
    evaluations: &[Evaluation],
) -> Vec<TriageRecord> {
    cases
        .iter()
        .zip(vitals.iter().zip(counts))
        .zip(evaluations)
        .map(|((case, (v, count)), evaluation)| {
            let mut record = TriageRecord::from_evaluation(v, *count, evaluation);
            record.timestamp = case.timestamp;
            record.id = case.id.clone();
            record
        })
        .collect()
}

fn write_output<W: Write>(
    mut out: W,
    format: Format,
    records: Vec<TriageRecord>,
    source: Option<String>,
) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            let mut batch = ExportBatch::new(records);
            batch.source = source;
            batch.write_json(&mut out).context("cannot write JSON")?;
        }
        Format::Csv => write_csv(&mut out, &records).context("cannot write CSV")?,
        Format::Report => {
            write_level_report_csv(&mut out, &records).context("cannot write report")?
        }
    }
    out.flush().context("cannot flush output")?;
    Ok(())
}

fn print_summary(cases: &[Case], evaluations: &[Evaluation]) -> anyhow::Result<()> {
    let scores: Vec<f64> = evaluations.iter().map(|e| e.acuity).collect();
    let stats = ScoreStats::compute(&scores);
    let range = AcuityStats::from_evaluations(evaluations);
    eprintln!(
        "Cases: {}\nMean acuity: {:.4} (95% CI {:.4}-{:.4})\nRange: {:.4}-{:.4}\nP25/P50/P75: {:.4}/{:.4}/{:.4}",
        stats.n,
        stats.mean,
        stats.ci95_low,
        stats.ci95_high,
        range.min,
        range.max,
        stats.p25,
        stats.p50,
        stats.p75
    );
    for (level, count) in LevelCounts::from_evaluations(evaluations).iter() {
        eprintln!("  {} {:<13} {count}", level.as_u8(), level.label());
    }

    let reference: Option<Vec<Level>> = cases.iter().map(|case| case.reference_level).collect();
    let Some(reference) = reference else {
        return Ok(());
    };
    let predicted: Vec<Level> = evaluations.iter().map(|e| e.level).collect();
    let matrix = ConfusionMatrix::from_levels(&predicted, &reference)?;
    let high = BinaryConfusion::high_acuity(&predicted, &reference)?;
    eprintln!(
        "Exact agreement: {:.3}\nWithin one level: {:.3}\nCohen's kappa: {:.3}\nWeighted kappa: {:.3}\nMacro F1: {:.3}\nHigh-acuity sensitivity/specificity: {:.3}/{:.3}",
        exact_agreement(&predicted, &reference)?,
        within_one_level(&predicted, &reference)?,
        matrix.cohen_kappa(),
        weighted_kappa(&predicted, &reference)?,
        matrix.macro_f1(),
        high.sensitivity(),
        high.specificity()
    );
    Ok(())
}
