use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use trecfuse::model::{FusionMethodSummary, FusionRunManifest, QrelsSummary, RunFileSummary};
use trecfuse::persist::write_atomic;
use trecfuse::{FusionMethod, FusionOptions, Qrels, TrecRun, filter};

use crate::cli::{Cli, Method, QrelsFilter};
use crate::util::{encode_json_pretty, now_utc_string, sha256_bytes, sha256_file};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: Cli) -> Result<()> {
    let method = fusion_method(&args);
    info!(
        method = method.name(),
        runs = args.runs.len(),
        output = %args.output.display(),
        "fusion requested"
    );

    let mut runs = Vec::with_capacity(args.runs.len());
    for path in &args.runs {
        let run = TrecRun::load(path, args.resort)
            .with_context(|| format!("failed to load run {}", path.display()))?;
        info!(
            path = %path.display(),
            records = run.len(),
            topics = run.topics().len(),
            "loaded run"
        );
        runs.push(run);
    }

    let qrels = args
        .qrels
        .as_deref()
        .map(|path| {
            Qrels::load(path).with_context(|| format!("failed to load qrels {}", path.display()))
        })
        .transpose()?;

    let options = FusionOptions {
        depth: args.depth,
        k: args.k,
        tag: args.runtag.clone(),
        strict_topics: args.strict_topics,
    };
    let mut fused = method
        .fuse(&runs, &options)
        .with_context(|| format!("{} fusion failed", method.name()))?;
    info!(
        records = fused.len(),
        topics = fused.topics().len(),
        "fused runs"
    );

    if let Some(qrels) = &qrels {
        match args.qrels_filter {
            QrelsFilter::Retain => filter::retain_in_place(&mut fused, qrels),
            QrelsFilter::Discard => filter::discard_in_place(&mut fused, qrels),
        }
        info!(
            filter = args.qrels_filter.as_str(),
            records = fused.len(),
            "applied qrels filter"
        );
    }

    // Everything is rendered before the first write so a failure cannot leave
    // a run on disk without its manifest.
    let run_bytes = fused
        .encode(&args.output, Some(args.runtag.as_str()))
        .with_context(|| format!("failed to render fused run {}", args.output.display()))?;
    let manifest_bytes = match &args.manifest {
        Some(manifest_path) => {
            let manifest =
                build_manifest(&args, &method, &runs, &fused, &run_bytes, qrels.as_ref())?;
            let bytes = encode_json_pretty(&manifest).with_context(|| {
                format!("failed to render manifest {}", manifest_path.display())
            })?;
            Some((manifest_path, bytes))
        }
        None => None,
    };

    write_atomic(&args.output, &run_bytes)
        .with_context(|| format!("failed to write fused run {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote fused run");

    if let Some((manifest_path, bytes)) = manifest_bytes {
        if let Err(err) = write_atomic(manifest_path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&args.output) {
                warn!(
                    path = %args.output.display(),
                    error = %cleanup,
                    "failed to remove fused run after manifest error"
                );
            }
            return Err(err).with_context(|| {
                format!("failed to write run manifest {}", manifest_path.display())
            });
        }
        info!(path = %manifest_path.display(), "wrote run manifest");
    }

    Ok(())
}

fn fusion_method(args: &Cli) -> FusionMethod {
    match args.method {
        Method::Rrf => FusionMethod::ReciprocalRankFusion { k: args.rrf_k },
        Method::Interpolation => FusionMethod::Interpolation { alpha: args.alpha },
        Method::Average => FusionMethod::Average,
    }
}

fn build_manifest(
    args: &Cli,
    method: &FusionMethod,
    runs: &[TrecRun],
    fused: &TrecRun,
    fused_bytes: &[u8],
    qrels: Option<&Qrels>,
) -> Result<FusionRunManifest> {
    let inputs = args
        .runs
        .iter()
        .zip(runs)
        .map(|(path, run)| summarize_run_file(path, run))
        .collect::<Result<Vec<_>>>()?;

    let qrels = match (args.qrels.as_deref(), qrels) {
        (Some(path), Some(qrels)) => Some(QrelsSummary {
            path: path.display().to_string(),
            sha256: sha256_file(path)?,
            filter: args.qrels_filter.as_str().to_string(),
            topic_count: qrels.topics().len(),
        }),
        _ => None,
    };

    let (rrf_k, alpha) = match *method {
        FusionMethod::ReciprocalRankFusion { k } => (Some(k), None),
        FusionMethod::Interpolation { alpha } => (None, Some(alpha)),
        FusionMethod::Average => (None, None),
    };

    Ok(FusionRunManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        method: FusionMethodSummary {
            name: method.name().to_string(),
            rrf_k,
            alpha,
        },
        depth: args.depth,
        k: args.k,
        runtag: args.runtag.clone(),
        resort: args.resort,
        strict_topics: args.strict_topics,
        qrels,
        inputs,
        output: RunFileSummary {
            path: args.output.display().to_string(),
            sha256: sha256_bytes(fused_bytes),
            record_count: fused.len(),
            topic_count: fused.topics().len(),
        },
    })
}

fn summarize_run_file(path: &Path, run: &TrecRun) -> Result<RunFileSummary> {
    Ok(RunFileSummary {
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
        record_count: run.len(),
        topic_count: run.topics().len(),
    })
}
