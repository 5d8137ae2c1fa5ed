//! Command-line front end for ferro-structmap.
//!
//! Thin shell over the library: resolves per-protein input files by naming
//! convention, builds a `MapperConfig` from flags and runs the parallel
//! batch classifier.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use ferro_structmap::batch::ProteinInput;
use ferro_structmap::parallel::classify_batch_parallel;
use ferro_structmap::structure::read_structural_table;
use ferro_structmap::variant::read_variant_table_for_protein;
use ferro_structmap::{MapperConfig, OutputWriter};

#[derive(Parser, Debug)]
#[command(
    name = "structmap",
    about = "Map annotated genomic variants onto 3D protein structure interfaces"
)]
struct Args {
    /// Protein accessions to classify (one or more)
    #[arg(required = true)]
    proteins: Vec<String>,

    /// Directory of annotated variant tables, one <protein>.<ext> per protein
    #[arg(long, value_name = "DIR")]
    variants_dir: PathBuf,

    /// Directory of structural/interface tables, one <protein>.<ext> per protein
    #[arg(long, value_name = "DIR")]
    structures_dir: PathBuf,

    /// Output directory for category and setID files
    #[arg(long, short = 'o', value_name = "DIR", default_value = "structmap_out")]
    out: PathBuf,

    /// Minimum alignment percent identity
    #[arg(long)]
    pident: Option<f64>,

    /// Minimum alignment e-value
    #[arg(long)]
    evalue: Option<f64>,

    /// Restrict to these consequence tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    consequence: Vec<String>,

    /// Restrict to variants on this APPRIS isoform tag
    #[arg(long)]
    isoform: Option<String>,

    /// Also recover variants inside covered alignment spans
    #[arg(long)]
    loc: bool,

    /// Number of worker threads (defaults to available cores)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to configure worker pool")?;
    }

    let mut config = MapperConfig::new().locate_unmapped(args.loc);
    if let Some(pident) = args.pident {
        config = config.min_pident(pident);
    }
    if let Some(evalue) = args.evalue {
        config = config.min_evalue(evalue);
    }
    if !args.consequence.is_empty() {
        config = config.consequence_filter(args.consequence.clone());
    }
    if let Some(isoform) = &args.isoform {
        config = config.isoform_filter(isoform.clone());
    }

    let writer = OutputWriter::new(&args.out, config.descriptor())?;

    let bar = ProgressBar::new(args.proteins.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} proteins {msg}")
            .expect("valid progress template"),
    );

    let mut inputs = Vec::with_capacity(args.proteins.len());
    for protein_id in &args.proteins {
        inputs.push(load_protein(
            protein_id,
            &args.variants_dir,
            &args.structures_dir,
        )?);
        bar.set_message(format!("loading {}", protein_id));
        bar.tick();
    }

    let stats = classify_batch_parallel(inputs, &config, &writer)?;
    bar.finish_and_clear();

    println!(
        "classified {}/{} proteins: {} interface, {} structure, {} unmapped, {} noncoding rows ({:.1}s)",
        stats.succeeded, stats.total, stats.interface, stats.structure, stats.unmapped,
        stats.noncoding, stats.elapsed_secs,
    );
    for error in &stats.errors {
        eprintln!("skipped {}", error);
    }

    if stats.succeeded == 0 && stats.total > 0 {
        bail!("no protein could be classified");
    }
    Ok(())
}

/// Load one protein's inputs. Missing files read as empty slices; the
/// engine decides whether that is NoData or an unresolved protein.
fn load_protein(
    protein_id: &str,
    variants_dir: &Path,
    structures_dir: &Path,
) -> anyhow::Result<ProteinInput> {
    let variants = match find_input_file(variants_dir, protein_id)? {
        Some(path) => read_variant_table_for_protein(&path, protein_id)
            .with_context(|| format!("reading variants for {}", protein_id))?,
        None => Vec::new(),
    };
    let structures = match find_input_file(structures_dir, protein_id)? {
        Some(path) => read_structural_table(&path)
            .with_context(|| format!("reading structures for {}", protein_id))?,
        None => Vec::new(),
    };
    Ok(ProteinInput::new(protein_id, variants, structures))
}

/// Resolve `<id>.<ext>` inside a directory, any extension.
fn find_input_file(dir: &Path, id: &str) -> anyhow::Result<Option<PathBuf>> {
    let prefix = format!("{}.", id);
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(&prefix)
        {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}
