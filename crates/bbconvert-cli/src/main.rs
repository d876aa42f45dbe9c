use anyhow::{bail, Context, Result};
use bbconvert_core::assemble::{ConvertConfig, Converter};
use bbconvert_core::normalize::to_pack_name;
use bbconvert_core::plan::{OutputPlan, WriteOptions};
use bbconvert_core::report::{ConversionReport, Note};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bbconvert")]
#[command(about = "Convert Blockbench .bbmodel files into vanilla item models and textures.")]
#[command(version)]
struct Cli {
    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract exactly one model JSON plus its PNG textures from a .bbmodel
    Extract {
        /// Path to the .bbmodel file
        bbmodel: PathBuf,
        /// Assets root directory containing namespaces
        #[arg(long, default_value = "assets")]
        assets_root: PathBuf,
        #[arg(long, default_value = "bloodstone")]
        namespace: String,
        /// Folder under models/item and textures/item (default: bbmodel stem)
        #[arg(long)]
        asset: Option<String>,
        #[arg(long, default_value = "default")]
        variant: String,
        /// Model file name without extension (default: bbmodel stem)
        #[arg(long)]
        model_name: Option<String>,
        /// Prefix texture file names with the model name
        #[arg(long)]
        prefix_textures: bool,
        /// Overwrite destination files that already exist
        #[arg(long)]
        force: bool,
        /// Print planned writes without writing files
        #[arg(long)]
        dry_run: bool,
        /// Write the JSON run report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

struct ExtractArgs {
    bbmodel: PathBuf,
    assets_root: PathBuf,
    namespace: String,
    asset: Option<String>,
    variant: String,
    model_name: Option<String>,
    prefix_textures: bool,
    write: WriteOptions,
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Extract {
            bbmodel,
            assets_root,
            namespace,
            asset,
            variant,
            model_name,
            prefix_textures,
            force,
            dry_run,
            report,
        } => extract(ExtractArgs {
            bbmodel,
            assets_root,
            namespace,
            asset,
            variant,
            model_name,
            prefix_textures,
            write: WriteOptions {
                overwrite: force,
                dry_run,
            },
            report,
        }),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn extract(args: ExtractArgs) -> Result<()> {
    ensure_input_file(&args.bbmodel)?;
    let bbmodel = args
        .bbmodel
        .canonicalize()
        .with_context(|| format!("resolve input: {:?}", args.bbmodel))?;
    let assets_root = args
        .assets_root
        .canonicalize()
        .ok()
        .filter(|p| p.is_dir())
        .with_context(|| format!("assets root directory does not exist: {:?}", args.assets_root))?;

    let mut notes = Vec::new();
    let cfg = naming_config(&args, &bbmodel, &mut notes)?;

    let doc = bbconvert_import_bbmodel::import_bbmodel(&bbmodel)?;
    let base_dir = bbconvert_import_bbmodel::base_dir(&bbmodel);
    let conversion = Converter::new(cfg.clone()).convert(&doc, &base_dir)?;

    let plan = OutputPlan::new(&assets_root, &cfg, &conversion)?;
    info!(
        input = ?bbmodel,
        model = ?plan.model_path(),
        textures = ?plan.texture_dir(),
        "planned output"
    );
    let writes = plan.execute(&args.write)?;

    let report = ConversionReport::new(bbmodel, &plan, args.write.dry_run, writes, notes);
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    if let Some(path) = &args.report {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(path, &json).with_context(|| format!("write report: {path:?}"))?;
    } else {
        println!("{json}");
    }

    info!("{}", if args.write.dry_run { "Done (dry-run)." } else { "Done." });
    Ok(())
}

/// Normalizes caller-supplied names; asset and model name default to the
/// bbmodel's file stem.
fn naming_config(
    args: &ExtractArgs,
    bbmodel: &Path,
    notes: &mut Vec<Note>,
) -> Result<ConvertConfig> {
    let stem = bbmodel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let namespace = to_pack_name(&args.namespace);
    if namespace != args.namespace.to_lowercase() {
        let message = format!("sanitized namespace '{}' -> '{namespace}'", args.namespace);
        info!("NOTE: {message}");
        notes.push(Note::new("namespace_sanitized", message));
    }

    let model_name = to_pack_name(args.model_name.as_deref().unwrap_or(&stem));
    let asset = to_pack_name(args.asset.as_deref().unwrap_or(&stem));
    let variant = to_pack_name(&args.variant);
    for (label, value) in [
        ("model name", &model_name),
        ("asset name", &asset),
        ("variant name", &variant),
    ] {
        if value.is_empty() {
            bail!("computed empty {label}");
        }
    }

    Ok(ConvertConfig {
        namespace,
        asset,
        variant,
        model_name,
        prefix_textures: args.prefix_textures,
    })
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("bbmodel is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("bbmodel file does not exist: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
