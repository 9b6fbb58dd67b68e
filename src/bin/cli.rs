//! replay-locator command line
//!
//! Resolves recorded element descriptors against a JSON page snapshot and
//! prints the resolution summary.

use anyhow::{Context, Result, bail};
use clap::Parser;
use replay_locator::{
    Descriptors, DomNavigator, DomTree, FingerprintCodec, MatchTypes, PathQueryEvaluator, ResolveOptions, Resolver,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "replay-locator")]
#[command(version)]
#[command(about = "Re-locate recorded elements in a page snapshot", long_about = None)]
struct Cli {
    /// JSON element snapshot of the page
    #[arg(long)]
    dom: PathBuf,

    /// URL the snapshot was taken from
    #[arg(long)]
    url: Option<String>,

    /// JSON descriptors (fingerprint, elementPath, breadcrumbs)
    #[arg(long, required_unless_present = "encode")]
    descriptors: Option<PathBuf>,

    /// JSON resolve options; flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    /// Methods to run: any of fp, ep, bc, or all
    #[arg(long)]
    match_types: Option<String>,

    /// Ignore id/name attributes below the document
    #[arg(long)]
    ignore_named_attrs: bool,

    /// Always run the breadcrumb search
    #[arg(long)]
    no_optimized_match: bool,

    /// Discard imperfect structural matches
    #[arg(long)]
    preferred_document: bool,

    /// Widen the breadcrumb search
    #[arg(long)]
    hail_mary: bool,

    /// Print the fingerprint of the first node this XPath selects and exit
    #[arg(long, value_name = "XPATH")]
    encode: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_options(cli: &Cli) -> Result<ResolveOptions> {
    let mut options = match &cli.options {
        Some(path) => ResolveOptions::from_json(&read(path)?).context("Invalid options file")?,
        None => ResolveOptions::default(),
    };
    if let Some(types) = &cli.match_types {
        options.match_types = MatchTypes::parse(types);
    }
    if cli.ignore_named_attrs {
        options.ignore_named_attrs = true;
    }
    if cli.no_optimized_match {
        options.optimized_match = false;
    }
    if cli.preferred_document {
        options.preferred_document = true;
    }
    if cli.hail_mary {
        options.hail_mary = true;
    }
    Ok(options)
}

fn encode(tree: &DomTree, query: &str) -> Result<()> {
    let Some(node) = PathQueryEvaluator.first(tree, tree.document(), query) else {
        bail!("'{}' matched no element", query);
    };
    let fingerprint = FingerprintCodec
        .try_encode(tree, node)
        .with_context(|| format!("Cannot fingerprint {}", tree.describe(node)))?;
    println!("{}", fingerprint);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let snapshot = read(&cli.dom)?;
    let tree = replay_locator::dom::load_snapshot(&snapshot, cli.url.as_deref()).context("Invalid DOM snapshot")?;
    log::info!("Loaded snapshot with {} elements", tree.count_elements());

    if let Some(query) = &cli.encode {
        return encode(&tree, query);
    }

    let Some(descriptors_path) = &cli.descriptors else {
        bail!("--descriptors is required");
    };
    let descriptors = Descriptors::from_json(&read(descriptors_path)?).context("Invalid descriptors file")?;
    let options = load_options(&cli)?;
    if options.match_types.is_empty() {
        bail!("No resolution method selected by '{}'", options.match_types);
    }

    let summary = Resolver::new().resolve(&tree, &descriptors, &options);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{}", json);

    match summary.target_node {
        Some(node) => {
            let fingerprint = FingerprintCodec.encode(&tree, node).unwrap_or_else(|| "-".to_string());
            eprintln!(
                "Resolved {} ({}) via {} with score {:.3}",
                tree.describe(node),
                fingerprint,
                summary.selected,
                summary.target_score
            );
        }
        None => eprintln!("No element resolved ({})", summary.methods),
    }
    Ok(())
}
