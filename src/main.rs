use std::path::PathBuf;

use anyhow::{Context, bail};

use docmask::batch::{self, BatchMode, CancelToken};
use docmask::store::{self, RegionStore};

const USAGE: &str = "usage: docmask <folder> [--template] [--store <path>]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut folder: Option<PathBuf> = None;
    let mut mode = BatchMode::PerDocument;
    let mut store_path = store::default_path();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--template" {
            mode = BatchMode::Template;
        } else if arg == "--store" {
            store_path = PathBuf::from(args.next().context("--store needs a path")?);
        } else if arg == "--help" || arg == "-h" {
            eprintln!("{USAGE}");
            return Ok(());
        } else if !arg.starts_with('-') && folder.is_none() {
            folder = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument {arg}\n{USAGE}");
        }
    }
    let Some(folder) = folder else {
        bail!("missing source folder\n{USAGE}");
    };

    let store = RegionStore::load_or_empty(&store_path)
        .with_context(|| format!("loading region store from {}", store_path.display()))?;
    if store.documents.is_empty() {
        log::warn!(
            "region store {} has no documents; outputs will be unmasked copies",
            store_path.display()
        );
    }

    let outcome = batch::process_folder(&folder, &store, mode, &CancelToken::new())?;
    if outcome.summary.failed > 0 {
        bail!("{} file(s) could not be masked, see log", outcome.summary.failed);
    }
    Ok(())
}
