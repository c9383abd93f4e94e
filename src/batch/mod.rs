//! Batch masking across a folder of documents
//!
//! The region store is snapshotted once before the run, files fan out to a
//! small worker pool, and every per-file failure is recorded rather than
//! raised so one bad scan cannot sink the rest of the run. Outputs land in
//! a sibling `masked/` directory, preserving filenames and page order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel as channel;

use crate::codec::{self, FileKind};
use crate::domain::{Rect, Scale};
use crate::error::{Error, Result};
use crate::mask;
use crate::store::RegionStore;

/// Which stored regions apply to a file being masked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Mask each file with the regions recorded for its own path; files
    /// with no recorded regions come out as unmodified copies
    #[default]
    PerDocument,
    /// Mask every file with the union of all stored regions, each
    /// document's rectangles resolved through its own recorded scale
    Template,
}

/// Cooperative cancellation flag, checked between files.
/// A cancelled run still reports the files it finished.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Aggregate per-file tally for one batch run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub masked: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Where the outputs went plus the per-file tally
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    pub output_dir: PathBuf,
    pub summary: BatchSummary,
}

/// The immutable region snapshot workers share for the whole run
#[derive(Clone)]
enum RegionSource {
    PerDocument(Arc<RegionStore>),
    Template(Arc<Vec<Rect>>),
}

impl RegionSource {
    fn for_file(&self, path: &Path) -> Result<(Vec<Rect>, Scale)> {
        match self {
            RegionSource::Template(rects) => Ok((rects.as_ref().clone(), Scale::IDENTITY)),
            RegionSource::PerDocument(store) => {
                let regions = store.regions_for(&path.to_string_lossy());
                let scale = Scale::new(regions.scale_factor)?;
                Ok((regions.rectangles, scale))
            }
        }
    }
}

/// Union of every stored region set, converted to native space through each
/// document's own recorded scale. Entries with a bad scale are dropped with
/// a warning, matching the fail-soft batch policy.
fn native_template(store: &RegionStore) -> Vec<Rect> {
    let mut rects = Vec::new();
    for (document, regions) in &store.documents {
        match Scale::new(regions.scale_factor) {
            Ok(scale) => rects.extend(
                regions
                    .rectangles
                    .iter()
                    .map(|r| r.normalized().to_native(scale)),
            ),
            Err(err) => log::warn!("dropping regions for {document}: {err}"),
        }
    }
    rects
}

/// Sibling `masked/` directory alongside the source folder
fn masked_dir(folder: &Path) -> PathBuf {
    match folder.parent() {
        Some(parent) => parent.join("masked"),
        None => folder.join("masked"),
    }
}

fn process_file(path: &Path, output_dir: &Path, source: &RegionSource) -> Result<()> {
    let (rects, scale) = source.for_file(path)?;
    let pages = codec::decode(path)?;
    let masked: Vec<_> = pages
        .iter()
        .map(|page| mask::mask_page(page, &rects, scale))
        .collect();
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::UnsupportedFile(path.to_path_buf()))?;
    codec::encode(&masked, &output_dir.join(file_name))
}

/// Mask every recognized document directly inside `folder`.
///
/// Unsupported files are skipped, decode/encode failures are logged and
/// counted, and no per-file error escapes the run. Masking itself is
/// read-only with respect to the store and the source files, so files are
/// distributed across one worker per available core.
pub fn process_folder(
    folder: &Path,
    store: &RegionStore,
    mode: BatchMode,
    token: &CancelToken,
) -> Result<BatchOutcome> {
    let output_dir = masked_dir(folder);
    fs::create_dir_all(&output_dir)?;

    let source = match mode {
        BatchMode::PerDocument => RegionSource::PerDocument(Arc::new(store.clone())),
        BatchMode::Template => RegionSource::Template(Arc::new(native_template(store))),
    };

    let mut summary = BatchSummary::default();
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match FileKind::detect(&path) {
            Some(_) => files.push(path),
            None => {
                log::debug!("skipping unsupported file {}", path.display());
                summary.skipped += 1;
            }
        }
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(files.len().max(1));

    let (job_tx, job_rx) = channel::unbounded::<PathBuf>();
    let (result_tx, result_rx) =
        channel::unbounded::<std::result::Result<PathBuf, (PathBuf, Error)>>();
    for path in files {
        if job_tx.send(path).is_err() {
            break;
        }
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let source = &source;
            let output_dir = &output_dir;
            scope.spawn(move || {
                while let Ok(path) = job_rx.recv() {
                    if token.is_cancelled() {
                        break;
                    }
                    let outcome = match process_file(&path, output_dir, source) {
                        Ok(()) => Ok(path),
                        Err(err) => Err((path, err)),
                    };
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for outcome in result_rx.iter() {
            match outcome {
                Ok(path) => {
                    log::debug!("masked {}", path.display());
                    summary.masked += 1;
                }
                Err((path, err)) => {
                    log::error!("failed to mask {}: {err}", path.display());
                    summary.failed += 1;
                }
            }
        }
    });

    log::info!(
        "batch complete: {} masked, {} skipped, {} failed (outputs in {})",
        summary.masked,
        summary.skipped,
        summary.failed,
        output_dir.display()
    );
    Ok(BatchOutcome {
        output_dir,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::pdf;
    use crate::domain::DocumentRegions;
    use image::{Rgba, RgbaImage};

    const BLUE: Rgba<u8> = Rgba([20, 40, 200, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn source_dir(root: &tempfile::TempDir) -> PathBuf {
        let dir = root.path().join("scans");
        fs::create_dir(&dir).unwrap();
        dir
    }

    fn store_for(path: &Path) -> RegionStore {
        let mut store = RegionStore::default();
        store.documents.insert(
            path.to_string_lossy().into_owned(),
            DocumentRegions::new(0.5, vec![Rect::new(40.0, 40.0, 120.0, 100.0)]),
        );
        store
    }

    #[test]
    fn per_document_scenario_masks_the_recorded_native_area() {
        let root = tempfile::tempdir().unwrap();
        let dir = source_dir(&root);
        let png = dir.join("a.png");
        RgbaImage::from_pixel(800, 600, BLUE).save(&png).unwrap();
        fs::write(dir.join("notes.txt"), b"not an image").unwrap();

        let outcome = process_folder(
            &dir,
            &store_for(&png),
            BatchMode::PerDocument,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(outcome.summary.masked, 1);
        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.failed, 0);
        assert_eq!(outcome.output_dir, root.path().join("masked"));

        let masked = image::open(outcome.output_dir.join("a.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(*masked.get_pixel(100, 100), WHITE);
        assert_eq!(*masked.get_pixel(235, 195), WHITE);
        assert_eq!(*masked.get_pixel(70, 70), BLUE);
        assert_eq!(*masked.get_pixel(245, 205), BLUE);
    }

    #[test]
    fn files_without_recorded_regions_copy_through_unmasked() {
        let root = tempfile::tempdir().unwrap();
        let dir = source_dir(&root);
        let png = dir.join("other.png");
        RgbaImage::from_pixel(64, 48, BLUE).save(&png).unwrap();

        let outcome = process_folder(
            &dir,
            &RegionStore::default(),
            BatchMode::PerDocument,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(outcome.summary.masked, 1);
        let masked = image::open(outcome.output_dir.join("other.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(*masked.get_pixel(32, 24), BLUE);
    }

    #[test]
    fn multi_page_pdf_masks_every_page_in_order() {
        let root = tempfile::tempdir().unwrap();
        let dir = source_dir(&root);
        let pdf_path = dir.join("doc.pdf");
        let pages = vec![
            RgbaImage::from_pixel(400, 300, BLUE),
            RgbaImage::from_pixel(400, 300, BLUE),
            RgbaImage::from_pixel(400, 300, BLUE),
        ];
        pdf::encode(&pages, &pdf_path).unwrap();

        let outcome = process_folder(
            &dir,
            &store_for(&pdf_path),
            BatchMode::PerDocument,
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(outcome.summary.masked, 1);

        let masked_pages = pdf::decode(&outcome.output_dir.join("doc.pdf")).unwrap();
        assert_eq!(masked_pages.len(), 3);
        for page in &masked_pages {
            assert_eq!(page.dimensions(), (400, 300));
            // Native (80,80)-(240,200) is filled white on every page;
            // JPEG transport keeps solid fills close to their values
            let inside = page.get_pixel(150, 150);
            assert!(inside[0] > 230 && inside[1] > 230 && inside[2] > 230);
            let outside = page.get_pixel(350, 250);
            assert!(outside[2] > 150 && outside[0] < 80);
        }
    }

    #[test]
    fn a_broken_file_fails_alone() {
        let root = tempfile::tempdir().unwrap();
        let dir = source_dir(&root);
        fs::write(dir.join("broken.png"), b"not a png").unwrap();
        let good = dir.join("good.png");
        RgbaImage::from_pixel(32, 32, BLUE).save(&good).unwrap();

        let outcome = process_folder(
            &dir,
            &RegionStore::default(),
            BatchMode::PerDocument,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(outcome.summary.masked, 1);
        assert_eq!(outcome.summary.failed, 1);
        assert!(outcome.output_dir.join("good.png").exists());
    }

    #[test]
    fn template_mode_applies_other_documents_regions() {
        let root = tempfile::tempdir().unwrap();
        let dir = source_dir(&root);
        let png = dir.join("fresh.png");
        RgbaImage::from_pixel(800, 600, BLUE).save(&png).unwrap();

        // Regions were recorded for a different document entirely
        let mut store = RegionStore::default();
        store.documents.insert(
            "/elsewhere/template.png".to_owned(),
            DocumentRegions::new(0.5, vec![Rect::new(40.0, 40.0, 120.0, 100.0)]),
        );

        let outcome =
            process_folder(&dir, &store, BatchMode::Template, &CancelToken::new()).unwrap();
        assert_eq!(outcome.summary.masked, 1);

        let masked = image::open(outcome.output_dir.join("fresh.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(*masked.get_pixel(100, 100), WHITE);
        assert_eq!(*masked.get_pixel(245, 205), BLUE);
    }

    #[test]
    fn a_cancelled_run_masks_nothing() {
        let root = tempfile::tempdir().unwrap();
        let dir = source_dir(&root);
        let png = dir.join("a.png");
        RgbaImage::from_pixel(32, 32, BLUE).save(&png).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let outcome =
            process_folder(&dir, &RegionStore::default(), BatchMode::PerDocument, &token).unwrap();

        assert_eq!(outcome.summary.masked, 0);
        assert_eq!(outcome.summary.failed, 0);
        assert!(!outcome.output_dir.join("a.png").exists());
    }
}
