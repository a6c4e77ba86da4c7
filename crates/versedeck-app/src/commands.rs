//! Command handlers.

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::http::HttpBackend;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use versedeck_core::session::{export_session, import_session};
use versedeck_core::storage::{FileStorage, LocalSession, create_default_session};
use versedeck_core::sync::SaveApplied;
use versedeck_core::{
    ApproximateMeasure, BackendSync, ComposerConfig, FitBounds, SessionSnapshot, Slide, SlideBackend, SlideId,
    SlideStore, SyncState, TextMeasure, Verse, fit_line_to_width, fit_stanza_font_size, layout_verses,
};
use versedeck_render::ParleyMeasure;

/// Run one parsed command line.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { session } => {
            let snapshot = import_session(&session)?;
            print!("{}", summarize(&snapshot));
        }
        Commands::Fit {
            lines,
            width,
            height,
            family,
            approximate,
        } => {
            let measure: Box<dyn TextMeasure> = if approximate {
                Box::new(ApproximateMeasure)
            } else {
                Box::new(parley_measure(&config)?)
            };
            let family = family.unwrap_or_else(|| config.composer.font_family.clone());
            let size = fit_lines(measure.as_ref(), &lines, width, height, &family, &config.composer)?;
            println!("{}px", size);
        }
        Commands::Psalms { verses, name, out } => {
            let json = std::fs::read_to_string(&verses)?;
            let snapshot = psalms_session(&json, &name)?;
            match out {
                Some(path) => {
                    export_session(&path, &snapshot)?;
                    println!("Wrote {} slides to {}", snapshot.slides.len(), path.display());
                }
                None => println!("{}", snapshot.to_json().map_err(versedeck_core::SessionError::from)?),
            }
        }
        Commands::Push {
            session,
            images,
            api,
            create,
        } => {
            let base = config.api_base(api.as_deref())?;
            let snapshot = import_session(&session)?;
            let sync = BackendSync::new(Arc::new(HttpBackend::new(&base)?), snapshot.presentation_name.clone());

            if create {
                sync.create_presentation(chrono::Utc::now()).await?;
                log::info!("Created presentation '{}'", snapshot.presentation_name);
            }

            let mut store = SlideStore::new();
            snapshot.apply_to(&mut store);
            let report = push_slides(&sync, &mut store, &images).await;

            let updated = SessionSnapshot::capture(snapshot.presentation_name, &store);
            export_session(&session, &updated)?;

            println!(
                "Saved {}, failed {}, skipped {}",
                report.saved.len(),
                report.failed.len(),
                report.skipped.len()
            );
            for (id, message) in &report.failed {
                println!("  {}: {}", id, message);
            }
        }
        Commands::Save { session } => {
            let snapshot = import_session(&session)?;
            let mut local = local_session(&config)?;
            local.save(&snapshot).await?;
            println!("Kept '{}' as the local draft", snapshot.presentation_name);
        }
        Commands::Resume { export } => {
            let mut local = local_session(&config)?;
            let Some(meta) = local.resume_meta().await else {
                println!("No saved draft");
                return Ok(());
            };
            println!(
                "Draft '{}' with {} slides, saved {}",
                meta.presentation_name,
                meta.slide_count,
                meta.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
            if let Some(path) = export {
                let snapshot = local.resume().await?;
                export_session(&path, &snapshot)?;
                println!("Exported to {}", path.display());
            }
        }
        Commands::Discard => {
            let mut local = local_session(&config)?;
            local.discard().await?;
            println!("Draft discarded");
        }
    }
    Ok(())
}

fn parley_measure(config: &AppConfig) -> Result<ParleyMeasure, AppError> {
    let measure = ParleyMeasure::new();
    for font in &config.fonts {
        measure.register_font_file(font)?;
    }
    Ok(measure)
}

fn local_session(config: &AppConfig) -> Result<LocalSession<FileStorage>, AppError> {
    let local = match &config.storage_dir {
        Some(dir) => LocalSession::new(Arc::new(FileStorage::new(dir.clone())?)),
        None => create_default_session()?,
    };
    Ok(local)
}

/// One line per slide: position, id, line count, edit mode and sync state.
pub fn summarize(snapshot: &SessionSnapshot) -> String {
    let name = if snapshot.presentation_name.is_empty() {
        "(unnamed)"
    } else {
        snapshot.presentation_name.as_str()
    };
    let mut out = format!(
        "{}: {} slides, current {}, saved {}\n",
        name,
        snapshot.slides.len(),
        snapshot.current_index + 1,
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    for (i, slide) in snapshot.slides.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {}  {} lines  {:?}  {:?}{}",
            i + 1,
            slide.id,
            slide.lines.len(),
            slide.edit_mode,
            slide.sync.state,
            if slide.unsaved { "  *" } else { "" }
        );
    }
    out
}

/// Fit `lines` into the given box, defaulting to the padded canvas.
pub fn fit_lines(
    measure: &dyn TextMeasure,
    lines: &[String],
    width: Option<f64>,
    height: Option<f64>,
    family: &str,
    config: &ComposerConfig,
) -> Result<u32, AppError> {
    let width = width.unwrap_or(config.canvas_size.width * config.padding_factor);
    let height = height.unwrap_or(config.canvas_size.height * config.padding_factor);
    if !(width > 0.0 && height > 0.0) {
        return Err(AppError::Input("width and height must be positive".to_string()));
    }
    let bounds: FitBounds = config.fit_bounds;

    match lines {
        [] => Err(AppError::Input("nothing to fit".to_string())),
        [line] => Ok(fit_line_to_width(measure, line, width, family, bounds)),
        _ => fit_stanza_font_size(
            measure,
            lines,
            width,
            height,
            family,
            bounds,
            config.line_height_factor,
        )
        .ok_or_else(|| AppError::Input("nothing to fit".to_string())),
    }
}

/// Build a session with one slide per verse.
pub fn psalms_session(verses_json: &str, name: &str) -> Result<SessionSnapshot, AppError> {
    let verses: Vec<Verse> =
        serde_json::from_str(verses_json).map_err(|e| AppError::Input(format!("Invalid verse list: {}", e)))?;
    if verses.is_empty() {
        return Err(AppError::Input("verse list is empty".to_string()));
    }
    let slides: Vec<Slide> = layout_verses(&verses).into_iter().map(Slide::new).collect();
    let store = SlideStore::from_slides(slides, 0);
    log::info!("Laid out {} verses", verses.len());
    Ok(SessionSnapshot::capture(name, &store))
}

/// What a push did to each slide.
#[derive(Debug, Default)]
pub struct PushReport {
    pub saved: Vec<SlideId>,
    pub failed: Vec<(SlideId, String)>,
    /// Already synced, or no image found.
    pub skipped: Vec<SlideId>,
}

/// Save every slide that is not in sync, reading `<slide-id>.png` from
/// `images`. Slides are sent one at a time in deck order.
pub async fn push_slides<B: SlideBackend>(sync: &BackendSync<B>, store: &mut SlideStore, images: &Path) -> PushReport {
    let mut report = PushReport::default();

    for id in store.slide_ids() {
        let Some(slide) = store.slide_by_id(&id) else {
            continue;
        };
        if slide.sync.state == SyncState::Synced {
            report.skipped.push(id);
            continue;
        }
        let path = images.join(format!("{}.png", id));
        let png = match std::fs::read(&path) {
            Ok(png) => png,
            Err(e) => {
                log::warn!("No image for slide {} at {}: {}", id, path.display(), e);
                report.skipped.push(id);
                continue;
            }
        };

        let Some(index) = store.index_of(&id) else {
            continue;
        };
        let Some(job) = sync.begin_save(store, index, &png) else {
            report.skipped.push(id);
            continue;
        };
        let outcome = sync.execute(job).await;
        match sync.apply_save(store, outcome) {
            SaveApplied::Saved => report.saved.push(id),
            SaveApplied::Failed(message) => report.failed.push((id, message)),
            SaveApplied::Stale => report.skipped.push(id),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use std::sync::Mutex;
    use tempfile::tempdir;
    use versedeck_core::Line;
    use versedeck_core::backend::{
        BackendError, BackendResult, CreatePresentationRequest, CreateSlideRequest, UpdateOrderRequest,
        UpdateSlideRequest,
    };
    use versedeck_core::storage::BoxFuture;

    #[derive(Default)]
    struct FakeBackend {
        sent: Mutex<Vec<String>>,
        failing: Option<String>,
    }

    impl FakeBackend {
        fn respond(&self, id: &str) -> BoxFuture<'_, BackendResult<()>> {
            self.sent.lock().unwrap().push(id.to_string());
            let fail = self.failing.as_deref() == Some(id);
            Box::pin(async move {
                if fail {
                    Err(BackendError::Status {
                        status: 503,
                        body: "unavailable".to_string(),
                    })
                } else {
                    Ok(())
                }
            })
        }
    }

    impl SlideBackend for FakeBackend {
        fn create_presentation(&self, _request: CreatePresentationRequest) -> BoxFuture<'_, BackendResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn create_slide(&self, request: CreateSlideRequest) -> BoxFuture<'_, BackendResult<()>> {
            self.respond(&request.random_id)
        }

        fn update_slide(&self, request: UpdateSlideRequest) -> BoxFuture<'_, BackendResult<()>> {
            self.respond(&request.random_id)
        }

        fn delete_slide(&self, _presentation_name: &str, random_id: &str) -> BoxFuture<'_, BackendResult<()>> {
            self.respond(random_id)
        }

        fn update_order(&self, request: UpdateOrderRequest) -> BoxFuture<'_, BackendResult<()>> {
            self.respond(&request.random_id)
        }
    }

    fn three_slides() -> SlideStore {
        let slides = (0..3)
            .map(|i| {
                Slide::new(vec![Line::new(
                    format!("line {}", i),
                    Point::new(480.0, 270.0),
                    40.0,
                )])
            })
            .collect();
        SlideStore::from_slides(slides, 0)
    }

    #[tokio::test]
    async fn test_push_saves_slides_with_images() {
        let dir = tempdir().unwrap();
        let mut store = three_slides();
        let ids = store.slide_ids();
        std::fs::write(dir.path().join(format!("{}.png", ids[0])), b"png0").unwrap();
        std::fs::write(dir.path().join(format!("{}.png", ids[2])), b"png2").unwrap();

        let backend = Arc::new(FakeBackend::default());
        let sync = BackendSync::new(backend.clone(), "Sunday");
        let report = push_slides(&sync, &mut store, dir.path()).await;

        assert_eq!(report.saved, vec![ids[0].clone(), ids[2].clone()]);
        assert_eq!(report.skipped, vec![ids[1].clone()]);
        assert!(store.get(0).unwrap().is_saved_to_backend());
        assert_eq!(store.get(1).unwrap().sync.state, SyncState::Draft);

        // A second push only touches what is still out of sync
        let again = push_slides(&sync, &mut store, dir.path()).await;
        assert!(again.saved.is_empty());
        assert_eq!(again.skipped.len(), 3);
        assert_eq!(backend.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_push_reports_failures() {
        let dir = tempdir().unwrap();
        let mut store = three_slides();
        let ids = store.slide_ids();
        for id in &ids {
            std::fs::write(dir.path().join(format!("{}.png", id)), b"png").unwrap();
        }

        let backend = Arc::new(FakeBackend {
            failing: Some(ids[1].clone()),
            ..Default::default()
        });
        let sync = BackendSync::new(backend, "Sunday");
        let report = push_slides(&sync, &mut store, dir.path()).await;

        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, ids[1]);
        assert_eq!(store.get(1).unwrap().sync.state, SyncState::Error);
    }

    #[test]
    fn test_psalms_session() {
        let json = r#"[{"verse":1,"telugu":"యెహోవా నా కాపరి","english":"The Lord is my shepherd"},
                       {"verse":2,"telugu":"పచ్చిక","english":"Green pastures"}]"#;
        let snapshot = psalms_session(json, "Psalm 23").unwrap();
        assert_eq!(snapshot.slides.len(), 2);
        assert_eq!(snapshot.presentation_name, "Psalm 23");
        assert!(snapshot.slides[1].lines[0].text.starts_with("2. "));

        assert!(matches!(psalms_session("[]", "x"), Err(AppError::Input(_))));
        assert!(matches!(psalms_session("{", "x"), Err(AppError::Input(_))));
    }

    #[test]
    fn test_fit_lines() {
        let config = ComposerConfig::default();
        let one = fit_lines(
            &ApproximateMeasure,
            &["Amazing grace".to_string()],
            None,
            None,
            "Anek Telugu",
            &config,
        )
        .unwrap();
        let stanza = fit_lines(
            &ApproximateMeasure,
            &["Amazing grace".to_string(), "how sweet the sound".to_string()],
            None,
            None,
            "Anek Telugu",
            &config,
        )
        .unwrap();
        assert!(stanza <= one);
        assert!(fit_lines(&ApproximateMeasure, &[], None, None, "x", &config).is_err());
        assert!(fit_lines(&ApproximateMeasure, &["a".to_string()], Some(0.0), None, "x", &config).is_err());
    }

    #[test]
    fn test_summarize() {
        let snapshot = psalms_session(r#"[{"verse":1,"telugu":"a","english":"b"}]"#, "").unwrap();
        let text = summarize(&snapshot);
        assert!(text.starts_with("(unnamed): 1 slides, current 1"));
        assert!(text.contains(&snapshot.slides[0].id));
        assert!(text.contains("2 lines"));
    }
}
