//! End-to-end poll loop scenarios with fake clipboard and codec.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clipsaver_core::config::OutputKind;
use clipsaver_core::watch::Effect;
use clipsaver_core::{
    Command, Fingerprinter, Ledger, SampledFingerprinter, SavingsLedger, Settings, TickOutcome,
    WatchEvent, Watcher,
};
use clipsaver_media::{Clipboard, Codec, EncodeFormat, ImageCodec, MediaError, MediaResult};
use clipsaver_store::{LedgerRecord, MemoryStore};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tokio_util::sync::CancellationToken;

type Read = Result<Option<DynamicImage>, String>;

#[derive(Default)]
struct ClipboardState {
    reads: VecDeque<Read>,
    written_images: Vec<DynamicImage>,
    written_text: Vec<String>,
}

/// Clipboard that replays a script of reads and records writes.
/// Cancels `done` once the script runs out.
#[derive(Clone)]
struct FakeClipboard {
    state: Arc<Mutex<ClipboardState>>,
    done: CancellationToken,
}

impl FakeClipboard {
    fn new(reads: Vec<Read>) -> Self {
        let state = ClipboardState {
            reads: reads.into(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            done: CancellationToken::new(),
        }
    }
}

impl Clipboard for FakeClipboard {
    fn read_image(&mut self) -> MediaResult<Option<DynamicImage>> {
        let next = self.state.lock().unwrap().reads.pop_front();
        match next {
            Some(Ok(image)) => Ok(image),
            Some(Err(msg)) => Err(MediaError::MalformedImage(msg)),
            None => {
                self.done.cancel();
                Ok(None)
            }
        }
    }

    fn write_image(&mut self, image: &DynamicImage) -> MediaResult<DynamicImage> {
        // The system clipboard keeps RGBA whatever layout it was given
        let stored = DynamicImage::ImageRgba8(image.to_rgba8());
        self.state.lock().unwrap().written_images.push(stored.clone());
        Ok(stored)
    }

    fn write_text(&mut self, text: &str) -> MediaResult<()> {
        self.state.lock().unwrap().written_text.push(text.to_string());
        Ok(())
    }
}

/// Codec producing buffers of fixed sizes per format.
struct FakeCodec {
    lossless_len: usize,
    lossy_len: usize,
    decoded: DynamicImage,
}

impl Codec for FakeCodec {
    fn encode(&self, _image: &DynamicImage, format: EncodeFormat, _quality: u8) -> MediaResult<Vec<u8>> {
        let len = if format.is_lossless() { self.lossless_len } else { self.lossy_len };
        Ok(vec![0u8; len])
    }

    fn decode(&self, _bytes: &[u8]) -> MediaResult<DynamicImage> {
        Ok(self.decoded.clone())
    }
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

fn codec(lossless_len: usize, lossy_len: usize) -> FakeCodec {
    FakeCodec {
        lossless_len,
        lossy_len,
        // Lossy decoders hand back RGB for opaque images
        decoded: DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]))),
    }
}

fn settings() -> Settings {
    Settings {
        ledger_path: PathBuf::from("unused.json"),
        ..Settings::default()
    }
}

#[test]
fn test_800x600_savings_recorded() {
    let store = Arc::new(MemoryStore::new());
    let ledger = Ledger::load(store.clone());
    let mut watcher = Watcher::new(&settings(), FakeClipboard::new(vec![]), codec(500_000, 150_000), ledger);

    let outcome = watcher.process(&solid(800, 600, [1, 2, 3, 255]), Instant::now()).unwrap();

    match outcome {
        TickOutcome::Saved { report, totals, effect, .. } => {
            assert_eq!(report.original.tokens, 166_666);
            assert_eq!(report.optimized.tokens, 50_000);
            assert_eq!(report.saved_tokens(), 116_666);
            assert_eq!(totals, SavingsLedger::new(166_666, 50_000));
            assert_eq!(effect, Effect::None);
        }
        other => panic!("expected Saved, got {:?}", other),
    }
    assert_eq!(store.snapshot(), Some(LedgerRecord::new(166_666, 50_000)));
}

#[test]
fn test_duplicate_within_cooldown_counted_once() {
    let store = Arc::new(MemoryStore::new());
    let ledger = Ledger::load(store.clone());
    let mut watcher = Watcher::new(&settings(), FakeClipboard::new(vec![]), codec(3000, 300), ledger);
    let image = solid(64, 64, [50, 60, 70, 255]);
    let t0 = Instant::now();

    let first = watcher.process(&image, t0).unwrap();
    let second = watcher.process(&image, t0 + Duration::from_secs(1)).unwrap();

    assert!(matches!(first, TickOutcome::Saved { .. }));
    assert!(matches!(second, TickOutcome::Unchanged { .. }));
    assert_eq!(store.saves(), 1);
    assert_eq!(watcher.ledger().totals(), SavingsLedger::new(1000, 100));
}

#[test]
fn test_distinct_images_after_cooldown_both_counted() {
    let store = Arc::new(MemoryStore::new());
    let ledger = Ledger::load(store.clone());
    let mut watcher = Watcher::new(&settings(), FakeClipboard::new(vec![]), codec(3000, 300), ledger);
    let t0 = Instant::now();

    let a = watcher.process(&solid(64, 64, [1, 1, 1, 255]), t0).unwrap();
    let b = watcher.process(&solid(64, 64, [2, 2, 2, 255]), t0 + Duration::from_secs(4)).unwrap();

    assert!(matches!(a, TickOutcome::Saved { .. }));
    assert!(matches!(b, TickOutcome::Saved { .. }));
    assert_eq!(store.saves(), 2);
}

#[test]
fn test_larger_lossy_output_leaves_ledger_alone() {
    let store = Arc::new(MemoryStore::with_record(LedgerRecord::new(10, 5)));
    let ledger = Ledger::load(store.clone());
    let mut watcher = Watcher::new(&settings(), FakeClipboard::new(vec![]), codec(1000, 4000), ledger);
    let image = solid(32, 32, [200, 0, 0, 255]);
    let t0 = Instant::now();

    let outcome = watcher.process(&image, t0).unwrap();
    match &outcome {
        TickOutcome::NoSavings { report, .. } => assert!(report.saved_tokens() <= 0),
        other => panic!("expected NoSavings, got {:?}", other),
    }
    assert_eq!(store.saves(), 0);
    assert_eq!(watcher.ledger().totals(), SavingsLedger::new(10, 5));

    // State still advanced: the same content is rejected on later polls
    let expected = SampledFingerprinter.fingerprint(&image);
    assert_eq!(watcher.detector().state().last_fingerprint, Some(expected));
    assert_eq!(watcher.detector().state().last_event_time, Some(t0));
    let again = watcher.process(&image, t0 + Duration::from_secs(10)).unwrap();
    assert!(matches!(again, TickOutcome::Unchanged { .. }));
}

#[test]
fn test_equal_sizes_are_not_savings() {
    let store = Arc::new(MemoryStore::new());
    let mut watcher = Watcher::new(
        &settings(),
        FakeClipboard::new(vec![]),
        codec(900, 900),
        Ledger::load(store.clone()),
    );

    let outcome = watcher.process(&solid(8, 8, [0, 0, 0, 255]), Instant::now()).unwrap();
    assert!(matches!(outcome, TickOutcome::NoSavings { .. }));
    assert_eq!(store.saves(), 0);
}

#[test]
fn test_tick_without_image_is_idle() {
    let clipboard = FakeClipboard::new(vec![Ok(None)]);
    let mut watcher = Watcher::new(
        &settings(),
        clipboard,
        codec(10, 1),
        Ledger::load(Arc::new(MemoryStore::new())),
    );

    assert!(matches!(watcher.tick(Instant::now()).unwrap(), TickOutcome::Idle));
    assert_eq!(watcher.detector().state().last_fingerprint, None);
}

#[test]
fn test_tick_surfaces_clipboard_errors() {
    let clipboard = FakeClipboard::new(vec![Err("busy".to_string())]);
    let mut watcher = Watcher::new(
        &settings(),
        clipboard,
        codec(10, 1),
        Ledger::load(Arc::new(MemoryStore::new())),
    );

    assert!(watcher.tick(Instant::now()).is_err());
}

#[test]
fn test_replace_mode_writes_clipboard_and_remembers_output() {
    let clipboard = FakeClipboard::new(vec![]);
    let written = clipboard.state.clone();
    let settings = Settings {
        mode: OutputKind::Replace,
        ..settings()
    };
    let codec = codec(3000, 300);
    let mut watcher = Watcher::new(&settings, clipboard, codec, Ledger::load(Arc::new(MemoryStore::new())));
    let t0 = Instant::now();

    let outcome = watcher.process(&solid(16, 16, [7, 7, 7, 255]), t0).unwrap();

    match outcome {
        TickOutcome::Saved { effect, .. } => assert_eq!(effect, Effect::ClipboardReplaced),
        other => panic!("expected Saved, got {:?}", other),
    }
    assert_eq!(written.lock().unwrap().written_images.len(), 1);

    // Reading our own output back is not a new event
    let echo = written.lock().unwrap().written_images[0].clone();
    assert!(echo.as_rgba8().is_some());
    let echo = watcher.process(&echo, t0 + Duration::from_secs(10)).unwrap();
    assert!(matches!(echo, TickOutcome::Unchanged { .. }));
}

/// Clipboard holding one image, stored as RGBA like the system clipboard.
#[derive(Default)]
struct RgbaClipboard {
    current: Option<DynamicImage>,
}

impl Clipboard for RgbaClipboard {
    fn read_image(&mut self) -> MediaResult<Option<DynamicImage>> {
        Ok(self.current.clone())
    }

    fn write_image(&mut self, image: &DynamicImage) -> MediaResult<DynamicImage> {
        let stored = DynamicImage::ImageRgba8(image.to_rgba8());
        self.current = Some(stored.clone());
        Ok(stored)
    }

    fn write_text(&mut self, _text: &str) -> MediaResult<()> {
        Ok(())
    }
}

/// Opaque noise; compresses poorly as PNG and well as lossy output.
fn noise(width: u32, height: u32) -> DynamicImage {
    let mut seed: u32 = 0x1234_5678;
    let image = RgbaImage::from_fn(width, height, |_, _| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [r, g, b, _] = seed.to_be_bytes();
        Rgba([r, g, b, 255])
    });
    DynamicImage::ImageRgba8(image)
}

#[test]
fn test_replace_mode_does_not_recount_own_output() {
    for format in [EncodeFormat::Webp, EncodeFormat::Jpeg] {
        let store = Arc::new(MemoryStore::new());
        let settings = Settings {
            mode: OutputKind::Replace,
            target_format: format,
            quality: 30,
            ..settings()
        };
        let mut clipboard = RgbaClipboard::default();
        clipboard.current = Some(noise(64, 64));
        let mut watcher = Watcher::new(&settings, clipboard, ImageCodec::new(), Ledger::load(store.clone()));
        let t0 = Instant::now();

        let first = watcher.tick(t0).unwrap();
        assert!(matches!(first, TickOutcome::Saved { .. }), "{format}: {first:?}");

        for i in 1..=3u64 {
            let outcome = watcher.tick(t0 + Duration::from_secs(4 * i)).unwrap();
            assert!(
                matches!(outcome, TickOutcome::Unchanged { .. }),
                "{format}: tick {i} gave {outcome:?}"
            );
        }
        assert_eq!(store.saves(), 1, "{format}");
    }
}

#[test]
fn test_save_mode_writes_file_and_copies_path() {
    let dir = tempfile::tempdir().unwrap();
    let clipboard = FakeClipboard::new(vec![]);
    let written = clipboard.state.clone();
    let settings = Settings {
        mode: OutputKind::Save,
        folder: Some(dir.path().to_path_buf()),
        ..settings()
    };
    let mut watcher = Watcher::new(&settings, clipboard, codec(3000, 300), Ledger::load(Arc::new(MemoryStore::new())));

    let outcome = watcher.process(&solid(16, 16, [7, 7, 7, 255]), Instant::now()).unwrap();

    let path = match outcome {
        TickOutcome::Saved { effect: Effect::Saved { path }, .. } => path,
        other => panic!("expected Saved with file, got {:?}", other),
    };
    assert!(path.exists());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 300);
    assert_eq!(path.extension().unwrap(), "webp");
    assert_eq!(written.lock().unwrap().written_text, vec![path.display().to_string()]);
}

#[test]
fn test_full_pixel_fingerprinter_is_pluggable() {
    let store = Arc::new(MemoryStore::new());
    let mut watcher = Watcher::new(&settings(), FakeClipboard::new(vec![]), codec(3000, 300), Ledger::load(store.clone()))
        .with_fingerprinter(Box::new(clipsaver_core::FullPixelFingerprinter));

    let a = solid(8, 8, [0, 0, 0, 255]);
    let mut buf = a.to_rgba8();
    buf.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
    let b = DynamicImage::ImageRgba8(buf);
    let t0 = Instant::now();

    watcher.process(&a, t0).unwrap();
    let outcome = watcher.process(&b, t0 + Duration::from_secs(4)).unwrap();

    // The sampled strategy would miss this change; the full digest does not
    assert!(matches!(outcome, TickOutcome::Saved { .. }));
    assert_eq!(store.saves(), 2);
}

#[tokio::test]
async fn test_run_survives_errors_and_handles_reset() {
    let image_a = solid(20, 20, [1, 2, 3, 255]);
    let image_b = solid(20, 20, [4, 5, 6, 255]);
    let clipboard = FakeClipboard::new(vec![
        Err("clipboard locked".to_string()),
        Ok(Some(image_a.clone())),
        Ok(Some(image_a)),
        Ok(None),
        Ok(Some(image_b)),
    ]);
    let cancel = clipboard.done.clone();

    let store = Arc::new(MemoryStore::with_record(LedgerRecord::new(5000, 100)));
    let settings = Settings {
        poll_interval_ms: 5,
        cooldown_ms: 0,
        ..settings()
    };
    let watcher = Watcher::new(&settings, clipboard, codec(3000, 300), Ledger::load(store.clone()));

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tx.send(Command::Reset).unwrap();

    let mut events = Vec::new();
    let totals = tokio::time::timeout(
        Duration::from_secs(10),
        watcher.run(rx, cancel, |event| events.push(event.clone())),
    )
    .await
    .expect("watcher did not stop");

    assert!(matches!(events[0], WatchEvent::Reset(t) if t == SavingsLedger::default()));
    assert!(matches!(events[1], WatchEvent::Error(_)));
    assert!(matches!(events[2], WatchEvent::Tick(TickOutcome::Saved { .. })));
    assert!(matches!(events[3], WatchEvent::Tick(TickOutcome::Unchanged { .. })));
    assert!(matches!(events[4], WatchEvent::Tick(TickOutcome::Idle)));
    assert!(matches!(events[5], WatchEvent::Tick(TickOutcome::Saved { .. })));

    assert_eq!(totals, SavingsLedger::new(2000, 200));
    assert_eq!(store.snapshot(), Some(LedgerRecord::new(2000, 200)));
}

#[tokio::test]
async fn test_run_stops_when_already_cancelled() {
    let clipboard = FakeClipboard::new(vec![Ok(Some(solid(4, 4, [0, 0, 0, 255])))]);
    let store = Arc::new(MemoryStore::new());
    let watcher = Watcher::new(&settings(), clipboard, codec(3000, 300), Ledger::load(store.clone()));

    let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut ticks = 0;
    let totals = watcher.run(rx, cancel, |_| ticks += 1).await;

    assert_eq!(ticks, 0);
    assert_eq!(totals, SavingsLedger::default());
    assert_eq!(store.saves(), 0);
}
