//! Background texture loading.
//!
//! Fetching and decoding happen on dedicated worker threads. The main thread
//! submits requests and polls for completed images once per frame, so a slow
//! network never stalls rendering.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::decode::{LoadedImage, decode_rgba8};
use crate::error::AssetError;
use crate::source::TextureSource;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 3;

/// Bounded depth of the request queue.
const REQUEST_QUEUE_DEPTH: usize = 16;

/// A single image to fetch and decode.
#[derive(Debug, Clone)]
pub struct TextureRequest<K> {
    /// Caller-chosen key returned with the result.
    pub key: K,
    pub source: TextureSource,
}

/// The outcome of one request.
#[derive(Debug)]
pub struct TextureLoadResult<K> {
    pub key: K,
    pub source: TextureSource,
    pub image: Result<LoadedImage, AssetError>,
    /// Wall-clock time spent fetching and decoding.
    pub elapsed: Duration,
}

/// Progress of one texture slot, as seen by the main thread.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Requested but not yet delivered.
    #[default]
    Pending,
    /// Delivered and uploaded.
    Ready,
    /// Failed; the placeholder stays in use.
    Failed(String),
}

impl LoadState {
    /// `true` once the slot will not change again.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Asynchronous image loader backed by a small thread pool.
pub struct TextureLoader<K> {
    request_tx: Sender<TextureRequest<K>>,
    result_rx: Receiver<TextureLoadResult<K>>,
    in_flight: usize,
}

impl<K: Send + Debug + 'static> TextureLoader<K> {
    /// Spawn `workers` threads, each fetching with the given network timeout.
    pub fn new(workers: usize, fetch_timeout: Duration) -> Self {
        let workers = workers.max(1);
        let (request_tx, request_rx) = crossbeam_channel::bounded::<TextureRequest<K>>(
            REQUEST_QUEUE_DEPTH,
        );
        let (result_tx, result_rx) = crossbeam_channel::bounded(REQUEST_QUEUE_DEPTH);

        for i in 0..workers {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            std::thread::Builder::new()
                .name(format!("texture-loader-{i}"))
                .spawn(move || worker_loop(rx, tx, fetch_timeout))
                .expect("failed to spawn texture loader thread");
        }

        log::debug!("Texture loader started with {workers} workers");

        Self {
            request_tx,
            result_rx,
            in_flight: 0,
        }
    }

    /// Queue an image for loading. Returns immediately.
    pub fn submit(&mut self, key: K, source: TextureSource) -> Result<(), AssetError> {
        match self.request_tx.try_send(TextureRequest { key, source }) {
            Ok(()) => {
                self.in_flight += 1;
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(AssetError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Err(AssetError::Disconnected),
        }
    }

    /// Collect every result that has completed since the last call.
    ///
    /// Call this once per frame on the main thread.
    pub fn drain_results(&mut self) -> Vec<TextureLoadResult<K>> {
        let mut results = Vec::new();
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    results.push(result);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        results
    }

    /// Requests submitted but not yet drained.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
    }
}

fn worker_loop<K: Debug>(
    requests: Receiver<TextureRequest<K>>,
    results: Sender<TextureLoadResult<K>>,
    fetch_timeout: Duration,
) {
    while let Ok(TextureRequest { key, source }) = requests.recv() {
        let start = Instant::now();
        let image = source
            .fetch(fetch_timeout)
            .and_then(|bytes| decode_rgba8(&bytes));
        let elapsed = start.elapsed();

        match &image {
            Ok(img) => log::debug!(
                "Decoded {} ({}x{}) in {:.1} ms",
                source.file_name(),
                img.width,
                img.height,
                elapsed.as_secs_f64() * 1000.0
            ),
            Err(err) => log::debug!("Loading {key:?} from {source} failed: {err}"),
        }

        let result = TextureLoadResult {
            key,
            source,
            image,
            elapsed,
        };
        if results.send(result).is_err() {
            // Loader dropped.
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Slot {
        A,
        B,
    }

    fn write_png(path: &std::path::Path, w: u32, h: u32) {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    fn wait_for<K: Send + Debug + 'static>(
        loader: &mut TextureLoader<K>,
        count: usize,
    ) -> Vec<TextureLoadResult<K>> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut out = Vec::new();
        while out.len() < count && Instant::now() < deadline {
            out.extend(loader.drain_results());
            std::thread::sleep(Duration::from_millis(5));
        }
        out
    }

    #[test]
    fn test_load_state_settled() {
        assert!(!LoadState::Pending.is_settled());
        assert!(LoadState::Ready.is_settled());
        assert!(LoadState::Failed("boom".into()).is_settled());
        assert_eq!(LoadState::default(), LoadState::Pending);
    }

    #[test]
    fn test_drain_before_completion_is_empty() {
        let mut loader: TextureLoader<Slot> = TextureLoader::new(1, Duration::from_secs(1));
        assert!(loader.drain_results().is_empty());
        assert_eq!(loader.in_flight_count(), 0);
    }

    #[test]
    fn test_loads_file_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("earth.png");
        write_png(&path, 4, 2);

        let mut loader = TextureLoader::new(2, Duration::from_secs(1));
        loader.submit(Slot::A, TextureSource::File(path)).unwrap();
        assert_eq!(loader.in_flight_count(), 1);

        let results = wait_for(&mut loader, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, Slot::A);
        let img = results[0].image.as_ref().unwrap();
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(loader.in_flight_count(), 0);
    }

    #[test]
    fn test_failure_is_reported_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        write_png(&good, 1, 1);

        let mut loader = TextureLoader::new(2, Duration::from_secs(1));
        loader.submit(Slot::A, TextureSource::File(good)).unwrap();
        loader
            .submit(Slot::B, TextureSource::File(dir.path().join("missing.png")))
            .unwrap();

        let results = wait_for(&mut loader, 2);
        assert_eq!(results.len(), 2);
        for result in results {
            match result.key {
                Slot::A => assert!(result.image.is_ok()),
                Slot::B => assert!(matches!(result.image, Err(AssetError::Io { .. }))),
            }
        }
    }
}
