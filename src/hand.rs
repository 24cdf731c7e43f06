//! Hand tracking input
//!
//! Normalizes raw hand landmarks from an external tracker into a
//! [`HandSignal`], and reads those landmarks from a newline-delimited JSON
//! feed on a background thread. The render loop only ever sees the latest
//! snapshot.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Landmark index of the wrist
const WRIST: usize = 0;
/// Landmark index of the thumb tip
const THUMB_TIP: usize = 4;
/// Landmark index of the index finger tip
const INDEX_TIP: usize = 8;
/// Thumb-to-index distance (in image coordinates) below which the hand is pinching
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Hand landmark in normalized image coordinates (`[0, 1]`, y down)
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct HandLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// One line of the feed
#[derive(Debug, Default, Deserialize)]
struct FeedFrame {
    #[serde(default)]
    landmarks: Vec<HandLandmark>,
}

/// Normalized hand position for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSignal {
    /// Horizontal position in `[-1, 1]`, mirrored so moving right reads positive
    pub x: f32,
    /// Vertical position in `[-1, 1]`, up is positive
    pub y: f32,
    /// Thumb and index finger are touching
    pub pinching: bool,
}

impl HandSignal {
    /// Builds a signal from tracker landmarks.
    ///
    /// Needs at least the wrist, thumb tip and index tip (indices 0, 4 and 8).
    pub fn from_landmarks(landmarks: &[HandLandmark]) -> Result<Self> {
        if landmarks.len() <= INDEX_TIP {
            return Err(Error::HandFeed(format!(
                "expected at least {} landmarks, got {}",
                INDEX_TIP + 1,
                landmarks.len()
            )));
        }
        let wrist = landmarks[WRIST];
        let thumb = landmarks[THUMB_TIP];
        let index = landmarks[INDEX_TIP];

        let distance = ((thumb.x - index.x).powi(2) + (thumb.y - index.y).powi(2)).sqrt();

        Ok(HandSignal {
            x: (1.0 - wrist.x) * 2.0 - 1.0,
            y: -(wrist.y * 2.0 - 1.0),
            pinching: distance < PINCH_THRESHOLD,
        })
    }

    /// Copy with both axes forced into `[-1, 1]`; non-finite values become 0
    pub fn clamped(self) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        HandSignal {
            x: clamp(self.x),
            y: clamp(self.y),
            pinching: self.pinching,
        }
    }
}

/// Parses one feed line into a signal; `null`, `{}` or no landmarks mean no hand
pub fn parse_line(line: &str) -> Result<Option<HandSignal>> {
    let frame: Option<FeedFrame> =
        serde_json::from_str(line).map_err(|e| Error::HandFeed(e.to_string()))?;
    match frame {
        Some(frame) if !frame.landmarks.is_empty() => {
            HandSignal::from_landmarks(&frame.landmarks).map(Some)
        }
        _ => Ok(None),
    }
}

/// Latest signal plus when it arrived
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    signal: Option<HandSignal>,
    received: Instant,
}

/// Background reader for a hand landmark feed
pub struct HandFeed {
    latest: Arc<Mutex<Option<Snapshot>>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    stale_after: Duration,
    path: PathBuf,
}

impl HandFeed {
    /// Starts reading `path` (a file or FIFO) on a background thread.
    ///
    /// The file is opened on the reader thread, since opening a FIFO blocks
    /// until a writer connects.
    pub fn open(path: impl AsRef<Path>, stale_after: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // Fail early on a path that does not exist at all
        std::fs::metadata(&path)?;

        let open_path = path.clone();
        let feed = Self::start(path, stale_after, move || {
            File::open(&open_path).map(BufReader::new)
        })?;
        log::info!("Reading hand feed from {}", feed.path.display());
        Ok(feed)
    }

    /// Spawns the reader thread; `open` runs on that thread
    fn start<R, F>(path: PathBuf, stale_after: Duration, open: F) -> Result<Self>
    where
        R: BufRead,
        F: FnOnce() -> std::io::Result<R> + Send + 'static,
    {
        let latest = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));

        let latest_clone = latest.clone();
        let running_clone = running.clone();
        let thread_path = path.clone();

        let thread_handle = std::thread::Builder::new()
            .name("hand-feed".to_string())
            .spawn(move || match open() {
                Ok(reader) => Self::reader_thread(reader, thread_path, latest_clone, running_clone),
                Err(e) => {
                    log::warn!("Failed to open hand feed {}: {}", thread_path.display(), e);
                    running_clone.store(false, Ordering::Release);
                }
            })?;

        Ok(HandFeed {
            latest,
            running,
            thread_handle: Some(thread_handle),
            stale_after,
            path,
        })
    }

    fn reader_thread(
        reader: impl BufRead,
        path: PathBuf,
        latest: Arc<Mutex<Option<Snapshot>>>,
        running: Arc<AtomicBool>,
    ) {
        let mut was_pinching = false;

        for line in reader.lines() {
            if !running.load(Ordering::Acquire) {
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("Hand feed read error on {}: {}", path.display(), e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(signal) => {
                    let pinching = signal.is_some_and(|s| s.pinching);
                    if pinching != was_pinching {
                        log::debug!("Pinch {}", if pinching { "started" } else { "released" });
                        was_pinching = pinching;
                    }
                    *latest.lock() = Some(Snapshot {
                        signal,
                        received: Instant::now(),
                    });
                }
                Err(e) => log::warn!("Skipping hand feed line: {}", e),
            }
        }

        *latest.lock() = None;
        running.store(false, Ordering::Release);
        log::info!("Hand feed {} closed", path.display());
    }

    /// Latest signal, or `None` when no hand is tracked or the last update is stale
    pub fn latest(&self) -> Option<HandSignal> {
        let snapshot = (*self.latest.lock())?;
        if snapshot.received.elapsed() > self.stale_after {
            return None;
        }
        snapshot.signal
    }

    /// Whether the reader thread is still consuming the feed
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops reading.
    ///
    /// A finished reader is joined. A reader still blocked on a FIFO is
    /// detached: it keeps the FIFO open until the next line arrives or the
    /// writer closes, then exits on the cleared running flag.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    log::error!("Hand feed reader for {} panicked: {:?}", self.path.display(), e);
                }
            } else {
                log::debug!("Detaching blocked hand feed reader for {}", self.path.display());
            }
        }
    }
}

/// Stops the feed; a reader still blocked on a FIFO is detached, see [`HandFeed::stop`]
impl Drop for HandFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn landmarks(wrist: (f32, f32), thumb: (f32, f32), index: (f32, f32)) -> Vec<HandLandmark> {
        let mut points = vec![HandLandmark::default(); 21];
        points[WRIST] = HandLandmark {
            x: wrist.0,
            y: wrist.1,
            z: 0.0,
        };
        points[THUMB_TIP] = HandLandmark {
            x: thumb.0,
            y: thumb.1,
            z: 0.0,
        };
        points[INDEX_TIP] = HandLandmark {
            x: index.0,
            y: index.1,
            z: 0.0,
        };
        points
    }

    #[test]
    fn test_wrist_is_mirrored_and_flipped() {
        let signal =
            HandSignal::from_landmarks(&landmarks((0.0, 0.0), (0.0, 0.0), (0.5, 0.5))).unwrap();
        assert_eq!(signal.x, 1.0);
        assert_eq!(signal.y, 1.0);

        let signal =
            HandSignal::from_landmarks(&landmarks((0.75, 0.75), (0.0, 0.0), (0.5, 0.5))).unwrap();
        assert!((signal.x + 0.5).abs() < 1e-6);
        assert!((signal.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pinch_threshold() {
        let pinch =
            HandSignal::from_landmarks(&landmarks((0.5, 0.5), (0.3, 0.3), (0.33, 0.33))).unwrap();
        assert!(pinch.pinching);

        let open =
            HandSignal::from_landmarks(&landmarks((0.5, 0.5), (0.3, 0.3), (0.4, 0.3))).unwrap();
        assert!(!open.pinching);
    }

    #[test]
    fn test_too_few_landmarks() {
        let result = HandSignal::from_landmarks(&[HandLandmark::default(); 8]);
        assert!(matches!(result, Err(Error::HandFeed(_))));
    }

    #[test]
    fn test_clamped() {
        let signal = HandSignal {
            x: 1.7,
            y: f32::NAN,
            pinching: true,
        }
        .clamped();
        assert_eq!(signal.x, 1.0);
        assert_eq!(signal.y, 0.0);
        assert!(signal.pinching);
    }

    #[test]
    fn test_missing_feed_fails_fast() {
        let result = HandFeed::open("/definitely/not/a/feed", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("null").unwrap(), None);
        assert_eq!(parse_line("{}").unwrap(), None);
        assert_eq!(parse_line(r#"{"landmarks": []}"#).unwrap(), None);
        assert!(parse_line("not json").is_err());

        let points: Vec<String> = (0..21)
            .map(|_| r#"{"x": 0.25, "y": 0.5, "z": 0.0}"#.to_string())
            .collect();
        let line = format!(r#"{{"landmarks": [{}]}}"#, points.join(","));
        let signal = parse_line(&line).unwrap().unwrap();
        assert!((signal.x - 0.5).abs() < 1e-6);
        assert!(signal.y.abs() < 1e-6);
        assert!(signal.pinching);
    }

    /// Reader that blocks until the test sends more bytes, like a FIFO with an open writer
    struct ChannelReader {
        rx: std::sync::mpsc::Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl std::io::Read for ChannelReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pending.is_empty() {
                match self.rx.recv() {
                    Ok(bytes) => self.pending = bytes,
                    // Writer closed
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    fn wait_for(feed: &HandFeed, timeout: Duration) -> Option<HandSignal> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(signal) = feed.latest() {
                return Some(signal);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_live_signal_then_goes_stale() {
        let (tx, rx) = std::sync::mpsc::channel();
        let reader = ChannelReader {
            rx,
            pending: Vec::new(),
        };
        let mut feed = HandFeed::start(
            PathBuf::from("live-feed"),
            Duration::from_millis(200),
            move || Ok(BufReader::new(reader)),
        )
        .unwrap();

        let points: Vec<String> = (0..21)
            .map(|_| r#"{"x": 0.25, "y": 0.5}"#.to_string())
            .collect();
        let line = format!("{{\"landmarks\": [{}]}}\n", points.join(","));
        tx.send(line.into_bytes()).unwrap();

        let signal = wait_for(&feed, Duration::from_secs(5)).expect("signal never arrived");
        assert!((signal.x - 0.5).abs() < 1e-6);
        assert!(signal.y.abs() < 1e-6);
        assert!(signal.pinching);

        // No further lines: the snapshot ages out while the reader keeps waiting
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(feed.latest(), None);
        assert!(feed.is_running());

        drop(tx);
        let deadline = Instant::now() + Duration::from_secs(5);
        while feed.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!feed.is_running());
        feed.stop();
    }

    #[test]
    fn test_stop_detaches_blocked_reader() {
        let (tx, rx) = std::sync::mpsc::channel::<Vec<u8>>();
        let reader = ChannelReader {
            rx,
            pending: Vec::new(),
        };
        let mut feed = HandFeed::start(
            PathBuf::from("blocked-feed"),
            Duration::from_secs(1),
            move || Ok(BufReader::new(reader)),
        )
        .unwrap();

        // Returns without waiting on the blocked reader
        feed.stop();
        assert!(feed.thread_handle.is_none());

        // Next line wakes the reader, which sees the cleared flag and exits
        tx.send(b"null\n".to_vec()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while feed.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!feed.is_running());
    }

    #[test]
    fn test_feed_reads_file_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "null").unwrap();
        writeln!(file, "garbage").unwrap();
        file.flush().unwrap();

        let feed = HandFeed::open(file.path(), Duration::from_secs(5)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while feed.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!feed.is_running());
        // End of feed degrades to "no hand"
        assert_eq!(feed.latest(), None);
    }
}
