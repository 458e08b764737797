//! Host-side test doubles for the platform traits

use core::cell::Cell;
use std::collections::HashMap;
use std::format;
use std::string::{String, ToString};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::thread::{self, ThreadId};
use std::vec::Vec;

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{Level, LevelFilter, Log, Metadata, Record};

use pixelix_hal::{
    Clock, ConfigStore, DateTime, HttpClient, HttpListener, StorageError, TransportError,
    WallClock,
};

std::thread_local! {
    static LOCK_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Raw mutex recording whether the calling thread currently holds one
///
/// Provides no exclusion between threads; single-threaded tests only.
pub struct TrackingRawMutex;

#[allow(unsafe_code)]
unsafe impl RawMutex for TrackingRawMutex {
    const INIT: Self = TrackingRawMutex;

    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        LOCK_DEPTH.with(|depth| depth.set(depth.get() + 1));
        let result = f();
        LOCK_DEPTH.with(|depth| depth.set(depth.get() - 1));
        result
    }
}

/// Check if the calling thread is inside a [`TrackingRawMutex`]
pub fn tracking_lock_held() -> bool {
    LOCK_DEPTH.with(|depth| depth.get() > 0)
}

/// Logger keeping every record together with the thread that emitted it
struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format!("{}", record.args());
        if let Ok(mut records) = self.records.lock() {
            records.push((thread::current().id(), record.level(), line));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

static LOGGER_INIT: Once = Once::new();

/// Route `log` output into the capture buffer
pub fn start_log_capture() {
    LOGGER_INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Messages logged at `level` by the calling thread so far
pub fn captured(level: Level) -> Vec<String> {
    let me = thread::current().id();
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(id, l, _)| *id == me && *l == level)
        .map(|(_, _, line)| line.clone())
        .collect()
}

/// Counts live and released [`Token`]s
#[derive(Debug, Clone, Default)]
pub struct DropCounter {
    created: Arc<AtomicUsize>,
    dropped: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self, id: u32) -> Token {
        self.created.fetch_add(1, Ordering::SeqCst);
        Token {
            id,
            dropped: Arc::clone(&self.dropped),
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn alive(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.dropped()
    }
}

/// Heap payload whose release is observable
#[derive(Debug)]
pub struct Token {
    id: u32,
    dropped: Arc<AtomicUsize>,
}

impl Token {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Manually advanced monotonic clock
#[derive(Debug, Default)]
pub struct MockClock {
    now_ms: AtomicU64,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Wall clock returning whatever the test set
#[derive(Debug, Default)]
pub struct MockWallClock {
    time: Mutex<Option<DateTime>>,
}

impl MockWallClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, time: Option<DateTime>) {
        *self.time.lock().unwrap() = time;
    }
}

impl WallClock for MockWallClock {
    fn local_time(&self) -> Option<DateTime> {
        *self.time.lock().unwrap()
    }
}

/// In-memory configuration store
#[derive(Debug, Default)]
pub struct MemStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_saves: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn put(&self, path: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), data.to_vec());
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl ConfigStore for MemStore {
    fn load(&self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let files = self.files.lock().unwrap();
        let data = files.get(path).ok_or(StorageError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io);
        }
        self.put(path, data);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), StorageError> {
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

struct MockHttpState<L> {
    listener: Option<L>,
    requests: Vec<String>,
    reject: Option<TransportError>,
    /// Calls made while a [`TrackingRawMutex`] was held
    calls_under_lock: usize,
}

/// HTTP client recording requests; callbacks are fired by the test
///
/// Clones share state, so a test keeps one clone while the plugin owns
/// the other.
pub struct MockHttp<L> {
    state: Arc<Mutex<MockHttpState<L>>>,
}

impl<L> Clone for MockHttp<L> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<L: HttpListener + Clone> MockHttp<L> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockHttpState {
                listener: None,
                requests: Vec::new(),
                reject: None,
                calls_under_lock: 0,
            })),
        }
    }

    /// Make every following `get` fail with `error` (`None` accepts again)
    pub fn set_reject(&self, error: Option<TransportError>) {
        self.state.lock().unwrap().reject = error;
    }

    pub fn calls_under_lock(&self) -> usize {
        self.state.lock().unwrap().calls_under_lock
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    /// The registered listener, as the worker context would hold it
    pub fn listener(&self) -> L {
        self.state
            .lock()
            .unwrap()
            .listener
            .clone()
            .expect("no listener registered")
    }

    pub fn respond(&self, payload: &[u8]) {
        self.listener().on_response(payload);
    }

    pub fn close(&self) {
        self.listener().on_closed();
    }

    pub fn fail(&self) {
        self.listener().on_error();
    }
}

impl<L: HttpListener + Clone> HttpClient<L> for MockHttp<L> {
    fn register_listener(&self, listener: L) {
        let mut state = self.state.lock().unwrap();
        if tracking_lock_held() {
            state.calls_under_lock += 1;
        }
        state.listener = Some(listener);
    }

    fn get(&self, url: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if tracking_lock_held() {
            state.calls_under_lock += 1;
        }
        if let Some(error) = state.reject {
            return Err(error);
        }
        state.requests.push(url.to_string());
        Ok(())
    }
}
