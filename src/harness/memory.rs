//! Heap accounting and the concurrent peak-memory sampler
//!
//! [`TrackingAllocator`] wraps the system allocator and keeps a process-wide
//! count of live heap bytes. A binary opts in with
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: matbench::TrackingAllocator = matbench::TrackingAllocator;
//! ```
//!
//! Without it [`heap_in_use`] stays at zero and memory columns report 0.
//!
//! [`MemorySampler`] polls a heap probe on its own thread and folds every
//! reading into an atomic maximum. It must be stopped (signalled and joined)
//! before the peak is read; dropping it stops it as well, so a sampler never
//! outlives the measurement it belongs to.

use std::alloc::{GlobalAlloc, Layout, System};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);

/// Global allocator wrapper that counts live heap bytes
pub struct TrackingAllocator;

// SAFETY: Delegates all allocation/deallocation to the System allocator and only
// adjusts an atomic counter around the calls.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: Forwarding to System allocator with the same layout.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: Forwarding to System allocator with the same layout.
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: ptr was allocated by System with the same layout.
        unsafe { System.dealloc(ptr, layout) };
        LIVE_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: ptr was allocated by System with `layout`; the caller upholds realloc's contract.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                LIVE_BYTES.fetch_add(new_size - layout.size(), Ordering::Relaxed);
            } else {
                LIVE_BYTES.fetch_sub(layout.size() - new_size, Ordering::Relaxed);
            }
        }
        new_ptr
    }
}

/// Live heap bytes as counted by [`TrackingAllocator`]
pub fn heap_in_use() -> usize {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Reads the current heap usage in bytes
pub type HeapProbe = fn() -> usize;

/// Background thread tracking the peak of a heap probe
pub struct MemorySampler {
    stop: Arc<AtomicBool>,
    peak: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl MemorySampler {
    /// Spawns the sampler; it takes a first reading immediately
    pub fn start(interval: Duration, probe: HeapProbe) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let peak = Arc::new(AtomicUsize::new(0));

        let handle = {
            let stop = Arc::clone(&stop);
            let peak = Arc::clone(&peak);
            thread::Builder::new()
                .name("matbench-sampler".to_string())
                .spawn(move || loop {
                    // Read before checking the flag so a stop that races the
                    // spawn still leaves one sample
                    peak.fetch_max(probe(), Ordering::AcqRel);
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                    thread::park_timeout(interval);
                })?
        };

        Ok(Self {
            stop,
            peak,
            handle: Some(handle),
        })
    }

    /// Signals the sampler, waits for it to exit and returns the peak in bytes
    pub fn stop(mut self) -> usize {
        self.shutdown();
        self.peak.load(Ordering::Acquire)
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::warn!("memory sampler thread panicked");
            }
        }
    }
}

impl Drop for MemorySampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FAKE_HEAP: AtomicUsize = AtomicUsize::new(0);

    fn fake_probe() -> usize {
        FAKE_HEAP.load(Ordering::SeqCst)
    }

    #[test]
    fn test_sampler_keeps_running_maximum() {
        FAKE_HEAP.store(100, Ordering::SeqCst);
        let sampler = MemorySampler::start(Duration::from_millis(1), fake_probe).unwrap();

        thread::sleep(Duration::from_millis(20));
        FAKE_HEAP.store(5_000, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        FAKE_HEAP.store(200, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));

        assert_eq!(sampler.stop(), 5_000);
    }

    #[test]
    fn test_stop_returns_promptly_with_long_interval() {
        let sampler = MemorySampler::start(Duration::from_secs(60), fake_probe).unwrap();
        let started = std::time::Instant::now();
        sampler.stop();
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_immediate_stop_still_samples() {
        fn constant_probe() -> usize {
            777
        }
        let sampler = MemorySampler::start(Duration::from_millis(1), constant_probe).unwrap();
        assert_eq!(sampler.stop(), 777);
    }

    #[test]
    fn test_drop_joins_sampler() {
        let sampler = MemorySampler::start(Duration::from_millis(1), fake_probe).unwrap();
        let stop = Arc::clone(&sampler.stop);
        drop(sampler);
        assert!(stop.load(Ordering::Acquire));
    }
}
