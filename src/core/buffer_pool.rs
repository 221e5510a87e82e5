//! Reusable byte buffers for formatting records
//!
//! Each enabled log call borrows one buffer through a [`PooledBuffer`] guard.
//! Dropping the guard hands the buffer back, so release happens on every path
//! out of the call, including unwinding.
//!
//! The pool never refuses to hand out a buffer: when the free list is empty a
//! fresh one is allocated. Only *idle* buffers are bounded, both in count and
//! in retained capacity.

use crossbeam_queue::ArrayQueue;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Idle buffers kept for reuse
pub const DEFAULT_POOL_RETAIN: usize = 64;

/// Capacity of freshly allocated buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Buffers that grew beyond this are freed on release instead of retained
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Snapshot of pool counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub acquired: u64,
    pub released: u64,
    /// Buffers created because the free list was empty
    pub allocated: u64,
    pub idle: usize,
}

#[derive(Debug)]
pub struct BufferPool {
    free: ArrayQueue<Vec<u8>>,
    initial_capacity: usize,
    acquired: AtomicU64,
    released: AtomicU64,
    allocated: AtomicU64,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_POOL_RETAIN, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a pool keeping at most `retain` idle buffers, each starting at
    /// `initial_capacity` bytes
    pub fn with_retention(retain: usize, initial_capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(retain.max(1)),
            initial_capacity,
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// Borrow an empty buffer; capacity from earlier use is kept
    pub fn acquire(&self) -> PooledBuffer<'_> {
        self.acquired.fetch_add(1, Ordering::Relaxed);

        let buf = match self.free.pop() {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(self.initial_capacity)
            }
        };

        PooledBuffer { pool: self, buf }
    }

    fn release(&self, mut buf: Vec<u8>) {
        self.released.fetch_add(1, Ordering::Relaxed);

        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        // A full free list just drops the buffer
        let _ = self.free.push(buf);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            idle: self.free.len(),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive borrow of a pool buffer, returned to the pool on drop
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_empty_buffer() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"leftover bytes");
        }
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= b"leftover bytes".len());
    }

    #[test]
    fn test_buffers_are_reused() {
        let pool = BufferPool::new();
        for _ in 0..100 {
            let mut buf = pool.acquire();
            buf.push(b'x');
        }

        let stats = pool.stats();
        assert_eq!(stats.acquired, 100);
        assert_eq!(stats.released, 100);
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.idle, 1);
    }

    #[test]
    fn test_empty_free_list_allocates() {
        let pool = BufferPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.stats().allocated, 2);
        drop(a);
        drop(b);
        assert_eq!(pool.stats().idle, 2);
    }

    #[test]
    fn test_retention_is_bounded() {
        let pool = BufferPool::with_retention(2, 16);
        let held: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        drop(held);

        let stats = pool.stats();
        assert_eq!(stats.released, 5);
        assert_eq!(stats.idle, 2);
    }

    #[test]
    fn test_oversized_buffers_are_not_retained() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.resize(MAX_RETAINED_CAPACITY + 1, b'a');
        }
        assert_eq!(pool.stats().idle, 0);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        use std::sync::Arc;
        use std::thread;

        let pool = Arc::new(BufferPool::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..1000 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.extend_from_slice(format!("{}-{}", t, i).as_bytes());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.acquired, 8000);
        assert_eq!(stats.released, 8000);
        assert!(stats.allocated <= 8);
    }
}
