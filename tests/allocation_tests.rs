//! Heap allocation tests for the logging hot path
//!
//! These tests verify:
//! - Warm enabled calls stay within a small per-call allocation budget
//! - Filtered calls allocate nothing
//!
//! A counting global allocator records allocations made by the current thread
//! while counting is switched on, so tests running in parallel do not disturb
//! each other.

use rust_structured_logger::prelude::*;
use rust_structured_logger::{SPAN_ID_KEY, TRACE_ID_KEY};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

struct CountingAllocator;

thread_local! {
    static COUNTING: Cell<bool> = const { Cell::new(false) };
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

fn note_allocation() {
    // try_with: thread-local storage may already be gone during thread exit
    let _ = COUNTING.try_with(|counting| {
        if counting.get() {
            let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        }
    });
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        note_allocation();
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        note_allocation();
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        note_allocation();
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Number of allocations `f` performs on this thread
fn count_allocations(f: impl FnOnce()) -> usize {
    ALLOCATIONS.with(|n| n.set(0));
    COUNTING.with(|c| c.set(true));
    f();
    COUNTING.with(|c| c.set(false));
    ALLOCATIONS.with(|n| n.get())
}

const CALLS: usize = 1000;

/// Upper bound on allocations over `CALLS` warm calls; one per call would fail
const ALLOCATION_BUDGET: usize = CALLS / 10;

fn context_logger(format: OutputFormat, threshold: usize) -> Logger {
    let logger = Logger::builder()
        .format(format)
        .buffer_threshold(threshold)
        .sink(NullSink)
        .build();
    let ctx = LogContext::new()
        .with_field(TRACE_ID_KEY, "trace123")
        .with_field(SPAN_ID_KEY, "span456");
    logger.with_static_context(&ctx)
}

fn log_with_fields(logger: &Logger, i: usize) {
    logger.info(
        "test message",
        &[
            Field::new("iteration", i),
            Field::new("component", "allocation"),
            Field::new("ok", true),
        ],
    );
}

#[test]
fn test_warm_calls_stay_within_budget() {
    for format in [OutputFormat::Text, OutputFormat::Json] {
        for threshold in [0, 4096] {
            let logger = context_logger(format, threshold);

            // Warm the pool and the accumulation buffer
            for i in 0..CALLS {
                log_with_fields(&logger, i);
            }

            let allocations = count_allocations(|| {
                for i in 0..CALLS {
                    log_with_fields(&logger, i);
                }
            });

            assert!(
                allocations <= ALLOCATION_BUDGET,
                "{} allocations over {} calls ({} format, threshold {})",
                allocations,
                CALLS,
                format,
                threshold
            );
        }
    }
}

#[test]
fn test_filtered_calls_do_not_allocate() {
    let logger = Logger::builder()
        .min_level(LogLevel::Error)
        .sink(NullSink)
        .build();
    let traced = logger.with_context(|| LogContext::new().with_field(TRACE_ID_KEY, "unused"));

    let allocations = count_allocations(|| {
        for i in 0..CALLS {
            log_with_fields(&traced, i);
            traced.debug("filtered", &[Field::new("i", i)]);
        }
    });

    assert_eq!(allocations, 0);
}
