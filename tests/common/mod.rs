#![allow(dead_code)]

pub use globpipe_test_utils::{init_tracing, with_timeout};
