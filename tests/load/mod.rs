//! Concurrency and load tests

mod concurrent_matching;
