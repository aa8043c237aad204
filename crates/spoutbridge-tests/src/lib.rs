//! Integration test crate for SpoutBridge.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! A CPU-only fake backend stands in for the GPU, so nothing here needs a device.




#[cfg(test)]
mod frame_loop;
