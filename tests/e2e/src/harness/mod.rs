//! Test harness: a [`engine_harness::TestEngineHarness`] wraps a real
//! [`amem_core::engine::RetrievalEngine`] over the in-memory ports in
//! [`crate::mocks`], so end-to-end tests drive the engine's public API
//! exactly as the surrounding system would.

pub mod engine_harness;
