//! # Caterer Test Suite
//!
//! Cross-crate tests that run the real engine, frame builder, encoder and
//! worker behind the dispatcher.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── fixtures.rs      # Patterns, GIF decoding, worker wiring
//! │   ├── pipeline.rs      # Script → frames → GIF → standard decoder
//! │   ├── supervision.rs   # Timeouts, restarts, draining
//! │   └── chat_commands.rs # Command wording end to end
//! └── benches/
//!     └── pipeline_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p caterer-tests
//! cargo test -p caterer-tests integration::supervision::
//! cargo bench -p caterer-tests
//! ```

pub mod integration;
