//! # Terrain Engine Entry Point
//!
//! Runs the engine headless. Pass a JSON configuration file as the first argument to override
//! the defaults; set `RUST_LOG` to choose the log level.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json
//! ```

fn main() {
    terrain_engine::run();
}
