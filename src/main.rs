#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod config;
mod controller;
mod events;
mod rate_limit;
mod telemetry;

#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project runs in the browser. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
