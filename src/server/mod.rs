// Server module entry point
// Hosts ServeStatic on a hyper HTTP/1 server: listener, accept loop,
// per-connection serving and shutdown

pub mod connection;
pub mod listener;
pub mod service;
pub mod signal;
pub mod state;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use server_loop::run;
pub use state::AppState;
