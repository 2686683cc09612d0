pub mod countdown_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that builds the web server router.
pub use rest::{chat_handler, list_countries_handler, list_services_handler};
pub use ws_handler::ws_handler;
