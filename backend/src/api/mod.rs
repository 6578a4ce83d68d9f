mod handler;
pub mod process_http;
