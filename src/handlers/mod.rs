pub mod fs;
pub mod health;
pub mod websocket;
