mod checkin_handler;
mod help_handler;
mod invite_handler;
pub mod start_handler;
mod update_router;

pub use update_router::process_update;
