pub mod compact;
pub mod fetch;
