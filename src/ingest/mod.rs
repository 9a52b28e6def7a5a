mod api;
mod error;
mod filter;
mod geodesy;
mod icao;
mod poller;

pub use poller::Poller;
