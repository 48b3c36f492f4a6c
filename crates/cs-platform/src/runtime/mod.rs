mod client;

pub use client::ClientRuntime;
