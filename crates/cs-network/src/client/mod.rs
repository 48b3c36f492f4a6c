mod tcp;

pub use tcp::TcpClipSyncTransport;
