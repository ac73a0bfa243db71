//! Integration test common infrastructure.
//!
//! Provides a configurable `BotInfo` fake and an in-process control server
//! bound to an ephemeral loopback port.

pub mod info;
pub mod server;

#[allow(unused_imports)]
pub use info::RecordingInfo;
#[allow(unused_imports)]
pub use server::TestServer;
