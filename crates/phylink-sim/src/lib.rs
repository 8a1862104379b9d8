//! Phylink Simulation Library
//!
//! This crate provides a stand-in for the physical-layer simulator so that
//! device-side code can be exercised without the real phy process:
//!
//! - **ScriptedPhy**: plays the phy's half of the protocol from a test
//!   script, over a socket pair or a real per-device socket
//! - **SessionConfig**: describes where a session's per-device sockets live
//!
//! # Example
//!
//! ```rust
//! use phylink_device::Connection;
//! use phylink_sim::ScriptedPhy;
//!
//! let (transport, phy) = ScriptedPhy::spawn(|phy| {
//!     let req = phy.expect_wait()?;
//!     phy.send_wait_end()?;
//!     phy.expect_disconnect()?;
//!     assert_eq!(req.end_time, 5000);
//!     Ok(())
//! })?;
//!
//! let mut conn = Connection::from_transport(transport);
//! conn.advance_time(5000)?;
//! conn.disconnect();
//! phy.join()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod phy;
pub mod session;

pub use phy::{PhyThread, ScriptedPhy, SimError};
pub use session::{BoundPhy, SessionConfig};
