//! Session socket layout
//!
//! The phy owns a directory of per-device sockets; devices connect to the
//! one matching their id. [`SessionConfig`] captures the layout so tests and
//! tools derive the same paths as the device engine, and [`BoundPhy`] stands
//! in for the phy's accepting side on a real socket.

use std::fs;
use std::io;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::phy::ScriptedPhy;

/// Where a session's per-device sockets live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base directory shared by all sessions
    pub endpoint: PathBuf,
    /// Name of this session; one subdirectory per session
    pub session_id: String,
}

impl SessionConfig {
    /// The socket path for one device of this session
    pub fn socket_path(&self, device_id: u32) -> PathBuf {
        self.endpoint
            .join(&self.session_id)
            .join(format!("dev{device_id}.phy"))
    }
}

/// The phy's accepting side of one device socket
#[derive(Debug)]
pub struct BoundPhy {
    listener: UnixListener,
}

impl BoundPhy {
    /// Create the session directory and listen on the device's socket.
    ///
    /// A stale socket file from a previous run is removed first. Must be
    /// called before the device connects.
    pub fn bind(config: &SessionConfig, device_id: u32) -> io::Result<Self> {
        let path = config.socket_path(device_id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let listener = UnixListener::bind(&path)?;
        info!(device_id, path = %path.display(), "phy listening");
        Ok(BoundPhy { listener })
    }

    /// Block until a device connects and hand back a scripted endpoint
    pub fn accept(&self) -> io::Result<ScriptedPhy> {
        let (stream, _) = self.listener.accept()?;
        Ok(ScriptedPhy::from_stream(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path_layout() {
        let config = SessionConfig {
            endpoint: PathBuf::from("/tmp/phy"),
            session_id: "sim-7".to_string(),
        };
        assert_eq!(
            config.socket_path(3),
            PathBuf::from("/tmp/phy/sim-7/dev3.phy")
        );
    }
}
