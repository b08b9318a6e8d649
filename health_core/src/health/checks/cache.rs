use crate::config::CacheConfig;
use crate::error::ProbeError;
use crate::health::Probe;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

const PING_COMMAND: &[u8] = b"*1\r\n$4\r\nPING\r\n";

/// Bytes read while waiting for the reply line.
const MAX_REPLY_BYTES: u64 = 512;

/// Characters of a bad reply quoted back in the verdict message.
const MAX_QUOTED_CHARS: usize = 64;

/// Key-value cache probe speaking the Redis wire protocol.
///
/// Opens a fresh connection for every check. The connection is owned by the
/// check and closes when it returns, fails, or is abandoned on timeout.
pub struct CacheProbe {
    name: String,
    address: String,
    timeout: Duration,
}

impl CacheProbe {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: "cache".to_string(),
            address: address.into(),
            timeout,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.address.clone(), config.timeout())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait::async_trait]
impl Probe for CacheProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        let mut stream = TcpStream::connect(&self.address).await?;
        stream.write_all(PING_COMMAND).await?;

        let mut reader = BufReader::new(stream.take(MAX_REPLY_BYTES));
        let mut reply = Vec::new();
        if reader.read_until(b'\n', &mut reply).await? == 0 {
            return Err(ProbeError::Connection(
                "connection closed before reply".to_string(),
            ));
        }

        let reply = String::from_utf8_lossy(&reply);
        debug!("Probe '{}' got reply {:?}", self.name, quoted(reply.trim_end()));
        parse_ping_reply(reply.trim_end())
    }
}

fn parse_ping_reply(reply: &str) -> Result<(), ProbeError> {
    if reply == "+PONG" {
        Ok(())
    } else if let Some(error) = reply.strip_prefix('-') {
        Err(ProbeError::Protocol(quoted(error)))
    } else {
        Err(ProbeError::Protocol(format!("unexpected reply {:?}", quoted(reply))))
    }
}

fn quoted(reply: &str) -> String {
    if reply.chars().count() > MAX_QUOTED_CHARS {
        let prefix: String = reply.chars().take(MAX_QUOTED_CHARS).collect();
        format!("{}...", prefix)
    } else {
        reply.to_string()
    }
}
