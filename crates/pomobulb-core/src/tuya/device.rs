use serde_json::json;
use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

use super::cipher::{hmac_sha256, EcbCipher, BLOCK};
use super::frame::{command, Frame, Integrity, HEADER_LEN};
use crate::error::BulbError;
use crate::payload::DpsPayload;
use crate::storage::SmartBulbConfig;

pub const DEFAULT_PORT: u16 = 6668;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Version tag plus twelve reserved bytes prefixed to commands.
const VERSION_HEADER_LEN: usize = 15;
/// Frames read while waiting for a status reply.
const MAX_STATUS_FRAMES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V32,
    V33,
    V34,
}

impl ProtocolVersion {
    pub fn from_config(version: f64) -> Result<Self, BulbError> {
        match (version * 10.0).round() as i64 {
            32 => Ok(ProtocolVersion::V32),
            33 => Ok(ProtocolVersion::V33),
            34 => Ok(ProtocolVersion::V34),
            _ => Err(BulbError::UnsupportedVersion(format!("{version:.1}"))),
        }
    }

    fn tag(self) -> &'static [u8; 3] {
        match self {
            ProtocolVersion::V32 => b"3.2",
            ProtocolVersion::V33 => b"3.3",
            ProtocolVersion::V34 => b"3.4",
        }
    }

    fn header(self) -> [u8; VERSION_HEADER_LEN] {
        let mut header = [0u8; VERSION_HEADER_LEN];
        header[..3].copy_from_slice(self.tag());
        header
    }
}

/// A Tuya device reachable over the LAN protocol.
///
/// Every call opens a fresh connection, and 3.4 devices negotiate a new
/// session key each time.
#[derive(Debug)]
pub struct TuyaDevice {
    device_id: String,
    address: String,
    local_key: Vec<u8>,
    version: ProtocolVersion,
    timeout: Duration,
    seq: u32,
}

impl TuyaDevice {
    pub fn new(
        device_id: impl Into<String>,
        address: impl Into<String>,
        local_key: &str,
        version: ProtocolVersion,
    ) -> Result<Self, BulbError> {
        if local_key.len() != BLOCK {
            return Err(BulbError::Crypto(format!(
                "local key must be {BLOCK} bytes, got {}",
                local_key.len()
            )));
        }
        Ok(Self {
            device_id: device_id.into(),
            address: address.into(),
            local_key: local_key.as_bytes().to_vec(),
            version,
            timeout: DEFAULT_TIMEOUT,
            seq: 0,
        })
    }

    pub fn from_config(config: &SmartBulbConfig) -> Result<Self, BulbError> {
        Self::new(
            config.device_id.clone(),
            config.address.clone(),
            &config.local_key,
            ProtocolVersion::from_config(config.version)?,
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a DPS command map.
    pub fn set_dps(&mut self, dps: &DpsPayload) -> Result<(), BulbError> {
        let mut session = self.connect()?;
        let now = chrono::Utc::now().timestamp();

        let (cmd, payload) = match self.version {
            ProtocolVersion::V32 | ProtocolVersion::V33 => {
                let body = json!({
                    "devId": self.device_id,
                    "uid": self.device_id,
                    "t": now.to_string(),
                    "dps": dps,
                });
                let mut payload = self.version.header().to_vec();
                payload.extend(session.cipher.encrypt(body.to_string().as_bytes()));
                (command::CONTROL, payload)
            }
            ProtocolVersion::V34 => {
                let body = json!({
                    "protocol": 5,
                    "t": now,
                    "data": { "dps": dps },
                });
                let mut plain = self.version.header().to_vec();
                plain.extend_from_slice(body.to_string().as_bytes());
                (command::CONTROL_NEW, session.cipher.encrypt(&plain))
            }
        };

        let seq = self.next_seq();
        session.send(&Frame::new(seq, cmd, payload))?;

        // Some bulbs never acknowledge a control command.
        match session.receive() {
            Ok(frame) => debug!(command = frame.command, "control acknowledged"),
            Err(BulbError::Io { source, .. })
                if matches!(source.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                debug!("no acknowledgement before timeout");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Query the device's data points.
    ///
    /// Returns the device's JSON reply, normalized so the data points sit
    /// under a top-level `dps` key.
    pub fn status(&mut self) -> Result<serde_json::Value, BulbError> {
        let mut session = self.connect()?;
        let body = json!({
            "gwId": self.device_id,
            "devId": self.device_id,
            "uid": self.device_id,
            "t": chrono::Utc::now().timestamp().to_string(),
        });
        let cmd = match self.version {
            ProtocolVersion::V34 => command::DP_QUERY_NEW,
            _ => command::DP_QUERY,
        };
        let seq = self.next_seq();
        let payload = session.cipher.encrypt(body.to_string().as_bytes());
        session.send(&Frame::new(seq, cmd, payload))?;

        for _ in 0..MAX_STATUS_FRAMES {
            let frame = session.receive()?;
            let Some(reply) = session.open(&frame)? else {
                continue;
            };
            if let Some(status) = normalize_status(reply) {
                return Ok(status);
            }
        }
        Err(BulbError::Response("device sent no data points".into()))
    }

    fn next_seq(&mut self) -> u32 {
        self.seq = self.seq.wrapping_add(1);
        self.seq
    }

    fn socket_addr(&self) -> Result<SocketAddr, BulbError> {
        if let Some(addr) = literal_socket_addr(&self.address) {
            return Ok(addr);
        }
        let resolved = if self.address.contains(':') {
            self.address.to_socket_addrs()
        } else {
            (self.address.as_str(), DEFAULT_PORT).to_socket_addrs()
        };
        resolved
            .map_err(|source| self.io_error(source))?
            .next()
            .ok_or_else(|| {
                self.io_error(std::io::Error::new(
                    ErrorKind::NotFound,
                    "address did not resolve",
                ))
            })
    }

    fn io_error(&self, source: std::io::Error) -> BulbError {
        BulbError::Io {
            address: self.address.clone(),
            source,
        }
    }

    fn connect(&mut self) -> Result<Session, BulbError> {
        let addr = self.socket_addr()?;
        debug!(device = %self.device_id, %addr, version = ?self.version, "connecting");
        let stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|source| self.io_error(source))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
            .and_then(|_| stream.set_nodelay(true))
            .map_err(|source| self.io_error(source))?;

        let mut session = Session {
            stream,
            address: self.address.clone(),
            version: self.version,
            cipher: EcbCipher::new(&self.local_key)?,
            hmac_key: None,
        };
        if self.version == ProtocolVersion::V34 {
            let local_key = self.local_key.clone();
            let mut seq = || self.next_seq();
            session.negotiate(&local_key, &mut seq)?;
        }
        Ok(session)
    }
}

/// One open connection with its active key.
struct Session {
    stream: TcpStream,
    address: String,
    version: ProtocolVersion,
    cipher: EcbCipher,
    /// Frame HMAC key; `None` means CRC framing.
    hmac_key: Option<Vec<u8>>,
}

impl Session {
    fn integrity(&self) -> Integrity<'_> {
        match &self.hmac_key {
            Some(key) => Integrity::Hmac(key),
            None => Integrity::Crc,
        }
    }

    fn io_error(&self, source: std::io::Error) -> BulbError {
        BulbError::Io {
            address: self.address.clone(),
            source,
        }
    }

    fn send(&mut self, frame: &Frame) -> Result<(), BulbError> {
        let bytes = frame.encode(self.integrity())?;
        debug!(seq = frame.seq, command = frame.command, len = bytes.len(), "send frame");
        self.stream
            .write_all(&bytes)
            .map_err(|source| self.io_error(source))
    }

    fn receive(&mut self) -> Result<Frame, BulbError> {
        let mut header = [0u8; HEADER_LEN];
        self.stream
            .read_exact(&mut header)
            .map_err(|source| self.io_error(source))?;
        let len = Frame::body_len(&header)?;

        let mut bytes = vec![0u8; HEADER_LEN + len];
        bytes[..HEADER_LEN].copy_from_slice(&header);
        self.stream
            .read_exact(&mut bytes[HEADER_LEN..])
            .map_err(|source| self.io_error(source))?;

        let frame = Frame::decode(&bytes, self.integrity())?;
        debug!(seq = frame.seq, command = frame.command, len = bytes.len(), "received frame");
        Ok(frame)
    }

    /// Decrypt a reply body to JSON. `None` for empty acknowledgements.
    fn open(&self, frame: &Frame) -> Result<Option<serde_json::Value>, BulbError> {
        let mut body = frame.body();
        if body.is_empty() {
            return Ok(None);
        }
        if body.starts_with(self.version.tag()) && body.len() > VERSION_HEADER_LEN {
            body = &body[VERSION_HEADER_LEN..];
        }
        let mut plain = self.cipher.decrypt(body)?;
        if plain.starts_with(self.version.tag()) && plain.len() > VERSION_HEADER_LEN {
            plain.drain(..VERSION_HEADER_LEN);
        }
        serde_json::from_slice(&plain)
            .map(Some)
            .map_err(|e| BulbError::Response(format!("reply is not JSON: {e}")))
    }

    /// Protocol 3.4 key exchange.
    ///
    /// Both sides contribute a 16 byte nonce, each proves knowledge of the
    /// local key with an HMAC over the other's nonce, and the session key is
    /// the local-key encryption of the XORed nonces.
    fn negotiate(
        &mut self,
        local_key: &[u8],
        next_seq: &mut dyn FnMut() -> u32,
    ) -> Result<(), BulbError> {
        self.hmac_key = Some(local_key.to_vec());
        let local_nonce: [u8; BLOCK] = rand::random();

        let start = Frame::new(
            next_seq(),
            command::SESS_KEY_NEG_START,
            self.cipher.encrypt(&local_nonce),
        );
        self.send(&start)?;

        let reply = self.receive()?;
        if reply.command != command::SESS_KEY_NEG_RESP {
            return Err(BulbError::Response(format!(
                "expected session key response, got command {:#x}",
                reply.command
            )));
        }
        let plain = self.cipher.decrypt(reply.body())?;
        if plain.len() < BLOCK + 32 {
            return Err(BulbError::Response(format!(
                "session key response too short: {} bytes",
                plain.len()
            )));
        }
        let mut remote_nonce = [0u8; BLOCK];
        remote_nonce.copy_from_slice(&plain[..BLOCK]);
        let proof = &plain[BLOCK..BLOCK + 32];
        if hmac_sha256(local_key, &local_nonce)?.as_slice() != proof {
            return Err(BulbError::Crypto(
                "device failed to prove the local key".into(),
            ));
        }

        let answer = hmac_sha256(local_key, &remote_nonce)?;
        let finish = Frame::new(
            next_seq(),
            command::SESS_KEY_NEG_FINISH,
            self.cipher.encrypt(&answer),
        );
        self.send(&finish)?;

        let session_key = session_key(&self.cipher, &local_nonce, &remote_nonce);
        self.cipher = EcbCipher::new(&session_key)?;
        self.hmac_key = Some(session_key.to_vec());
        debug!("session key negotiated");
        Ok(())
    }
}

/// Derive the 3.4 session key from both nonces.
pub fn session_key(
    local_cipher: &EcbCipher,
    local_nonce: &[u8; BLOCK],
    remote_nonce: &[u8; BLOCK],
) -> [u8; BLOCK] {
    let mut mixed = [0u8; BLOCK];
    for (out, (a, b)) in mixed.iter_mut().zip(local_nonce.iter().zip(remote_nonce)) {
        *out = a ^ b;
    }
    local_cipher.encrypt_block(mixed)
}

/// An IP literal, with or without a port. IPv6 addresses without a port may
/// be bracketed or bare; both get the default port.
fn literal_socket_addr(address: &str) -> Option<SocketAddr> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Some(addr);
    }
    let ip = address
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(address);
    ip.parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, DEFAULT_PORT))
}

/// Pull the `dps` object to the top level (3.4 nests it under `data`).
fn normalize_status(mut reply: serde_json::Value) -> Option<serde_json::Value> {
    if reply.get("dps").is_some() {
        return Some(reply);
    }
    let dps = reply.get_mut("data")?.get_mut("dps")?.take();
    let mut out = serde_json::Map::new();
    if let Some(id) = reply.get("devId") {
        out.insert("devId".into(), id.clone());
    }
    out.insert("dps".into(), dps);
    Some(serde_json::Value::Object(out))
}
