use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// One opaque unit of broadcast data.
///
/// The bus never inspects a message's contents; it only moves bytes from the
/// ingestion side to every registered subscriber. Backed by [`Bytes`], so
/// cloning during fan-out is a reference-count bump, not a copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message(Bytes);

impl Message {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The message bytes followed by a single `\n`, ready to write to a
    /// streaming response.
    pub fn to_line(&self) -> Bytes {
        let mut line = BytesMut::with_capacity(self.0.len() + 1);
        line.put_slice(&self.0);
        line.put_u8(b'\n');
        line.freeze()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<Bytes> for Message {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self(Bytes::from(text))
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self(Bytes::copy_from_slice(text.as_bytes()))
    }
}
