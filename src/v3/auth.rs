//! USM key derivation (RFC 3414 Section 2.6 / RFC 7860 Appendix A).
//!
//! Two steps turn an operator-supplied passphrase into the key actually used
//! on the wire: the *master key* `Ku` is the password stretched to one
//! megabyte and hashed, then *localized* to a specific engine ID to produce
//! `Kul`. Only the localized key is ever used to compute or verify a MAC or
//! derive a privacy key; the master key exists purely as an intermediate.

use digest::Digest;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::AuthProtocol;

const PASSWORD_BUF_LEN: usize = 1_048_576;

/// A master key `Ku`, derived from a passphrase but not yet bound to an
/// engine ID. Zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Derive `Ku` from a passphrase per RFC 3414 Appendix A.2: the password
    /// is repeated to fill a 1MB buffer, which is then digested.
    pub fn from_password(protocol: AuthProtocol, password: &[u8]) -> Self {
        if password.is_empty() {
            return Self {
                bytes: vec![0u8; protocol.digest_len()],
            };
        }
        let mut digest = digest_password(protocol, password);
        digest.truncate(protocol.digest_len());
        Self { bytes: digest }
    }

    /// Wrap an already-derived key (e.g. read from a config file as hex).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bind this master key to an engine ID, producing the key that is
    /// actually used for MAC/privacy-key computation (RFC 3414 Section
    /// 2.6.1): `Kul = H(Ku || engineID || Ku)`.
    pub fn localize(&self, protocol: AuthProtocol, engine_id: &[u8]) -> LocalizedKey {
        let mut buf = Vec::with_capacity(self.bytes.len() * 2 + engine_id.len());
        buf.extend_from_slice(&self.bytes);
        buf.extend_from_slice(engine_id);
        buf.extend_from_slice(&self.bytes);
        let mut digest = digest_bytes(protocol, &buf);
        buf.zeroize();
        digest.truncate(protocol.digest_len());
        LocalizedKey { bytes: digest }
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey").field("bytes", &"<redacted>").finish()
    }
}

/// An engine-localized key `Kul`, ready for HMAC/privacy use. Zeroized on
/// drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct LocalizedKey {
    bytes: Vec<u8>,
}

impl LocalizedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for LocalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizedKey").field("bytes", &"<redacted>").finish()
    }
}

/// The pair of localized keys (auth, priv) a USM user needs once both
/// protocols and an engine ID are known.
#[derive(Clone, Debug)]
pub struct MasterKeys {
    pub auth: Option<LocalizedKey>,
    pub priv_: Option<LocalizedKey>,
}

impl MasterKeys {
    pub fn new(auth: Option<LocalizedKey>, priv_: Option<LocalizedKey>) -> Self {
        Self { auth, priv_ }
    }
}

fn digest_password(protocol: AuthProtocol, password: &[u8]) -> Vec<u8> {
    // Repeat the password to fill a 1MB buffer (RFC 3414 Appendix A.2),
    // digesting in a single streaming pass rather than materializing it.
    fn stream<D: Digest>(password: &[u8]) -> Vec<u8> {
        let mut hasher = D::new();
        let mut produced = 0usize;
        let mut cursor = 0usize;
        while produced < PASSWORD_BUF_LEN {
            let chunk_len = 64.min(PASSWORD_BUF_LEN - produced);
            let mut chunk = Vec::with_capacity(chunk_len);
            while chunk.len() < chunk_len {
                chunk.push(password[cursor % password.len()]);
                cursor += 1;
            }
            hasher.update(&chunk);
            produced += chunk_len;
        }
        hasher.finalize().to_vec()
    }
    match protocol {
        AuthProtocol::Md5 => stream::<Md5>(password),
        AuthProtocol::Sha1 => stream::<Sha1>(password),
        AuthProtocol::Sha224 => stream::<Sha224>(password),
        AuthProtocol::Sha256 => stream::<Sha256>(password),
        AuthProtocol::Sha384 => stream::<Sha384>(password),
        AuthProtocol::Sha512 => stream::<Sha512>(password),
    }
}

fn digest_bytes(protocol: AuthProtocol, data: &[u8]) -> Vec<u8> {
    match protocol {
        AuthProtocol::Md5 => Md5::digest(data).to_vec(),
        AuthProtocol::Sha1 => Sha1::digest(data).to_vec(),
        AuthProtocol::Sha224 => Sha224::digest(data).to_vec(),
        AuthProtocol::Sha256 => Sha256::digest(data).to_vec(),
        AuthProtocol::Sha384 => Sha384::digest(data).to_vec(),
        AuthProtocol::Sha512 => Sha512::digest(data).to_vec(),
    }
}
