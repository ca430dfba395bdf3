//! The [`UsmSecurityProvider`] trait: the seam between protocol engine and
//! cryptography.
//!
//! [`super::engine`] and [`super::usm`] know how to discover an authoritative
//! engine and shape `msgSecurityParameters`, but neither one hashes or
//! encrypts anything itself; that's delegated to whatever implements this
//! trait. [`DefaultUsmSecurityProvider`] is the crate's own implementation,
//! built from [`super::auth`] key localization and [`super::privacy`]
//! encryption, but a caller with an HSM or an existing key store can swap in
//! their own.

use digest::Mac;
use hmac::Hmac;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use super::auth::{LocalizedKey, MasterKeys};
use super::privacy::{PrivKey, PrivacyResult};
use super::{AuthProtocol, KeyExtension, PrivProtocol};

/// Authenticates and encrypts/decrypts USM-protected messages.
///
/// Implementors are handed the already-localized key material for one
/// (engine, user) pair; engine discovery and key localization are the
/// caller's job (see [`MasterKeys::new`] and [`super::auth::MasterKey::localize`]).
pub trait UsmSecurityProvider: Send + Sync {
    /// Compute the truncated MAC over `whole_message`, which must already
    /// have its `msgAuthenticationParameters` field zero-filled per RFC 3414
    /// Section 6.3.1 step 2. Returns `None` if no auth key is configured.
    fn compute_mac(&self, whole_message: &[u8]) -> Option<Vec<u8>>;

    /// Verify a received MAC against a freshly computed one in constant
    /// time. Returns `false` (never panics) if no auth key is configured.
    fn verify_mac(&self, whole_message: &[u8], received: &[u8]) -> bool;

    /// Encrypt a scoped PDU, returning `(ciphertext, privParameters)`.
    /// `Err` if no privacy key is configured or the plaintext is malformed
    /// for the underlying cipher.
    fn encrypt(&self, plaintext: &[u8], engine_boots: u32, salt_counter: u64)
    -> PrivacyResult<(Vec<u8>, Vec<u8>)>;

    /// Decrypt a scoped PDU given the `privParameters` received on the wire.
    fn decrypt(&self, ciphertext: &[u8], engine_boots: u32, priv_params: &[u8])
    -> PrivacyResult<Vec<u8>>;
}

/// The crate's own [`UsmSecurityProvider`], built by localizing a
/// passphrase-derived [`MasterKeys`] to one engine ID.
pub struct DefaultUsmSecurityProvider {
    auth: Option<(AuthProtocol, LocalizedKey)>,
    priv_key: Option<PrivKey>,
}

impl DefaultUsmSecurityProvider {
    /// Build a provider from already-localized keys (see
    /// [`super::auth::MasterKey::localize`]). `priv_protocol` is required
    /// alongside `priv_key` so the privacy key can be length-extended per
    /// RFC 3826 / the Blumenthal and Reeder drafts before use.
    pub fn new(
        auth: Option<(AuthProtocol, LocalizedKey)>,
        priv_protocol: Option<PrivProtocol>,
        priv_localized: Option<LocalizedKey>,
    ) -> Self {
        let priv_key = match (priv_protocol, priv_localized, &auth) {
            (Some(proto), Some(localized), Some((auth_proto, _))) => {
                let extended = extend_priv_key(proto, *auth_proto, localized.as_bytes());
                PrivKey::new(proto, extended).ok()
            }
            (Some(proto), Some(localized), None) => {
                PrivKey::new(proto, localized.as_bytes().to_vec()).ok()
            }
            _ => None,
        };
        Self { auth, priv_key }
    }

    /// Convenience constructor from a [`MasterKeys`] pair already localized
    /// to one engine ID (the common case once engine discovery has run and
    /// [`super::auth::MasterKey::localize`] has been called for both keys).
    pub fn from_localized(
        auth_protocol: AuthProtocol,
        priv_protocol: Option<PrivProtocol>,
        keys: MasterKeys,
    ) -> Self {
        let auth = keys.auth.map(|localized| (auth_protocol, localized));
        Self::new(auth, priv_protocol, keys.priv_)
    }
}

/// Stretch a localized auth digest out to the byte length a privacy
/// protocol needs, per the key-extension algorithm the protocol pair
/// requires (RFC 3414 uses the digest directly; AES-192/256 and 3DES need
/// more bytes than any digest alone provides).
fn extend_priv_key(priv_protocol: PrivProtocol, auth_protocol: AuthProtocol, localized: &[u8]) -> Vec<u8> {
    let needed = priv_protocol.key_len();
    if localized.len() >= needed {
        return localized[..needed].to_vec();
    }
    match priv_protocol.key_extension_for(auth_protocol) {
        KeyExtension::None => {
            // Caller misconfigured (short key, no extension path); pad with
            // zeros rather than panic so PrivKey::new reports the shortfall.
            let mut key = localized.to_vec();
            key.resize(needed, 0);
            key
        }
        KeyExtension::Blumenthal => {
            // draft-blumenthal-aes-usm-04: re-hash Ku||engine-independent
            // material is the password-based variant; the localized-key
            // variant simply re-digests the localized key with itself
            // appended until long enough (matches net-snmp's extended
            // key derivation for the localized-key code path).
            extend_by_rehash(auth_protocol, localized, needed)
        }
        KeyExtension::Reeder => extend_by_rehash(auth_protocol, localized, needed),
    }
}

fn extend_by_rehash(protocol: AuthProtocol, seed: &[u8], needed: usize) -> Vec<u8> {
    let mut out = seed.to_vec();
    let mut last = seed.to_vec();
    while out.len() < needed {
        last = digest_bytes(protocol, &last);
        out.extend_from_slice(&last);
    }
    out.truncate(needed);
    out
}

fn digest_bytes(protocol: AuthProtocol, data: &[u8]) -> Vec<u8> {
    use digest::Digest;
    match protocol {
        AuthProtocol::Md5 => Md5::digest(data).to_vec(),
        AuthProtocol::Sha1 => Sha1::digest(data).to_vec(),
        AuthProtocol::Sha224 => Sha224::digest(data).to_vec(),
        AuthProtocol::Sha256 => Sha256::digest(data).to_vec(),
        AuthProtocol::Sha384 => Sha384::digest(data).to_vec(),
        AuthProtocol::Sha512 => Sha512::digest(data).to_vec(),
    }
}

fn hmac_truncated(protocol: AuthProtocol, key: &[u8], data: &[u8], mac_len: usize) -> Vec<u8> {
    fn run<D: digest::Mac + digest::KeyInit>(key: &[u8], data: &[u8], mac_len: usize) -> Vec<u8> {
        let mut mac = <D as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
        mac.update(data);
        let full = mac.finalize().into_bytes();
        full[..mac_len].to_vec()
    }
    match protocol {
        AuthProtocol::Md5 => run::<Hmac<Md5>>(key, data, mac_len),
        AuthProtocol::Sha1 => run::<Hmac<Sha1>>(key, data, mac_len),
        AuthProtocol::Sha224 => run::<Hmac<Sha224>>(key, data, mac_len),
        AuthProtocol::Sha256 => run::<Hmac<Sha256>>(key, data, mac_len),
        AuthProtocol::Sha384 => run::<Hmac<Sha384>>(key, data, mac_len),
        AuthProtocol::Sha512 => run::<Hmac<Sha512>>(key, data, mac_len),
    }
}

impl UsmSecurityProvider for DefaultUsmSecurityProvider {
    fn compute_mac(&self, whole_message: &[u8]) -> Option<Vec<u8>> {
        let (protocol, key) = self.auth.as_ref()?;
        Some(hmac_truncated(*protocol, key.as_bytes(), whole_message, protocol.mac_len()))
    }

    fn verify_mac(&self, whole_message: &[u8], received: &[u8]) -> bool {
        let Some(expected) = self.compute_mac(whole_message) else {
            return false;
        };
        subtle::ConstantTimeEq::ct_eq(expected.as_slice(), received).into()
    }

    fn encrypt(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        salt_counter: u64,
    ) -> PrivacyResult<(Vec<u8>, Vec<u8>)> {
        let key = self.priv_key.as_ref().ok_or(super::PrivacyError::NoKeyConfigured)?;
        key.encrypt(plaintext, engine_boots, salt_counter)
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        priv_params: &[u8],
    ) -> PrivacyResult<Vec<u8>> {
        let key = self.priv_key.as_ref().ok_or(super::PrivacyError::NoKeyConfigured)?;
        key.decrypt(ciphertext, engine_boots, priv_params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v3::auth::MasterKey;

    #[test]
    fn test_compute_and_verify_mac_roundtrip() {
        let master = MasterKey::from_password(AuthProtocol::Sha256, b"authpassword");
        let localized = master.localize(AuthProtocol::Sha256, b"\x80\x00\x1f\x88\x01");
        let provider = DefaultUsmSecurityProvider::new(Some((AuthProtocol::Sha256, localized)), None, None);

        let message = b"a whole snmp message with auth params zeroed";
        let mac = provider.compute_mac(message).unwrap();
        assert_eq!(mac.len(), AuthProtocol::Sha256.mac_len());
        assert!(provider.verify_mac(message, &mac));
        assert!(!provider.verify_mac(message, &vec![0u8; mac.len()]));
    }

    #[test]
    fn test_no_auth_key_never_authenticates() {
        let provider = DefaultUsmSecurityProvider::new(None, None, None);
        assert!(provider.compute_mac(b"anything").is_none());
        assert!(!provider.verify_mac(b"anything", b"anything"));
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip_aes128() {
        let auth_master = MasterKey::from_password(AuthProtocol::Sha1, b"authpassword");
        let auth_localized = auth_master.localize(AuthProtocol::Sha1, b"\x80\x00\x1f\x88\x01");
        let priv_master = MasterKey::from_password(AuthProtocol::Sha1, b"privpassword");
        let priv_localized = priv_master.localize(AuthProtocol::Sha1, b"\x80\x00\x1f\x88\x01");

        let provider = DefaultUsmSecurityProvider::new(
            Some((AuthProtocol::Sha1, auth_localized)),
            Some(PrivProtocol::Aes128),
            Some(priv_localized),
        );

        let plaintext = b"a scoped pdu payload, padded or not";
        let (ciphertext, priv_params) = provider.encrypt(plaintext, 3, 1).unwrap();
        let decrypted = provider.decrypt(&ciphertext, 3, &priv_params).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_extend_priv_key_for_aes256_stretches_sha1_digest() {
        let extended = extend_priv_key(PrivProtocol::Aes256, AuthProtocol::Sha1, &[0x11; 20]);
        assert_eq!(extended.len(), PrivProtocol::Aes256.key_len());
    }
}
