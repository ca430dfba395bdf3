//! USM privacy (RFC 3414 Section 8 DES-CBC, RFC 3826 AES-CFB).
//!
//! [`PrivKey`] wraps an already key-extended localized key and knows how to
//! turn a plaintext scoped PDU into ciphertext + salt, and back. Key
//! extension (stretching a short auth digest to the longer key an AES-192/
//! 256 or 3DES cipher needs) happens one layer up in [`super::usm`], which
//! knows both protocols involved; this module only consumes the final key.

use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut};
use des::Des;
use std::sync::atomic::{AtomicU32, Ordering};
use zeroize::ZeroizeOnDrop;

use super::PrivProtocol;

type Aes128Cfb = cfb_mode::Encryptor<aes::Aes128>;
type Aes128CfbDec = cfb_mode::Decryptor<aes::Aes128>;
type Aes192Cfb = cfb_mode::Encryptor<aes::Aes192>;
type Aes192CfbDec = cfb_mode::Decryptor<aes::Aes192>;
type Aes256Cfb = cfb_mode::Encryptor<aes::Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<aes::Aes256>;
type DesCbcEnc = cbc::Encryptor<Des>;
type DesCbcDec = cbc::Decryptor<Des>;

/// Errors from encrypting/decrypting a scoped PDU.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PrivacyError {
    #[error("privacy key too short: need {needed} bytes, have {actual}")]
    KeyTooShort { needed: usize, actual: usize },
    #[error("ciphertext length {0} is not a multiple of the block size")]
    UnalignedCiphertext(usize),
    #[error("privacy parameters field has wrong length: expected {expected}, got {actual}")]
    BadParamsLength { expected: usize, actual: usize },
    #[error("no privacy key configured for this security provider")]
    NoKeyConfigured,
}

pub type PrivacyResult<T> = std::result::Result<T, PrivacyError>;

/// An engine-localized, protocol-specific privacy key ready to encrypt or
/// decrypt. Zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct PrivKey {
    #[zeroize(skip)]
    protocol: PrivProtocol,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivKey")
            .field("protocol", &self.protocol)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl PrivKey {
    /// Wrap an already-extended key. `bytes` must be at least
    /// `protocol.key_len()` long.
    pub fn new(protocol: PrivProtocol, bytes: Vec<u8>) -> PrivacyResult<Self> {
        if bytes.len() < protocol.key_len() {
            return Err(PrivacyError::KeyTooShort {
                needed: protocol.key_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self { protocol, bytes })
    }

    /// Encrypt `plaintext`, returning `(ciphertext, privParameters)`.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        salt_counter: u64,
    ) -> PrivacyResult<(Vec<u8>, Vec<u8>)> {
        match self.protocol {
            PrivProtocol::Des => self.encrypt_des(plaintext, salt_counter as u32),
            PrivProtocol::Des3 => self.encrypt_des(plaintext, salt_counter as u32),
            PrivProtocol::Aes128 | PrivProtocol::Aes192 | PrivProtocol::Aes256 => {
                self.encrypt_aes(plaintext, engine_boots, salt_counter)
            }
        }
    }

    /// Decrypt `ciphertext` given the `privParameters` received on the wire.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        priv_params: &[u8],
    ) -> PrivacyResult<Vec<u8>> {
        match self.protocol {
            PrivProtocol::Des | PrivProtocol::Des3 => self.decrypt_des(ciphertext, priv_params),
            PrivProtocol::Aes128 | PrivProtocol::Aes192 | PrivProtocol::Aes256 => {
                self.decrypt_aes(ciphertext, engine_boots, priv_params)
            }
        }
    }

    fn des_key_iv(&self) -> (&[u8], [u8; 8]) {
        let key = &self.bytes[..8];
        let pre_iv = &self.bytes[8..16];
        (key, pre_iv.try_into().unwrap())
    }

    fn encrypt_des(&self, plaintext: &[u8], salt: u32) -> PrivacyResult<(Vec<u8>, Vec<u8>)> {
        let (key, pre_iv) = self.des_key_iv();
        let mut salt_bytes = [0u8; 8];
        salt_bytes[..4].copy_from_slice(&0u32.to_be_bytes());
        salt_bytes[4..].copy_from_slice(&salt.to_be_bytes());
        let mut iv = [0u8; 8];
        for i in 0..8 {
            iv[i] = pre_iv[i] ^ salt_bytes[i];
        }
        let padded_len = plaintext.len().div_ceil(8) * 8;
        let mut buf = vec![0u8; padded_len];
        buf[..plaintext.len()].copy_from_slice(plaintext);
        let enc = DesCbcEnc::new(key.into(), &iv.into());
        enc.encrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf, padded_len)
            .map_err(|_| PrivacyError::UnalignedCiphertext(plaintext.len()))?;
        Ok((buf, salt_bytes.to_vec()))
    }

    fn decrypt_des(&self, ciphertext: &[u8], priv_params: &[u8]) -> PrivacyResult<Vec<u8>> {
        if priv_params.len() != 8 {
            return Err(PrivacyError::BadParamsLength {
                expected: 8,
                actual: priv_params.len(),
            });
        }
        if ciphertext.len() % 8 != 0 {
            return Err(PrivacyError::UnalignedCiphertext(ciphertext.len()));
        }
        let (key, pre_iv) = self.des_key_iv();
        let mut iv = [0u8; 8];
        for i in 0..8 {
            iv[i] = pre_iv[i] ^ priv_params[i];
        }
        let mut buf = ciphertext.to_vec();
        let dec = DesCbcDec::new(key.into(), &iv.into());
        let len = buf.len();
        dec.decrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf[..len])
            .map_err(|_| PrivacyError::UnalignedCiphertext(ciphertext.len()))?;
        Ok(buf)
    }

    fn aes_iv(&self, engine_boots: u32, engine_time: u32, salt: u64) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[..4].copy_from_slice(&engine_boots.to_be_bytes());
        iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
        iv[8..].copy_from_slice(&salt.to_be_bytes());
        iv
    }

    fn encrypt_aes(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        salt: u64,
    ) -> PrivacyResult<(Vec<u8>, Vec<u8>)> {
        let iv = self.aes_iv(engine_boots, 0, salt);
        let mut buf = plaintext.to_vec();
        match self.protocol {
            PrivProtocol::Aes128 => {
                Aes128Cfb::new(self.bytes[..16].into(), &iv.into()).encrypt(&mut buf)
            }
            PrivProtocol::Aes192 => {
                Aes192Cfb::new(self.bytes[..24].into(), &iv.into()).encrypt(&mut buf)
            }
            PrivProtocol::Aes256 => {
                Aes256Cfb::new(self.bytes[..32].into(), &iv.into()).encrypt(&mut buf)
            }
            _ => unreachable!(),
        }
        Ok((buf, salt.to_be_bytes().to_vec()))
    }

    fn decrypt_aes(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        priv_params: &[u8],
    ) -> PrivacyResult<Vec<u8>> {
        if priv_params.len() != 8 {
            return Err(PrivacyError::BadParamsLength {
                expected: 8,
                actual: priv_params.len(),
            });
        }
        let salt = u64::from_be_bytes(priv_params.try_into().unwrap());
        let iv = self.aes_iv(engine_boots, 0, salt);
        let mut buf = ciphertext.to_vec();
        match self.protocol {
            PrivProtocol::Aes128 => {
                Aes128CfbDec::new(self.bytes[..16].into(), &iv.into()).decrypt(&mut buf)
            }
            PrivProtocol::Aes192 => {
                Aes192CfbDec::new(self.bytes[..24].into(), &iv.into()).decrypt(&mut buf)
            }
            PrivProtocol::Aes256 => {
                Aes256CfbDec::new(self.bytes[..32].into(), &iv.into()).decrypt(&mut buf)
            }
            _ => unreachable!(),
        }
        Ok(buf)
    }
}

/// Monotonic per-session counter used to build privacy salts (RFC 3414
/// Section 8.1.1.1: a `(bootCount, localCounter)` or, for AES, a plain
/// 64-bit counter, neither of which may repeat within an engine boot).
#[derive(Debug)]
pub struct SaltCounter {
    counter: AtomicU32,
}

impl SaltCounter {
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Returns the next salt value; wraps per RFC 3414 (the peer must treat
    /// a repeated salt within the same engine boot as a replay).
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) as u64
    }
}

impl Default for SaltCounter {
    fn default() -> Self {
        Self::new()
    }
}
