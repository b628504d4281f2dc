//! AES-CFB stream decryption for depot segments
//!
//! Depot content is encrypted with AES in full-block (128-bit segment) CFB
//! mode using a fixed all-zero initialization vector. This is not a general
//! purpose encryption scheme; it exists to be bit-compatible with the
//! producing format.
//!
//! The key length selects the AES variant:
//! - 16 bytes: AES-128
//! - 24 bytes: AES-192
//! - 32 bytes: AES-256

use std::io::{self, Read};

use aes::{Aes128, Aes192, Aes256};
use cfb_mode::{BufDecryptor, BufEncryptor};
use cipher::KeyIvInit;

use crate::error::CryptoError;

/// Initialization vector used for every depot segment
pub const DEPOT_IV: [u8; 16] = [0u8; 16];

/// Keyed CFB decryptor for any supported AES key size
enum CfbDecryptor {
    Aes128(BufDecryptor<Aes128>),
    Aes192(BufDecryptor<Aes192>),
    Aes256(BufDecryptor<Aes256>),
}

impl CfbDecryptor {
    fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::UnsupportedKeySize(key.len());
        match key.len() {
            16 => BufDecryptor::new_from_slices(key, &DEPOT_IV)
                .map(Self::Aes128)
                .map_err(invalid),
            24 => BufDecryptor::new_from_slices(key, &DEPOT_IV)
                .map(Self::Aes192)
                .map_err(invalid),
            32 => BufDecryptor::new_from_slices(key, &DEPOT_IV)
                .map(Self::Aes256)
                .map_err(invalid),
            other => Err(CryptoError::UnsupportedKeySize(other)),
        }
    }

    fn decrypt(&mut self, data: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.decrypt(data),
            Self::Aes192(c) => c.decrypt(data),
            Self::Aes256(c) => c.decrypt(data),
        }
    }
}

impl std::fmt::Debug for CfbDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Self::Aes128(_) => "Aes128",
            Self::Aes192(_) => "Aes192",
            Self::Aes256(_) => "Aes256",
        };
        f.debug_tuple("CfbDecryptor").field(&variant).finish()
    }
}

/// Reader adapter that decrypts everything read from the inner reader
///
/// The cipher state carries across calls, so the stream can be consumed in
/// arbitrarily sized reads.
#[derive(Debug)]
pub struct AesCfbReader<R> {
    inner: R,
    cipher: CfbDecryptor,
}

impl<R: Read> AesCfbReader<R> {
    /// Wrap `inner` with a decryptor keyed by `key` and the zero IV
    pub fn new(inner: R, key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            inner,
            cipher: CfbDecryptor::new(key)?,
        })
    }

    /// Unwrap the inner reader, discarding the cipher state
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for AesCfbReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.cipher.decrypt(&mut buf[..n]);
        Ok(n)
    }
}

/// Decrypt a complete buffer in place
pub fn decrypt_in_place(key: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    CfbDecryptor::new(key)?.decrypt(data);
    Ok(())
}

/// Encrypt a complete buffer in place
pub fn encrypt_in_place(key: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    let invalid = |_| CryptoError::UnsupportedKeySize(key.len());
    match key.len() {
        16 => BufEncryptor::<Aes128>::new_from_slices(key, &DEPOT_IV)
            .map_err(invalid)?
            .encrypt(data),
        24 => BufEncryptor::<Aes192>::new_from_slices(key, &DEPOT_IV)
            .map_err(invalid)?
            .encrypt(data),
        32 => BufEncryptor::<Aes256>::new_from_slices(key, &DEPOT_IV)
            .map_err(invalid)?
            .encrypt(data),
        other => return Err(CryptoError::UnsupportedKeySize(other)),
    }
    Ok(())
}
