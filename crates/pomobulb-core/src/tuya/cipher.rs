use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::BulbError;

pub const BLOCK: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// AES-128 in ECB mode with PKCS#7 padding, as used by Tuya devices.
#[derive(Clone)]
pub struct EcbCipher {
    aes: Aes128,
}

impl EcbCipher {
    pub fn new(key: &[u8]) -> Result<Self, BulbError> {
        let aes = Aes128::new_from_slice(key).map_err(|_| {
            BulbError::Crypto(format!("AES key must be {BLOCK} bytes, got {}", key.len()))
        })?;
        Ok(Self { aes })
    }

    pub fn encrypt(&self, plain: &[u8]) -> Vec<u8> {
        let pad = BLOCK - plain.len() % BLOCK;
        let mut data = Vec::with_capacity(plain.len() + pad);
        data.extend_from_slice(plain);
        data.resize(plain.len() + pad, pad as u8);
        for chunk in data.chunks_exact_mut(BLOCK) {
            self.aes.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        data
    }

    /// Encrypt exactly one block without padding.
    pub fn encrypt_block(&self, block: [u8; BLOCK]) -> [u8; BLOCK] {
        let mut out = GenericArray::from(block);
        self.aes.encrypt_block(&mut out);
        out.into()
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, BulbError> {
        if data.is_empty() || data.len() % BLOCK != 0 {
            return Err(BulbError::Crypto(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK}",
                data.len()
            )));
        }
        let mut plain = data.to_vec();
        for chunk in plain.chunks_exact_mut(BLOCK) {
            self.aes.decrypt_block(GenericArray::from_mut_slice(chunk));
        }
        let pad = usize::from(plain[plain.len() - 1]);
        let valid = (1..=BLOCK).contains(&pad)
            && plain[plain.len() - pad..].iter().all(|&b| usize::from(b) == pad);
        if !valid {
            return Err(BulbError::Crypto("bad PKCS#7 padding".into()));
        }
        plain.truncate(plain.len() - pad);
        Ok(plain)
    }
}

impl std::fmt::Debug for EcbCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EcbCipher")
    }
}

pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32], BulbError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| BulbError::Crypto(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), BulbError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| BulbError::Crypto(e.to_string()))?;
    mac.update(data);
    mac.verify_slice(tag)
        .map_err(|_| BulbError::Crypto(format!("HMAC mismatch for tag {}", hex::encode(tag))))
}
