// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use base64::{engine::general_purpose, Engine as _};
use ring::aead::{Aad, BoundKey, Nonce, NonceSequence, OpeningKey, SealingKey, AES_256_GCM};
use ring::pbkdf2::{self, derive};
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::modules::error::code::ErrorCode;
use crate::modules::error::GraphMailerResult;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;

const PBKDF2_ROUNDS: u32 = 100_000;

struct SingleNonceSequence([u8; 12]);

impl NonceSequence for SingleNonceSequence {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        Ok(Nonce::assume_unique_for_key(self.0))
    }
}

pub fn encrypt_string(plaintext: &str) -> GraphMailerResult<String> {
    internal_encrypt_string(&SETTINGS.graphmailer_encrypt_password, plaintext)
        .map_err(|_| raise_error!("Failed to encrypt string.".into(), ErrorCode::InternalError))
}

pub fn decrypt_string(data: &str) -> GraphMailerResult<String> {
    internal_decrypt_string(&SETTINGS.graphmailer_encrypt_password, data).map_err(|_| {
        raise_error!(
            "Decryption failed, likely due to incorrect encryption key or corrupted data".into(),
            ErrorCode::InternalError
        )
    })
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PBKDF2_ROUNDS).unwrap(),
        salt,
        password.as_bytes(),
        &mut key,
    );
    key
}

fn internal_encrypt_string(
    password: &str,
    plaintext: &str,
) -> Result<String, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; 32];
    rng.fill(&mut salt)?;
    let mut nonce_bytes = [0u8; 12];
    rng.fill(&mut nonce_bytes)?;

    let key = derive_key(password, &salt);
    let unbound_key = ring::aead::UnboundKey::new(&AES_256_GCM, &key)?;
    let mut sealing_key = SealingKey::new(unbound_key, SingleNonceSequence(nonce_bytes));
    let mut in_out = plaintext.as_bytes().to_vec();
    sealing_key.seal_in_place_append_tag(Aad::empty(), &mut in_out)?;

    // salt || nonce || ciphertext+tag
    let mut result = Vec::with_capacity(32 + 12 + in_out.len());
    result.extend_from_slice(&salt);
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&in_out);
    Ok(general_purpose::URL_SAFE.encode(&result))
}

fn internal_decrypt_string(password: &str, data: &str) -> Result<String, ring::error::Unspecified> {
    let data = general_purpose::URL_SAFE
        .decode(data)
        .map_err(|_| ring::error::Unspecified)?;
    if data.len() < 32 + 12 {
        return Err(ring::error::Unspecified);
    }
    let salt = &data[0..32];
    let nonce_bytes: [u8; 12] = data[32..44]
        .try_into()
        .map_err(|_| ring::error::Unspecified)?;
    let ciphertext = &data[44..];

    let key = derive_key(password, salt);
    let unbound_key = ring::aead::UnboundKey::new(&AES_256_GCM, &key)?;
    let mut opening_key = OpeningKey::new(unbound_key, SingleNonceSequence(nonce_bytes));
    let mut in_out = ciphertext.to_vec();
    let decrypted_bytes = opening_key.open_in_place(Aad::empty(), &mut in_out)?;
    String::from_utf8(decrypted_bytes.to_vec()).map_err(|_| ring::error::Unspecified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let password = "a-test-password-that-is-long-enough";
        let plaintext = "client-secret-value";
        let encrypted = internal_encrypt_string(password, plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        let decrypted = internal_decrypt_string(password, &encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypt_rejects_wrong_password() {
        let encrypted = internal_encrypt_string("password-one-for-encrypting", "data").unwrap();
        assert!(internal_decrypt_string("password-two-for-decrypting", &encrypted).is_err());
    }

    #[test]
    fn decrypt_rejects_truncated_input() {
        assert!(internal_decrypt_string("any-password", "c2hvcnQ=").is_err());
    }
}
