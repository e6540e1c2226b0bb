//! SCRAM-SHA-256 client (RFC 5802 / RFC 7677) used by the V1_0 handshake.

use super::ReqlError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const NONCE_BYTES: usize = 18;
/// GS2 header "n,," base64-encoded.
const CHANNEL_BINDING: &str = "biws";

pub struct ScramClient {
    password: String,
    client_nonce: String,
    client_first_bare: String,
}

/// Second client step: the final message and the signature the server
/// must echo back.
pub struct ScramFinal {
    client_final: String,
    server_signature: Vec<u8>,
}

impl ScramClient {
    pub fn new(username: &str, password: &str) -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::with_nonce(username, password, &STANDARD.encode(bytes))
    }

    pub fn with_nonce(username: &str, password: &str, nonce: &str) -> Self {
        Self {
            password: password.to_string(),
            client_nonce: nonce.to_string(),
            client_first_bare: format!("n={},r={}", escape_username(username), nonce),
        }
    }

    pub fn client_first(&self) -> String {
        format!("n,,{}", self.client_first_bare)
    }

    pub fn handle_server_first(&self, server_first: &str) -> Result<ScramFinal, ReqlError> {
        let nonce = attribute(server_first, 'r')?;
        let salt = attribute(server_first, 's')?;
        let iterations = attribute(server_first, 'i')?;

        if !nonce.starts_with(&self.client_nonce) {
            return Err(ReqlError::Auth("server nonce does not extend client nonce".into()));
        }
        let salt = STANDARD
            .decode(salt)
            .map_err(|e| ReqlError::Auth(format!("invalid salt: {e}")))?;
        let iterations: u32 = iterations
            .parse()
            .map_err(|_| ReqlError::Auth(format!("invalid iteration count '{iterations}'")))?;

        let mut salted_password = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            self.password.as_bytes(),
            &salt,
            iterations,
            &mut salted_password,
        );

        let client_key = hmac(&salted_password, b"Client Key")?;
        let stored_key = Sha256::digest(&client_key);
        let without_proof = format!("c={CHANNEL_BINDING},r={nonce}");
        let auth_message = format!(
            "{},{},{}",
            self.client_first_bare, server_first, without_proof
        );

        let client_signature = hmac(&stored_key, auth_message.as_bytes())?;
        let proof: Vec<u8> = client_key
            .iter()
            .zip(client_signature.iter())
            .map(|(k, s)| k ^ s)
            .collect();

        let server_key = hmac(&salted_password, b"Server Key")?;
        let server_signature = hmac(&server_key, auth_message.as_bytes())?;

        Ok(ScramFinal {
            client_final: format!("{},p={}", without_proof, STANDARD.encode(proof)),
            server_signature,
        })
    }
}

impl ScramFinal {
    pub fn client_final(&self) -> &str {
        &self.client_final
    }

    pub fn verify(&self, server_final: &str) -> Result<(), ReqlError> {
        if let Ok(error) = attribute(server_final, 'e') {
            return Err(ReqlError::Auth(error.to_string()));
        }
        let signature = attribute(server_final, 'v')?;
        let signature = STANDARD
            .decode(signature)
            .map_err(|e| ReqlError::Auth(format!("invalid server signature: {e}")))?;
        if signature != self.server_signature {
            return Err(ReqlError::Auth("server signature mismatch".into()));
        }
        Ok(())
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ReqlError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| ReqlError::Auth(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn attribute(message: &str, name: char) -> Result<&str, ReqlError> {
    message
        .split(',')
        .find_map(|part| {
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), Some('=')) if c == name => Some(&part[2..]),
                _ => None,
            }
        })
        .ok_or_else(|| ReqlError::Auth(format!("missing '{name}' in SCRAM message")))
}

fn escape_username(username: &str) -> String {
    username.replace('=', "=3D").replace(',', "=2C")
}
