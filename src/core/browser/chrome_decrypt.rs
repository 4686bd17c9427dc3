// Chrome cookie value decryption
//
// Chromium encrypts cookie values at rest. The scheme differs per platform:
// - Windows: AES-256-GCM with a master key held DPAPI-wrapped in the
//   profile's Local State file (v10/v11 prefixes)
// - macOS: AES-128-CBC with a key derived from the keychain's
//   "<browser> Safe Storage" password (PBKDF2-SHA1, 1003 rounds)
// - Linux: AES-128-CBC with a key derived from the basic storage password
//   "peanuts" (PBKDF2-SHA1, 1 round)
// Chrome 127+ "v20" App-Bound values cannot be decrypted from outside the
// browser and are rejected with a clear error.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Context, Result};

#[cfg(not(windows))]
use once_cell::sync::OnceCell;

use super::chrome::ChromiumBrowser;

#[cfg(windows)]
use super::dpapi::decrypt_dpapi;

/// Encryption version prefixes used by Chromium.
const PREFIX_V10: &[u8] = b"v10";
const PREFIX_V11: &[u8] = b"v11";
const PREFIX_V20: &[u8] = b"v20"; // App-Bound Encryption
#[cfg(windows)]
const DPAPI_PREFIX: &[u8] = b"DPAPI";

/// Fixed PBKDF2 salt and CBC IV used by every Safe Storage backend.
const SAFE_STORAGE_SALT: &[u8] = b"saltysalt";
const SAFE_STORAGE_IV: [u8; 16] = [b' '; 16];

#[cfg(target_os = "macos")]
const SAFE_STORAGE_ITERATIONS: u32 = 1003;
#[cfg(all(unix, not(target_os = "macos")))]
const SAFE_STORAGE_ITERATIONS: u32 = 1;

/// Password of Chromium's basic (non-keyring) storage backend on Linux.
#[cfg(all(unix, not(target_os = "macos")))]
const BASIC_STORAGE_PASSWORD: &str = "peanuts";

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Decrypts cookie values for one browser profile.
///
/// Key material is acquired lazily so that a store holding only plaintext
/// values never touches DPAPI or the keychain.
pub struct ChromeDecryptor {
    /// AES-256 master key from Local State; None on stores predating
    /// key-wrapped encryption.
    #[cfg(windows)]
    aes_key: Option<Vec<u8>>,

    #[cfg(not(windows))]
    keys: Option<SafeStorageKeys>,
}

#[cfg(not(windows))]
struct SafeStorageKeys {
    browser: ChromiumBrowser,
    v10: OnceCell<[u8; 16]>,
    v11: OnceCell<[u8; 16]>,
}

impl ChromeDecryptor {
    /// Build the decryptor for a profile.
    ///
    /// On Windows this reads and unwraps the master key from the profile's
    /// Local State file up front; elsewhere construction is free and keys
    /// are derived on first use.
    pub fn for_profile(browser: ChromiumBrowser, user_data_dir: &std::path::Path) -> Result<Self> {
        #[cfg(windows)]
        {
            let local_state = user_data_dir.join("Local State");
            let aes_key = extract_master_key(&local_state, browser)?;
            Ok(ChromeDecryptor { aes_key })
        }
        #[cfg(not(windows))]
        {
            let _ = user_data_dir;
            Ok(ChromeDecryptor {
                keys: Some(SafeStorageKeys {
                    browser,
                    v10: OnceCell::new(),
                    v11: OnceCell::new(),
                }),
            })
        }
    }

    /// A decryptor with no key material.
    ///
    /// Handles plaintext legacy values only; any v10/v11 value fails with
    /// a clear error. Useful against databases whose values were written
    /// unencrypted (fixtures, exported snapshots).
    pub fn plaintext_only() -> Self {
        #[cfg(windows)]
        {
            ChromeDecryptor { aes_key: None }
        }
        #[cfg(not(windows))]
        {
            ChromeDecryptor { keys: None }
        }
    }

    /// Decrypt one `encrypted_value` column into the cookie's plaintext.
    #[cfg(windows)]
    pub fn decrypt(&self, encrypted_value: &[u8]) -> Result<String> {
        if encrypted_value.len() < 3 {
            return try_legacy_decrypt(encrypted_value);
        }

        let (prefix, payload) = encrypted_value.split_at(3);
        match prefix {
            p if p == PREFIX_V10 || p == PREFIX_V11 => {
                let aes_key = self.aes_key.as_ref().ok_or_else(|| {
                    anyhow!("value is encrypted but the decryptor was built without key material")
                })?;
                decrypt_aes_gcm(aes_key, payload)
            }
            p if p == PREFIX_V20 => Err(anyhow!(
                "App-Bound Encryption (Chrome 127+) is not supported; \
                 export the cookies from inside the browser instead"
            )),
            _ => try_legacy_decrypt(encrypted_value),
        }
    }

    /// Decrypt one `encrypted_value` column into the cookie's plaintext.
    #[cfg(not(windows))]
    pub fn decrypt(&self, encrypted_value: &[u8]) -> Result<String> {
        if encrypted_value.len() < 3 {
            return decode_plaintext(encrypted_value);
        }

        let (prefix, payload) = encrypted_value.split_at(3);
        match prefix {
            p if p == PREFIX_V10 => decrypt_aes_cbc(self.version_key(Version::V10)?, payload),
            p if p == PREFIX_V11 => decrypt_aes_cbc(self.version_key(Version::V11)?, payload),
            p if p == PREFIX_V20 => Err(anyhow!(
                "App-Bound Encryption (Chrome 127+) is not supported; \
                 export the cookies from inside the browser instead"
            )),
            _ => decode_plaintext(encrypted_value),
        }
    }

    #[cfg(not(windows))]
    fn version_key(&self, version: Version) -> Result<&[u8; 16]> {
        let keys = self.keys.as_ref().ok_or_else(|| {
            anyhow!("value is encrypted but the decryptor was built without key material")
        })?;
        keys.key_for(version)
    }
}

#[cfg(not(windows))]
#[derive(Clone, Copy)]
enum Version {
    V10,
    V11,
}

#[cfg(not(windows))]
impl SafeStorageKeys {
    fn key_for(&self, version: Version) -> Result<&[u8; 16]> {
        let cell = match version {
            Version::V10 => &self.v10,
            Version::V11 => &self.v11,
        };
        cell.get_or_try_init(|| {
            let password = self.safe_storage_password(version)?;
            Ok(derive_safe_storage_key(
                password.as_bytes(),
                SAFE_STORAGE_ITERATIONS,
            ))
        })
    }

    #[cfg(target_os = "macos")]
    fn safe_storage_password(&self, _version: Version) -> Result<String> {
        let (service, account) = self.browser.safe_storage_entry();
        let entry = keyring::Entry::new(service, account)
            .with_context(|| format!("cannot open keychain entry '{service}'"))?;
        entry
            .get_password()
            .with_context(|| format!("cannot read '{service}' from the keychain"))
    }

    #[cfg(not(target_os = "macos"))]
    fn safe_storage_password(&self, _version: Version) -> Result<String> {
        // Linux installs default to the basic backend. Profiles bound to a
        // desktop keyring store a random password there instead; those
        // values will fail to unpad below and surface as a decrypt error
        // naming the browser.
        let _ = self.browser;
        Ok(BASIC_STORAGE_PASSWORD.to_string())
    }
}

/// Derive the 16-byte Safe Storage AES key from a backend password.
pub fn derive_safe_storage_key(password: &[u8], iterations: u32) -> [u8; 16] {
    let mut key = [0u8; 16];
    pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, SAFE_STORAGE_SALT, iterations, &mut key);
    key
}

/// AES-256-GCM decryption of a `[12-byte nonce][ciphertext + 16-byte tag]`
/// payload (Windows v10/v11 layout).
pub fn decrypt_aes_gcm(key: &[u8], payload: &[u8]) -> Result<String> {
    if payload.len() < 28 {
        return Err(anyhow!(
            "encrypted payload too short for AES-GCM: {} bytes",
            payload.len()
        ));
    }

    let (nonce_bytes, ciphertext) = payload.split_at(12);
    let cipher = Aes256Gcm::new_from_slice(key).context("master key has the wrong length")?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| {
            anyhow!("AES-GCM decryption failed; the value may belong to another profile")
        })?;

    String::from_utf8(plaintext).context("decrypted cookie value is not valid UTF-8")
}

/// AES-128-CBC decryption of a PKCS#7-padded payload with the fixed Safe
/// Storage IV (macOS/Linux v10/v11 layout).
pub fn decrypt_aes_cbc(key: &[u8; 16], payload: &[u8]) -> Result<String> {
    if payload.is_empty() || payload.len() % 16 != 0 {
        return Err(anyhow!(
            "encrypted payload has invalid AES-CBC length: {} bytes",
            payload.len()
        ));
    }

    let plaintext = Aes128CbcDec::new(key.into(), &SAFE_STORAGE_IV.into())
        .decrypt_padded_vec_mut::<Pkcs7>(payload)
        .map_err(|_| {
            anyhow!("AES-CBC unpadding failed; the Safe Storage password did not match")
        })?;

    String::from_utf8(plaintext).context("decrypted cookie value is not valid UTF-8")
}

/// Accept an unprefixed value as plaintext if it decodes as printable UTF-8.
fn decode_plaintext(data: &[u8]) -> Result<String> {
    if let Ok(text) = String::from_utf8(data.to_vec()) {
        if text
            .chars()
            .all(|c| !c.is_control() || c == '\n' || c == '\t')
        {
            return Ok(text);
        }
    }
    Err(anyhow!(
        "cookie value is neither plaintext nor a recognized encryption format"
    ))
}

/// Legacy handling for values without a version prefix: plaintext first,
/// then direct DPAPI (Chrome < 80 stored values DPAPI-wrapped wholesale).
#[cfg(windows)]
fn try_legacy_decrypt(data: &[u8]) -> Result<String> {
    if let Ok(text) = decode_plaintext(data) {
        return Ok(text);
    }

    if let Ok(decrypted) = decrypt_dpapi(data) {
        if let Ok(text) = String::from_utf8(decrypted) {
            return Ok(text);
        }
    }

    Err(anyhow!(
        "cookie value is neither plaintext, v10/v11 encrypted, nor DPAPI-recoverable"
    ))
}

/// Extract and unwrap the AES-256 master key from the Local State file.
///
/// Returns `Ok(None)` when the profile predates key-wrapped encryption
/// (no `encrypted_key` present).
#[cfg(windows)]
fn extract_master_key(
    local_state: &std::path::Path,
    browser: ChromiumBrowser,
) -> Result<Option<Vec<u8>>> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let content = std::fs::read_to_string(local_state).with_context(|| {
        format!(
            "cannot read Local State for {} at '{}'",
            browser.label(),
            local_state.display()
        )
    })?;

    let json: serde_json::Value =
        serde_json::from_str(&content).context("Local State is not valid JSON")?;

    if json
        .get("os_crypt")
        .and_then(|o| o.get("app_bound_encrypted_key"))
        .is_some()
    {
        return Err(anyhow!(
            "{} uses App-Bound Encryption (Chrome 127+), which cannot be \
             decrypted from outside the browser",
            browser.label()
        ));
    }

    let Some(encrypted_key_b64) = json
        .get("os_crypt")
        .and_then(|o| o.get("encrypted_key"))
        .and_then(|k| k.as_str())
    else {
        return Ok(None);
    };

    let encrypted_key = STANDARD
        .decode(encrypted_key_b64)
        .context("encrypted_key is not valid base64")?;

    let Some(wrapped) = encrypted_key.strip_prefix(DPAPI_PREFIX) else {
        return Err(anyhow!("encrypted_key does not carry the DPAPI prefix"));
    };

    let key = decrypt_dpapi(wrapped)
        .with_context(|| format!("cannot unwrap the {} master key", browser.label()))?;
    Ok(Some(key))
}
