// Windows DPAPI wrapper, used to unwrap the Chromium master key

use anyhow::Result;

#[cfg(windows)]
use windows_sys::Win32::Foundation::{LocalFree, HLOCAL};
#[cfg(windows)]
use windows_sys::Win32::Security::Cryptography::{
    CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN, CRYPT_INTEGER_BLOB,
};

/// Decrypt a blob with the current user's DPAPI key.
///
/// DPAPI ties the ciphertext to the Windows account that wrote it, so this
/// only succeeds for data produced by the same user profile that runs us.
#[cfg(windows)]
pub fn decrypt_dpapi(encrypted_data: &[u8]) -> Result<Vec<u8>> {
    use std::ptr::null_mut;

    let mut input_blob = CRYPT_INTEGER_BLOB {
        cbData: encrypted_data.len() as u32,
        pbData: encrypted_data.as_ptr() as *mut u8,
    };

    let mut output_blob = CRYPT_INTEGER_BLOB {
        cbData: 0,
        pbData: null_mut(),
    };

    let result = unsafe {
        CryptUnprotectData(
            &mut input_blob,
            null_mut(),
            null_mut(),
            null_mut(),
            null_mut(),
            CRYPTPROTECT_UI_FORBIDDEN,
            &mut output_blob,
        )
    };

    if result == 0 {
        return Err(anyhow::anyhow!(
            "DPAPI refused to decrypt; the data was written by another \
             Windows user or the profile is damaged"
        ));
    }

    // Copy out before releasing the buffer Windows allocated for us.
    let decrypted = unsafe {
        std::slice::from_raw_parts(output_blob.pbData, output_blob.cbData as usize).to_vec()
    };
    unsafe {
        LocalFree(output_blob.pbData as HLOCAL);
    }

    Ok(decrypted)
}

/// DPAPI does not exist off Windows.
#[cfg(not(windows))]
pub fn decrypt_dpapi(_encrypted_data: &[u8]) -> Result<Vec<u8>> {
    Err(anyhow::anyhow!(
        "DPAPI decryption is only available on Windows"
    ))
}
