use crate::errors::Result;

/// bcrypt-hash a short secret (OTP or PIN) off the async workers.
pub async fn hash_secret(secret: &str, cost: u32) -> Result<String> {
    let secret = secret.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost)).await??;
    Ok(hashed)
}

/// Check `secret` against a stored bcrypt hash. bcrypt compares the
/// digests in constant time.
pub async fn verify_secret(secret: &str, hash: &str) -> Result<bool> {
    let secret = secret.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash)).await??;
    Ok(matches)
}
