//! SSH credentials for private remotes

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use git2::{Cred, ErrorClass, ErrorCode, RemoteCallbacks};

use crate::{Error, Result};

/// Default user for SSH remotes.
pub const DEFAULT_GIT_USER: &str = "git";

/// libgit2 re-invokes the credential callback after a rejected key; give up
/// after this many tries instead of looping forever.
const MAX_AUTH_ATTEMPTS: usize = 3;

/// ASN.1 tag every DER encoded private key starts with.
const DER_SEQUENCE: u8 = 0x30;

/// A PEM or OpenSSH encoded private key held in memory.
#[derive(Clone)]
pub struct PrivateKey {
    pem: String,
}

impl PrivateKey {
    /// Parse private key material.
    ///
    /// Keys passed through environment variables or flags often arrive with
    /// newlines written as a literal `\n`; those are turned back into real
    /// newlines before decoding. OpenSSH keys are decoded in full. PEM keys
    /// must carry a base64 body, and unencrypted ones must decode to a DER
    /// sequence. Passphrase protected keys are accepted without decrypting.
    pub fn parse(raw: &str) -> Result<Self> {
        let pem = raw.replace("\\n", "\n").trim().to_string();

        let mut lines = pem.lines().map(str::trim).filter(|l| !l.is_empty());
        let begin = lines.next().ok_or_else(|| invalid("key is empty"))?;
        let label = armour_label(begin, "BEGIN")
            .ok_or_else(|| invalid("missing '-----BEGIN ... PRIVATE KEY-----' header"))?;

        let body: Vec<&str> = lines.collect();
        let Some((end, body)) = body.split_last() else {
            return Err(invalid("missing '-----END ... PRIVATE KEY-----' footer"));
        };
        match armour_label(end, "END") {
            Some(end_label) if end_label == label => {}
            Some(_) => return Err(invalid("header and footer labels differ")),
            None => return Err(invalid("missing '-----END ... PRIVATE KEY-----' footer")),
        }
        if body.is_empty() {
            return Err(invalid("key body is empty"));
        }

        if label == "OPENSSH" {
            ssh_key::PrivateKey::from_openssh(&pem)
                .map_err(|e| invalid(&format!("not a valid OpenSSH key: {e}")))?;
        } else {
            check_pem_body(body)?;
        }

        Ok(Self { pem })
    }

    /// The normalized key text.
    pub fn as_pem(&self) -> &str {
        &self.pem
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// The key type between `-----{marker} ` and ` PRIVATE KEY-----`, empty for
/// PKCS#8 armour.
fn armour_label<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix("-----")?.strip_prefix(marker)?;
    let rest = rest.strip_suffix("PRIVATE KEY-----")?;
    if rest.is_empty() {
        return None;
    }
    rest.strip_prefix(' ').map(str::trim_end)
}

/// Legacy PEM bodies may open with `Name: value` headers (`Proc-Type`,
/// `DEK-Info`); when present the payload is ciphertext.
fn check_pem_body(body: &[&str]) -> Result<()> {
    let (headers, encoded): (Vec<&str>, Vec<&str>) =
        body.iter().copied().partition(|l| l.contains(':'));
    let der = STANDARD
        .decode(encoded.concat())
        .map_err(|e| invalid(&format!("key body is not valid base64: {e}")))?;
    if der.is_empty() {
        return Err(invalid("key body is empty"));
    }
    if headers.is_empty() && der[0] != DER_SEQUENCE {
        return Err(invalid("key body is not a DER encoded key"));
    }
    Ok(())
}

fn invalid(reason: &str) -> Error {
    Error::InvalidPrivateKey {
        reason: reason.to_string(),
    }
}

/// User plus private key used to authenticate against an SSH remote.
#[derive(Debug, Clone)]
pub struct Credential {
    user: String,
    key: PrivateKey,
}

impl Credential {
    /// Build a credential from a user name and raw key material.
    pub fn new(user: impl Into<String>, raw_key: &str) -> Result<Self> {
        let user = user.into();
        Ok(Self {
            user: if user.is_empty() {
                DEFAULT_GIT_USER.to_string()
            } else {
                user
            },
            key: PrivateKey::parse(raw_key)?,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    /// Remote callbacks answering SSH credential requests with this key.
    pub fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0;
        callbacks.credentials(move |_url, _username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_AUTH_ATTEMPTS {
                return Err(git2::Error::new(
                    ErrorCode::Auth,
                    ErrorClass::Ssh,
                    format!("remote rejected private key for user '{}'", self.user),
                ));
            }
            if allowed.is_username() {
                return Cred::username(&self.user);
            }
            if allowed.is_ssh_key() || allowed.is_ssh_memory() {
                return Cred::ssh_key_from_memory(&self.user, None, self.key.as_pem(), None);
            }
            Cred::default()
        });
        callbacks
    }
}

/// Returns true for remote addresses that use the SSH transport.
///
/// Accepts `ssh://` style URLs and scp-like `user@host:path` addresses.
/// Local paths (including `C:\...` drive paths) and other schemes are not
/// SSH.
pub fn is_ssh_url(url: &str) -> bool {
    if let Some((scheme, _)) = url.split_once("://") {
        return matches!(scheme, "ssh" | "git+ssh" | "ssh+git");
    }
    match url.find(':') {
        Some(idx) => idx > 1 && !url[..idx].contains('/'),
        None => false,
    }
}
