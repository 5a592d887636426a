use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

pub const ACCESS_KEY_ENV: &str = "IVONA_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "IVONA_SECRET_KEY";

/// Long-lived access/secret key pair.
///
/// Held in memory only. The `Debug` output never shows the secret, and both
/// keys are wiped when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// True unless both keys are non-empty.
    pub fn is_incomplete(&self) -> bool {
        self.access_key.is_empty() || self.secret_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Somewhere credentials can be resolved from at client construction.
pub trait CredentialSource {
    /// Returns `None` when this source has nothing to offer.
    fn credentials(&self) -> Option<Credentials>;
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.clone())
    }
}

impl<F> CredentialSource for F
where
    F: Fn() -> Option<Credentials>,
{
    fn credentials(&self) -> Option<Credentials> {
        self()
    }
}

/// Reads the key pair from two environment variables.
///
/// The environment is read only when the client resolves credentials, never
/// implicitly.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    access_key_var: String,
    secret_key_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(ACCESS_KEY_ENV, SECRET_KEY_ENV)
    }
}

impl EnvCredentials {
    pub fn new(access_key_var: impl Into<String>, secret_key_var: impl Into<String>) -> Self {
        Self {
            access_key_var: access_key_var.into(),
            secret_key_var: secret_key_var.into(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Option<Credentials> {
        let access_key = std::env::var(&self.access_key_var).ok()?;
        let secret_key = std::env::var(&self.secret_key_var).ok()?;
        Some(Credentials::new(access_key, secret_key))
    }
}

/// Tries each source in order and yields the first complete key pair.
///
/// ```
/// use ivona_rs::engines::ivona::{CredentialChain, CredentialSource, Credentials, EnvCredentials};
///
/// let chain = CredentialChain::new()
///     .with(Credentials::new("", ""))
///     .with(EnvCredentials::new("MY_APP_IVONA_ACCESS", "MY_APP_IVONA_SECRET"))
///     .with(Credentials::new("AKID", "secret"));
/// assert_eq!(chain.credentials().unwrap().access_key(), "AKID");
/// ```
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl CredentialSource for CredentialChain {
    fn credentials(&self) -> Option<Credentials> {
        self.sources
            .iter()
            .filter_map(|source| source.credentials())
            .find(|creds| !creds.is_incomplete())
    }
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChain")
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let creds = Credentials::new("AKIDEXAMPLE", "super-secret");
        let printed = format!("{creds:?}");
        assert!(printed.contains("AKIDEXAMPLE"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn incomplete_pairs_are_detected() {
        assert!(Credentials::new("", "secret").is_incomplete());
        assert!(Credentials::new("akid", "").is_incomplete());
        assert!(!Credentials::new("akid", "secret").is_incomplete());
    }

    #[test]
    fn env_source_reads_named_variables() {
        std::env::set_var("IVONA_RS_TEST_ENV_ACCESS", "env-akid");
        std::env::set_var("IVONA_RS_TEST_ENV_SECRET", "env-secret");
        let source = EnvCredentials::new("IVONA_RS_TEST_ENV_ACCESS", "IVONA_RS_TEST_ENV_SECRET");
        let creds = source.credentials().unwrap();
        assert_eq!(creds.access_key(), "env-akid");
        assert_eq!(creds.secret_key(), "env-secret");
    }

    #[test]
    fn env_source_yields_nothing_when_unset() {
        let source = EnvCredentials::new("IVONA_RS_TEST_UNSET_ACCESS", "IVONA_RS_TEST_UNSET_SECRET");
        assert!(source.credentials().is_none());
    }

    #[test]
    fn chain_skips_empty_and_missing_sources() {
        let chain = CredentialChain::new()
            .with(|| -> Option<Credentials> { None })
            .with(Credentials::new("akid", ""))
            .with(Credentials::new("second", "secret"));
        assert_eq!(chain.credentials().unwrap().access_key(), "second");

        let empty = CredentialChain::new().with(|| -> Option<Credentials> { None });
        assert!(empty.credentials().is_none());
    }
}
