//! API key resolution and persistence.
//!
//! The key is looked up in the environment, then in the key file, and only
//! then requested interactively. An interactively entered key is written
//! back with owner-only permissions so the prompt appears once.

use crate::config::Config;
use crate::error::HowError;
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Secret used to authenticate the completion request.
#[derive(Debug)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

pub struct CredentialProvider {
    env_var: String,
    key_file: PathBuf,
}

impl CredentialProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            env_var: config.api_key_env.clone(),
            key_file: config.api_key_file.clone(),
        }
    }

    /// Resolves the credential using the process environment and stdin.
    pub fn resolve(&self, force_reenter: bool) -> Result<Credential, HowError> {
        let env_value = std::env::var(&self.env_var).ok();
        let interactive = io::stdin().is_terminal();
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.resolve_with_io(force_reenter, env_value, interactive, &mut input, &mut output)
    }

    /// Resolves the credential with injected environment value and I/O.
    pub fn resolve_with_io<R: BufRead, W: Write>(
        &self,
        force_reenter: bool,
        env_value: Option<String>,
        interactive: bool,
        input: &mut R,
        output: &mut W,
    ) -> Result<Credential, HowError> {
        if !force_reenter {
            if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
                info!("Using API key from {}", self.env_var);
                return Ok(Credential::new(key.trim()));
            }
            if let Some(key) = self.read_key_file() {
                info!("Using API key from {}", self.key_file.display());
                return Ok(Credential::new(key));
            }
        }

        if !interactive {
            return Err(HowError::Auth(format!(
                "{} not found in non-interactive session.",
                self.env_var
            )));
        }

        let key = Self::prompt_for_key(input, output)?;
        if let Err(e) = self.replace(&key) {
            warn!("Failed to persist API key: {}", e);
        }
        Ok(Credential::new(key))
    }

    /// Overwrites the persisted key unconditionally.
    pub fn replace(&self, new_value: &str) -> Result<(), HowError> {
        let persist = |e: io::Error| HowError::persist(&self.key_file, e);
        if let Some(parent) = self.key_file.parent() {
            fs::create_dir_all(parent).map_err(persist)?;
        }
        // Tightened before the secret is written, also for a pre-existing file.
        let mut file = open_owner_only(&self.key_file).map_err(persist)?;
        restrict_to_owner(&self.key_file).map_err(persist)?;
        file.write_all(new_value.trim().as_bytes()).map_err(persist)?;
        info!("API key saved to {}", self.key_file.display());
        Ok(())
    }

    fn read_key_file(&self) -> Option<String> {
        let content = fs::read_to_string(&self.key_file).ok()?;
        let key = content.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    fn prompt_for_key<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String, HowError> {
        let cancelled = || HowError::Auth("API key input cancelled.".to_string());

        writeln!(output, "Paste your Groq API key:").map_err(|_| cancelled())?;
        write!(output, "API Key: ").map_err(|_| cancelled())?;
        output.flush().map_err(|_| cancelled())?;

        let mut line = String::new();
        let read = input.read_line(&mut line).map_err(|_| cancelled())?;
        if read == 0 {
            return Err(cancelled());
        }

        let key = line.trim();
        if key.is_empty() {
            return Err(HowError::Auth("API key cannot be empty.".to_string()));
        }
        Ok(key.to_string())
    }
}

/// Opens `path` for writing, creating it as 0600 where modes exist.
fn open_owner_only(path: &std::path::Path) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn restrict_to_owner(path: &std::path::Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &std::path::Path) -> io::Result<()> {
    Ok(())
}
