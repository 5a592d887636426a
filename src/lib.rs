//! # ivona-rs
//!
//! A Rust client library for the IVONA Speech Cloud text-to-speech service.
//!
//! ## Features
//!
//! - **Signed requests**: every call carries an AWS Signature V4 for the client's region
//! - **Voice catalog**: the region's voices are fetched once and used to validate
//!   voice/language pairs before any synthesis request is sent
//! - **Streaming output**: synthesized audio is copied straight into any `Write` sink
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! ivona-rs = "2026.10"
//! ```
//!
//! ```no_run
//! use std::path::PathBuf;
//! use ivona_rs::{engines::ivona::{ClientConfig, EnvCredentials, IvonaClient}, SpeechSynthesizer};
//!
//! let client = IvonaClient::new(EnvCredentials::default(), ClientConfig::default())?;
//! client.synthesize_to_file("Hello, world!", &PathBuf::from("hello.mp3"), None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Common interface for text-to-speech services.
///
/// Each service may have its own voice description and per-call voice
/// parameters.
pub trait SpeechSynthesizer {
    /// Description of one available voice.
    type Voice;
    /// Per-call voice selection.
    type VoiceParams: Default;
    type Error: From<std::io::Error>;

    /// List the voices the service currently offers.
    fn list_voices(&self) -> Result<Vec<Self::Voice>, Self::Error>;

    /// Synthesize `text` into `sink`, returning the number of bytes written.
    ///
    /// If this fails, `sink` may already hold part of the audio.
    fn synthesize_into(
        &self,
        text: &str,
        sink: &mut dyn Write,
        params: Option<Self::VoiceParams>,
    ) -> Result<u64, Self::Error>;

    /// Synthesize `text` and save it at `path`.
    ///
    /// Audio goes to a `.part` file next to `path`, which is renamed into
    /// place once complete and removed if anything fails.
    fn synthesize_to_file(
        &self,
        text: &str,
        path: &Path,
        params: Option<Self::VoiceParams>,
    ) -> Result<u64, Self::Error> {
        let partial = partial_path(path);
        let result = File::create(&partial)
            .map_err(<Self::Error as From<std::io::Error>>::from)
            .and_then(|mut file| {
                let written = self.synthesize_into(text, &mut file, params)?;
                file.sync_all()?;
                drop(file);
                fs::rename(&partial, path)?;
                Ok(written)
            });

        match result {
            Ok(written) => Ok(written),
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&partial) {
                    log::debug!("Could not remove {}: {cleanup}", partial.display());
                }
                Err(e)
            }
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::partial_path;
    use std::path::Path;

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/tmp/out.mp3")),
            Path::new("/tmp/out.mp3.part")
        );
    }
}
