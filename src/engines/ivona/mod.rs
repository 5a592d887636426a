//! IVONA Speech Cloud engine.
//!
//! A blocking HTTP client for the two IVONA endpoints, `ListVoices` and
//! `CreateSpeech`. Requests are signed with AWS Signature V4 for the `tts`
//! service in the configured region.
//!
//! # Regions
//!
//! | Region | Endpoint |
//! |---|---|
//! | `eu-west-1` (default) | `https://tts.eu-west-1.ivonacloud.com` |
//! | `us-east-1` | `https://tts.us-east-1.ivonacloud.com` |
//! | `us-west-2` | `https://tts.us-west-2.ivonacloud.com` |
//!
//! # Voice validation
//!
//! Constructing an [`IvonaClient`] downloads the region's voice catalog and
//! checks the default voice against it. Every synthesis call checks its
//! (voice, language) pair against the same cached catalog, so a bad voice
//! fails locally instead of costing a round trip.
//!
//! # Errors
//!
//! [`IvonaError::Configuration`] covers everything detected locally.
//! Responses carrying an `x-amzn-ErrorType` header, or a non-2xx status, map
//! to [`IvonaError::Authentication`] or [`IvonaError::RemoteService`].
//! Network failures come back as [`IvonaError::Transport`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use ivona_rs::engines::ivona::{ClientConfig, Credentials, IvonaClient, VoiceSelection};
//!
//! let client = IvonaClient::new(Credentials::new("AKID", "secret"), ClientConfig::default())?;
//!
//! let mut audio = Vec::new();
//! client.synthesize("Hello, world!", &mut audio, &VoiceSelection::default())?;
//! println!("Received {} bytes of MP3", audio.len());
//! # Ok::<(), ivona_rs::engines::ivona::IvonaError>(())
//! ```
//!
//! ## With Custom Voice and Settings
//!
//! ```rust,no_run
//! use std::fs::File;
//! use ivona_rs::engines::ivona::{ClientConfig, EnvCredentials, IvonaClient, Region, VoiceSelection};
//!
//! let config = ClientConfig::default()
//!     .with_region(Region::UsEast1)
//!     .with_voice("Maja", "pl-PL");
//! let mut client = IvonaClient::new(EnvCredentials::default(), config)?;
//! client.config_mut().set_codec("ogg")?;
//! client.config_mut().set_rate("slow")?;
//!
//! let mut file = File::create("dzien-dobry.ogg")?;
//! client.synthesize("Dzień dobry", &mut file, &VoiceSelection::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod signer;
pub mod speech;
pub mod voices;

pub use client::IvonaClient;
pub use config::{
    ClientConfig, ClientOptions, ClientOptionsBuilder, Codec, Rate, Region, Volume,
};
pub use credentials::{CredentialChain, CredentialSource, Credentials, EnvCredentials};
pub use error::{ConfigError, IvonaError};
pub use signer::{Aws4Signer, RequestSigner};
pub use speech::VoiceSelection;
pub use voices::{Gender, VoiceCatalog, VoiceDescriptor, VoiceFilter};
