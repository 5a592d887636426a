use std::path::PathBuf;
use std::time::Instant;

use ivona_rs::{
    engines::ivona::{
        ClientConfig, ClientOptionsBuilder, EnvCredentials, IvonaClient, VoiceFilter,
        VoiceSelection,
    },
    SpeechSynthesizer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = ClientConfig::default();
    if let Ok(region) = std::env::var("IVONA_REGION") {
        config.set_region(&region)?;
    }
    config.set_codec("mp3")?;

    let options = ClientOptionsBuilder::default()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()?;

    let connect_start = Instant::now();
    let mut client = IvonaClient::with_options(EnvCredentials::default(), config, options)?;
    println!(
        "Loaded {} voices in {:.2?}",
        client.catalog().len(),
        connect_start.elapsed()
    );
    println!("Languages: {:?}", client.catalog().languages());

    let polish = client.fetch_voices(&VoiceFilter::language("pl-PL"))?;
    println!("Polish voices: {polish:?}");

    client.config_mut().set_rate("medium")?;
    client.config_mut().set_sentence_break(600)?;

    let text = "Hello! This is the IVONA Speech Cloud, speaking through a Rust client.";
    let synth_start = Instant::now();
    let output = PathBuf::from(format!("output.{}", client.config().codec().extension()));
    let written = client.synthesize_to_file(text, &output, None)?;
    println!(
        "Saved {written} bytes to {} in {:.2?}",
        output.display(),
        synth_start.elapsed()
    );

    if client.voice_exists("Maja", "pl-PL") {
        let mut audio = Vec::new();
        client.synthesize("Dzień dobry", &mut audio, &VoiceSelection::new("Maja", "pl-PL"))?;
        std::fs::write("output-pl.mp3", &audio)?;
        println!("Saved {} bytes to output-pl.mp3", audio.len());
    }

    Ok(())
}
