use std::{env, fs, path::PathBuf};
use tether_codegen::{EndpointDescriptor, SourceBuffer, SynthConfig, Synthesizer};

fn main() {
    println!("cargo:rerun-if-changed=endpoints.json");
    println!("cargo:rerun-if-changed=tether.toml");

    let config = fs::read_to_string("tether.toml")
        .unwrap_or_else(|err| panic!("tether.toml must be readable: {err}"));
    let config = SynthConfig::from_toml(&config)
        .unwrap_or_else(|err| panic!("invalid tether.toml: {err}"));

    let endpoints = fs::read_to_string("endpoints.json")
        .unwrap_or_else(|err| panic!("endpoints.json must be readable: {err}"));
    let descs: Vec<EndpointDescriptor> = serde_json::from_str(&endpoints)
        .unwrap_or_else(|err| panic!("invalid endpoints.json: {err}"));

    let synth = Synthesizer::new(config).unwrap_or_else(|err| panic!("{err}"));
    let mut buffer = SourceBuffer::new();
    synth
        .emit_all(&descs, &mut buffer)
        .unwrap_or_else(|err| panic!("wrapper synthesis failed: {err}"));

    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| panic!("OUT_DIR is set by cargo"));
    let target = PathBuf::from(out_dir).join("wrappers.rs");
    fs::write(&target, buffer.render())
        .unwrap_or_else(|err| panic!("cannot write {}: {err}", target.display()));
}
