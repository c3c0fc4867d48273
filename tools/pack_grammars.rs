//! Offline packaging step: compress a plain-JSON grammar definition file
//! into the gzip blob the registry loads at startup.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Parser;
use flate2::{Compression, write::GzEncoder};
use prismatic::{RawGrammarSet, Registry};

#[derive(Parser)]
#[command(
    name = "pack-grammars",
    about = "Compress a grammar definition file into the embeddable blob"
)]
struct Args {
    /// Path to the plain-JSON grammar definition file
    input: PathBuf,

    /// Where to write the packed blob
    #[arg(short, long, default_value = "grammars.bin")]
    output: PathBuf,

    /// Base64-armor the output for text transport instead of raw bytes
    #[arg(long)]
    base64: bool,

    /// Try to compile every pattern and report the ones that will be inert
    #[arg(long)]
    check: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let raw = RawGrammarSet::load_from_file(&args.input)?;
    println!(
        "Loaded {} languages, {} aliases from {}",
        raw.languages.len(),
        raw.aliases.len(),
        args.input.display()
    );

    if args.check {
        check_patterns(&raw);
    }

    // Re-serialize compactly: authored files tend to be pretty-printed
    let json = serde_json::to_vec(&raw)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    println!(
        "Packed {} bytes of JSON into {} bytes",
        json.len(),
        compressed.len()
    );

    if args.base64 {
        fs::write(&args.output, BASE64.encode(&compressed))?;
    } else {
        fs::write(&args.output, &compressed)?;
    }
    println!("Wrote {}", args.output.display());

    Ok(())
}

fn check_patterns(raw: &RawGrammarSet) {
    let registry = Registry::from_raw(raw.clone());
    let mut total = 0usize;
    let mut invalid = 0usize;

    for grammar in registry.grammars() {
        for token in &grammar.tokens {
            for pattern in &token.patterns {
                total += 1;
                if let Err(err) = pattern.regex().validate() {
                    invalid += 1;
                    println!(
                        "  {}/{}: pattern will never match: {err}",
                        grammar.name, token.name
                    );
                }
            }
        }
    }

    println!("Checked {total} patterns, {invalid} invalid");
}
