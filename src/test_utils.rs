//! Shared fixtures for unit tests: a small synthetic grammar set and blob
//! packing, so every test builds a fresh registry instead of sharing state.

use std::io::Write;

use flate2::{Compression, write::GzEncoder};

use crate::Registry;

pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub(crate) fn registry_from_json(json: &str) -> Registry {
    Registry::from_raw(serde_json::from_str(json).unwrap())
}

/// A two-language definition set exercising comments, greedy strings,
/// cross-language embedding and an alias
pub(crate) fn toy_grammar_set() -> String {
    r##"{
        "languages": {
            "toy": {
                "tokens": [
                    { "name": "comment", "patterns": [{ "pattern": "#.*" }] },
                    { "name": "string", "patterns": [{ "pattern": "\"[^\"]*\"", "greedy": true }] },
                    { "name": "embedded", "patterns": [{ "pattern": "<[^>]*>", "inside": "inner" }] },
                    { "name": "number", "patterns": [{ "pattern": "\\b\\d+\\b" }] }
                ]
            },
            "inner": {
                "tokens": [
                    { "name": "word", "patterns": [{ "pattern": "[a-z]+" }] }
                ]
            }
        },
        "aliases": { "t": "toy" }
    }"##
    .to_string()
}
