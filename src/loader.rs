//! Loads a net description from its JSON schema into a [`NetBuilder`].
//! This module owns no error vocabulary of its own beyond `Json`/`LoadIo`:
//! every structural problem with the described net (duplicate names,
//! unknown endpoints, bad weights) is raised by the builder itself, so a
//! caller sees exactly the same errors whether the net was built by hand or
//! loaded from a file.

use crate::error::{PetriNetError, Result};
use crate::petri_net::NetBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct PlaceDoc {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Tokens")]
    pub tokens: i64,
}

#[derive(Debug, Deserialize)]
pub struct EdgeDoc {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Weight")]
    pub weight: i64,
}

/// The JSON-shaped net description, deserialized field-for-field before it
/// is folded into a `NetBuilder`.
#[derive(Debug, Deserialize)]
pub struct NetDocument {
    #[serde(rename = "Places")]
    pub places: Vec<PlaceDoc>,
    #[serde(rename = "Transitions")]
    pub transitions: Vec<String>,
    #[serde(rename = "Edges")]
    pub edges: Vec<EdgeDoc>,
}

impl NetDocument {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Folds this document into a `NetBuilder`, one place/transition/edge at
    /// a time, in document order. Does not call `build()` — the caller
    /// decides when to partition.
    pub fn into_builder(self) -> Result<NetBuilder> {
        let mut builder = NetBuilder::new();
        for place in self.places {
            builder.add_place(place.name, place.tokens)?;
        }
        for transition in self.transitions {
            builder.add_transition(transition)?;
        }
        for edge in self.edges {
            // `add_arc` takes a `u32` and already rejects zero; only an
            // out-of-range value (negative, or past `u32::MAX`) needs to be
            // caught here, and the original `i64` is kept in the error so
            // the message reflects what the document actually said rather
            // than a value collapsed to fit `u32`.
            let weight = u32::try_from(edge.weight)
                .map_err(|_| PetriNetError::InvalidWeight { weight: edge.weight })?;
            builder.add_arc(&edge.from, &edge.to, weight)?;
        }
        Ok(builder)
    }
}

/// Reads and parses a net description from `path`, returning a `NetBuilder`
/// ready for `.build()`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<NetBuilder> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| PetriNetError::LoadIo {
        path: path.display().to_string(),
        source,
    })?;
    NetDocument::parse(&text)?.into_builder()
}
