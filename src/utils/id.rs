//! Destination id generation.

use rand::{Rng, distr::Alphanumeric};

const ID_PREFIX: &str = "d_";
const ID_RANDOM_LEN: usize = 16;

/// Generates an opaque destination id such as `d_k3v9x0q2m1z8a7b4`.
///
/// Ids only need to be unique within one slug.
pub fn generate_destination_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_RANDOM_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{ID_PREFIX}{suffix}")
}
