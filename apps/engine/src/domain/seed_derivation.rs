//! RNG seed derivation for deterministic serves.
//!
//! Each game draws one base seed when it is created. Every serve derives its
//! own seed from that base, so replaying a snapshot replays its serves.

/// Derive the seed for the `serve_no`-th serve of a game.
///
/// Same game seed + serve number = same serve; consecutive serves differ.
pub fn derive_serve_seed(game_seed: u64, serve_no: u32) -> u64 {
    // splitmix64 finalizer over the combined value spreads nearby serve
    // numbers across the whole seed space
    let mut z = game_seed.wrapping_add((serve_no as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
