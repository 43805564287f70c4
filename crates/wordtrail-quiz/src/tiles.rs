//! Answer tile layout.

use wordtrail_core::rng::DeterministicRng;

const ALPHABET_LEN: u32 = 26;

/// Builds the tiles offered for a question.
///
/// The expected glyphs are padded with distinct random letters up to
/// `tile_count`, then shuffled with a forward Fisher–Yates pass. Every tile
/// is uppercase. When `expected` already has `tile_count` glyphs or more, no
/// padding is added.
pub fn build_tiles<S: AsRef<str>>(
    expected: &[S],
    tile_count: usize,
    rng: &mut dyn DeterministicRng,
) -> Vec<String> {
    let mut tiles: Vec<String> = expected.iter().map(|g| g.as_ref().to_uppercase()).collect();

    while tiles.len() < tile_count {
        let Some(letter) = pick_distractor(&tiles, rng) else {
            break;
        };
        tiles.push(letter.to_string());
    }

    let n = tiles.len();
    for i in 0..n {
        let j = rng.next_index(i, n).clamp(i, n - 1);
        tiles.swap(i, j);
    }
    tiles
}

/// Draws uniformly from the letters not already on a tile.
fn pick_distractor(tiles: &[String], rng: &mut dyn DeterministicRng) -> Option<char> {
    let free: Vec<char> = (0..ALPHABET_LEN)
        .filter_map(|offset| char::from_u32(u32::from('A') + offset))
        .filter(|c| !tiles.iter().any(|t| t.chars().eq(std::iter::once(*c))))
        .collect();
    if free.is_empty() {
        return None;
    }
    let index = rng.next_index(0, free.len()).min(free.len() - 1);
    Some(free[index])
}
