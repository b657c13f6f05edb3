use game_types::{Avatar, TOTAL_AVATARS};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Pick a uniformly random avatar nobody in `used` has. Once the pool is
/// exhausted any avatar may be returned.
pub fn next_avatar<'a, R, I>(used: I, rng: &mut R) -> Avatar
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = &'a Avatar>,
{
    let used: HashSet<Avatar> = used.into_iter().copied().collect();
    let available: Vec<Avatar> = Avatar::all().filter(|a| !used.contains(a)).collect();

    match available.choose(rng) {
        Some(avatar) => *avatar,
        None => random_avatar(rng),
    }
}

pub fn random_avatar<R: Rng + ?Sized>(rng: &mut R) -> Avatar {
    Avatar::clamped(rng.gen_range(1..=TOTAL_AVATARS))
}
