//! Name generation utilities

use crate::components::Name;
use rand::seq::SliceRandom;
use rand::Rng;

/// Generate a random citizen name
pub fn generate_name(rng: &mut impl Rng) -> Name {
    let given = GIVEN_NAMES.choose(rng).copied().unwrap_or("Ada");
    let family = FAMILY_NAMES.choose(rng).copied().unwrap_or("Miller");

    Name::new(given, family)
}

static GIVEN_NAMES: &[&str] = &[
    "Ada", "Alric", "Bertha", "Bram", "Cecily", "Cuthbert", "Edith", "Edwin",
    "Elsa", "Emory", "Greta", "Hale", "Hilda", "Ivo", "Joan", "Kendrick",
    "Liesel", "Maud", "Merrick", "Nell", "Osric", "Petra", "Quill", "Rowan",
    "Sabine", "Tamsin", "Ulric", "Wynn", "Yara", "Zeno",
];

static FAMILY_NAMES: &[&str] = &[
    "Ashdown", "Barley", "Cooper", "Thatcher", "Fletcher", "Hollins", "Miller",
    "Oakes", "Reeve", "Sawyer", "Shepherd", "Smith", "Stone", "Tanner",
    "Wainwright", "Weaver", "Woodward", "Yeoman",
];
