//! Gift Catalog
//!
//! Each category owns an explicit shelf of items. Prices are in rupees.

use crate::domain::value_objects::GiftCategory;

/// A purchasable catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogItem {
    pub name: &'static str,
    pub price: f64,
    pub description: &'static str,
    pub image_url: &'static str,
}

const fn item(
    name: &'static str,
    price: f64,
    description: &'static str,
    image_url: &'static str,
) -> CatalogItem {
    CatalogItem {
        name,
        price,
        description,
        image_url,
    }
}

const CHAOTIC: &[CatalogItem] = &[
    item(
        "Screaming Goat Toy",
        299.0,
        "A goat that screams when you squeeze it",
        "https://placeholder.com/goat.jpg",
    ),
    item(
        "Inflatable T-Rex Costume",
        1499.0,
        "Become a dinosaur instantly",
        "https://placeholder.com/trex.jpg",
    ),
    item(
        "100 Rubber Ducks",
        599.0,
        "For absolutely no reason",
        "https://placeholder.com/ducks.jpg",
    ),
    item(
        "Nicolas Cage Pillow",
        799.0,
        "Sleep with Nicolas Cage's face",
        "https://placeholder.com/cage.jpg",
    ),
];

const ROAST: &[CatalogItem] = &[
    item(
        "World's Okayest Friend Mug",
        349.0,
        "They're okay, I guess",
        "https://placeholder.com/mug.jpg",
    ),
    item(
        "Participation Trophy",
        199.0,
        "For trying their best",
        "https://placeholder.com/trophy.jpg",
    ),
    item(
        "'I Survived Another Meeting' Notepad",
        149.0,
        "For the corporate warrior",
        "https://placeholder.com/notepad.jpg",
    ),
];

const THOUGHTFUL: &[CatalogItem] = &[
    item(
        "Personalized Star Map",
        999.0,
        "The night sky from a special date",
        "https://placeholder.com/starmap.jpg",
    ),
    item("Custom Photo Book", 1299.0, "Memories in print", "https://placeholder.com/photobook.jpg"),
    item("Handwritten Letter Kit", 499.0, "Old school vibes", "https://placeholder.com/letter.jpg"),
];

const FOODIE: &[CatalogItem] = &[
    item(
        "Exotic Snack Box",
        799.0,
        "Snacks from around the world",
        "https://placeholder.com/snacks.jpg",
    ),
    item(
        "Instant Noodle Variety Pack",
        599.0,
        "20 different flavors",
        "https://placeholder.com/noodles.jpg",
    ),
    item(
        "Hot Sauce Challenge Set",
        899.0,
        "From mild to DEATH",
        "https://placeholder.com/hotsauce.jpg",
    ),
];

const TECHIE: &[CatalogItem] = &[
    item(
        "USB Pet Rock",
        299.0,
        "Does absolutely nothing, digitally",
        "https://placeholder.com/usbrock.jpg",
    ),
    item(
        "Keyboard Waffle Maker",
        1999.0,
        "Ctrl+Alt+Breakfast",
        "https://placeholder.com/waffle.jpg",
    ),
    item("RGB Everything Kit", 1499.0, "Make anything glow", "https://placeholder.com/rgb.jpg"),
];

const DEFAULT: &[CatalogItem] = &[
    item("Mystery Box", 499.0, "Who knows what's inside?", "https://placeholder.com/mystery.jpg"),
    item(
        "Plant That's Hard to Kill",
        399.0,
        "Even they can't mess this up",
        "https://placeholder.com/plant.jpg",
    ),
    item("Cozy Socks", 299.0, "Everyone needs socks", "https://placeholder.com/socks.jpg"),
];

/// Category-keyed item shelves
#[derive(Debug, Clone, Copy, Default)]
pub struct GiftCatalog;

impl GiftCatalog {
    pub fn shelf(&self, category: GiftCategory) -> &'static [CatalogItem] {
        match category {
            GiftCategory::Chaotic => CHAOTIC,
            GiftCategory::Roast => ROAST,
            GiftCategory::Thoughtful => THOUGHTFUL,
            GiftCategory::Foodie => FOODIE,
            GiftCategory::Techie => TECHIE,
            GiftCategory::Default => DEFAULT,
        }
    }

    /// Every item across all shelves
    pub fn all(&self) -> impl Iterator<Item = &'static CatalogItem> + '_ {
        GiftCategory::ALL
            .into_iter()
            .flat_map(move |category| self.shelf(category).iter())
    }
}
