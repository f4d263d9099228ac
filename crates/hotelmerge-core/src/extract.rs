//! Image URL discovery over decoded documents.
//!
//! Two paths feed the result set:
//!
//! - Structural: a map holding an `image` list of `{ "url": "..." }` objects.
//!   Those URLs are taken as-is.
//! - Fallback: any other string anywhere in the tree whose whole value ends in
//!   an image extension (`jpg`, `jpeg`, `png`, `gif`, any case).

use std::collections::HashSet;

use crate::Tree;

const IMAGE_COLLECTION_KEY: &str = "image";
const IMAGE_URL_KEY: &str = "url";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Collect every image URL in `tree`, deduplicated.
pub fn extract_image_urls(tree: &Tree) -> HashSet<String> {
    let mut urls = HashSet::new();
    collect(tree, &mut urls);
    urls
}

fn collect(node: &Tree, urls: &mut HashSet<String>) {
    match node {
        Tree::Object(map) => {
            if let Some(Tree::Array(images)) = map.get(IMAGE_COLLECTION_KEY) {
                for image in images {
                    if let Some(Tree::String(url)) = image.get(IMAGE_URL_KEY) {
                        urls.insert(url.clone());
                    }
                }
            }
            for value in map.values() {
                collect(value, urls);
            }
        }
        Tree::Array(items) => {
            for item in items {
                collect(item, urls);
            }
        }
        Tree::String(s) if has_image_extension(s) => {
            urls.insert(s.clone());
        }
        _ => {}
    }
}

/// Whole-string match of `.*\.(jpg|jpeg|png|gif)$`, case-insensitive.
fn has_image_extension(s: &str) -> bool {
    s.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}
