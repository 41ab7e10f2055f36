// Rule-based English lemmatizer for identifier tokens

const MIN_LEMMA_LEN: usize = 4;

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
    ("statuses", "status"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wives", "wife"),
    ("shelves", "shelf"),
    ("halves", "half"),
    ("wolves", "wolf"),
    ("calves", "calf"),
    ("selves", "self"),
    ("elves", "elf"),
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("thieves", "thief"),
    ("scarves", "scarf"),
    ("wharves", "wharf"),
    ("movies", "movie"),
    ("series", "series"),
    ("species", "species"),
];

/// Reduce a lowercase token to its dictionary form
pub fn lemmatize(token: &str) -> String {
    if let Some(&(_, lemma)) = IRREGULAR.iter().find(|(plural, _)| *plural == token) {
        return lemma.to_string();
    }
    if token.chars().count() < MIN_LEMMA_LEN || !token.chars().all(|c| c.is_alphabetic()) {
        return token.to_string();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    if let Some(stem) = token.strip_suffix("sses") {
        return format!("{}ss", stem);
    }
    for suffix in ["xes", "ches", "shes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    if token.ends_with('s') && !["ss", "us", "is"].iter().any(|s| token.ends_with(s)) {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
