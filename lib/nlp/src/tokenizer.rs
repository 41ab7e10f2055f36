// Identifier tokenizer: camel case, underscores, whitespace and punctuation

/// Split an identifier into lowercase tokens
///
/// Boundaries are non-alphanumeric characters, lower-to-upper transitions
/// (`bookTitle`), the end of an acronym (`HTTPServer` -> `http`, `server`) and
/// letter/digit transitions.
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in name.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        split_camel_case(word, &mut tokens);
    }
    tokens
}

fn split_camel_case(word: &str, tokens: &mut Vec<String>) {
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;
    for i in 1..chars.len() {
        let (prev, cur) = (chars[i - 1], chars[i]);
        let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());
        let boundary = (prev.is_lowercase() && cur.is_uppercase())
            || (prev.is_uppercase() && cur.is_uppercase() && next_is_lower)
            || (prev.is_alphabetic() && cur.is_numeric())
            || (prev.is_numeric() && cur.is_alphabetic());
        if boundary {
            tokens.push(chars[start..i].iter().collect::<String>().to_lowercase());
            start = i;
        }
    }
    tokens.push(chars[start..].iter().collect::<String>().to_lowercase());
}
