// Candidate author-name derivation from Readarr's composite
// "Lastname, Firstname Title" strings.

/// Derive a lookup-ready author name from a composite `authorTitle` string.
///
/// Drops a trailing `" {title}"` (case-insensitive), reorders a
/// `"Lastname, Firstname"` remainder, then capitalizes word starts.
pub fn derive_author_name(author_title: &str, title: &str) -> String {
    let mut name = author_title.trim().to_string();

    let suffix = format!(" {}", title);
    if name.len() >= suffix.len() {
        let split = name.len() - suffix.len();
        if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(&suffix) {
            name.truncate(split);
        }
    }

    let parts: Vec<&str> = name.split(',').map(str::trim).collect();
    if parts.len() == 2 {
        name = format!("{} {}", parts[1], parts[0]);
    } else {
        name = name.trim().to_string();
    }

    capitalize_words(&name)
}

/// Uppercase the first letter of every word. Word boundaries follow the
/// ASCII `\w` rule, so apostrophes and hyphens start a new word and inner
/// capitals are left untouched.
fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;
    for c in s.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}
