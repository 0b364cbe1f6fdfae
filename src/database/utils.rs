use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?").expect("placeholder pattern compiles"));

/// Collapses whitespace in a query and rewrites `?` placeholders into the
/// numbered `$n` form Postgres expects.
pub fn sql(query: &str) -> String {
    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let mut param_index = 0;
    PLACEHOLDER
        .replace_all(&cleaned, |_: &regex::Captures| {
            param_index += 1;
            format!("${}", param_index)
        })
        .into_owned()
}
