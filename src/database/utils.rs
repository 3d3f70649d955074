use std::sync::OnceLock;

use regex::{Captures, Regex};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\?").expect("static placeholder pattern"))
}

/// Collapse whitespace and number `?` placeholders as Postgres `$n` parameters.
pub fn sql(query: &str) -> String {
    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let mut index = 0;
    placeholder()
        .replace_all(&cleaned, |_: &Captures| {
            index += 1;
            format!("${}", index)
        })
        .into_owned()
}
