//! Bag-of-words summary over file names, the input handed to an external
//! word-cloud renderer. Rendering itself lives outside the core.

use std::collections::HashMap;

/// Lowercase alphanumeric tokens of every name, flattened in input order.
pub fn name_tokens<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();
    for name in names {
        for token in name
            .as_ref()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            tokens.push(token.to_lowercase());
        }
    }
    tokens
}

/// Token frequencies, most common first; ties ordered alphabetically so the
/// summary is stable.
pub fn token_counts<I, S>(names: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in name_tokens(names) {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn splits_names_on_non_alphanumerics() {
        let tokens = name_tokens(["budget_report_2023.xlsx", "notes.txt"]);
        assert_eq!(
            tokens,
            vec!["budget", "report", "2023", "xlsx", "notes", "txt"]
        );
    }

    #[test]
    fn counts_rank_frequent_tokens_first() {
        let counts = token_counts(["report_a.txt", "report_b.txt", "notes.txt"]);
        assert_eq!(counts[0], ("txt".to_string(), 3));
        assert_eq!(counts[1], ("report".to_string(), 2));
        // Singletons follow alphabetically.
        let singles: Vec<&str> = counts[2..].iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(singles, vec!["a", "b", "notes"]);
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        let names: [&str; 0] = [];
        assert!(name_tokens(names).is_empty());
        assert!(token_counts(names).is_empty());
    }
}
