/// Case-folded whitespace tokenization. No stemming, no stop words, no
/// punctuation stripping: `"Cells?"` and `"cells"` are different terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_splits_on_any_whitespace() {
        assert_eq!(tokenize("  Lace\tPlant\nLEAVES  "), ["lace", "plant", "leaves"]);
    }

    #[test]
    fn keeps_punctuation_attached() {
        assert_eq!(tokenize("cells? cells"), ["cells?", "cells"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize(" \n ").is_empty());
    }
}
