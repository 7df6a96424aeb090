//! Positional column names.
//!
//! Headerless uploads get spreadsheet-style names from the 0-based column
//! index, using bijective base-26 (there is no zero digit):
//!
//! ```text
//! 0 → a   25 → z   26 → aa   27 → ab   701 → zz   702 → aaa
//! ```

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Name of the column at `index`.
pub fn column_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut x = index;
    loop {
        letters.push(ALPHABET[x % 26]);
        if x < 26 {
            break;
        }
        x = x / 26 - 1;
    }
    letters.reverse();
    // Only ASCII letters were pushed.
    letters.into_iter().map(char::from).collect()
}

/// Names for the first `width` columns.
pub fn column_names(width: usize) -> Vec<String> {
    (0..width).map(column_name).collect()
}

/// Index of a column name, the inverse of [`column_name`].
///
/// `None` for anything that is not a non-empty run of lowercase ASCII letters,
/// or that would overflow `usize`.
pub fn column_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for b in name.bytes() {
        if !b.is_ascii_lowercase() {
            return None;
        }
        let digit = (b - b'a') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letters() {
        assert_eq!(column_name(0), "a");
        assert_eq!(column_name(1), "b");
        assert_eq!(column_name(14), "o");
        assert_eq!(column_name(25), "z");
    }

    #[test]
    fn test_bijective_rollover() {
        assert_eq!(column_name(26), "aa");
        assert_eq!(column_name(27), "ab");
        assert_eq!(column_name(51), "az");
        assert_eq!(column_name(52), "ba");
        assert_eq!(column_name(701), "zz");
        assert_eq!(column_name(702), "aaa");
        assert_eq!(column_name(18277), "zzz");
    }

    #[test]
    fn test_names_are_lowercase_letters() {
        for i in 0..2000 {
            let name = column_name(i);
            assert!(!name.is_empty());
            assert!(name.bytes().all(|b| b.is_ascii_lowercase()), "{}", name);
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        for i in 0..20_000 {
            assert_eq!(column_index(&column_name(i)), Some(i));
        }
    }

    #[test]
    fn test_names_are_distinct() {
        let names = column_names(1000);
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), 1000);
    }

    #[test]
    fn test_same_width_same_sequence() {
        assert_eq!(column_names(30), column_names(30));
        assert_eq!(column_names(0), Vec::<String>::new());
        assert_eq!(column_names(3), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A"), None);
        assert_eq!(column_index("a1"), None);
        assert_eq!(column_index(&"z".repeat(64)), None);
    }
}
