/// Levenshtein edit distance between two strings
///
/// Classic dynamic programming over a full `(|a|+1) x (|b|+1)` table of
/// chars. Insertion, deletion and substitution each cost 1; transpositions
/// get no discount.
///
/// # Examples
///
/// ```
/// use webgrep::matcher::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("same", "same"), 0);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (len_a, len_b) = (a.len(), b.len());

    let mut table = vec![vec![0usize; len_b + 1]; len_a + 1];

    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len_b {
        table[0][j] = j;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            table[i][j] = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
        }
    }

    table[len_a][len_b]
}
