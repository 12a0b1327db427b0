/// Normalize acquired report text before prediction.
///
/// Drops control characters (OCR noise, stray NULs from text exports),
/// trims each line and removes blank lines. Punctuation, units and
/// non-ASCII letters are kept as-is: vital readings depend on `:`, `/`, `.`
/// and `°`.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
