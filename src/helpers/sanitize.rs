/// Turn a display title into something safe to use as a file name.
///
/// Only ASCII letters and digits plus space, `-`, `_` and `.` survive, and
/// trailing whitespace is trimmed. The result may be empty.
pub fn sanitize(title: &str) -> String {
    let kept = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect::<String>();

    kept.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation() {
        assert_eq!(sanitize("Song: Title/Remix (2021)!"), "Song TitleRemix 2021");
    }

    #[test]
    fn keeps_allowed_set() {
        assert_eq!(sanitize("a-b_c.d e"), "a-b_c.d e");
    }

    #[test]
    fn trims_only_trailing_space() {
        assert_eq!(sanitize("  leading and trailing  "), "  leading and trailing");
        assert_eq!(sanitize("Artist - Title (Live)"), "Artist - Title Live");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(sanitize("Beyoncé"), "Beyonc");
        assert_eq!(sanitize("東京"), "");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "Song: Title/Remix (2021)!",
            "   ",
            "x !",
            "Ünïcödé - Tëst.mp3",
            "a\tb\nc",
            "..",
        ];

        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
            assert!(once
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.')));
        }
    }
}
