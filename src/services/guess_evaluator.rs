//! Guess normalisation and matching against the current song.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::state::game::Song;

/// Which components of a song a guess matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessMatch {
    /// The guess names the title.
    pub title: bool,
    /// The guess names the artist.
    pub artist: bool,
}

impl GuessMatch {
    /// Whether at least one component matched.
    pub fn any(&self) -> bool {
        self.title || self.artist
    }
}

/// Reduce free text to lowercase ASCII letters and digits.
///
/// Whitespace is dropped, accents are stripped through canonical decomposition
/// and any remaining non-alphanumeric character is removed.
pub fn normalize(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Compare a guess with the title and the artist of `song` independently.
pub fn evaluate(guess: &str, song: &Song) -> GuessMatch {
    let guess = normalize(guess);
    // Punctuation-only guesses would otherwise match punctuation-only titles.
    if guess.is_empty() {
        return GuessMatch::default();
    }

    GuessMatch {
        title: guess == normalize(&song.title),
        artist: guess == normalize(&song.artist.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::song;

    #[test]
    fn normalize_ignores_case_accents_spaces_and_punctuation() {
        assert_eq!(normalize("Héllo World!"), "helloworld");
        assert_eq!(normalize("hello   world"), "helloworld");
        assert_eq!(normalize("  HÉLLO,\tWÖRLD?? "), "helloworld");
        assert_eq!(normalize("Beyoncé"), "beyonce");
        assert_eq!(normalize("AC/DC"), "acdc");
        assert_eq!(normalize("Sigur Rós - Hoppípolla"), "sigurroshoppipolla");
    }

    #[test]
    fn normalize_keeps_digits_and_drops_non_latin_letters() {
        assert_eq!(normalize("Blink-182"), "blink182");
        assert_eq!(normalize("99 Luftballons"), "99luftballons");
        assert_eq!(normalize("東京 Tokyo"), "tokyo");
    }

    #[test]
    fn title_only_match() {
        let track = song(1, "Around the World", "Daft Punk");
        assert_eq!(
            evaluate("around the world!", &track),
            GuessMatch {
                title: true,
                artist: false
            }
        );
    }

    #[test]
    fn artist_only_match() {
        let track = song(1, "Around the World", "Daft Punk");
        let matched = evaluate("DAFT-PUNK", &track);
        assert!(matched.artist);
        assert!(!matched.title);
    }

    #[test]
    fn identical_title_and_artist_match_both() {
        let track = song(1, "Weezer", "Weezer");
        assert_eq!(
            evaluate("weezer", &track),
            GuessMatch {
                title: true,
                artist: true
            }
        );
    }

    #[test]
    fn partial_and_empty_guesses_do_not_match() {
        let track = song(1, "Around the World", "Daft Punk");
        assert!(!evaluate("around", &track).any());
        assert!(!evaluate("", &track).any());

        let punctuation = song(2, "!!!", "???");
        assert!(!evaluate("?!", &punctuation).any());
    }
}
