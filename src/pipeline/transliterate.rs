//! Devanagari → IAST romanisation.
//!
//! Runs locally and never touches the network, so unlike translation it
//! cannot fail for transient reasons. It still sits behind the
//! [`Transliterator`] trait so the translation stage can be tested with a
//! fake and another scheme can be dropped in.

use crate::error::ServiceError;

/// Romanise Sanskrit text.
pub trait Transliterator: Send + Sync {
    fn transliterate(&self, text: &str) -> Result<String, ServiceError>;
}

/// International Alphabet of Sanskrit Transliteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct IastTransliterator;

impl Transliterator for IastTransliterator {
    fn transliterate(&self, text: &str) -> Result<String, ServiceError> {
        Ok(to_iast(text))
    }
}

const VIRAMA: char = '\u{094D}';
const NUKTA: char = '\u{093C}';

/// Transliterate Devanagari to IAST. Non-Devanagari characters pass through.
///
/// Consonants carry an inherent `a` that is dropped before a virama and
/// replaced by a following vowel sign.
pub fn to_iast(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut inherent_pending = false;

    for c in text.chars() {
        if inherent_pending {
            if c == NUKTA {
                continue;
            }
            inherent_pending = false;
            if c == VIRAMA {
                continue;
            }
            if let Some(sign) = vowel_sign(c) {
                out.push_str(sign);
                continue;
            }
            out.push('a');
        }

        if let Some(cons) = consonant(c) {
            out.push_str(cons);
            inherent_pending = true;
        } else if let Some(s) = other(c) {
            out.push_str(s);
        } else if c != NUKTA && c != VIRAMA {
            out.push(c);
        }
    }

    if inherent_pending {
        out.push('a');
    }
    out
}

fn consonant(c: char) -> Option<&'static str> {
    Some(match c {
        'क' | '\u{0958}' => "k",
        'ख' | '\u{0959}' => "kh",
        'ग' | '\u{095A}' => "g",
        'घ' => "gh",
        'ङ' => "ṅ",
        'च' => "c",
        'छ' => "ch",
        'ज' | '\u{095B}' => "j",
        'झ' => "jh",
        'ञ' => "ñ",
        'ट' => "ṭ",
        'ठ' => "ṭh",
        'ड' | '\u{095C}' => "ḍ",
        'ढ' | '\u{095D}' => "ḍh",
        'ण' => "ṇ",
        'त' => "t",
        'थ' => "th",
        'द' => "d",
        'ध' => "dh",
        'न' | '\u{0929}' => "n",
        'प' => "p",
        'फ' | '\u{095E}' => "ph",
        'ब' => "b",
        'भ' => "bh",
        'म' => "m",
        'य' | '\u{095F}' => "y",
        'र' | '\u{0931}' => "r",
        'ल' => "l",
        'ळ' | '\u{0934}' => "ḻ",
        'व' => "v",
        'श' => "ś",
        'ष' => "ṣ",
        'स' => "s",
        'ह' => "h",
        _ => return None,
    })
}

fn vowel_sign(c: char) -> Option<&'static str> {
    Some(match c {
        'ा' => "ā",
        'ि' => "i",
        'ी' => "ī",
        'ु' => "u",
        'ू' => "ū",
        'ृ' => "ṛ",
        'ॄ' => "ṝ",
        'ॢ' => "ḷ",
        'ॣ' => "ḹ",
        'े' | 'ॆ' | 'ॅ' => "e",
        'ै' => "ai",
        'ो' | 'ॊ' | 'ॉ' => "o",
        'ौ' => "au",
        _ => return None,
    })
}

fn other(c: char) -> Option<&'static str> {
    Some(match c {
        'अ' => "a",
        'आ' => "ā",
        'इ' => "i",
        'ई' => "ī",
        'उ' => "u",
        'ऊ' => "ū",
        'ऋ' => "ṛ",
        'ॠ' => "ṝ",
        'ऌ' => "ḷ",
        'ॡ' => "ḹ",
        'ए' | 'ऎ' | 'ऍ' => "e",
        'ऐ' => "ai",
        'ओ' | 'ऒ' | 'ऑ' => "o",
        'औ' => "au",
        'ं' => "ṃ",
        'ः' => "ḥ",
        'ँ' => "m\u{0310}",
        'ऽ' => "'",
        'ॐ' => "oṃ",
        '।' => ".",
        '॥' => "..",
        '०' => "0",
        '१' => "1",
        '२' => "2",
        '३' => "3",
        '४' => "4",
        '५' => "5",
        '६' => "6",
        '७' => "7",
        '८' => "8",
        '९' => "9",
        // Dependent signs with no preceding consonant.
        _ => return vowel_sign(c),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherent_vowel_and_matras() {
        assert_eq!(to_iast("रामः गच्छति"), "rāmaḥ gacchati");
        assert_eq!(to_iast("सत्यं वचनम्"), "satyaṃ vacanam");
        assert_eq!(to_iast("धर्मः"), "dharmaḥ");
    }

    #[test]
    fn conjuncts_and_vocalic_r() {
        assert_eq!(to_iast("कृष्ण"), "kṛṣṇa");
        assert_eq!(to_iast("आयुर्वेद"), "āyurveda");
        assert_eq!(to_iast("चरकसंहिता"), "carakasaṃhitā");
    }

    #[test]
    fn independent_vowels_and_marks() {
        assert_eq!(to_iast("ॐ"), "oṃ");
        assert_eq!(to_iast("अथातो"), "athāto");
        assert_eq!(to_iast("सोऽहम्"), "so'ham");
        assert_eq!(to_iast("ऐश्वर्य"), "aiśvarya");
    }

    #[test]
    fn dandas_and_digits() {
        assert_eq!(to_iast("धर्मः।।१२।।"), "dharmaḥ..12..");
        assert_eq!(to_iast("॥"), "..");
    }

    #[test]
    fn nukta_maps_to_base_consonant() {
        assert_eq!(to_iast("ड़"), "ḍa");
        assert_eq!(to_iast("\u{095C}"), "ḍa");
    }

    #[test]
    fn latin_passes_through() {
        assert_eq!(to_iast("verse 12: राम"), "verse 12: rāma");
        assert_eq!(to_iast(""), "");
    }

    #[test]
    fn trait_impl_never_fails() {
        let t = IastTransliterator;
        assert_eq!(t.transliterate("मात्रा").unwrap(), "mātrā");
    }
}
