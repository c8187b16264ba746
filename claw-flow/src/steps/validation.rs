//! Syntactic input checks shared by the step handlers and the graph guards.
//! Nothing here inspects meaning: only lengths, field counts and a small
//! fixed vocabulary.

pub const MACHINE_NUMBER_MIN_CHARS: usize = 3;
pub const LOCATION_MIN_CHARS: usize = 10;
pub const CLAIM_FIELD_COUNT: usize = 3;

pub const RESOLVED_PHRASE: &str = "แก้ได้";
pub const NOT_RESOLVED_PHRASE: &str = "ไม่ได้";
const RESOLVED_WORDS: [&str; 2] = ["ok", "yes"];
const NOT_RESOLVED_WORDS: [&str; 1] = ["no"];

pub const EVIDENCE_PHRASE: &str = "ส่งหลักฐานเรียบร้อย";
/// Substring of [`EVIDENCE_PHRASE`]; any message containing it counts.
pub const EVIDENCE_KEYWORD: &str = "เรียบร้อย";

/// A troubleshooting answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Resolved,
    NotResolved,
    Unrecognized,
}

pub fn classify_answer(input: &str) -> Answer {
    let normalized = input.trim().to_lowercase();
    let resolved = normalized.contains(RESOLVED_PHRASE)
        || RESOLVED_WORDS.contains(&normalized.as_str());
    let not_resolved = normalized.contains(NOT_RESOLVED_PHRASE)
        || NOT_RESOLVED_WORDS.contains(&normalized.as_str());

    match (resolved, not_resolved) {
        (true, false) => Answer::Resolved,
        (false, true) => Answer::NotResolved,
        // both or neither
        _ => Answer::Unrecognized,
    }
}

/// Length in characters, not bytes.
pub fn has_min_chars(input: &str, min: usize) -> bool {
    input.chars().count() >= min
}

/// First `N` comma-separated fields, trimmed. `None` when there are fewer
/// than `N`; extra fields are ignored.
pub fn split_fields<const N: usize>(input: &str) -> Option<[&str; N]> {
    let mut parts = input.split(',').map(str::trim);
    let mut fields = [""; N];
    for field in fields.iter_mut() {
        *field = parts.next()?;
    }
    Some(fields)
}

pub fn mentions_evidence(input: &str) -> bool {
    input.contains(EVIDENCE_KEYWORD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_classified() {
        assert_eq!(classify_answer("แก้ได้"), Answer::Resolved);
        assert_eq!(classify_answer("แก้ได้แล้วครับ"), Answer::Resolved);
        assert_eq!(classify_answer("OK"), Answer::Resolved);
        assert_eq!(classify_answer(" yes "), Answer::Resolved);
        assert_eq!(classify_answer("ไม่ได้"), Answer::NotResolved);
        assert_eq!(classify_answer("ยังแก้ไม่ได้"), Answer::NotResolved);
        assert_eq!(classify_answer("No"), Answer::NotResolved);
        assert_eq!(classify_answer("maybe"), Answer::Unrecognized);
        assert_eq!(classify_answer("okay"), Answer::Unrecognized);
    }

    #[test]
    fn ambiguous_answers_are_rejected() {
        assert_eq!(classify_answer("แก้ได้ ไม่ได้"), Answer::Unrecognized);
    }

    #[test]
    fn length_counts_characters() {
        assert!(has_min_chars("A01", 3));
        assert!(!has_min_chars("A0", 3));
        // three Thai characters, nine bytes
        assert!(has_min_chars("กขค", 3));
        assert!(!has_min_chars("กข", 3));
    }

    #[test]
    fn fields_are_split_and_trimmed() {
        assert_eq!(
            split_fields::<3>(" a , b ,c "),
            Some(["a", "b", "c"])
        );
        assert_eq!(split_fields::<3>("a,b,c,d"), Some(["a", "b", "c"]));
        assert_eq!(split_fields::<3>("a,b,"), Some(["a", "b", ""]));
        assert_eq!(split_fields::<3>("a,b"), None);
        assert_eq!(split_fields::<3>("abc"), None);
    }

    #[test]
    fn evidence_keyword_matches_canonical_phrase() {
        assert!(mentions_evidence(EVIDENCE_PHRASE));
        assert!(mentions_evidence("ส่งแล้ว เรียบร้อย"));
        assert!(!mentions_evidence("ส่งแล้ว"));
    }
}
