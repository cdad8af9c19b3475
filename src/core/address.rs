// HFN / MFA string parsing and formatting
//
// HFN: Layer.Category.Subcategory[.Sequential[.Extension...]]
// MFA: LayerNum.CategoryNum.SubcategoryNum[.Sequential[.Extension...]]
use crate::core::error::LookupError;
use crate::core::types::{is_digits, numeric_value, AlphaPath, NumericPath};

/// Sequential and trailing segments shared by both address formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tail {
    //already padded to 3 digits
    pub sequential: Option<String>,
    //passed through unchanged, in order
    pub rest: Vec<String>,
}

impl Tail {
    //appends ".seq.ext..." to an already formatted L.C.S head
    pub fn append_to(&self, mut head: String) -> String {
        if let Some(seq) = &self.sequential {
            head.push('.');
            head.push_str(seq);
        }
        for seg in &self.rest {
            head.push('.');
            head.push_str(seg);
        }
        head
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHfn {
    //codes exactly as written, case is normalized at lookup
    pub path: AlphaPath,
    pub tail: Tail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMfa {
    pub path: NumericPath,
    pub tail: Tail,
}

fn malformed(input: &str, reason: &'static str) -> LookupError {
    LookupError::Malformed { input: input.to_string(), reason }
}

fn split_segments<'a>(input: &'a str) -> Result<Vec<&'a str>, LookupError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(malformed(input, "empty address"));
    }

    let segments: Vec<&str> = trimmed.split('.').map(str::trim).collect();
    if segments.len() < 3 {
        return Err(malformed(input, "expected at least three dot-separated segments"));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(malformed(input, "empty segment"));
    }
    Ok(segments)
}

/// Zero-pad a sequential counter to 3 digits. Longer counters are kept as-is.
pub fn pad_sequential(raw: &str) -> Option<String> {
    //digits only, any length; the counter is never interpreted as a number
    is_digits(raw).then(|| format!("{raw:0>3}"))
}

fn parse_tail(input: &str, segments: &[&str]) -> Result<Tail, LookupError> {
    let sequential = match segments.first() {
        Some(raw) => Some(
            pad_sequential(raw).ok_or_else(|| malformed(input, "sequential must be numeric"))?,
        ),
        None => None,
    };
    let rest = segments.iter().skip(1).map(|s| s.to_string()).collect();
    Ok(Tail { sequential, rest })
}

pub fn parse_hfn(input: &str) -> Result<ParsedHfn, LookupError> {
    let segments = split_segments(input)?;
    let path = AlphaPath::new(segments[0], segments[1], segments[2]);
    let tail = parse_tail(input, &segments[3..])?;
    Ok(ParsedHfn { path, tail })
}

pub fn parse_mfa(input: &str) -> Result<ParsedMfa, LookupError> {
    let segments = split_segments(input)?;

    let mut numbers = [0u32; 3];
    for (slot, raw) in numbers.iter_mut().zip(&segments[..3]) {
        *slot = numeric_value(raw).ok_or_else(|| malformed(input, "MFA segments must be numeric"))?;
    }

    let path = NumericPath::new(numbers[0], numbers[1], numbers[2]);
    let tail = parse_tail(input, &segments[3..])?;
    Ok(ParsedMfa { path, tail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hfn_with_sequential_and_extension() {
        let parsed = parse_hfn("W.BCH.SUN.2.mp4").unwrap();
        assert_eq!(parsed.path, AlphaPath::new("W", "BCH", "SUN"));
        assert_eq!(
            parsed.tail,
            Tail { sequential: Some("002".to_string()), rest: vec!["mp4".to_string()] }
        );
    }

    #[test]
    fn three_segments_have_no_tail() {
        let parsed = parse_hfn(" s.pop.hpm ").unwrap();
        assert_eq!(parsed.path, AlphaPath::new("s", "pop", "hpm"));
        assert_eq!(parsed.tail.sequential, None);
        assert!(parsed.tail.rest.is_empty());
    }

    #[test]
    fn too_few_or_empty_segments_are_malformed() {
        for bad in ["", "garbage", "W.BCH", "W..SUN.001", "W.BCH.SUN.001."] {
            let err = parse_hfn(bad).unwrap_err();
            assert!(matches!(err, LookupError::Malformed { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn non_numeric_sequential_is_malformed() {
        let err = parse_hfn("W.BCH.SUN.abc").unwrap_err();
        match err {
            LookupError::Malformed { reason, .. } => assert_eq!(reason, "sequential must be numeric"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn sequential_wider_than_u32_is_kept() {
        let parsed = parse_hfn("W.BCH.SUN.4294967296").unwrap();
        assert_eq!(parsed.tail.sequential.as_deref(), Some("4294967296"));
        assert_eq!(pad_sequential("07").as_deref(), Some("007"));
        assert_eq!(pad_sequential("+7"), None);
    }

    #[test]
    fn mfa_numbers_compare_by_value() {
        let parsed = parse_mfa("10.2.003.0001.png").unwrap();
        assert_eq!(parsed.path, NumericPath::new(10, 2, 3));
        assert_eq!(parsed.tail.sequential.as_deref(), Some("0001"));
        assert_eq!(parsed.tail.rest, vec!["png".to_string()]);
    }

    #[test]
    fn mfa_rejects_alphabetic_segments() {
        assert!(parse_mfa("W.004.003.001").is_err());
    }

    #[test]
    fn tail_appends_in_order() {
        let tail = Tail { sequential: Some("001".into()), rest: vec!["a".into(), "b".into()] };
        assert_eq!(tail.append_to("5.004.003".into()), "5.004.003.001.a.b");
    }
}
