//! Merging of per-photograph extraction results.
//!
//! The first photograph has priority. Address and date fall back to the
//! second photograph independently; plate and code are coupled, with one
//! exception: a first-photograph plate that has no code may borrow the code
//! found on the second photograph.

use crate::models::{ExtractedFields, MergedRecord};

/// Merge up to two extraction results in priority order.
///
/// Results that carry an error contribute nothing. Disagreements between
/// non-empty values are resolved silently in favour of the first source.
pub fn merge_fields(
    first: Option<&ExtractedFields>,
    second: Option<&ExtractedFields>,
) -> MergedRecord {
    let a = usable(first);
    let b = usable(second);

    let (plate, code) = match a.plate {
        Some(plate) => (Some(plate), a.code.or(b.code)),
        None if b.plate.is_some() => (b.plate, b.code),
        // No plate anywhere: keep whichever code exists so that merging with
        // an empty result never drops a field.
        None => (None, a.code.or(b.code)),
    };

    MergedRecord {
        address: a.address.or(b.address),
        date: a.date.or(b.date),
        plate,
        code,
    }
}

fn usable(fields: Option<&ExtractedFields>) -> MergedRecord {
    fields
        .filter(|f| !f.is_error())
        .map(MergedRecord::from)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(address: &str, date: &str, plate: &str, code: &str) -> ExtractedFields {
        let opt = |s: &str| Some(s.to_string());
        ExtractedFields {
            address: opt(address),
            date: opt(date),
            plate: opt(plate),
            code: opt(code),
            error: None,
        }
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let f = fields("中山路12號", "113年5月2日", "KEL-0283", "112");
        let empty = ExtractedFields::default();

        assert_eq!(merge_fields(Some(&f), Some(&empty)), MergedRecord::from(&f));
        assert_eq!(merge_fields(Some(&empty), Some(&f)), MergedRecord::from(&f));
        assert_eq!(merge_fields(Some(&f), None), MergedRecord::from(&f));
        assert_eq!(merge_fields(None, Some(&f)), MergedRecord::from(&f));
    }

    #[test]
    fn test_first_plate_borrows_second_code() {
        let a = fields("", "", "ABC-1234", "");
        let b = fields("X路1號", "", "", "999");

        let merged = merge_fields(Some(&a), Some(&b));
        assert_eq!(
            merged,
            MergedRecord {
                address: Some("X路1號".to_string()),
                date: None,
                plate: Some("ABC-1234".to_string()),
                code: Some("999".to_string()),
            }
        );
    }

    #[test]
    fn test_first_source_wins_conflicts() {
        let a = fields("中山路12號", "113年5月2日", "KEL-0283", "112");
        let b = fields("民生街8號", "113年6月1日", "ABC-1234", "305");

        let merged = merge_fields(Some(&a), Some(&b));
        assert_eq!(merged, MergedRecord::from(&a));
    }

    #[test]
    fn test_missing_first_plate_takes_second_plate_and_code() {
        let a = fields("中山路12號", "", "", "");
        let b = fields("", "113年5月2日", "ABC-1234", "305");

        let merged = merge_fields(Some(&a), Some(&b));
        assert_eq!(merged.address.as_deref(), Some("中山路12號"));
        assert_eq!(merged.date.as_deref(), Some("113年5月2日"));
        assert_eq!(merged.plate.as_deref(), Some("ABC-1234"));
        assert_eq!(merged.code.as_deref(), Some("305"));
    }

    #[test]
    fn test_second_plate_without_code_keeps_code_empty() {
        let a = fields("", "", "", "");
        let b = fields("", "", "ABC-1234", "");

        let merged = merge_fields(Some(&a), Some(&b));
        assert_eq!(merged.plate.as_deref(), Some("ABC-1234"));
        assert_eq!(merged.code, None);
    }

    #[test]
    fn test_codes_without_any_plate() {
        let a = fields("", "", "", "112");
        let b = fields("", "", "", "305");
        let empty = ExtractedFields::default();

        assert_eq!(merge_fields(Some(&a), Some(&b)).code.as_deref(), Some("112"));
        assert_eq!(merge_fields(Some(&empty), Some(&b)).code.as_deref(), Some("305"));
        assert_eq!(merge_fields(Some(&a), Some(&empty)).code.as_deref(), Some("112"));
        assert_eq!(merge_fields(Some(&a), Some(&b)).plate, None);
    }

    #[test]
    fn test_code_without_plate_is_dropped_for_second_plate() {
        let a = fields("", "", "", "112");
        let b = fields("", "", "ABC-1234", "");

        let merged = merge_fields(Some(&a), Some(&b));
        assert_eq!(merged.plate.as_deref(), Some("ABC-1234"));
        assert_eq!(merged.code, None);
    }

    #[test]
    fn test_failed_source_contributes_nothing() {
        let failed = ExtractedFields {
            address: Some("should be ignored".to_string()),
            ..ExtractedFields::failed("OCR failed: boom")
        };
        let b = fields("民生街8號", "", "ABC-1234", "305");

        let merged = merge_fields(Some(&failed), Some(&b));
        assert_eq!(merged, MergedRecord::from(&b));
    }
}
