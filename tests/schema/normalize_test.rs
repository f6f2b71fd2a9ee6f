use proptest::prelude::*;

use pneumo_linkage::algorithm::linkage::gaussian_similarity;
use pneumo_linkage::models::AgeGroup;
use pneumo_linkage::schema::normalize::{
    bucket_age, canonicalize_municipality, is_in_diagnosis_set, parse_date,
};

proptest! {
    #[test]
    fn municipality_is_six_digits(raw in "[A-Z ]{0,3}[0-9]{1,9}[A-Z-]{0,3}") {
        let code = canonicalize_municipality(Some(&raw)).unwrap();
        prop_assert_eq!(code.len(), 6);
        prop_assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn municipality_is_idempotent(raw in "\\PC{0,12}") {
        let once = canonicalize_municipality(Some(&raw));
        let twice = canonicalize_municipality(once.as_deref());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn known_ages_get_exactly_one_bucket(age in 0.0f64..130.0) {
        let group = bucket_age(Some(age));
        prop_assert_ne!(group, AgeGroup::Unknown);
        let matching = AgeGroup::ALL
            .iter()
            .filter(|group| group.contains(age))
            .count();
        prop_assert_eq!(matching, 1);
    }

    #[test]
    fn negative_ages_are_unknown(age in -200.0f64..-1e-9) {
        prop_assert_eq!(bucket_age(Some(age)), AgeGroup::Unknown);
    }

    #[test]
    fn gaussian_similarity_is_symmetric_and_bounded(d in -1e3f64..1e3, scale in 0.1f64..50.0) {
        let s = gaussian_similarity(d, scale);
        prop_assert!((0.0..=1.0).contains(&s));
        prop_assert_eq!(s, gaussian_similarity(-d, scale));
        prop_assert!(gaussian_similarity(d.abs() + 1.0, scale) <= s);
    }

    #[test]
    fn iso_and_compact_dates_agree(y in 1990i32..2030, m in 1u32..=12, d in 1u32..=28) {
        let iso = format!("{y:04}-{m:02}-{d:02}");
        let compact = format!("{d:02}{m:02}{y:04}");
        prop_assert_eq!(parse_date(Some(&iso)), parse_date(Some(&compact)));
        prop_assert!(parse_date(Some(&iso)).is_some());
    }
}

#[test]
fn test_pneumonia_range_membership() {
    for code in ["J120", "J13", "J18X1", "j159"] {
        assert!(is_in_diagnosis_set(Some(code)), "{code}");
    }
    for code in ["J11", "A09", "", "J19"] {
        assert!(!is_in_diagnosis_set(Some(code)), "{code}");
    }
    assert!(!is_in_diagnosis_set(None));
}
