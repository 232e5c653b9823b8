mod common;

use common::MockUniverse;
use reliefseq::error::SelectionError;
use reliefseq::feature_selection::exclude_attributes;
use reliefseq::universe::AttributeUniverse;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_unknown_and_repeated_names_are_skipped() {
    let mut universe = MockUniverse::numbered(5);
    let removed = exclude_attributes(&mut universe, &names(&["a001", "nope", "a001", "a004"])).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(universe.attribute_names(), vec!["a000", "a002", "a003"]);
}

#[test]
fn test_empty_list_changes_nothing() {
    let mut universe = MockUniverse::numbered(3);
    assert_eq!(exclude_attributes(&mut universe, &[]).unwrap(), 0);
    assert_eq!(universe.attribute_count(), 3);
}

#[test]
fn test_excluding_everything_is_a_configuration_failure() {
    let mut universe = MockUniverse::numbered(2);
    let err = exclude_attributes(&mut universe, &names(&["a000", "a001"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Configuration(_))
    ));
    assert_eq!(universe.attribute_count(), 2);
}

#[test]
fn test_refused_removal_is_a_mutation_failure() {
    let mut universe = MockUniverse::numbered(4);
    universe.reject = Some("a002".to_string());
    let err = exclude_attributes(&mut universe, &names(&["a002"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Mutation(_))
    ));
}
