use super::ApiError;

#[test]
fn it_displays_the_message() {
    let err = ApiError::with_status(422, "The email field is required.");
    insta::assert_snapshot!(err.to_string(), @"The email field is required.");
    assert_eq!(err.status(), Some(422));
}

#[test]
fn it_marks_network_errors() {
    assert!(ApiError::network().is_network());
    assert!(ApiError::timeout().is_network());
    assert!(!ApiError::with_status(500, "Network error: upstream").is_network());
    assert!(!ApiError::new("Server exploded").is_network());
}
