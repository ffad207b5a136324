use trellis::{
    App, ConfigurationError, DispatchError, ExceptionType,
    exception::{ANY, DISPATCH_ERROR, NO_ROUTE},
    testing::RecordingHandler,
};

mod common;
use common::{APP_VALUE_ERROR, VALUE_ERROR, exception_handler, exception_raiser, get, text};

#[test]
fn test_subtype_registered_first_wins() {
    let specific = RecordingHandler::new();
    let general = RecordingHandler::new();
    let mut app = App::new();
    app.add_route("/", exception_raiser, [])
        .unwrap()
        .add_error_handler(&APP_VALUE_ERROR, specific.clone(), [])
        .unwrap()
        .add_error_handler(&VALUE_ERROR, general.clone(), [])
        .unwrap();

    app.get_response(get("/")).unwrap();
    assert_eq!(specific.count(), 1);
    assert_eq!(general.count(), 0);
}

#[test]
fn test_parent_registered_first_wins() {
    let specific = RecordingHandler::new();
    let general = RecordingHandler::new();
    let mut app = App::new();
    app.add_route("/", exception_raiser, [])
        .unwrap()
        .add_error_handler(&VALUE_ERROR, general.clone(), [])
        .unwrap()
        .add_error_handler(&APP_VALUE_ERROR, specific.clone(), [])
        .unwrap();

    app.get_response(get("/")).unwrap();
    assert_eq!(specific.count(), 0);
    assert_eq!(general.count(), 1);
    assert_eq!(general.calls()[0].exception, Some("AppValueError"));
    assert_eq!(general.calls()[0].path.as_deref(), Some("/"));
}

#[test]
fn test_builtin_hierarchy() {
    let mut app = App::new();
    app.add_error_handler(&DISPATCH_ERROR, exception_handler, [])
        .unwrap();

    let response = app.get_response(get("/nowhere")).unwrap();
    assert!(text(&response).starts_with("silenced NoRoute"));
    assert!(NO_ROUTE.is_a(&DISPATCH_ERROR));
}

#[test]
fn test_catch_all() {
    let mut app = App::new();
    app.add_error_handler(&ANY, exception_handler, []).unwrap();
    let response = app.get_response(get("/nowhere")).unwrap();
    assert!(text(&response).starts_with("silenced NoRoute"));
}

#[test]
fn test_duplicate_kind_rejected() {
    let mut app = App::new();
    app.add_error_handler(&VALUE_ERROR, exception_handler, [])
        .unwrap();
    assert_eq!(
        app.add_error_handler(&VALUE_ERROR, exception_handler, [])
            .unwrap_err(),
        ConfigurationError::DuplicateErrorHandler { kind: "ValueError" }
    );
    app.add_error_handler(&APP_VALUE_ERROR, exception_handler, [])
        .unwrap();
}

#[test]
fn test_no_handlers_at_all() {
    let app = App::new();
    let err = app.get_response(get("/")).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::NoErrorHandler { kind: "NoRoute", .. }
    ));
}

#[test]
fn test_same_named_kind_does_not_shadow_builtin() {
    static LOOKALIKE: ExceptionType = ExceptionType::root("NoRoute");
    let lookalike = RecordingHandler::new();
    let mut app = App::new();
    app.add_error_handler(&LOOKALIKE, lookalike.clone(), [])
        .unwrap();

    let err = app.get_response(get("/nowhere")).unwrap_err();
    assert!(matches!(err, DispatchError::NoErrorHandler { .. }));
    assert_eq!(lookalike.count(), 0);

    app.add_error_handler(&NO_ROUTE, exception_handler, [])
        .unwrap();
    let response = app.get_response(get("/nowhere")).unwrap();
    assert!(text(&response).starts_with("silenced NoRoute"));
    assert_eq!(lookalike.count(), 0);
}
