use serde_json::{Value, json};
use trellis::{
    AbsentAccept, App, AppConfig, BoxError, Context, DispatchError, Invocation, RequestParts,
    output::{Output, TemplateEngine, json as json_output, template, template_with},
};

mod common;
use common::{get, text};

/// Replaces `{{key}}` with the string form of the context value.
struct Substitute;

impl TemplateEngine for Substitute {
    fn render(&self, source: &str, context: &Context) -> Result<String, BoxError> {
        Ok(context.iter().fold(source.to_string(), |out, (key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.replace(&format!("{{{{{key}}}}}"), &text)
        }))
    }
}

fn page(_: &Invocation<'_>) -> Value {
    json!({"template": "<h1>{{title}}</h1>", "title": "Hello"})
}

fn app_with(outputs: Vec<Output>) -> App {
    let mut app = App::new();
    app.add_route("/", page, outputs).unwrap();
    app
}

fn with_accept(accept: &str) -> RequestParts {
    RequestParts::new("GET", "/").accept(accept)
}

#[test]
fn test_json_selected_by_accept() {
    let app = app_with(vec![template_with(Substitute), json_output()]);
    let response = app.get_response(get("/")).unwrap();
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert!(text(&response).starts_with("{\n    \"template\""));
}

#[test]
fn test_html_selected_by_quality() {
    let app = app_with(vec![json_output(), template_with(Substitute)]);
    let response = app
        .get_response(with_accept("application/json;q=0.5, text/html"))
        .unwrap();
    assert_eq!(response.content_type.as_deref(), Some("text/html"));
    assert_eq!(text(&response), "<h1>Hello</h1>");
}

#[test]
fn test_unregistered_type_fails() {
    let app = app_with(vec![json_output()]);
    let err = app.get_response(with_accept("image/png")).unwrap_err();
    // No exception handler is registered, so the negotiation failure surfaces
    // as the missing handler for it.
    match err {
        DispatchError::NoErrorHandler { kind, .. } => assert_eq!(kind, "NoOutputHandler"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_template_without_engine_fails_at_render_time() {
    // Registration succeeds; only rendering reports the missing engine.
    let app = app_with(vec![template()]);
    let err = app.get_response(with_accept("text/html")).unwrap_err();
    match err {
        DispatchError::NoErrorHandler { exception, .. } => {
            assert!(matches!(
                exception.downcast_source::<DispatchError>(),
                Some(DispatchError::RendererUnavailable { .. })
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_absent_accept_policy() {
    let strict = app_with(vec![json_output()]);
    assert!(
        strict
            .get_response(RequestParts::new("GET", "/"))
            .is_err()
    );

    let config = AppConfig::default().with_absent_accept(AbsentAccept::AcceptAny);
    let mut lenient = App::with_config(config).unwrap();
    lenient.add_route("/", page, [json_output()]).unwrap();
    let response = lenient.get_response(RequestParts::new("GET", "/")).unwrap();
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
}

#[test]
fn test_wildcard_takes_first_offer() {
    let app = app_with(vec![template_with(Substitute), json_output()]);
    let response = app.get_response(with_accept("*/*")).unwrap();
    assert_eq!(response.content_type.as_deref(), Some("text/html"));
}

#[test]
fn test_explicit_type_beats_wildcard_offer() {
    let app = app_with(vec![template_with(Substitute), json_output()]);
    let response = app
        .get_response(with_accept("application/json, text/plain, */*"))
        .unwrap();
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert!(text(&response).starts_with("{\n    \"template\""));
}
