#![allow(dead_code)]

use serde_json::{Value, json};
use trellis::{
    App, Exception, ExceptionType, Invocation, RequestParts, Resolution, Response,
    dispatch::MethodDispatch, handler_fn, output::json as json_output,
};

// ============================================================================
// Exception Kinds
// ============================================================================

pub static VALUE_ERROR: ExceptionType = ExceptionType::root("ValueError");
pub static APP_VALUE_ERROR: ExceptionType = ExceptionType::subtype("AppValueError", &VALUE_ERROR);
pub static TYPE_ERROR: ExceptionType = ExceptionType::root("TypeError");

// ============================================================================
// Handlers
// ============================================================================

pub fn ok_response(inv: &Invocation<'_>) -> Result<Value, Exception> {
    let n: i64 = inv.param_as("randomvalue")?;
    Ok(json!({ "yay": n }))
}

pub fn exception_raiser(_: &Invocation<'_>) -> Result<Value, Exception> {
    Err(Exception::new(&APP_VALUE_ERROR, "test"))
}

pub fn exception_handler(inv: &Invocation<'_>) -> String {
    match inv.exception() {
        Some(exc) => format!("silenced {}, value: {}", exc.kind(), exc.message()),
        None => "silenced nothing".to_string(),
    }
}

/// A factory that builds a per-request object, which picks a method handler,
/// which for POST hands back yet another function.
pub fn convoluted_response(_: &Invocation<'_>) -> Resolution {
    let post_step = handler_fn(|_inv| {
        Resolution::next(|inv: &Invocation<'_>| {
            json!({ "called": "post", "kwarg": inv.param("test") })
        })
    });
    Resolution::next(
        MethodDispatch::new()
            .get(|inv: &Invocation<'_>| json!({ "called": "get", "kwarg": inv.param("test") }))
            .post(post_step),
    )
}

// ============================================================================
// Helpers
// ============================================================================

pub fn app_with_raiser() -> App {
    let mut app = App::new();
    app.add_route("/", exception_raiser, [json_output()])
        .unwrap()
        .add_error_handler(&VALUE_ERROR, exception_handler, [json_output()])
        .unwrap();
    app
}

pub fn get(path: &str) -> RequestParts {
    RequestParts::new("GET", path).accept("application/json")
}

pub fn text(response: &Response) -> &str {
    response.body.as_text().unwrap()
}

pub fn body_json(response: &Response) -> Value {
    serde_json::from_slice(response.body.as_bytes()).unwrap()
}
