//! Demonstration RPC service: a handful of toy operations exposed through
//! an [`objrpc::RpcServer`], with a config file and CLI around it.

pub mod config;
pub mod logging;

use objrpc::{Error, Registry, RemoteError};
use serde_json::{json, Map, Value};

// set via _compile-time_ envars
const GIT_BRANCH: Option<&'static str> = option_env!("GIT_BRANCH");
const GIT_COMMIT: Option<&'static str> = option_env!("GIT_COMMIT");

#[cfg(debug_assertions)]
const BUILD_TYPE: &str = "debug";
#[cfg(not(debug_assertions))]
const BUILD_TYPE: &str = "release";

pub fn version() -> String {
    format!(
        "pinger {} {} {}",
        BUILD_TYPE,
        GIT_BRANCH.unwrap_or(""),
        GIT_COMMIT.unwrap_or("")
    )
}

/// Builds the demonstration registry.
pub fn registry() -> Result<Registry, Error> {
    let mut registry = Registry::new();
    registry.register("ping", "Returns PONG, and just for testing.", |_args, _kwargs| {
        Ok(json!("PONG"))
    })?;
    registry.register("echo", "Responds back to the caller.", |args, _kwargs| {
        let message = args.into_iter().next().unwrap_or(Value::Null);
        Ok(json!(format!("I received: {}", text(&message))))
    })?;
    registry.register(
        "story",
        "Responds back to the caller with food.",
        |args, kwargs| {
            let food = argument(&args, &kwargs, 0, "food", "cheese");
            let effect = argument(&args, &kwargs, 1, "effect", "moldy");
            Ok(json!(format!("The {food} is {effect}")))
        },
    )?;
    registry.register("raise_error", "Just raises an error.", |_args, _kwargs| {
        Err(RemoteError::new("NotImplementedError", "Not today!"))
    })?;
    Ok(registry)
}

/// Renders a value for humans: strings bare, everything else as JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Looks an argument up positionally first, then by keyword.
fn argument<'a>(
    args: &'a [Value],
    kwargs: &'a Map<String, Value>,
    index: usize,
    key: &str,
    default: &'a str,
) -> &'a str {
    args.get(index)
        .or_else(|| kwargs.get(key))
        .and_then(Value::as_str)
        .unwrap_or(default)
}
