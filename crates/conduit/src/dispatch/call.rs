//! Handler for the `Call` category: invoking bound application methods.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, info_span};

use conduit_types::CallOptions;

use super::errors::DispatchError;
use super::request::{METHOD_ID_HEADER, RuntimeRequest};
use super::router::DISPATCH_TARGET;
use crate::correlator::{CallFailure, CallId, Channel, Completion, Correlator};
use crate::registry::{Bindings, BoundMethod};
use crate::window::Window;

/// Argument carrying the correlation id of a call.
pub const CALL_ID: &str = "call-id";

/// Methods of the `Call` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMethod {
    /// Invoke a bound method.
    Call,
}

impl CallMethod {
    /// Parses a method name within the category.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownMethod`] for any other name.
    pub fn parse(method: &str) -> Result<Self, DispatchError> {
        match method {
            "Call" => Ok(Self::Call),
            _ => Err(DispatchError::unknown_method("Call", method)),
        }
    }
}

/// Resolves and launches a bound method call.
///
/// Only a missing or unreadable `call-id` fails on the transport. Once the id
/// is known every failure is delivered as the call's outcome and the request
/// is acknowledged.
pub(super) fn handle(
    bindings: &Bindings,
    correlator: &Correlator,
    window: &Arc<dyn Window>,
    request: &RuntimeRequest,
) -> Result<(), DispatchError> {
    let CallMethod::Call = CallMethod::parse(request.method())?;

    let args = request
        .params()
        .args()
        .map_err(|source| DispatchError::MalformedArguments { source })?;
    let Some(call_id) = args.string(CALL_ID) else {
        error!(
            target: DISPATCH_TARGET,
            window = %window.id(),
            "{CALL_ID} is required"
        );
        return Err(DispatchError::missing_id(CALL_ID));
    };

    let completion =
        correlator.completion(Arc::clone(window), Channel::Call, CallId::new(call_id));

    let options: CallOptions = match request.params().to_struct() {
        Ok(options) => options,
        Err(source) => {
            completion.fail(&CallFailure::Options(source));
            return Ok(());
        }
    };

    let method = match resolve(bindings, request, &options) {
        Ok(method) => method,
        Err(failure) => {
            completion.fail(&failure);
            return Ok(());
        }
    };

    debug!(
        target: DISPATCH_TARGET,
        id = %completion.id(),
        binding = %method,
        "resolved bound method"
    );
    let CallOptions { args, .. } = options;
    correlator.launch(completion, move |completion| {
        invoke(&method, &args, completion);
    });
    Ok(())
}

/// Picks the bound method: a non-zero id header wins over the signature.
fn resolve(
    bindings: &Bindings,
    request: &RuntimeRequest,
    options: &CallOptions,
) -> Result<Arc<BoundMethod>, CallFailure> {
    let id = match request.headers().get(METHOD_ID_HEADER) {
        Some(raw) => raw.parse::<u32>().map_err(CallFailure::MethodId)?,
        None => 0,
    };

    let method = if id == 0 {
        bindings.get(&options.signature())
    } else {
        bindings.get_by_id(id)
    };
    method.ok_or_else(|| CallFailure::NotFound {
        method: if options.method_name.is_empty() {
            format!("#{id}")
        } else {
            options.method_name.clone()
        },
    })
}

/// Runs the bound method inside a span carrying the method and arguments,
/// so invocation and encoding failures are logged with that context.
fn invoke(method: &BoundMethod, args: &[Value], completion: &Completion) {
    let _span = info_span!(
        target: DISPATCH_TARGET,
        "call",
        id = %completion.id(),
        method = %method,
        args = ?args
    )
    .entered();
    match method.call(args) {
        Ok(result) => {
            if completion.succeed_with(result.as_deref()) {
                info!(
                    target: DISPATCH_TARGET,
                    method = %method,
                    args = ?args,
                    result = ?result,
                    "Call Binding"
                );
            }
        }
        Err(error) => {
            completion.fail(&CallFailure::Invocation(error));
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::tests::support::{RecordingWindow, calc, calculator, capture_logs};

    #[test]
    fn parses_known_method_only() {
        assert_eq!(CallMethod::parse("Call").ok(), Some(CallMethod::Call));
        let error = CallMethod::parse("Invoke").expect_err("unknown method");
        assert_eq!(error.to_string(), "unknown Call method: Invoke");
    }

    #[rstest]
    #[case::invocation("Fail", "Error calling method: division by zero")]
    #[case::encoding("Unencodable", "Error converting result to json: ")]
    fn failures_are_logged_with_method_and_arguments(
        #[case] name: &str,
        #[case] message: &str,
    ) {
        let bindings = calculator();
        let method = bindings.get(&calc(name)).expect("bound method");
        let correlator = Correlator::new().expect("start correlator");
        let completion =
            correlator.completion(RecordingWindow::new(1, "main"), Channel::Call, CallId::new("c9"));

        let logs = capture_logs(|| invoke(&method, &[json!({ "a": 41 })], &completion));

        let line = logs
            .lines()
            .find(|line| line.contains("ERROR"))
            .expect("failure logged at error level");
        assert!(line.contains(message), "missing failure text: {line}");
        assert!(line.contains(&format!("main.Calc.{name}")), "missing method: {line}");
        assert!(line.contains("args="), "missing arguments: {line}");
        assert!(line.contains("41"), "missing argument values: {line}");
    }
}
