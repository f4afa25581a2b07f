//! AWS Lambda handler for interest calculations
//!
//! Accepts a calculation request as JSON, either directly or as the body of
//! a Lambda Function URL event, and returns a bank comparison or the best
//! deposit splits.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::collections::BTreeMap;

use interest_engine::optimizer::{
    optimize_with_spend, DepositOptimizer, OptimizerConfig, PlannedSolution, Silent,
};
use interest_engine::{
    compare_banks, BankSchedules, CalculationRequest, Comparison, EngineError, ErrorKind,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Mode {
    #[default]
    Compare,
    Optimize,
}

/// Input for one calculation
#[derive(Debug, Deserialize)]
struct InterestRequest {
    #[serde(default)]
    mode: Mode,

    /// Monthly card spend to route across an optimized split
    #[serde(default)]
    total_spend: f64,

    #[serde(flatten)]
    calculation: CalculationRequest,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum InterestResponse {
    Compare(Comparison),
    Optimize {
        total_amount: f64,
        solutions: Vec<PlannedSolution>,
        execution_time_ms: u64,
    },
}

/// Function URL response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HttpResponse {
    status_code: u16,
    headers: BTreeMap<&'static str, &'static str>,
    body: String,
}

fn cors_headers() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ])
}

fn json_response(status_code: u16, body: String) -> HttpResponse {
    HttpResponse {
        status_code,
        headers: cors_headers(),
        body,
    }
}

fn error_response(status_code: u16, error: &EngineError) -> HttpResponse {
    let body = serde_json::json!({
        "error": error.to_string(),
        "field": error.field(),
    });
    json_response(status_code, body.to_string())
}

fn calculate(
    request: &InterestRequest,
    schedules: &BankSchedules,
) -> Result<InterestResponse, EngineError> {
    request.calculation.validate()?;
    let requirements = &request.calculation.requirements;

    match request.mode {
        Mode::Compare => Ok(InterestResponse::Compare(compare_banks(
            request.calculation.deposit_amount,
            schedules,
            requirements,
        ))),
        Mode::Optimize => {
            let start = std::time::Instant::now();
            let optimizer = DepositOptimizer::new(OptimizerConfig::from_env()?);
            let solutions = optimize_with_spend(
                &optimizer,
                request.calculation.deposit_amount,
                request.total_spend,
                schedules,
                requirements,
                &Silent,
            )?;
            Ok(InterestResponse::Optimize {
                total_amount: request.calculation.deposit_amount,
                solutions,
                execution_time_ms: start.elapsed().as_millis() as u64,
            })
        }
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<Value>) -> Result<HttpResponse, Error> {
    let payload = event.payload;

    // Handle CORS preflight
    let method = payload
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str);
    if method == Some("OPTIONS") {
        return Ok(json_response(200, String::new()));
    }

    // Function URL events carry the request as a JSON string body
    let parsed = match payload.get("body") {
        Some(Value::String(body)) => serde_json::from_str::<InterestRequest>(body),
        Some(Value::Null) => serde_json::from_str::<InterestRequest>("{}"),
        _ => serde_json::from_value::<InterestRequest>(payload),
    };
    let request = match parsed {
        Ok(request) => request,
        Err(e) => {
            let body = serde_json::json!({ "error": format!("Invalid JSON: {}", e) });
            return Ok(json_response(400, body.to_string()));
        }
    };

    let schedules = match BankSchedules::published() {
        Ok(schedules) => schedules,
        Err(e) => return Ok(error_response(500, &e)),
    };

    log::info!(
        "{:?} request for {:.2}",
        request.mode,
        request.calculation.deposit_amount
    );

    match calculate(&request, &schedules) {
        Ok(response) => Ok(json_response(200, serde_json::to_string(&response)?)),
        Err(e) if e.kind() == ErrorKind::InvalidRequest => Ok(error_response(400, &e)),
        Err(e) => Ok(error_response(500, &e)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
