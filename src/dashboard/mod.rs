use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::error::PredictError;
use crate::predictor::{City, MatchForm, MatchInput, Prediction, Predictor, Team};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
}

/// Build the Axum router for the predictor page and its JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/predict", post(predict_form_handler))
        .route("/api/predict", post(predict_api_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/healthz", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Log a failed interaction at the level its kind deserves.
fn log_failure(err: &PredictError) {
    match err {
        PredictError::InvalidInput(msg) => warn!("Prediction rejected: {}", msg),
        PredictError::PredictionUnavailable(msg) => error!("Prediction unavailable: {}", msg),
    }
}

/// GET /
async fn index_handler() -> Html<String> {
    Html(render_page(&MatchForm::default(), &Outcome::Empty))
}

/// POST /predict (urlencoded form)
async fn predict_form_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MatchForm>,
) -> Html<String> {
    let outcome = match form.parse().and_then(|input| state.predictor.predict(&input)) {
        Ok(prediction) => Outcome::Predicted(prediction),
        Err(err) => {
            log_failure(&err);
            Outcome::Failed(err)
        }
    };
    Html(render_page(&form, &outcome))
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub win_percent: i64,
    pub loss_percent: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

fn status_for(err: &PredictError) -> StatusCode {
    match err {
        PredictError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictError::PredictionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// POST /api/predict
///
/// Body rejections (negative counts, missing fields, bad JSON) are reported
/// as `invalid_input` like any other gate failure.
async fn predict_api_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorBody>)> {
    payload
        .map_err(|rejection| PredictError::InvalidInput(rejection.body_text()))
        .and_then(|Json(input)| state.predictor.predict(&input))
        .map(|prediction| {
            Json(PredictResponse {
                win_percent: prediction.result.win_percent(),
                loss_percent: prediction.result.loss_percent(),
                prediction,
            })
        })
        .map_err(|err| {
            log_failure(&err);
            (
                status_for(&err),
                Json(ErrorBody {
                    error: err.kind(),
                    message: err.message().to_string(),
                }),
            )
        })
}

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub teams: Vec<&'static str>,
    pub cities: Vec<&'static str>,
}

/// GET /api/catalog
async fn catalog_handler() -> Json<Catalog> {
    Json(Catalog {
        teams: Team::sorted_names(),
        cities: City::sorted_names(),
    })
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub model: String,
    pub available: bool,
}

/// GET /healthz
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let available = state.predictor.is_available();
    let status = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(Health {
            model: state.predictor.classifier_name().to_string(),
            available,
        }),
    )
}

// ── Rendering ───────────────────────────────────────────────────────────────

enum Outcome {
    Empty,
    Predicted(Prediction),
    Failed(PredictError),
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select(name: &str, label: &str, options: &[&str], selected: &str) -> String {
    let mut html = format!(r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">"#);
    for opt in options {
        let attr = if *opt == selected { " selected" } else { "" };
        let opt = escape_html(opt);
        let _ = write!(html, r#"<option value="{opt}"{attr}>{opt}</option>"#);
    }
    html.push_str("</select>");
    html
}

fn number(name: &str, label: &str, value: &str, default: &str, attrs: &str) -> String {
    let value = if value.trim().is_empty() { default } else { value };
    format!(
        r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" value="{}" {attrs} required>"#,
        escape_html(value)
    )
}

fn render_form(form: &MatchForm) -> String {
    let teams = Team::sorted_names();
    let cities = City::sorted_names();
    let mut html = String::from(r#"<form method="post" action="/predict">"#);
    html.push_str(r#"<div class="row two"><div>"#);
    html.push_str(&select("batting_team", "🏏 Select Batting Team", &teams, &form.batting_team));
    html.push_str("</div><div>");
    html.push_str(&select("bowling_team", "🎯 Select Bowling Team", &teams, &form.bowling_team));
    html.push_str("</div></div>");
    html.push_str(&select("city", "📍 Select Host City", &cities, &form.city));
    html.push_str(&number("target", "🎯 Enter Target Score", &form.target, "1", r#"min="1" step="1""#));
    html.push_str(r#"<div class="row three"><div>"#);
    html.push_str(&number("current_score", "Current Score", &form.current_score, "0", r#"min="0" step="1""#));
    html.push_str("</div><div>");
    html.push_str(&number(
        "overs_completed",
        "Overs Completed",
        &form.overs_completed,
        "0.0",
        r#"min="0" max="20" step="0.1""#,
    ));
    html.push_str("</div><div>");
    html.push_str(&number(
        "wickets_fallen",
        "Wickets Fallen",
        &form.wickets_fallen,
        "0",
        r#"min="0" max="10" step="1""#,
    ));
    html.push_str("</div></div>");
    html.push_str(r#"<button type="submit">Predict Probability</button></form>"#);
    html
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Empty => String::new(),
        Outcome::Failed(PredictError::InvalidInput(msg)) => {
            format!(r#"<div class="notice warning">⚠️ {}</div>"#, escape_html(msg))
        }
        Outcome::Failed(PredictError::PredictionUnavailable(msg)) => format!(
            r#"<div class="notice error">Prediction unavailable: {}</div>"#,
            escape_html(msg)
        ),
        Outcome::Predicted(p) => {
            let r = &p.result;
            let f = &p.features;
            format!(
                r#"<div class="win-prob-box">
  <div class="prob-heading">✅ {batting} Win Probability: <strong>{win}%</strong></div>
  <div class="bar-container"><div class="bar win-bar" style="width:{win_width}%"></div></div>
  <div class="prob-heading spaced">❌ {bowling} Win Probability: <strong>{loss}%</strong></div>
  <div class="bar-container"><div class="bar loss-bar" style="width:{loss_width}%"></div></div>
  <div class="features">Need {runs_left} off {balls_left:.1} balls · {wickets} wickets in hand · CRR {crr:.2} · RRR {rrr:.2}</div>
</div>"#,
                batting = escape_html(p.state.batting_team.name()),
                bowling = escape_html(p.state.bowling_team.name()),
                win = r.win_percent(),
                loss = r.loss_percent(),
                win_width = r.win_probability * 100.0,
                loss_width = r.loss_probability * 100.0,
                runs_left = f.runs_left,
                balls_left = f.balls_left,
                wickets = f.wickets_remaining,
                crr = f.current_run_rate,
                rrr = f.required_run_rate,
            )
        }
    }
}

/// Rendered parts are concatenated once; user text is never re-scanned.
fn render_page(form: &MatchForm, outcome: &Outcome) -> String {
    let mut page = String::from(PAGE_HEAD);
    page.push_str(&render_form(form));
    page.push('\n');
    page.push_str(&render_outcome(outcome));
    page.push_str(PAGE_FOOT);
    page
}

/// Embedded single-file page (HTML + CSS), split around the form and outcome.
const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Win Predictor</title>
<style>
  * { box-sizing: border-box; }
  body { margin: 0; min-height: 100vh; background: linear-gradient(135deg, #74ebd5 0%, #ACB6E5 100%); color: #222; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 1rem 0; }
  main { max-width: 720px; margin: 0 auto; background: white; padding: 2rem 3rem; border-radius: 18px; box-shadow: 0 12px 30px rgba(0,0,0,0.15); }
  h1 { text-align: center; color: #004d40; font-weight: 900; font-size: 3rem; margin: 0 0 1.5rem; }
  label { display: block; font-weight: 700; color: #004d40; font-size: 1.1rem; margin: .8rem 0 .3rem; }
  select, input { width: 100%; padding: .5rem; border: 1px solid #b2dfdb; border-radius: 8px; font-size: 1rem; }
  .row { display: grid; gap: 1rem; }
  .row.two { grid-template-columns: 1fr 1fr; }
  .row.three { grid-template-columns: 1fr 1fr 1fr; }
  button { width: 100%; margin-top: 1.5rem; background: #00796b; color: white; font-weight: 700; font-size: 1.1rem; padding: .6rem 1.8rem; border: none; border-radius: 10px; cursor: pointer; transition: background-color .3s ease; }
  button:hover { background: #004d40; }
  .notice { margin-top: 1.5rem; padding: 1rem 1.2rem; border-radius: 10px; font-weight: 600; }
  .notice.warning { background: #fff8e1; border: 1px solid #ffb300; color: #8d6e00; }
  .notice.error { background: #ffebee; border: 1px solid #e53935; color: #b71c1c; }
  .win-prob-box { background: #e3f2fd; border: 2px solid #1976d2; border-radius: 20px; padding: 20px 30px; margin-top: 30px; box-shadow: 0 8px 24px rgba(25,118,210,0.2); }
  .prob-heading { font-weight: 800; margin-bottom: .15rem; }
  .prob-heading.spaced { margin-top: 1.5rem; }
  .bar-container { width: 100%; background: #b2dfdb; border-radius: 12px; height: 26px; margin-top: .3rem; overflow: hidden; }
  .bar { height: 26px; border-radius: 12px 0 0 12px; animation: grow 1.5s ease-in-out; }
  .win-bar { background: linear-gradient(90deg, #00bfa5, #1de9b6); }
  .loss-bar { background: linear-gradient(90deg, #e53935, #ef5350); }
  .features { margin-top: 1.2rem; color: #455a64; font-size: .9rem; }
  @keyframes grow { from { width: 0; } }
</style>
</head>
<body>
<main>
<h1>🏏 IPL Win Predictor</h1>
"#;

const PAGE_FOOT: &str = r#"
</main>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::tests::StubClassifier;
    use crate::predictor::UnavailableClassifier;
    use std::sync::atomic::Ordering;

    fn state_with(predictor: Predictor) -> State<Arc<AppState>> {
        State(Arc::new(AppState { predictor }))
    }

    fn form(overs: &str) -> MatchForm {
        MatchForm {
            batting_team: "Kolkata Knight Riders".into(),
            bowling_team: "Sunrisers Hyderabad".into(),
            city: "Kolkata".into(),
            target: "180".into(),
            current_score: "90".into(),
            overs_completed: overs.into(),
            wickets_fallen: "2".into(),
        }
    }

    #[tokio::test]
    async fn index_renders_sorted_dropdowns() {
        let Html(page) = index_handler().await;
        assert!(page.contains("Predict Probability"));
        let chennai = page.find("Chennai Super Kings").unwrap();
        let sunrisers = page.find("Sunrisers Hyderabad").unwrap();
        assert!(chennai < sunrisers);
        assert!(page.contains(r#"max="20" step="0.1""#));
        assert!(!page.contains("win-prob-box\""));
    }

    #[tokio::test]
    async fn form_submission_renders_both_bars() {
        let stub = StubClassifier::new([0.25, 0.75]);
        let Html(page) =
            predict_form_handler(state_with(Predictor::new(stub.clone())), Form(form("10"))).await;
        assert!(page.contains("Kolkata Knight Riders Win Probability: <strong>75%</strong>"));
        assert!(page.contains("Sunrisers Hyderabad Win Probability: <strong>25%</strong>"));
        assert!(page.contains("width:75%"));
        assert!(page.contains("width:25%"));
        assert!(page.contains("CRR 9.00 · RRR 9.00"));
        assert!(page.contains(r#"<option value="Kolkata Knight Riders" selected>"#));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_overs_shows_warning_without_calling_model() {
        let stub = StubClassifier::new([0.25, 0.75]);
        let Html(page) =
            predict_form_handler(state_with(Predictor::new(stub.clone())), Form(form("0"))).await;
        assert!(page.contains("Please enter valid values for overs and target."));
        assert!(page.contains("notice warning"));
        assert!(!page.contains("Win Probability:"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_model_shows_error_box() {
        let predictor = Predictor::new(Arc::new(UnavailableClassifier::new("models/ipl.json not found")));
        let Html(page) = predict_form_handler(state_with(predictor), Form(form("10"))).await;
        assert!(page.contains("notice error"));
        assert!(page.contains("models/ipl.json not found"));
        assert!(!page.contains("Win Probability:"));
    }

    #[tokio::test]
    async fn submitted_text_is_escaped() {
        let stub = StubClassifier::new([0.5, 0.5]);
        let mut f = form("10");
        f.city = "<script>alert(1)</script>".into();
        let Html(page) = predict_form_handler(state_with(Predictor::new(stub)), Form(f)).await;
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn api_returns_features_and_percentages() {
        let stub = StubClassifier::new([0.4, 0.6]);
        let input = form("10").parse().unwrap();
        let Json(resp) = predict_api_handler(state_with(Predictor::new(stub)), Ok(Json(input)))
            .await
            .unwrap();
        assert_eq!(resp.win_percent, 60);
        assert_eq!(resp.loss_percent, 40);
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body["features"]["runs_left"], 90);
        assert_eq!(body["features"]["batting_team"], "Kolkata Knight Riders");
        assert_eq!(body["result"]["win_probability"], 0.6);
    }

    #[tokio::test]
    async fn api_maps_error_kinds_to_status_codes() {
        let stub = StubClassifier::new([0.4, 0.6]);
        let input = form("0").parse().unwrap();
        let (status, Json(body)) = predict_api_handler(state_with(Predictor::new(stub)), Ok(Json(input)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "invalid_input");

        let predictor = Predictor::new(Arc::new(UnavailableClassifier::new("gone")));
        let input = form("10").parse().unwrap();
        let (status, Json(body)) = predict_api_handler(state_with(predictor), Ok(Json(input)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error, "prediction_unavailable");
        assert_eq!(body.message, "gone");
    }

    #[tokio::test]
    async fn placeholder_text_in_fields_is_echoed_verbatim() {
        let stub = StubClassifier::new([0.5, 0.5]);
        let mut f = form("10");
        f.target = "{{outcome}}".into();
        f.current_score = "{{form}}".into();
        let Html(page) =
            predict_form_handler(state_with(Predictor::new(stub.clone())), Form(f)).await;
        assert!(page.contains(r#"name="target" value="{{outcome}}" min="1""#));
        assert!(page.contains(r#"name="current_score" value="{{form}}" min="0""#));
        assert_eq!(page.matches("<form ").count(), 1);
        assert_eq!(page.matches("notice warning").count(), 1);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fractional_balls_left_is_rounded_for_display() {
        let stub = StubClassifier::new([0.5, 0.5]);
        let mut f = form("19.9");
        f.target = "160".into();
        f.current_score = "150".into();
        let Html(page) = predict_form_handler(state_with(Predictor::new(stub)), Form(f)).await;
        assert!(page.contains("Need 10 off 0.6 balls"), "page: {page}");
    }

    #[tokio::test]
    async fn api_body_rejection_is_reported_as_invalid_input() {
        let stub = StubClassifier::new([0.4, 0.6]);
        let payload = Json::<MatchInput>::from_bytes(
            br#"{"batting_team":"Mumbai Indians","bowling_team":"Delhi Capitals","city":"Mumbai","target":180,"current_score":-4,"overs_completed":10.0,"wickets_fallen":2}"#,
        );
        assert!(payload.is_err());
        let (status, Json(body)) =
            predict_api_handler(state_with(Predictor::new(stub.clone())), payload)
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "invalid_input");
        assert!(body.message.contains("current_score"), "got {}", body.message);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn catalog_lists_vocabularies() {
        let Json(catalog) = catalog_handler().await;
        assert_eq!(catalog.teams.len(), 8);
        assert_eq!(catalog.cities.len(), 29);
    }

    #[tokio::test]
    async fn health_reports_missing_model() {
        let predictor = Predictor::new(Arc::new(UnavailableClassifier::new("gone")));
        let resp = health_handler(state_with(predictor)).await.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let stub = StubClassifier::new([0.5, 0.5]);
        let resp = health_handler(state_with(Predictor::new(stub)))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn escape_html_covers_attribute_breakers() {
        assert_eq!(escape_html(r#"a"b'c&d"#), "a&quot;b&#39;c&amp;d");
    }
}
