//! Local web boundary: the intake form and the two result pages.
//!
//! One fixed address, two routes, one connection handled at a time. All the
//! rendering below is plumbing around the encode -> scale -> predict call;
//! the pipeline itself lives in the other modules.

use std::collections::HashMap;
use std::io;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::encoding::{
    self, encode, CHEST_PAIN, EXERCISE_ANGINA, FASTING_BLOOD_SUGAR, RESTING_ECG, SEX, SLOPE,
    THALASSEMIA,
};
use crate::error::{ForecastError, Result};
use crate::model::{Prediction, Predictor};
use crate::records::{
    PatientRecord, AGE_RANGE, CHOLESTEROL_RANGE, MAJOR_VESSELS_RANGE, MAX_HEART_RATE_RANGE,
    OLDPEAK_RANGE, RESTING_BP_RANGE,
};

/// Fixed local serving address.
pub static BIND_ADDR: &str = "127.0.0.1:8080";

const MAX_REQUEST_BYTES: usize = 16 * 1024;

lazy_static! {
    // The tables and domains are static, so the form never changes; render
    // it once.
    static ref FORM_PAGE: String = render_form();
}

/// Accept loop. Each submission is a synchronous compute-then-render step;
/// the next connection is only accepted once the current one is done.
pub async fn run(predictor: Predictor) -> io::Result<()> {
    let listener = TcpListener::bind(BIND_ADDR).await?;
    info!("serving on http://{BIND_ADDR}");
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("connection from {peer}");
        if let Err(e) = handle(stream, &predictor).await {
            warn!("connection dropped: {e}");
        }
    }
}

async fn handle(mut stream: TcpStream, predictor: &Predictor) -> io::Result<()> {
    let request = read_request(&mut stream).await?;
    debug!("{} {}", request.method, request.path);

    let response = match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/") => respond(200, "OK", FORM_PAGE.as_str()),
        ("POST", "/predict") => match submit(&request.body, predictor) {
            Ok(page) => respond(200, "OK", &page),
            Err(e) => {
                warn!("submission rejected: {e}");
                respond(400, "Bad Request", &failure_page())
            }
        },
        _ => respond(404, "Not Found", &page("Not found", "<p>There is nothing here.</p>")),
    };

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

struct Request {
    method: String,
    path: String,
    body: String,
}

async fn read_request(stream: &mut TcpStream) -> io::Result<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-request",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request too large"));
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
        .min(MAX_REQUEST_BYTES);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Run one submission through the whole pipeline and render the outcome.
fn submit(body: &str, predictor: &Predictor) -> Result<String> {
    let record = parse_submission(body)?;
    if let Err(violations) = record.validate() {
        return Err(ForecastError::InvalidField {
            field: "record",
            reason: violations.join("; "),
        });
    }
    let features = encode(&record)?;
    let prediction = predictor.predict(&features)?;
    debug!("outcome {prediction:?}");
    Ok(result_page(prediction))
}

fn parse_submission(body: &str) -> Result<PatientRecord> {
    let fields = parse_form(body);
    Ok(PatientRecord {
        age: numeric_field(&fields, "age")?,
        sex: label_field(&fields, "sex")?,
        chest_pain: label_field(&fields, "cp")?,
        resting_bp: numeric_field(&fields, "trestbps")?,
        resting_ecg: label_field(&fields, "restecg")?,
        cholesterol: numeric_field(&fields, "chol")?,
        fasting_blood_sugar: label_field(&fields, "fbs")?,
        max_heart_rate: numeric_field(&fields, "thalach")?,
        exercise_angina: label_field(&fields, "exang")?,
        oldpeak: numeric_field(&fields, "oldpeak")?,
        slope: label_field(&fields, "slope")?,
        major_vessels: numeric_field(&fields, "ca")?,
        thalassemia: label_field(&fields, "thal")?,
    })
}

fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match decoded {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn numeric_field<T: std::str::FromStr>(
    fields: &HashMap<String, String>,
    name: &'static str,
) -> Result<T> {
    let raw = fields.get(name).ok_or(ForecastError::InvalidField {
        field: name,
        reason: "missing".to_string(),
    })?;
    raw.trim().parse().map_err(|_| ForecastError::InvalidField {
        field: name,
        reason: format!("not a number: {raw:?}"),
    })
}

fn label_field(fields: &HashMap<String, String>, name: &'static str) -> Result<String> {
    fields
        .get(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ForecastError::InvalidField {
            field: name,
            reason: "missing".to_string(),
        })
}

// --- rendering ---

fn respond(status: u16, reason: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn page(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ background-color: #f9f9f9; color: #333333; font-family: Arial, sans-serif; margin: 0; }}\n\
         .header {{ background-color: #4285F4; padding: 20px; }}\n\
         .header h1 {{ color: white; text-align: center; margin: 0; }}\n\
         .main {{ background-color: #ffffff; max-width: 640px; margin: 30px auto; padding: 20px; border-radius: 10px; box-shadow: 0px 0px 15px rgba(0, 0, 0, 0.1); }}\n\
         label {{ display: block; margin-top: 12px; }}\n\
         .warning {{ color: #b00020; font-weight: bold; }}\n\
         .success {{ color: #0a7d33; font-weight: bold; }}\n\
         .footer {{ text-align: center; margin: 20px; color: #666666; }}\n\
         </style>\n</head>\n<body>\n\
         <div class=\"header\"><h1>Heart Disease Forecaster</h1></div>\n\
         <div class=\"main\">\n{content}\n</div>\n\
         <div class=\"footer\"><p>Note: This app provides forecasting, not medical advice. See a doctor if you have persistent symptoms.</p></div>\n\
         </body>\n</html>\n"
    )
}

fn render_form() -> String {
    let mut inputs = String::new();
    number_input(&mut inputs, "age", "Age", AGE_RANGE, 1.0);
    select_input(&mut inputs, "sex", "Gender", &SEX);
    select_input(&mut inputs, "cp", "Chest Pain Type", &CHEST_PAIN);
    number_input(&mut inputs, "trestbps", "Resting Blood Pressure", RESTING_BP_RANGE, 1.0);
    select_input(&mut inputs, "restecg", "Resting Electrocardiographic Results", &RESTING_ECG);
    number_input(&mut inputs, "chol", "Serum Cholestoral in mg/dl", CHOLESTEROL_RANGE, 1.0);
    select_input(&mut inputs, "fbs", "Fasting Blood Sugar &gt; 120 mg/dl", &FASTING_BLOOD_SUGAR);
    number_input(&mut inputs, "thalach", "Maximum Heart Rate Achieved", MAX_HEART_RATE_RANGE, 1.0);
    select_input(&mut inputs, "exang", "Exercise Induced Angina", &EXERCISE_ANGINA);
    float_input(&mut inputs, "oldpeak", "Oldpeak", OLDPEAK_RANGE, 0.1);
    select_input(&mut inputs, "slope", "Heart Rate Slope", &SLOPE);
    number_input(&mut inputs, "ca", "Number of Major Vessels Colored by Flourosopy", MAJOR_VESSELS_RANGE, 1.0);
    select_input(&mut inputs, "thal", "Thalium Stress Result", &THALASSEMIA);

    let content = format!(
        "<h2>About App</h2>\n\
         <p>This app helps you check your risk of developing heart disease.</p>\n\
         <p>Enter your information and click 'Forecast' to see your result.</p>\n\
         <h2>Input Your Data</h2>\n\
         <form method=\"post\" action=\"/predict\">\n{inputs}\
         <p><button type=\"submit\">Forecast</button></p>\n</form>"
    );
    page("Heart Disease Forecaster", &content)
}

fn number_input(
    out: &mut String,
    name: &str,
    label: &str,
    range: std::ops::RangeInclusive<u32>,
    step: f64,
) {
    out.push_str(&format!(
        "<label>{label}\n<input type=\"number\" name=\"{name}\" min=\"{}\" max=\"{}\" step=\"{step}\" required>\n</label>\n",
        range.start(),
        range.end()
    ));
}

fn float_input(
    out: &mut String,
    name: &str,
    label: &str,
    range: std::ops::RangeInclusive<f64>,
    step: f64,
) {
    out.push_str(&format!(
        "<label>{label}\n<input type=\"number\" name=\"{name}\" min=\"{}\" max=\"{}\" step=\"{step}\" required>\n</label>\n",
        range.start(),
        range.end()
    ));
}

fn select_input(out: &mut String, name: &str, label: &str, table: &encoding::CategoryCodeTable) {
    out.push_str(&format!("<label>{label}\n<select name=\"{name}\">\n"));
    for option in table.labels() {
        let escaped = html_escape(option);
        out.push_str(&format!("<option value=\"{escaped}\">{escaped}</option>\n"));
    }
    out.push_str("</select>\n</label>\n");
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn result_page(prediction: Prediction) -> String {
    let class = match prediction {
        Prediction::HighRisk => "warning",
        Prediction::LowRisk => "success",
    };
    page(
        "Forecast",
        &format!(
            "<p class=\"{class}\">{}</p>\n<p><a href=\"/\">Back</a></p>",
            prediction.message()
        ),
    )
}

fn failure_page() -> String {
    page(
        "Forecast",
        "<p class=\"warning\">Sorry, your submission could not be processed.</p>\n<p><a href=\"/\">Back</a></p>",
    )
}
