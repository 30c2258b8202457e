//! HTML pages.
//!
//! Two small pages: the upload form and the result view. Any text that can
//! come from configuration or the request is HTML-escaped.

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute, encode_text};
use lensgauge_core::Measurement;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:48rem;}\
img{max-width:100%;border:1px solid #ccc;}";

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = encode_text(title),
    ))
}

/// Upload form posting field `file` back to `/`.
pub fn index_page() -> Html<String> {
    layout(
        "Lensgauge",
        "<h1>Measure an object</h1>\n\
         <form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\"image/*\">\n\
         <input type=\"submit\" value=\"Upload\">\n\
         </form>",
    )
}

/// Result page showing the diameter and the annotated image.
pub fn result_page(measurement: &Measurement, result_url: &str) -> Html<String> {
    let body = format!(
        "<h1>Result</h1>\n\
         <p>Diameter: <strong>{diameter:.2} {unit}</strong></p>\n\
         <p>Image size: {width} &times; {height} px</p>\n\
         <img src=\"{url}\" alt=\"{alt}\">\n\
         <p><a href=\"/\">Measure another image</a></p>",
        diameter = measurement.diameter,
        unit = encode_text(&measurement.unit),
        width = measurement.width,
        height = measurement.height,
        url = encode_double_quoted_attribute(result_url),
        alt = encode_double_quoted_attribute(&measurement.label()),
    );
    layout("Lensgauge result", &body)
}
