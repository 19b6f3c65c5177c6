//! The single-page form: a URL input and the drafted emails underneath.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::errors::AppError;
use crate::outreach::pipeline::JobEmail;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
    form{display:flex;gap:.5rem}input[name=url]{flex:1;padding:.5rem}button{padding:.5rem 1rem}\
    pre{background:#f6f8fa;padding:1rem;white-space:pre-wrap;border-radius:6px}\
    .error{background:#fdecea;color:#611a15;padding:1rem;border-radius:6px}\
    .links{color:#555;font-size:.9rem}";

/// Renders the page. `outcome` is `None` before the first submission.
pub fn render_page(url: &str, outcome: Option<&Result<Vec<JobEmail>, AppError>>) -> String {
    let mut body = String::new();

    match outcome {
        None => {}
        Some(Err(e)) => {
            body.push_str(&format!(
                "<div class=\"error\">An Error Occurred: {}</div>",
                encode_text(&e.user_message())
            ));
        }
        Some(Ok(results)) if results.is_empty() => {
            body.push_str("<p>No job postings were found on that page.</p>");
        }
        Some(Ok(results)) => {
            for result in results {
                body.push_str(&render_job(result));
            }
        }
    }

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>Cold Email Generator</title><style>{STYLE}</style></head><body>\
         <h1>&#128231; Cold Mail Generator</h1>\
         <form method=\"post\" action=\"/\">\
         <input name=\"url\" type=\"text\" placeholder=\"Enter a URL:\" value=\"{}\">\
         <button type=\"submit\">Submit</button></form>{body}</body></html>",
        encode_double_quoted_attribute(url)
    )
}

fn render_job(result: &JobEmail) -> String {
    let mut html = format!("<h2>{}</h2>", encode_text(&result.job.role));
    if !result.links.is_empty() {
        let links = result
            .links
            .iter()
            .map(encode_text)
            .collect::<Vec<_>>()
            .join(", ");
        html.push_str(&format!("<p class=\"links\">Portfolio: {links}</p>"));
    }
    match (&result.email, &result.error) {
        (Some(email), _) => html.push_str(&format!("<pre><code>{}</code></pre>", encode_text(email))),
        (None, Some(error)) => html.push_str(&format!(
            "<div class=\"error\">An Error Occurred: {}</div>",
            encode_text(error)
        )),
        (None, None) => {}
    }
    html
}
