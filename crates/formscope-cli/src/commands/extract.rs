//! `formscope extract <URL>`

use std::fmt::Write as _;

use formscope::{ExtractResponse, FormExtractor, FormInfo};

/// Extract one form and print the result to stdout.
///
/// Returns `Ok(false)` when extraction failed; the failure has already been
/// printed (as an envelope with `--json`, otherwise to stderr).
pub async fn run(extractor: &FormExtractor, url: &str, json: bool) -> anyhow::Result<bool> {
    let result = extractor.extract(url).await;
    let ok = result.is_ok();

    if json {
        let envelope = ExtractResponse::from(result);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        match result {
            Ok(info) => print!("{}", summary(&info)),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(ok)
}

/// Human-readable block for one form.
pub fn summary(info: &FormInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Platform:     {}", info.platform);
    let _ = writeln!(out, "Title:        {}", info.title);
    if !info.description.is_empty() {
        let _ = writeln!(out, "Description:  {}", info.description);
    }
    let _ = writeln!(out, "Questions:    {}", info.question_count);
    let submit = if info.submit_url.is_empty() {
        "(none)"
    } else {
        info.submit_url.as_str()
    };
    let _ = writeln!(out, "Submit URL:   {submit}");

    if let Some(details) = &info.details {
        if let Some(id) = &details.form_id {
            let _ = writeln!(out, "Form ID:      {id}");
        }
        let _ = writeln!(out, "Quiz:         {}", yes_no(details.is_quiz));
        let _ = writeln!(out, "Login:        {}", yes_no(details.requires_login));
        let _ = writeln!(out, "Accepting:    {}", yes_no(details.accepting_responses));
    }
    out
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "yes"
    } else {
        "no"
    }
}
