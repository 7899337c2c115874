use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

use crate::page::PageView;

const PAGE_TITLE: &str = "YouTube Transcriber";
const PAGE_ICON: &str = "🎥";
const INTRO: &str = "Unlock the secrets of YouTube...without actually watching! This app uses the power of Google Gemini \
to provide transcripts, summaries, and key points – saving you from endless cat videos (probably)";
const INPUT_LABEL: &str = "Enter the YouTube video URL:";
const INPUT_HELP: &str = "Paste the full URL of the YouTube video you want to transcribe.";
const SUBMIT_LABEL: &str = "Transcribe";

/// Form value sent by the submit button
pub const SUBMIT_ACTION: &str = "transcribe";

const STYLE: &str = "body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem}\
input[type=text]{width:100%;padding:.5rem;box-sizing:border-box}\
img{width:100%;margin:1rem 0}\
.warning{background:#fff4d6;padding:.75rem;border-radius:.25rem}\
.error{color:#a00}";

/// Render the whole page as one HTML document
pub fn render_page(view: &PageView) -> String {
    let mut body = String::new();

    body.push_str(&format!("<h1>{PAGE_TITLE}</h1>\n<p>{}</p>\n", encode_text(INTRO)));

    // Changing the URL posts the form without an action, which only refreshes
    // the thumbnail preview.
    body.push_str(&format!(
        "<form method=\"post\" action=\"/\">\n\
         <label for=\"url\">{INPUT_LABEL}</label>\n\
         <input type=\"text\" id=\"url\" name=\"url\" value=\"{}\" title=\"{}\" onchange=\"this.form.submit()\">\n\
         <button type=\"submit\" name=\"action\" value=\"{SUBMIT_ACTION}\"{}>{SUBMIT_LABEL}</button>\n\
         </form>\n",
        encode_double_quoted_attribute(&view.url),
        encode_double_quoted_attribute(INPUT_HELP),
        if view.submit_disabled { " disabled" } else { "" },
    ));

    if let Some(ref warning) = view.warning {
        body.push_str(&format!("<p class=\"warning\">{}</p>\n", encode_text(warning)));
    }

    if let Some(ref thumbnail) = view.thumbnail {
        body.push_str(&format!(
            "<img src=\"{}\" alt=\"Video thumbnail\">\n",
            encode_double_quoted_attribute(thumbnail)
        ));
    }

    if let Some(ref response) = view.response {
        body.push_str(&format!(
            "<h3>Response:</h3>\n<div class=\"response\">{}</div>\n",
            render_markdown(response)
        ));
    }

    if let Some(ref error) = view.error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(error)));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n\
         <link rel=\"icon\" href=\"data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22><text y=%22.9em%22 font-size=%2290%22>{PAGE_ICON}</text></svg>\">\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

/// Render model output as Markdown. Raw HTML in the text comes out as
/// escaped text, and links or images with script-capable schemes point
/// nowhere.
fn render_markdown(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"].iter().any(|scheme| lowered.starts_with(scheme)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
