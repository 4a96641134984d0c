//! # 页面渲染
//!
//! 服务端拼接的简单 HTML，所有动态内容都经过转义。

use axum::http::StatusCode;

use crate::probe::CapabilityReport;

/// 用户拒绝授权时的提示
pub const DECLINED_MESSAGE: &str = "You need to accept the creation of api keys.";

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
pre{background:#f4f4f4;padding:1rem;overflow-x:auto}\
input[type=url]{width:100%;padding:.5rem;margin:.5rem 0}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// 发起授权的表单页
#[must_use]
pub fn index_page(app_name: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n\
<p>Enter the address of your store. You will be asked to approve API keys for this test.</p>\n\
<form method=\"post\" action=\"/\">\n\
<label for=\"url\">Store URL</label>\n\
<input type=\"url\" id=\"url\" name=\"url\" placeholder=\"https://shop.example\" required>\n\
<button type=\"submit\">Start test</button>\n\
</form>",
        escape_html(app_name)
    );
    layout(app_name, &body)
}

/// 能力报告页
#[must_use]
pub fn report_page(report: &CapabilityReport) -> String {
    let body = format!(
        "<h1>Results</h1>\n<pre>{}</pre>\n<p><a href=\"/\">Test another store</a></p>",
        escape_html(&report.to_pretty_text())
    );
    layout("Results", &body)
}

/// 错误页
#[must_use]
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Start again</a></p>",
        escape_html(title),
        escape_html(message)
    );
    layout(title, &body)
}

/// HTML 转义
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
