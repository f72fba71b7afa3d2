use std::collections::BTreeMap;

use crate::{
    models::{Page, Role},
    navigation,
};

/// Renders the HTML shell for a page. With `layout` the navigation panel is drawn
/// next to the page; without it (the login page) only the mount point is emitted.
///
/// Pages themselves are mounted client-side from `data-page`; route parameters are
/// handed over as `data-param-<name>` attributes.
pub fn render_shell(
    page: Page,
    layout: bool,
    params: &BTreeMap<String, String>,
    role: Option<Role>,
) -> String {
    let mount = mount_point(page, params);
    let body = if layout {
        format!(
            r#"<div class="flex min-h-screen">{}<main class="flex-1 p-6">{}</main></div>"#,
            sidebar(page, role),
            mount
        )
    } else {
        mount
    };

    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{} · Event Portal</title><script type="module" src="/assets/app.js"></script></head><body>{}</body></html>"#,
        page.title(),
        body
    )
}

fn mount_point(page: Page, params: &BTreeMap<String, String>) -> String {
    let attrs: String = params
        .iter()
        .map(|(name, value)| format!(r#" data-param-{}="{}""#, escape(name), escape(value)))
        .collect();
    format!(r#"<div id="app" data-page="{}"{}></div>"#, page.component(), attrs)
}

fn sidebar(current: Page, role: Option<Role>) -> String {
    let links: String = navigation::visible_pages(role)
        .into_iter()
        .map(|(path, page)| {
            let marker = if page == current { r#" aria-current="page""# } else { "" };
            format!(r#"<li><a href="{path}"{marker}>{}</a></li>"#, page.title())
        })
        .collect();
    let session = match role {
        Some(role) => format!(r#"<p class="role">{role}</p>"#),
        None => r#"<p class="role"><a href="/login">Sign in</a></p>"#.to_string(),
    };
    format!(r#"<nav class="sidebar">{session}<ul>{links}</ul></nav>"#)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
