//! Minimal HTML page around the chart slots and controls

use std::fmt::Write as _;

use crate::aggregate::Granularity;
use crate::dashboard::{DashboardPage, Level, SlotContent};
use crate::render::surface::escape_text;
use crate::state::{WsMetric, WORKSTATION_COUNT};

const SCRIPT: &str = r#"
async function post(url, body) {
  await fetch(url, {method: 'POST', headers: {'Content-Type': 'application/json'}, body: body ? JSON.stringify(body) : undefined});
  location.reload();
}
function control(name, value) { return post('/api/v1/controls', {control: name, value: value}); }
new EventSource('/api/v1/events').addEventListener('page', () => location.reload());
"#;

fn select(out: &mut String, control: &str, options: &[(&str, &str)], selected: &str) {
    let _ = write!(
        out,
        r#"<select onchange="control('{}', this.value)">"#,
        control
    );
    for (value, label) in options {
        let marker = if *value == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{}"{}>{}</option>"#, value, marker, label);
    }
    out.push_str("</select>\n");
}

const STYLE: &str = "<style>\
body{font-family:sans-serif;margin:16px}\
.slot{display:inline-block;vertical-align:top;margin:8px;max-width:660px}\
.banner{background:#fde2e2;padding:6px;margin:4px 0}\
.status{background:#fff7d6;padding:6px}\
</style>\n";

pub fn render(page: &DashboardPage) -> String {
    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Manufacturing Dashboard</title>\n");
    html.push_str(STYLE);
    let _ = writeln!(html, "<script>{}</script></head><body>", SCRIPT);
    html.push_str("<h1>Manufacturing Dashboard</h1>\n");

    for n in page.active_notifications() {
        let class = match n.level {
            Level::Error => "banner",
            Level::Info => "status",
        };
        let _ = writeln!(
            html,
            r#"<div class="{}">{} <button onclick="post('/api/v1/notifications/{}/dismiss')">&times;</button></div>"#,
            class,
            escape_text(&n.message),
            n.id
        );
    }
    if let Some(status) = &page.status_message {
        let _ = writeln!(html, r#"<div class="status">{}</div>"#, escape_text(status));
    }

    // Controls
    let state = page.state;
    html.push_str("<div class=\"controls\">\n");
    let ranges: Vec<(&str, &str)> = Granularity::ALL
        .iter()
        .map(|g| (g.as_str(), g.as_str()))
        .collect();
    select(&mut html, "time_range", &ranges, state.time_range.as_str());
    let metrics: Vec<(&str, &str)> = [WsMetric::Downtime, WsMetric::Waiting, WsMetric::Active]
        .iter()
        .map(|m| (m.as_str(), m.label()))
        .collect();
    select(&mut html, "ws_metric", &metrics, state.ws_metric.as_str());
    html.push_str(r#"<select onchange="control('workstation', Number(this.value))">"#);
    for ws in 1..=WORKSTATION_COUNT {
        let marker = if ws == state.selected_workstation { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{}"{}>Workstation {}</option>"#, ws, marker, ws);
    }
    html.push_str("</select>\n");
    let other = state.production_view.toggled();
    let _ = writeln!(
        html,
        r#"<button onclick="control('production_view', '{}')">Show {}</button>"#,
        other.as_str(),
        other.as_str()
    );
    let disabled = if page.refresh_enabled { "" } else { " disabled" };
    let _ = writeln!(
        html,
        r#"<button onclick="post('/api/v1/refresh')"{}>Run new simulation</button>"#,
        disabled
    );
    html.push_str("</div>\n");

    if let Some(headline) = &page.headline {
        let _ = writeln!(html, "<p><strong>{}</strong></p>", escape_text(headline));
    }
    if !page.kpi_cards.is_empty() {
        html.push_str("<div class=\"kpis\">");
        for card in &page.kpi_cards {
            let _ = write!(
                html,
                r#"<span class="slot"><small>{}</small><br><b>{}</b></span>"#,
                escape_text(card.label),
                escape_text(&card.value)
            );
        }
        html.push_str("</div>\n");
    }

    for slot in page.slots.values() {
        let _ = writeln!(
            html,
            r#"<div class="slot" id="{}"><h3>{}</h3>"#,
            slot.chart,
            escape_text(slot.title)
        );
        match &slot.content {
            SlotContent::Chart { svg } => html.push_str(svg),
            SlotContent::Error { message } => {
                let _ = writeln!(html, "<p>{}</p>", escape_text(message));
            }
            SlotContent::Empty => html.push_str("<p>No data to display</p>\n"),
        }
        if let Some(insight) = &slot.insight {
            let _ = writeln!(html, "<p><em>{}</em></p>", escape_text(insight));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body></html>\n");
    html
}
