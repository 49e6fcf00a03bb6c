//! HTML report generation
//!
//! Produces a single self-contained page: inline CSS, inline SVG charts and a
//! small script for the table carousel and the theme toggle. Works offline.

use crate::charts::{ChartData, ChartKind, StaticChartRenderer, EMPTY_CHART_MESSAGE};
use crate::config::Theme;
use crate::report::TableSlide;
use crate::service::DashboardView;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Render the view (charts included) and write it to `output`.
pub fn write_report(view: &DashboardView, output: &Path, theme: Theme) -> Result<(), ReportError> {
    let html = render_report(view, theme);
    std::fs::write(output, html).map_err(|source| ReportError::Write {
        path: output.display().to_string(),
        source,
    })?;
    info!(
        path = %output.display(),
        records = view.records.len(),
        "report written"
    );
    Ok(())
}

/// Render the view, drawing the charts first.
pub fn render_report(view: &DashboardView, theme: Theme) -> String {
    let charts = match &view.summary {
        Some(summary) => {
            let data = ChartData::from_records(&view.records, summary);
            StaticChartRenderer::render_all(&data)
                .into_iter()
                .map(|(kind, result)| {
                    let fragment = result.unwrap_or_else(|e| {
                        warn!(chart = kind.title(), error = %e, "chart rendering failed");
                        r#"<p class="placeholder">Chart unavailable.</p>"#.to_string()
                    });
                    (kind, fragment)
                })
                .collect()
        }
        None => Vec::new(),
    };
    render_html(view, &charts, theme)
}

/// Assemble the page from pre-rendered chart fragments.
///
/// An empty view gets placeholders in every chart slot.
pub fn render_html(view: &DashboardView, charts: &[(ChartKind, String)], theme: Theme) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-theme="{theme}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Production &amp; Quality Dashboard</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {recommendations}
        {charts}
        {slides}
        <footer>Source: {source} &middot; {kept} of {total} rows loaded</footer>
    </div>
    <script>{js}</script>
</body>
</html>"#,
        theme = theme.as_str(),
        css = inline_css(),
        js = inline_javascript(),
        header = render_header(view),
        recommendations = render_recommendations(&view.recommendations),
        charts = render_charts(charts),
        slides = render_slides(&view.table_slides),
        source = html_escape(&view.source.display().to_string()),
        kept = view.load.kept_rows,
        total = view.load.total_rows,
    )
}

fn render_header(view: &DashboardView) -> String {
    let notice = if view.range_applied {
        String::new()
    } else {
        r#"<p class="notice">The requested date range could not be read; showing the full dataset.</p>"#
            .to_string()
    };

    format!(
        r#"<header>
    <h1>Production &amp; Quality Dashboard</h1>
    <button id="theme-toggle" type="button">Toggle theme</button>
    <p class="range">Range: <strong>{start}</strong> to <strong>{end}</strong>
        &middot; dataset {min} to {max} &middot; {count} records</p>
    {notice}
</header>"#,
        start = html_escape(&view.start_date),
        end = html_escape(&view.end_date),
        min = html_escape(&view.min_date),
        max = html_escape(&view.max_date),
        count = view.records.len(),
        notice = notice,
    )
}

fn render_recommendations(recommendations: &[String]) -> String {
    let items: String = recommendations
        .iter()
        .map(|r| format!("<li>{}</li>", html_escape(r)))
        .collect();
    format!(
        r#"<section class="card"><h2>Recommendations</h2><ul class="recommendations">{}</ul></section>"#,
        items
    )
}

fn render_charts(charts: &[(ChartKind, String)]) -> String {
    let cards: String = ChartKind::ALL
        .iter()
        .map(|kind| {
            let body = charts
                .iter()
                .find(|(k, _)| k == kind)
                .map(|(_, svg)| svg.clone())
                .unwrap_or_else(|| {
                    format!(r#"<p class="placeholder">{}</p>"#, EMPTY_CHART_MESSAGE)
                });
            format!(
                r#"<div class="card chart" id="{id}"><h2>{title}</h2>{body}</div>"#,
                id = kind.slug(),
                title = kind.title(),
                body = body,
            )
        })
        .collect();
    format!(r#"<section class="charts">{}</section>"#, cards)
}

fn render_slides(slides: &[TableSlide]) -> String {
    let pages: String = slides
        .iter()
        .enumerate()
        .map(|(idx, slide)| {
            let body = match &slide.message {
                Some(message) => format!("<p>{}</p>", html_escape(message)),
                None => render_table(slide),
            };
            format!(
                r#"<div class="slide{active}" data-index="{idx}"><h3>{title}</h3>{body}</div>"#,
                active = if idx == 0 { " active" } else { "" },
                idx = idx,
                title = html_escape(&slide.title),
                body = body,
            )
        })
        .collect();

    format!(
        r#"<section class="card slides">
    <div class="slide-nav"><button type="button" data-step="-1">&larr;</button><span id="slide-position">1 / {count}</span><button type="button" data-step="1">&rarr;</button></div>
    {pages}
</section>"#,
        count = slides.len(),
        pages = pages,
    )
}

fn render_table(slide: &TableSlide) -> String {
    let head: String = slide
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", html_escape(h)))
        .collect();
    let rows: String = slide
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(c)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    format!(
        r#"<table class="table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>"#,
        head, rows
    )
}

fn inline_css() -> &'static str {
    r#"
:root { --bg: #f5f7fa; --card: #ffffff; --text: #222; --muted: #666; --border: #dde3ea; --accent: #3498db; }
[data-theme="dark"] { --bg: #16191d; --card: #22262b; --text: #e6e6e6; --muted: #9aa0a6; --border: #33393f; --accent: #5dade2; }
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: var(--bg); color: var(--text); }
.container { max-width: 1500px; margin: 0 auto; padding: 24px; }
header { position: relative; margin-bottom: 16px; }
header h1 { margin: 0 0 8px 0; }
#theme-toggle { position: absolute; top: 0; right: 0; padding: 6px 12px; border: 1px solid var(--border); background: var(--card); color: var(--text); border-radius: 6px; cursor: pointer; }
.range { color: var(--muted); }
.notice { color: #c0392b; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 8px; padding: 16px; margin-bottom: 16px; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(620px, 1fr)); gap: 16px; }
.chart svg { width: 100%; height: auto; background: #fff; border-radius: 4px; }
.placeholder { color: var(--muted); font-style: italic; }
.recommendations li { margin: 4px 0; }
.slide { display: none; }
.slide.active { display: block; }
.slide-nav { display: flex; align-items: center; gap: 12px; margin-bottom: 8px; }
.slide-nav button { padding: 4px 12px; border: 1px solid var(--border); background: var(--card); color: var(--text); border-radius: 4px; cursor: pointer; }
.table { border-collapse: collapse; width: 100%; font-size: 13px; }
.table th, .table td { border: 1px solid var(--border); padding: 4px 8px; text-align: right; }
.table th:first-child, .table td:first-child { text-align: left; }
.table tbody tr:nth-child(odd) { background: rgba(127, 127, 127, 0.08); }
footer { color: var(--muted); font-size: 12px; margin-top: 8px; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
(function () {
    var root = document.documentElement;
    var saved = localStorage.getItem("dashboard-theme");
    if (saved) { root.setAttribute("data-theme", saved); }
    document.getElementById("theme-toggle").addEventListener("click", function () {
        var next = root.getAttribute("data-theme") === "dark" ? "light" : "dark";
        root.setAttribute("data-theme", next);
        localStorage.setItem("dashboard-theme", next);
    });

    var slides = document.querySelectorAll(".slide");
    var position = document.getElementById("slide-position");
    var current = 0;
    function show(index) {
        slides[current].classList.remove("active");
        current = (index + slides.length) % slides.length;
        slides[current].classList.add("active");
        position.textContent = (current + 1) + " / " + slides.length;
    }
    document.querySelectorAll(".slide-nav button").forEach(function (button) {
        button.addEventListener("click", function () {
            show(current + parseInt(button.getAttribute("data-step"), 10));
        });
    });
})();
"#
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LoadReport;
    use crate::report::build_table_slides;
    use crate::stats::NO_DATA_RECOMMENDATION;
    use std::path::PathBuf;

    fn empty_view() -> DashboardView {
        DashboardView {
            source: PathBuf::from("data<1>.csv"),
            load: LoadReport::default(),
            extra_columns: Vec::new(),
            min_date: "2024-01-01".to_string(),
            max_date: "2024-01-31".to_string(),
            start_date: "2024-03-01".to_string(),
            end_date: "2024-03-31".to_string(),
            range_applied: true,
            records: Vec::new(),
            summary: None,
            recommendations: vec![NO_DATA_RECOMMENDATION.to_string()],
            table_slides: build_table_slides(&[], None, 15),
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_empty_view_renders_placeholders() {
        let html = render_report(&empty_view(), Theme::Light);

        assert!(html.contains(NO_DATA_RECOMMENDATION));
        assert_eq!(html.matches(EMPTY_CHART_MESSAGE).count(), ChartKind::ALL.len());
        assert!(html.contains("No data available in the selected range."));
        assert!(html.contains("data&lt;1&gt;.csv"));
        assert!(html.contains(r#"data-theme="light""#));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn test_uses_supplied_chart_fragments() {
        let mut view = empty_view();
        view.range_applied = false;
        let charts = vec![(ChartKind::QualityPie, "<svg id=\"q\"></svg>".to_string())];
        let html = render_html(&view, &charts, Theme::Dark);

        assert!(html.contains("<svg id=\"q\"></svg>"));
        assert_eq!(html.matches(EMPTY_CHART_MESSAGE).count(), ChartKind::ALL.len() - 1);
        assert!(html.contains("class=\"notice\""));
        assert!(html.contains(r#"data-theme="dark""#));
    }

    #[test]
    fn test_slides_rendered_as_tables() {
        let slide = TableSlide {
            title: "Overview".to_string(),
            headers: vec!["Date".to_string(), "Planned_Production".to_string()],
            rows: vec![vec!["2024-01-01".to_string(), "10.0".to_string()]],
            message: None,
        };
        let html = render_slides(&[slide, TableSlide::no_data()]);

        assert!(html.contains("<th>Planned_Production</th>"));
        assert!(html.contains("<td>10.0</td>"));
        assert!(html.contains("1 / 2"));
        assert!(html.contains(r#"class="slide active" data-index="0""#));
        assert!(html.contains(r#"class="slide" data-index="1""#));
    }

    #[test]
    fn test_write_report_to_missing_directory_fails() {
        let err = write_report(
            &empty_view(),
            Path::new("/nonexistent-dir/deeper/report.html"),
            Theme::Light,
        )
        .unwrap_err();
        assert!(err.to_string().contains("report.html"));
    }
}
