//! HTML pages. The volcano page is a thin client over the session API.

use axum::{extract::State, response::Html};

use crate::state::SharedState;

pub async fn landing_page() -> Html<&'static str> {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Volcanyx</title>
</head>
<body>
    <h1>Differential expression explorer</h1>
    <p><a href="/volcano/">Open the volcano plot</a></p>
</body>
</html>"#)
}

const VOLCANO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Volcano Plot | Volcanyx</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
</head>
<body>
    <div id="controls">
        <label>Adjusted p-value threshold
            <input id="threshold" type="range" min="__T_LO__" max="__T_HI__" step="0.005" value="__T_DEFAULT__">
            <span id="threshold-value">__T_DEFAULT__</span>
        </label>
        <label>Width <input id="width" type="number" min="__W_LO__" max="__W_HI__" step="50" value="__W_DEFAULT__"></label>
        <label>Height <input id="height" type="number" min="__H_LO__" max="__H_HI__" step="50" value="__H_DEFAULT__"></label>
    </div>
    <div id="volcano"></div>
    <div id="drilldown" style="display:none"></div>
    <div id="links"></div>
<script>
let sessionId = null;
let clickBound = false;

async function post(path, body) {
    const res = await fetch(path, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body || {}),
    });
    return res.json();
}

function drawVolcano(figure) {
    const el = document.getElementById('volcano');
    Plotly.react(el, figure.data, figure.layout);
    if (!clickBound) {
        el.on('plotly_click', (e) => {
            const points = e.points.map((p) => ({
                pointIndex: p.pointIndex,
                curveNumber: p.curveNumber,
                hovertext: p.hovertext,
                text: p.text,
            }));
            post(`/api/sessions/${sessionId}/click`, { points });
        });
        clickBound = true;
    }
}

function drawDrillDown(visible, figure) {
    const el = document.getElementById('drilldown');
    el.style.display = visible ? 'block' : 'none';
    if (visible && figure) Plotly.react(el, figure.data, figure.layout);
}

function drawLinks(gene, status) {
    const el = document.getElementById('links');
    el.replaceChildren();
    if (!gene || status.state === 'idle') return;
    const heading = document.createElement('h3');
    heading.textContent = `Literature for ${gene}`;
    el.appendChild(heading);
    if (status.state === 'loading') {
        el.appendChild(document.createTextNode('Loading…'));
    } else if (status.state === 'failed') {
        el.appendChild(document.createTextNode(status.message));
    } else {
        const list = document.createElement('ul');
        for (const paper of status.papers) {
            const item = document.createElement('li');
            const link = document.createElement('a');
            link.href = paper.url;
            link.target = '_blank';
            link.textContent = paper.title;
            item.appendChild(link);
            list.appendChild(item);
        }
        el.appendChild(list);
    }
}

function sendControls() {
    const threshold = parseFloat(document.getElementById('threshold').value);
    document.getElementById('threshold-value').textContent = threshold;
    post(`/api/sessions/${sessionId}/controls`, {
        threshold,
        width: parseInt(document.getElementById('width').value, 10),
        height: parseInt(document.getElementById('height').value, 10),
    });
}

async function start() {
    const created = await post('/api/sessions');
    sessionId = created.session_id;
    const view = created.view;
    if (view.volcano_figure) drawVolcano(view.volcano_figure);

    const events = new EventSource(`/api/sessions/${sessionId}/events`);
    events.onmessage = (msg) => {
        const ev = JSON.parse(msg.data);
        if (ev.type === 'volcano_updated') drawVolcano(ev.figure);
        else if (ev.type === 'drill_down_updated') drawDrillDown(ev.visible, ev.figure);
        else if (ev.type === 'links_updated') drawLinks(ev.gene, ev.status);
    };
    for (const id of ['threshold', 'width', 'height']) {
        document.getElementById(id).addEventListener('change', sendControls);
    }
}

start();
</script>
</body>
</html>"#;

/// The interactive page, with control ranges taken from configuration.
pub async fn volcano_page(State(state): State<SharedState>) -> Html<String> {
    let c = &state.config.controls;
    let page = VOLCANO_PAGE
        .replace("__T_LO__", &c.threshold_bounds.0.to_string())
        .replace("__T_HI__", &c.threshold_bounds.1.to_string())
        .replace("__T_DEFAULT__", &c.default_threshold.to_string())
        .replace("__W_LO__", &c.width_bounds.0.to_string())
        .replace("__W_HI__", &c.width_bounds.1.to_string())
        .replace("__W_DEFAULT__", &c.default_width.to_string())
        .replace("__H_LO__", &c.height_bounds.0.to_string())
        .replace("__H_HI__", &c.height_bounds.1.to_string())
        .replace("__H_DEFAULT__", &c.default_height.to_string());
    Html(page)
}
