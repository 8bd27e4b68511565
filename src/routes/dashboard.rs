use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};

use crate::common::AppState;

/// Dashboard page. The script only swaps in server-rendered fragments and
/// feeds the chart dataset to Chart.js.
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let page = DASHBOARD_HTML
        .replace("__REFRESH_MS__", &state.config.refresh_interval_ms.to_string())
        .replace("__HIDE_MS__", &state.config.watering_message_hide_ms.to_string());

    ([(header::CACHE_CONTROL, "no-cache")], Html(page))
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Plant Moisture Dashboard</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        :root {
            --bg: #f8fafc;
            --surface: #ffffff;
            --border: #e2e8f0;
            --muted: #64748b;
        }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); min-height: 100vh; }
        .panel {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.75rem;
            padding: 1.5rem;
        }
        .chart-wrap { position: relative; height: 320px; }
        #logContainer { max-height: 16rem; overflow-y: auto; }
        .water-single-btn:disabled { opacity: 0.6; cursor: not-allowed; }
        .site-footer { font-size: 0.7rem; color: var(--muted); opacity: 0.5; }
    </style>
</head>
<body>
    <div class="max-w-6xl mx-auto p-6 space-y-6">
        <header class="flex justify-between items-center flex-wrap gap-4">
            <h1 class="text-2xl font-semibold text-gray-800">Plant Moisture Dashboard</h1>
            <a class="text-sm text-blue-600 hover:underline" href="/dashboard/chart.csv">Export CSV</a>
        </header>

        <section id="sensorCardsContainer" class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">
            <p class="col-span-full text-center text-gray-500">Loading sensor data...</p>
        </section>

        <section class="panel">
            <div class="flex justify-between items-center mb-4 flex-wrap gap-2">
                <h2 class="text-lg font-semibold">Moisture History: <span id="selectedSensorForGraph">All Plants</span></h2>
                <select id="graphSensorSelect" class="border rounded-lg px-3 py-1 text-sm">
                    <option value="all">All Plants (Combined)</option>
                </select>
            </div>
            <div class="chart-wrap"><canvas id="moistureChart"></canvas></div>
        </section>

        <section class="panel">
            <h2 class="text-lg font-semibold mb-2">System Log</h2>
            <div id="logContainer" class="space-y-1"></div>
        </section>

        <footer class="site-footer">Refreshes every __REFRESH_MS__ ms</footer>
    </div>

<script>
const REFRESH_MS = __REFRESH_MS__;
const HIDE_MS = __HIDE_MS__;

const cardsEl = document.getElementById('sensorCardsContainer');
const selectEl = document.getElementById('graphSensorSelect');
const titleEl = document.getElementById('selectedSensorForGraph');
const logEl = document.getElementById('logContainer');
let chart = null;

async function fragment(url) {
    const r = await fetch(url, { cache: 'no-store' });
    if (!r.ok) throw new Error(`${url}: HTTP ${r.status}`);
    return r.text();
}

// Indicators the page owns until the server's copy can take over: the
// in-flight state before the POST reaches the server, and failures the
// server never records (rate limiting, transport errors).
const localIndicators = new Map();

function applyLocalIndicators() {
    for (const [name, indicator] of localIndicators) {
        const message = document.getElementById(`wateringMessage-${name}`);
        if (message) {
            message.textContent = indicator.text;
            message.className = `text-center mt-1 text-sm font-medium ${indicator.color} flex items-center justify-center`;
        }
        const button = [...cardsEl.querySelectorAll('.water-single-btn')]
            .find(b => b.dataset.sensorName === name);
        if (button && indicator.pending) button.disabled = true;
    }
}

function showLocalIndicator(name, indicator) {
    localIndicators.set(name, indicator);
    applyLocalIndicators();
    if (indicator.pending) return;
    setTimeout(() => {
        if (localIndicators.get(name) === indicator) localIndicators.delete(name);
        refreshCards();
    }, HIDE_MS);
}

async function refreshCards() {
    try {
        cardsEl.innerHTML = await fragment('/dashboard/cards');
        applyLocalIndicators();
        // Leave the select alone while the user has it open
        if (document.activeElement !== selectEl) {
            selectEl.innerHTML = await fragment('/dashboard/sensor-options');
        }
    } catch (e) {
        console.error('Failed to refresh cards:', e);
        cardsEl.innerHTML = '<p class="col-span-full text-center text-red-500">Error loading sensor data. Check server connection.</p>';
    }
}

// Browser-local HH:MM; the server's label is used when the stamp won't parse
function timeLabel(ts, fallback) {
    const d = new Date(ts);
    return isNaN(d) ? fallback : d.toLocaleTimeString([], { hour: '2-digit', minute: '2-digit' });
}

async function refreshChart() {
    try {
        const r = await fetch('/dashboard/chart', { cache: 'no-store' });
        if (!r.ok) throw new Error(`HTTP ${r.status}`);
        const data = await r.json();
        titleEl.textContent = data.title;
        const labels = data.timestamps.map((ts, i) => timeLabel(ts, data.labels[i]));
        if (chart) {
            chart.data.labels = labels;
            chart.data.datasets = data.datasets;
            chart.update();
            return;
        }
        chart = new Chart(document.getElementById('moistureChart').getContext('2d'), {
            type: 'line',
            data: { labels, datasets: data.datasets },
            options: {
                responsive: true,
                maintainAspectRatio: false,
                spanGaps: false,
                scales: {
                    y: { min: data.y_min, max: data.y_max, title: { display: true, text: 'Moisture Value' } },
                    x: { title: { display: true, text: 'Time' } }
                },
                plugins: { legend: { display: true, position: 'top' } }
            }
        });
    } catch (e) {
        console.error('Failed to refresh chart:', e);
    }
}

async function refreshLogs() {
    try {
        logEl.innerHTML = await fragment('/dashboard/logs');
        logEl.scrollTop = logEl.scrollHeight;
    } catch (e) {
        console.error('Failed to refresh logs:', e);
        logEl.innerHTML = '<p class="text-red-500 text-sm">Failed to load logs.</p>';
    }
}

cardsEl.addEventListener('click', async (event) => {
    const button = event.target.closest('.water-single-btn');
    if (!button || button.disabled) return;
    const name = button.dataset.sensorName;
    showLocalIndicator(name, { text: `Watering ${name}...`, color: 'text-blue-600', pending: true });

    let result;
    try {
        const r = await fetch(`/dashboard/water/${encodeURIComponent(name)}`, { method: 'POST' });
        if (r.ok) {
            const outcome = await r.json();
            result = {
                text: outcome.message,
                color: outcome.outcome === 'success' ? 'text-green-600' : 'text-red-600',
            };
        } else if (r.status === 409) {
            // Another request for this sensor is in flight; the server shows it
            localIndicators.delete(name);
        } else {
            console.error(`Watering ${name} rejected: HTTP ${r.status}`);
            result = { text: `Network error watering ${name}.`, color: 'text-red-600' };
        }
    } catch (e) {
        console.error(`Error watering ${name}:`, e);
        result = { text: `Network error watering ${name}.`, color: 'text-red-600' };
    }

    if (result) showLocalIndicator(name, { ...result, pending: false });
    await refreshCards();
});

selectEl.addEventListener('change', async () => {
    try {
        await fetch('/dashboard/selection', {
            method: 'PUT',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ sensor: selectEl.value })
        });
    } catch (e) {
        console.error('Failed to store selection:', e);
    }
    refreshChart();
});

document.addEventListener('DOMContentLoaded', () => {
    refreshCards();
    refreshChart();
    refreshLogs();
    setInterval(() => { refreshCards(); refreshChart(); }, REFRESH_MS);
    setInterval(refreshLogs, REFRESH_MS * 2);
});
</script>
</body>
</html>
"##;
