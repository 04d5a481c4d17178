//! HTML page generation.
//!
//! The page is self-contained: inline CSS, server-rendered SVG, the view
//! model as JSON and the formula functions rendered from `core::formula`.

use super::chart::{self, html_escape};
use super::{ReportData, SliderRow};
use crate::core::formula;

/// Generate the rate tool page
pub fn generate_html(data: &ReportData) -> anyhow::Result<String> {
    // keep "</script>" inside string values from closing the script element
    let json_data = serde_json::to_string(data)?.replace("</", "<\\/");
    let js = JS
        .replace("__FORMULAS__", &formula::page_script())
        .replace("__JSON_DATA__", &json_data);

    let sliders: String = data.sliders.iter().map(slider_control).collect();

    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Tax Rate Tool: {scenario}</title>
    <style>
{css}
    </style>
</head>
<body>
    <header>
        <h1>Tax Rate Tool</h1>
        <p class="subtitle">Scenario {scenario}: {current_year} compared with {previous_year}</p>
    </header>

    <main>
        <section class="summary-cards">
            <div class="card">
                <h3>Revenue ({current_year})</h3>
                <p class="value" id="total-revenue">${total:.2}M</p>
            </div>
            <div class="card">
                <h3>Required ({current_year})</h3>
                <p class="value">${required:.2}M</p>
            </div>
            <div class="card">
                <h3>Balance</h3>
                <p class="value" id="balance">{description}</p>
            </div>
        </section>

        <section class="charts">
            <div class="chart">
{revenue_chart}
            </div>
            <div class="chart-row">
                <div class="chart">
{percent_chart}
                </div>
                <div class="indicator">
                    <h3>{indicator_title}</h3>
{indicator}
                </div>
            </div>
        </section>

        <section class="sliders">
            <h2>Tax Rates</h2>
            <div class="slider-grid">
{sliders}
            </div>
            <button class="reset-btn" id="reset-rates">Reset Rates</button>
        </section>
    </main>

    <footer>
        Scenario {scenario} &middot; fingerprint <code id="fingerprint">{fingerprint}</code> &middot; generated {generated_at}
    </footer>

    <script>
{js}
    </script>
</body>
</html>"##,
        scenario = html_escape(&data.scenario),
        current_year = html_escape(&data.current.year),
        previous_year = html_escape(&data.previous.year),
        total = data.current.total,
        required = data.current.required,
        description = html_escape(&data.compliance.description),
        revenue_chart = chart::revenue_chart(data),
        percent_chart = chart::percent_chart(data),
        indicator_title = html_escape(&data.indicator_title),
        indicator = chart::indicator(data),
        sliders = sliders,
        fingerprint = data.fingerprint,
        generated_at = html_escape(&data.generated_at),
        css = CSS,
        js = js
    ))
}

fn slider_control(slider: &SliderRow) -> String {
    format!(
        r#"                <div class="slider">
                    <label for="slider-{key}">{title} <span class="slider-value" id="slider-value-{key}">{value:.4}</span></label>
                    <input type="range" id="slider-{key}" data-sector="{key}" min="{start}" max="{end}" step="{step}" value="{value}">
                </div>
"#,
        key = slider.key,
        title = html_escape(&slider.title),
        start = slider.start,
        end = slider.end,
        step = slider.step,
        value = slider.value
    )
}

const CSS: &str = r#"
:root {
    --gray-50: #f9fafb;
    --gray-200: #e5e7eb;
    --gray-500: #6b7280;
    --gray-900: #111827;
    --primary: #2563eb;
}

* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
    background: var(--gray-50);
    color: var(--gray-900);
    line-height: 1.5;
}

header {
    background: white;
    border-bottom: 1px solid var(--gray-200);
    padding: 1.5rem 2rem;
}

header h1 {
    font-size: 1.5rem;
    font-weight: 600;
}

.subtitle {
    color: var(--gray-500);
}

main {
    padding: 2rem;
    max-width: 1200px;
    margin: 0 auto;
}

.summary-cards {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 1.5rem;
    margin-bottom: 2rem;
}

.card, .chart, .indicator, .sliders {
    background: white;
    border: 1px solid var(--gray-200);
    border-radius: 0.5rem;
    padding: 1rem 1.25rem;
}

.card h3, .indicator h3 {
    font-size: 0.875rem;
    font-weight: 500;
    color: var(--gray-500);
    margin-bottom: 0.5rem;
}

.card .value {
    font-size: 1.5rem;
    font-weight: 600;
}

.charts {
    display: flex;
    flex-direction: column;
    gap: 1.5rem;
    margin-bottom: 2rem;
}

.chart-row {
    display: flex;
    gap: 1.5rem;
    align-items: flex-start;
}

.chart svg {
    max-width: 100%;
    height: auto;
}

.sliders h2 {
    font-size: 1.125rem;
    margin-bottom: 1rem;
}

.slider-grid {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 1rem 2rem;
}

.slider label {
    display: block;
    font-size: 0.875rem;
}

.slider input[type="range"] {
    width: 100%;
}

.slider-value {
    font-weight: 600;
    font-variant-numeric: tabular-nums;
}

.reset-btn {
    margin-top: 1rem;
    padding: 0.5rem 1rem;
    background: var(--primary);
    color: white;
    border: none;
    border-radius: 0.375rem;
    cursor: pointer;
}

footer {
    padding: 1rem 2rem 2rem;
    color: var(--gray-500);
    font-size: 0.75rem;
    text-align: center;
}

@media (max-width: 768px) {
    main {
        padding: 1rem;
    }

    .summary-cards, .slider-grid {
        grid-template-columns: 1fr;
    }

    .chart-row {
        flex-direction: column;
    }
}
"#;

const JS: &str = r###"
const DATA = __JSON_DATA__;

__FORMULAS__

function formatMillions(value) {
    return '$' + value.toFixed(2) + 'M';
}

function formatPercent(value) {
    return value === null ? 'n/a' : value.toFixed(1) + '%';
}

function setText(id, text) {
    const el = document.getElementById(id);
    if (el) el.textContent = text;
}

// Every update reads all sliders, never just the one that moved
function readRates() {
    const rates = {};
    for (const slider of DATA.sliders) {
        rates[slider.key] = parseFloat(document.getElementById('slider-' + slider.key).value);
    }
    return rates;
}

function snapshot(rates) {
    const sectors = DATA.sectors.map(sector => {
        const rate = sector.key in rates ? rates[sector.key] : sector.rate;
        const current = burden(rate, sector.property_value);
        const pct = percentChange(current, sector.previous_burden);
        return {
            key: sector.key,
            label: sector.label,
            rate: rate,
            current_burden: current,
            percent_change: Number.isFinite(pct) ? pct : null,
        };
    });
    const total = sectors.reduce((sum, sector) => sum + sector.current_burden, 0);
    const diff = balance(DATA.current.required, total);
    return {
        sectors: sectors,
        total: total,
        balance: diff,
        verdict: verdict(diff, DATA.tolerance),
    };
}

function revenueX(value) {
    const layout = DATA.revenue_chart;
    const v = Math.min(Math.max(value, 0), layout.x_max);
    return layout.left + v / layout.x_max * layout.plot_width;
}

function percentY(value) {
    const layout = DATA.percent_chart;
    const v = Math.min(Math.max(value, layout.y_min), layout.y_max);
    return layout.top + (layout.y_max - v) / (layout.y_max - layout.y_min) * layout.plot_height;
}

function describe(snap) {
    const label = DATA.verdicts[snap.verdict].label;
    if (snap.verdict === 'ExactMatch') return label;
    return label + ' by ' + formatMillions(Math.abs(snap.balance));
}

function render(snap) {
    const zero = percentY(0);
    let offset = 0;
    for (const sector of snap.sectors) {
        const bar = document.getElementById('bar-current-' + sector.key);
        const x0 = revenueX(offset);
        const x1 = revenueX(offset + sector.current_burden);
        bar.setAttribute('x', x0.toFixed(2));
        bar.setAttribute('width', (x1 - x0).toFixed(2));
        setText('tip-current-' + sector.key, sector.label + ' Revenue: ' + formatMillions(sector.current_burden));
        offset += sector.current_burden;

        const top = sector.percent_change === null ? zero : percentY(sector.percent_change);
        const pct = document.getElementById('pct-' + sector.key);
        pct.setAttribute('y', Math.min(top, zero).toFixed(2));
        pct.setAttribute('height', Math.abs(top - zero).toFixed(2));
        setText('pct-tip-' + sector.key, sector.label + ': ' + formatPercent(sector.percent_change));

        setText('slider-value-' + sector.key, sector.rate.toFixed(4));
    }

    const style = DATA.verdicts[snap.verdict];
    document.getElementById('indicator-box').setAttribute('fill', style.color);
    setText('indicator-text', style.label);
    setText('total-revenue', formatMillions(snap.total));
    setText('balance', describe(snap));
}

function update() {
    render(snapshot(readRates()));
}

// Restores the scenario's rates, not the rates the page opened with
function resetRates() {
    for (const slider of DATA.sliders) {
        const input = document.getElementById('slider-' + slider.key);
        input.min = slider.reset.start;
        input.max = slider.reset.end;
        input.value = slider.reset.value;
    }
    update();
}

document.addEventListener('DOMContentLoaded', () => {
    for (const slider of DATA.sliders) {
        document.getElementById('slider-' + slider.key).addEventListener('input', update);
    }
    document.getElementById('reset-rates').addEventListener('click', resetRates);
});
"###;
