//! Template engine setup and HTML templates.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

/// Global template engine instance with embedded templates.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();

    tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("grid.html", GRID_TEMPLATE),
        ("editor.html", EDITOR_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
    ])
    .expect("Failed to load templates");

    tera
});

/// Render a template with context
pub fn render(template: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(template, context)
}

// =============================================================================
// Embedded Templates
// =============================================================================

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}Translation Workbench{% endblock %}</title>
    <style>
        :root {
            --bg: #0a0a0a;
            --bg-secondary: #141414;
            --foreground: #fafafa;
            --foreground-secondary: rgba(250, 250, 250, 0.7);
            --foreground-tertiary: rgba(250, 250, 250, 0.4);
            --border: #262626;
            --border-subtle: #1a1a1a;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.5;
            -webkit-font-smoothing: antialiased;
        }

        a { color: var(--foreground); text-decoration: none; }
        a:hover { opacity: 0.7; }

        .header {
            border-bottom: 1px solid var(--border-subtle);
            padding: 16px 32px;
        }
        .header-content {
            display: flex;
            align-items: center;
            justify-content: space-between;
        }
        .logo { font-size: 18px; font-weight: 600; letter-spacing: -0.02em; }

        .container { padding: 24px 32px; }

        h1 { font-size: 24px; font-weight: 600; letter-spacing: -0.02em; margin-bottom: 16px; }

        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 12px;
            overflow: auto;
        }

        /* Grid */
        table { width: 100%; border-collapse: collapse; font-size: 13px; }
        th, td {
            padding: 8px 10px;
            border-bottom: 1px solid var(--border-subtle);
            text-align: left;
            vertical-align: top;
        }
        th {
            color: var(--foreground-secondary);
            font-weight: 500;
            text-transform: uppercase;
            font-size: 11px;
            letter-spacing: 0.05em;
        }
        tr.selected { background: rgba(59, 130, 246, 0.08); }
        tr.finalized td { color: var(--foreground-tertiary); }
        td.english { max-width: 360px; }
        td.mono { font-family: 'SF Mono', 'Consolas', Menlo, monospace; }

        input[type=text], select, textarea {
            background: var(--bg);
            color: var(--foreground);
            border: 1px solid var(--border);
            border-radius: 6px;
            padding: 6px 8px;
            font: inherit;
            width: 100%;
        }
        textarea { min-height: 120px; }
        form.inline { display: inline; }
        .filter-row th { padding-top: 0; }

        .badge {
            font-size: 11px;
            font-weight: 500;
            padding: 2px 8px;
            border-radius: 100px;
            background: var(--border);
            color: var(--foreground-secondary);
            text-transform: uppercase;
        }
        .badge-success { background: rgba(34, 197, 94, 0.15); color: #4ade80; }
        .badge-warning { background: rgba(234, 179, 8, 0.15); color: #facc15; }

        .btn {
            display: inline-flex;
            align-items: center;
            gap: 6px;
            padding: 6px 14px;
            border-radius: 100px;
            font-size: 13px;
            font-weight: 500;
            border: none;
            cursor: pointer;
        }
        .btn[disabled] { opacity: 0.4; cursor: default; }
        .btn-primary { background: var(--foreground); color: var(--bg); }
        .btn-secondary {
            background: transparent;
            border: 1px solid var(--border);
            color: var(--foreground);
        }
        .btn-small { padding: 2px 10px; font-size: 12px; }

        .toolbar {
            display: flex;
            flex-wrap: wrap;
            align-items: center;
            gap: 8px;
            margin-bottom: 16px;
        }
        .toolbar select { width: auto; }
        .spacer { flex: 1; }

        .notice {
            border-radius: 8px;
            padding: 10px 14px;
            margin-bottom: 16px;
            font-size: 14px;
        }
        .notice-success { background: rgba(34, 197, 94, 0.12); color: #4ade80; }
        .notice-error { background: rgba(239, 68, 68, 0.12); color: #f87171; }

        .pagination {
            display: flex;
            align-items: center;
            justify-content: space-between;
            margin-top: 16px;
            color: var(--foreground-secondary);
            font-size: 13px;
        }

        .dialog-backdrop {
            position: fixed;
            inset: 0;
            background: rgba(0, 0, 0, 0.6);
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .dialog {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 24px;
            width: min(640px, 90vw);
        }
        .dialog h2 { font-size: 16px; margin-bottom: 12px; }
        .dialog .source { color: var(--foreground-secondary); margin-bottom: 12px; white-space: pre-wrap; }

        .empty {
            text-align: center;
            padding: 48px 32px;
            color: var(--foreground-tertiary);
        }
        .text-tertiary { color: var(--foreground-tertiary); }
    </style>
</head>
<body>
    <header class="header">
        <div class="header-content">
            <a href="/" class="logo">Translation Workbench</a>
            <span class="text-tertiary">English &rarr; Hungarian</span>
        </div>
    </header>
    <main class="container">
        {% block content %}{% endblock %}
    </main>
</body>
</html>"##;

const GRID_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
{% if notice %}
<div class="notice notice-{{ notice.kind }}">{{ notice.message }}</div>
{% endif %}

<div class="toolbar">
    <form method="post" action="/ui/model" class="inline">
        <select name="model_id" onchange="this.form.submit()">
            {% for model in models %}
            <option value="{{ model.id }}" {% if model.id == model_id %}selected{% endif %}>{{ model.displayName }}</option>
            {% endfor %}
        </select>
    </form>
    <form method="post" action="/ui/select-all" class="inline">
        <button class="btn btn-secondary" {% if eligible_count == 0 %}disabled{% endif %}>Select all ({{ eligible_count }})</button>
    </form>
    <form method="post" action="/ui/select-range" class="inline">
        <input type="text" name="start" placeholder="from id" size="6" style="width: 80px">
        <input type="text" name="end" placeholder="to id" size="6" style="width: 80px">
        <button class="btn btn-secondary">Select range</button>
    </form>
    <form method="post" action="/ui/clear" class="inline">
        <button class="btn btn-secondary" {% if selected_count == 0 %}disabled{% endif %}>Clear selection</button>
    </form>
    <span class="spacer"></span>
    <span class="text-tertiary">{{ selected_count }} selected</span>
    <form method="post" action="/ui/translate-selected" class="inline">
        <input type="hidden" name="model_id" value="{{ model_id }}">
        <button class="btn btn-secondary" {% if selected_count == 0 %}disabled{% endif %}>Translate selected</button>
    </form>
    <form method="post" action="/ui/finalize" class="inline">
        <button class="btn btn-primary" {% if selected_count == 0 %}disabled{% endif %}>Finalize selected</button>
    </form>
</div>

<div class="card">
    <form id="filters" method="post" action="/ui/filters"></form>
    <table>
        <thead>
            <tr>
                <th></th>
                {% for filter in filters %}<th>{{ filter.label }}</th>{% endfor %}
                <th>Status</th>
                <th></th>
            </tr>
            <tr class="filter-row">
                <th><button form="filters" class="btn btn-secondary btn-small">Filter</button></th>
                {% for filter in filters %}
                <th><input type="text" form="filters" name="{{ filter.name }}" value="{{ filter.value }}" data-live-filter></th>
                {% endfor %}
                <th>
                    <select form="filters" name="is_translated">
                        <option value="" {% if status_filter == "" %}selected{% endif %}>All</option>
                        <option value="false" {% if status_filter == "false" %}selected{% endif %}>Draft</option>
                        <option value="true" {% if status_filter == "true" %}selected{% endif %}>Finalized</option>
                    </select>
                </th>
                <th>
                    <form method="post" action="/ui/filters/clear" class="inline">
                        <button class="btn btn-secondary btn-small">Reset</button>
                    </form>
                </th>
            </tr>
        </thead>
        <tbody>
            {% for row in rows %}
            <tr class="{% if row.selected %}selected{% endif %} {% if row.is_translated %}finalized{% endif %}">
                <td>
                    {% if row.selectable %}
                    <form method="post" action="/ui/select/{{ row.id }}" class="inline">
                        <button class="btn btn-secondary btn-small">{% if row.selected %}&#10003;{% else %}&nbsp;{% endif %}</button>
                    </form>
                    {% endif %}
                </td>
                <td class="mono">{{ row.id }}</td>
                <td title="{{ row.path }}">{{ row.filename }}</td>
                <td class="mono">{{ row.key }}</td>
                <td class="english">{{ row.english_text }}</td>
                <td>
                    {% if row.is_translated %}
                    {{ row.temp_hungarian }}
                    {% else %}
                    <form method="post" action="/ui/rows/{{ row.id }}/draft">
                        <input type="text" name="value" value="{{ row.temp_hungarian }}">
                    </form>
                    {% endif %}
                </td>
                <td>{{ row.final_hungarian }}</td>
                <td>
                    {% if row.is_translated %}
                    <span class="badge badge-success">Final</span>
                    {% else %}
                    <span class="badge badge-warning">Draft</span>
                    {% endif %}
                </td>
                <td>
                    {% if not row.is_translated %}
                    <a class="btn btn-secondary btn-small" href="/ui/edit/{{ row.id }}">Edit</a>
                    <form method="post" action="/ui/translate/{{ row.id }}" class="inline">
                        <input type="hidden" name="model_id" value="{{ model_id }}">
                        <button class="btn btn-secondary btn-small">Translate</button>
                    </form>
                    {% endif %}
                </td>
            </tr>
            {% endfor %}
        </tbody>
    </table>
    {% if rows | length == 0 %}
    <div class="empty">No translations match the current filters.</div>
    {% endif %}
</div>

<div class="pagination">
    <span>{{ total }} rows &middot; page {{ page }} of {{ total_pages }}</span>
    <div>
        <form method="post" action="/ui/page/prev" class="inline">
            <button class="btn btn-secondary" {% if page <= 1 %}disabled{% endif %}>Previous</button>
        </form>
        <form method="post" action="/ui/page" class="inline">
            <input type="text" name="page" value="{{ page }}" style="width: 60px">
        </form>
        <form method="post" action="/ui/page/next" class="inline">
            <button class="btn btn-secondary" {% if page >= total_pages %}disabled{% endif %}>Next</button>
        </form>
    </div>
</div>

{% if editor %}{% include "editor.html" %}{% endif %}

<script>
    // Send each edit as it is typed; the grid reloads once typing pauses
    (function () {
        var reload = null;
        document.querySelectorAll("[data-live-filter]").forEach(function (input) {
            input.addEventListener("input", function () {
                fetch("/ui/filter/" + input.name, {
                    method: "POST",
                    headers: { "Content-Type": "application/x-www-form-urlencoded" },
                    body: "value=" + encodeURIComponent(input.value)
                });
                clearTimeout(reload);
                reload = setTimeout(function () { location.reload(); }, {{ debounce_ms }});
            });
        });
    })();
</script>
{% endblock %}"##;

const EDITOR_TEMPLATE: &str = r##"<div class="dialog-backdrop">
    <div class="dialog">
        <h2>Edit translation #{{ editor.id }}{% if editor.key %} &middot; <span class="text-tertiary">{{ editor.key }}</span>{% endif %}</h2>
        <div class="source">{{ editor.english_text }}</div>
        <form method="post" action="/ui/edit/{{ editor.id }}">
            <textarea name="value" autofocus>{{ editor.value }}</textarea>
            <div class="toolbar" style="margin-top: 12px; margin-bottom: 0">
                <button class="btn btn-primary">Save</button>
                <button class="btn btn-secondary" formaction="/ui/translate/{{ editor.id }}" name="model_id" value="{{ model_id }}">Translate</button>
                <span class="spacer"></span>
                <button class="btn btn-secondary" formaction="/ui/cancel-edit">Cancel</button>
            </div>
        </form>
    </div>
</div>"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Error - Translation Workbench{% endblock %}
{% block content %}
<div class="empty">
    <h1>Something went wrong</h1>
    <p>{{ message }}</p>
    <p class="mt-4"><a href="/" class="btn btn-secondary">Back to translations</a></p>
</div>
{% endblock %}"##;
