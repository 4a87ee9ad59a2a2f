//! Single-page dashboard markup.

use crate::chart::escape;
use crate::dataset::GroupLabel;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0 auto; max-width: 760px; color: #222; }
h1 { text-align: center; }
#controls, #summary { padding: 20px; font-size: 16px; }
#controls label { margin-right: 16px; }
.note { color: #666; }
"#;

const SCRIPT: &str = r#"
const boxes = () => Array.from(document.querySelectorAll('input[name=group]'));

function line(text) {
  const p = document.createElement('p');
  p.textContent = text;
  return p;
}

async function refresh() {
  const groups = boxes().filter(b => b.checked).map(b => encodeURIComponent(b.value)).join(',');
  const resp = await fetch('/api/view?groups=' + groups);
  const view = await resp.json();
  const summary = document.getElementById('summary');
  const chart = document.getElementById('chart');
  summary.replaceChildren();

  if (view.message) {
    summary.appendChild(line(view.message));
    chart.innerHTML = '';
    return;
  }

  summary.appendChild(line('Total Users: ' + view.total_users));
  for (const arm of view.arms) {
    summary.appendChild(line('Group ' + arm.group + ' Users: ' + arm.users));
  }
  summary.appendChild(line('Conversion Rates:'));
  for (const g of view.rates) {
    summary.appendChild(line(g.group + ': ' + g.rate.toFixed(2) + '%'));
  }
  if (view.test.status === 'ran') {
    const r = view.test.result;
    summary.appendChild(line('Z-statistic: ' + r.z_statistic.toFixed(3) + ' | P-value: ' + r.p_value.toFixed(4)));
    summary.appendChild(line(view.test.conclusion));
  } else {
    const note = line(view.test.reason);
    note.className = 'note';
    summary.appendChild(note);
  }
  chart.innerHTML = view.chart_svg || '';
}

boxes().forEach(b => b.addEventListener('change', refresh));
refresh();
"#;

/// Render the dashboard page with one checkbox per group, all checked.
pub fn render_page(title: &str, groups: &[GroupLabel]) -> String {
    let checkboxes: Vec<String> = groups
        .iter()
        .map(|g| {
            let value = escape(g.as_str());
            format!(
                r#"<label><input type="checkbox" name="group" value="{value}" checked> Group {value}</label>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>{title}</h1>
<div id="controls"><span>Select Group(s):</span> {checkboxes}</div>
<div id="summary"></div>
<div id="chart"></div>
<script>{script}</script>
</body>
</html>
"#,
        title = escape(title),
        style = STYLE,
        checkboxes = checkboxes.join(" "),
        script = SCRIPT
    )
}
