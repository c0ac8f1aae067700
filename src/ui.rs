use crate::handlers::CHART_SESSION_HEADER;
use crate::page::Region;
use crate::render::{self, ANALYZING};

/// Page markup bound to `session`, the id its chart redraws are keyed by.
pub fn render_index(session: &str) -> String {
    INDEX_HTML
        .replace("{{SESSION}}", session)
        .replace("{{SESSION_HEADER}}", CHART_SESSION_HEADER)
        .replace("{{REGISTER_UNREACHABLE}}", &script_string(render::registration_unreachable()))
        .replace("{{UPLOAD_UNREACHABLE}}", &script_string(render::upload_unreachable()))
        .replace("{{REGISTER_FORM}}", Region::RegisterForm.id())
        .replace("{{REGISTER_STATUS}}", Region::RegisterStatus.id())
        .replace("{{UPLOAD_FORM}}", Region::UploadForm.id())
        .replace("{{RESULT}}", Region::Result.id())
        .replace("{{CHART}}", Region::CalorieChart.id())
        .replace("{{ANALYZING}}", ANALYZING)
}

/// Quoted string literal safe to drop into the page script.
fn script_string(text: String) -> String {
    serde_json::Value::String(text).to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Calorie Log</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef6ee;
      --bg-2: #bfe3c6;
      --ink: #23302a;
      --accent: #27ae60;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f2e1 60%, #f4faf2 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.4rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
    }

    input,
    select {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(39, 174, 96, 0.3);
    }

    button:active {
      transform: scale(0.98);
    }

    .status {
      margin-top: 12px;
      min-height: 1.2em;
      color: #4e5a53;
    }

    #{{RESULT}} {
      display: none;
      margin-top: 16px;
    }

    .salad-type {
      border-left: 3px solid var(--accent);
      padding-left: 12px;
      margin-bottom: 10px;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Calorie Log</h1>
      <p class="subtitle">Save your profile, snap your meal, watch the week add up.</p>
    </header>

    <section class="card">
      <h2>Profile</h2>
      <form id="{{REGISTER_FORM}}">
        <input name="user_id" placeholder="User ID" required />
        <input name="name" placeholder="Name" />
        <input name="age" type="number" placeholder="Age" />
        <select name="gender">
          <option value="male">Male</option>
          <option value="female">Female</option>
        </select>
        <input name="height" type="number" step="0.1" placeholder="Height (cm)" />
        <input name="weight" type="number" step="0.1" placeholder="Weight (kg)" />
        <select name="activity_level">
          <option value="sedentary">Sedentary</option>
          <option value="light">Light</option>
          <option value="moderate">Moderate</option>
          <option value="active">Active</option>
        </select>
        <button type="submit">Save profile</button>
      </form>
      <p class="status" id="{{REGISTER_STATUS}}"></p>
    </section>

    <section class="card">
      <h2>Log a meal</h2>
      <form id="{{UPLOAD_FORM}}" enctype="multipart/form-data">
        <input name="user_id" placeholder="User ID" required />
        <input name="file" type="file" accept="image/*" required />
        <button type="submit">Analyze</button>
      </form>
      <div id="{{RESULT}}"></div>
    </section>

    <section class="card">
      <h2>This week</h2>
      <canvas id="{{CHART}}"></canvas>
    </section>
  </main>

  <script>
    const session = '{{SESSION}}';
    const charts = new Map();
    let latestChart = 0;

    const drawChart = (target, snapshot) => {
      if (snapshot.id < latestChart) {
        return;
      }
      if (snapshot.replaces !== null && charts.has(snapshot.replaces)) {
        charts.get(snapshot.replaces).destroy();
        charts.delete(snapshot.replaces);
      }
      const canvas = document.getElementById(target);
      charts.set(snapshot.id, new Chart(canvas.getContext('2d'), snapshot.config));
      latestChart = snapshot.id;
    };

    const apply = (instructions) => {
      for (const step of instructions) {
        const el = document.getElementById(step.target);
        if (step.kind === 'text') {
          el.innerText = step.text;
        } else if (step.kind === 'html') {
          el.style.display = 'block';
          el.innerHTML = step.html;
        } else if (step.kind === 'chart') {
          try {
            drawChart(step.target, step.chart);
          } catch (err) {
            console.error('Error drawing chart:', err);
          }
        }
      }
    };

    const dispatch = async (url, options = {}) => {
      const headers = { '{{SESSION_HEADER}}': session };
      const res = await fetch(url, { ...options, headers });
      if (!res.ok) {
        throw new Error((await res.text()) || `Server error ${res.status}`);
      }
      apply(await res.json());
    };

    document.getElementById('{{REGISTER_FORM}}').addEventListener('submit', (event) => {
      event.preventDefault();
      const body = new URLSearchParams(new FormData(event.target));
      dispatch('/api/register', { method: 'POST', body }).catch((err) => {
        console.error('Register error:', err);
        document.getElementById('{{REGISTER_STATUS}}').innerText = {{REGISTER_UNREACHABLE}};
      });
    });

    document.getElementById('{{UPLOAD_FORM}}').addEventListener('submit', (event) => {
      event.preventDefault();
      const result = document.getElementById('{{RESULT}}');
      result.style.display = 'block';
      result.innerHTML = '{{ANALYZING}}';
      dispatch('/api/upload', { method: 'POST', body: new FormData(event.target) }).catch((err) => {
        console.error('Upload failed:', err);
        result.innerHTML = {{UPLOAD_UNREACHABLE}};
      });
    });

    dispatch('/api/chart').catch((err) => console.error('Error loading chart:', err));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_binds_every_region() {
        let html = render_index("1f-2");
        for region in [
            Region::RegisterForm,
            Region::RegisterStatus,
            Region::UploadForm,
            Region::Result,
            Region::CalorieChart,
        ] {
            assert!(html.contains(&format!(r#"id="{}""#, region.id())), "{region:?}");
        }
        assert!(!html.contains("{{"));
        assert!(html.contains(ANALYZING));
        assert!(html.contains("const session = '1f-2';"));
        assert!(html.contains(&format!("'{CHART_SESSION_HEADER}': session")));
    }

    #[test]
    fn page_failures_use_fixed_network_message() {
        let html = render_index("1f-2");
        assert!(html.contains(
            r#"innerText = "❌ Network error — couldn't reach server.";"#
        ));
        assert!(html.contains(
            r#"result.innerHTML = "<p style=\"color:red;\">Network error — couldn't reach server.</p>";"#
        ));
        assert!(!html.contains("err.message"));
    }
}
