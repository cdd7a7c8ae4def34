use axum::{extract::Query, response::Html};
use serde::Deserialize;

const DEFAULT_NEXT: &str = "/dashboard";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Post-login destination. Only same-site absolute paths are honoured so the
/// login page cannot be used as an open redirect.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n,
        _ => DEFAULT_NEXT,
    }
}

/// JSON string literal safe to embed inside a `<script>` block.
fn script_literal(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"/dashboard\"".into())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

pub async fn login_page(Query(q): Query<LoginQuery>) -> Html<String> {
    let next = script_literal(safe_next(q.next.as_deref()));
    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<form id="login">
  <h1>Sign in</h1>
  <label>Username <input name="username" autocomplete="username"></label>
  <label>Password <input name="password" type="password" autocomplete="current-password"></label>
  <p id="error" role="alert"></p>
  <button type="submit">Login</button>
</form>
<script>
const next = {next};
document.getElementById("login").addEventListener("submit", async (e) => {{
  e.preventDefault();
  const form = new FormData(e.target);
  const res = await fetch("/api/auth/login", {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify({{ username: form.get("username"), password: form.get("password") }}),
  }});
  if (res.ok) {{
    window.location.replace(next);
  }} else {{
    const data = await res.json().catch(() => ({{ message: "Login failed" }}));
    document.getElementById("error").textContent = data.message || "Login failed";
  }}
}});
</script>
</body>
</html>
"#
    ))
}

/// Landing page behind the session gate. Charts and document forms are
/// served by separate services.
pub async fn dashboard_page() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Desk</title></head>
<body>
<h1>Desk</h1>
<button id="logout">Logout</button>
<script>
document.getElementById("logout").addEventListener("click", async () => {
  await fetch("/api/auth/logout", { method: "POST" });
  window.location.replace("/login");
});
</script>
</body>
</html>
"#,
    )
}
