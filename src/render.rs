//! Status text and result fragments for the page regions.

use crate::models::{
    DailyStatus, MultiTypeFoodResult, Nutrition, Quantity, RegistrationReceipt, Reply,
    SingleFoodResult,
};

pub const NETWORK_ERROR: &str = "Network error — couldn't reach server.";
pub const ANALYZING: &str = "<p>Analyzing image…</p>";
const NOT_AVAILABLE: &str = "N/A";

/// Status line for a rejected registration.
pub fn registration_failure(reply: &Reply) -> String {
    format!("❌ {}", reply.failure_message(&["message", "error"]))
}

pub fn registration_saved(receipt: &RegistrationReceipt) -> String {
    format!(
        "✅ {} | BMI: {} | Daily Target: {} kcal",
        receipt.message.as_deref().unwrap_or("Profile saved"),
        receipt.bmi.as_deref().unwrap_or(NOT_AVAILABLE),
        receipt.calorie_target.as_deref().unwrap_or(NOT_AVAILABLE),
    )
}

pub fn registration_unreachable() -> String {
    format!("❌ {NETWORK_ERROR}")
}

pub fn upload_error(message: &str) -> String {
    format!(r#"<p style="color:red;">Error: {}</p>"#, html_escape(message))
}

pub fn upload_unreachable() -> String {
    format!(r#"<p style="color:red;">{NETWORK_ERROR}</p>"#)
}

pub fn single_food(result: &SingleFoodResult) -> String {
    let nut = &result.nutrition;
    let mut html = format!(
        "<h3>🍽️ {} ({}% confidence)</h3>\n",
        html_escape(&result.food),
        amount(&result.confidence)
    );
    html.push_str(&format!("<p><b>Calories:</b> {}</p>\n", amount(&nut.calories)));
    html.push_str(&format!(
        "<p><b>Protein:</b> {}g | <b>Fat:</b> {}g | <b>Carbs:</b> {}g | <b>Fiber:</b> {}g</p>\n",
        amount(&nut.protein),
        amount(&nut.fat),
        amount(&nut.carbs),
        amount(&nut.fiber)
    ));
    html.push_str("<hr>\n");
    html.push_str(&daily_status(&result.daily, true));
    html
}

pub fn multi_type_food(result: &MultiTypeFoodResult) -> String {
    let mut html = format!(
        "<h3>🥗 {} ({}% confidence)</h3>\n<p><b>Possible Salad Types:</b></p>\n",
        html_escape(&result.food),
        amount(&result.confidence)
    );
    for (name, nutrition) in &result.types {
        html.push_str(&salad_type(name, nutrition));
    }
    html.push_str("<hr>");
    html.push_str(&daily_status(&result.daily, false));
    html
}

fn salad_type(name: &str, nut: &Nutrition) -> String {
    format!(
        concat!(
            "<div class=\"salad-type\">\n",
            "  <h4>{}</h4>\n",
            "  <p>Calories: {}</p>\n",
            "  <p>Protein: {}g | Fat: {}g | Carbs: {}g | Fiber: {}g</p>\n",
            "</div>\n"
        ),
        html_escape(name),
        amount(&nut.calories),
        amount(&nut.protein),
        amount(&nut.fat),
        amount(&nut.carbs),
        amount(&nut.fiber)
    )
}

/// Total-today line, target indicator and optional suggestions.
fn daily_status(daily: &DailyStatus, rule_before_suggestions: bool) -> String {
    let mut html = format!(
        "<p><b>Total Calories Today:</b> {} kcal</p>\n",
        html_escape(&daily.total_calories_today.to_string())
    );
    html.push_str(if daily.target_exceeded {
        "<p style='color:red;'>⚠️ Daily target exceeded!</p>\n"
    } else {
        "<p style='color:green;'>✅ Within daily target.</p>\n"
    });
    if let Some(suggestions) = &daily.suggestions {
        if rule_before_suggestions {
            html.push_str("<hr>");
        }
        let lines: Vec<String> = suggestions.iter().map(|line| html_escape(line)).collect();
        html.push_str(&format!(
            "<p><b>Suggestions:</b><br>{}</p>\n",
            lines.join("<br>")
        ));
    }
    html
}

fn amount(value: &Option<Quantity>) -> String {
    value
        .as_ref()
        .map_or_else(|| NOT_AVAILABLE.to_string(), |q| html_escape(&q.to_string()))
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
