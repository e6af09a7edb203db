//! Registration form page
//!
//! GET / and GET /register serve the HTML form, with the membership categories
//! and their fees filled in from `MembershipCategory`.

use axum::response::Html;
use shared::models::MembershipCategory;
use std::sync::LazyLock;

const TEMPLATE: &str = include_str!("../../assets/register.html");
const CATEGORY_PLACEHOLDER: &str = "{{membership_categories}}";

static PAGE: LazyLock<String> = LazyLock::new(|| render(TEMPLATE));

pub async fn register_page() -> Html<&'static str> {
    Html(PAGE.as_str())
}

fn render(template: &str) -> String {
    let options = MembershipCategory::ALL
        .iter()
        .map(|c| {
            format!(
                r#"<label class="radio"><input type="radio" name="membership_category" value="{label}" data-fee="{fee}"> {label} (৳{fee})</label>"#,
                label = c.as_str(),
                fee = c.fee(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");
    template.replace(CATEGORY_PLACEHOLDER, &options)
}
