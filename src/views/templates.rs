use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    // messages are plain text, not HTML
    hb.register_escape_fn(handlebars::no_escape);

    hb.register_template_string(
        "messages/target_hit",
        include_str!("../../templates/messages/target_hit.hbs"),
    )
    .expect("template messages/target_hit");
    hb.register_template_string(
        "messages/market_closed",
        include_str!("../../templates/messages/market_closed.hbs"),
    )
    .expect("template messages/market_closed");
    hb.register_template_string(
        "messages/monitoring_started",
        include_str!("../../templates/messages/monitoring_started.hbs"),
    )
    .expect("template messages/monitoring_started");
    hb.register_template_string(
        "messages/status",
        include_str!("../../templates/messages/status.hbs"),
    )
    .expect("template messages/status");
    hb.register_template_string("messages/help", include_str!("../../templates/messages/help.hbs"))
        .expect("template messages/help");

    Arc::new(hb)
}
