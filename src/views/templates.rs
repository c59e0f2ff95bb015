use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

// Compiled in so the binary and the tests don't depend on the working dir.
const TEMPLATES: &[(&str, &str)] = &[
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/home", include_str!("../../templates/pages/home.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
    ("partials/watchlist", include_str!("../../templates/partials/watchlist.hbs")),
    ("partials/alerts", include_str!("../../templates/partials/alerts.hbs")),
];

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    for (name, src) in TEMPLATES {
        hb.register_template_string(name, *src)
            .unwrap_or_else(|e| panic!("template {name}: {e}"));

        // partial endpoints double as `{{> name}}` inside full pages
        if let Some(partial) = name.strip_prefix("partials/") {
            hb.register_partial(partial, *src)
                .unwrap_or_else(|e| panic!("partial {partial}: {e}"));
        }
    }

    Arc::new(hb)
}
